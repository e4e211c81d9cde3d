//! Slack connectivity.
//!
//! ## Module Structure
//!
//! - `transport`: Slack Web API client behind the `ChatTransport` seam
//! - `session`: connect/read/dispatch/write/ping loop with reconnection

pub mod session;
pub mod transport;

pub use session::Session;
pub use transport::SlackTransport;
