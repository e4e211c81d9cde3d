//! Command pipeline: extraction, dispatch and reply construction.
//!
//! ## Module Structure
//!
//! - `commands`: bracketed command extraction and priority-ordered dispatch
//! - `formatter`: card rules text to Slack mrkdwn
//! - `responses`: card and pack attachments
//! - `schedule`: upcoming release page fetch and parse

pub mod commands;
pub mod formatter;
pub mod responses;
pub mod schedule;

pub use commands::CommandDispatcher;
pub use responses::ResponseBuilder;
pub use schedule::{HttpReleaseSource, ReleaseSource};
