//! Common utilities and types shared across the application.

pub mod error;
pub mod messages;
pub mod queue;

// Re-export message types from messages module
pub use messages::{Attachment, AttachmentField, InboundEvent, OutboundMessage, Reply};
pub use queue::OutboundQueue;
