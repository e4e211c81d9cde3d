//! Canonical message types for chat communication.
//!
//! This module defines the single source of truth for the payloads that
//! flow between the chat transport and the command dispatcher.

use serde::{Deserialize, Serialize};

/// Attachment parts Slack should render as mrkdwn.
const MRKDWN_IN: [&str; 3] = ["pretext", "text", "fields"];

/// Event read from the chat stream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundEvent {
    /// Event type tag (`"message"` for chat messages).
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Message text, present on message events.
    #[serde(default)]
    pub text: Option<String>,
    /// Message subtype (edits, joins, bot posts...).
    #[serde(default)]
    pub subtype: Option<String>,
    /// Set when the message was posted by a bot integration.
    #[serde(default)]
    pub bot_id: Option<String>,
    /// Slack timestamp, doubles as the message id.
    #[serde(default)]
    pub ts: Option<String>,
}

impl InboundEvent {
    /// Create a plain message event.
    #[cfg(test)]
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            kind: "message".to_string(),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Whether this event is a chat message the dispatcher should see.
    pub fn is_message(&self) -> bool {
        self.kind == "message"
    }

    /// Whether this event was posted by a bot (including ourselves).
    pub fn is_from_bot(&self) -> bool {
        self.bot_id.is_some() || self.subtype.as_deref() == Some("bot_message")
    }
}

/// Short field rendered inside an attachment (pack summaries).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentField {
    pub title: String,
    pub value: String,
    pub short: bool,
}

/// Structured, styled block accompanying a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub mrkdwn_in: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretext: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// `#RRGGBB` color bar.
    pub color: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<AttachmentField>,
}

impl Attachment {
    /// Create an empty attachment with the given color.
    pub fn new(color: impl Into<String>) -> Self {
        Self {
            mrkdwn_in: MRKDWN_IN.iter().map(|s| s.to_string()).collect(),
            pretext: None,
            text: None,
            color: color.into(),
            fields: Vec::new(),
        }
    }

    /// Set the pretext.
    pub fn with_pretext(mut self, pretext: impl Into<String>) -> Self {
        self.pretext = Some(pretext.into());
        self
    }

    /// Set the body text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Reply produced by a command handler, before it is addressed to a channel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reply {
    pub text: String,
    pub attachments: Vec<Attachment>,
}

impl Reply {
    /// Plain text reply.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachments: Vec::new(),
        }
    }

    /// Reply with attachments.
    pub fn with_attachments(text: impl Into<String>, attachments: Vec<Attachment>) -> Self {
        Self {
            text: text.into(),
            attachments,
        }
    }
}

/// Message queued for delivery to the chat transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Destination channel name (without the leading `#`).
    pub channel: String,
    pub text: String,
    pub attachments: Vec<Attachment>,
}

impl OutboundMessage {
    /// Address a handler reply to a channel.
    pub fn new(channel: impl Into<String>, reply: Reply) -> Self {
        Self {
            channel: channel.into(),
            text: reply.text,
            attachments: reply.attachments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_event_from_json() {
        let event: InboundEvent =
            serde_json::from_str(r#"{"type":"message","text":"[[help]]","ts":"1.2"}"#).unwrap();
        assert!(event.is_message());
        assert!(!event.is_from_bot());
        assert_eq!(event.text.as_deref(), Some("[[help]]"));
    }

    #[test]
    fn test_non_message_event() {
        let event: InboundEvent = serde_json::from_str(r#"{"type":"presence_change"}"#).unwrap();
        assert!(!event.is_message());
        assert!(event.text.is_none());
    }

    #[test]
    fn test_bot_message_detected() {
        let event: InboundEvent =
            serde_json::from_str(r#"{"type":"message","text":"hi","bot_id":"B01"}"#).unwrap();
        assert!(event.is_from_bot());
    }

    #[test]
    fn test_attachment_serialization_skips_empty_parts() {
        let json = serde_json::to_value(Attachment::new("#b30000")).unwrap();
        assert_eq!(json["color"], "#b30000");
        assert_eq!(json["mrkdwn_in"][2], "fields");
        assert!(json.get("fields").is_none());
        assert!(json.get("pretext").is_none());
    }
}
