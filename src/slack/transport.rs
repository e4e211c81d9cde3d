//! Chat transport abstraction and the Slack Web API implementation.
//!
//! The Slack transport is poll-driven: `read` asks `conversations.history`
//! for anything newer than the last message it has seen, so a read never
//! blocks waiting for traffic.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::common::error::{TransportError, TransportResult};
use crate::common::{InboundEvent, OutboundMessage};
use crate::config::types::SlackConfig;

/// Slack errors meaning the destination channel cannot be posted to.
const UNRESOLVED_CHANNEL_ERRORS: [&str; 3] = ["channel_not_found", "not_in_channel", "is_archived"];

/// Page size for list/history calls.
const PAGE_LIMIT: &str = "200";

/// Used when a 429 response carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

/// Outcome of a single send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The transport accepted the message.
    Delivered,
    /// The destination channel is unknown or not postable.
    ChannelUnresolved,
    /// The transport refused the message for another reason.
    Rejected(String),
}

/// Connect/receive/send primitives used by the session loop.
#[allow(async_fn_in_trait)]
pub trait ChatTransport {
    /// Establish a session. Called again after any failure.
    async fn connect(&mut self) -> TransportResult<()>;

    /// Return every event available right now, oldest first.
    async fn read(&mut self) -> TransportResult<Vec<InboundEvent>>;

    /// Attempt to deliver one message.
    async fn send(&mut self, message: &OutboundMessage) -> TransportResult<Delivery>;

    /// Liveness probe; `false` means the session is no longer usable.
    async fn ping(&mut self) -> TransportResult<bool>;
}

/// State established by a successful `connect`.
#[derive(Debug)]
struct SlackSession {
    /// Channel name -> channel id.
    channels: HashMap<String, String>,
    /// Id of the channel we read from.
    watch_channel_id: String,
}

/// Slack Web API transport authenticated with a bot token.
#[derive(Debug)]
pub struct SlackTransport {
    client: reqwest::Client,
    api_base: String,
    token: String,
    watch_channel: String,
    username: String,
    icon_url: String,
    session: Option<SlackSession>,
    /// Timestamp of the newest message already read. Kept across
    /// reconnects so messages posted while disconnected are still read.
    cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthTest {
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    team: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChannelInfo {
    id: String,
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

#[derive(Debug, Deserialize)]
struct ChannelList {
    channels: Vec<ChannelInfo>,
    #[serde(default)]
    response_metadata: ResponseMetadata,
}

#[derive(Debug, Deserialize)]
struct History {
    #[serde(default)]
    messages: Vec<InboundEvent>,
}

impl SlackTransport {
    pub fn new(config: &SlackConfig, timeout: Duration) -> TransportResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| TransportError::Http {
                method: "client".to_string(),
                source,
            })?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            watch_channel: config.channel.trim_start_matches('#').to_string(),
            username: config.username.clone(),
            icon_url: config.icon_url.clone(),
            session: None,
            cursor: None,
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.api_base, method)
    }

    /// Send a request and return the raw JSON body.
    async fn call(&self, method: &str, request: RequestBuilder) -> TransportResult<Value> {
        let http_err = |source: reqwest::Error| TransportError::Http {
            method: method.to_string(),
            source,
        };

        let response = request.bearer_auth(&self.token).send().await.map_err(http_err)?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(TransportError::RateLimited {
                method: method.to_string(),
                retry_after_secs: retry_after_secs(response.headers()),
            });
        }

        response
            .error_for_status()
            .map_err(http_err)?
            .json()
            .await
            .map_err(http_err)
    }

    async fn get<T: DeserializeOwned>(&self, method: &str, query: &[(&str, &str)]) -> TransportResult<T> {
        let request = self.client.get(self.url(method)).query(query);
        let body = self.call(method, request).await?;
        decode(method, body)
    }

    async fn auth_test(&self) -> TransportResult<AuthTest> {
        let request = self.client.post(self.url("auth.test"));
        let body = self.call("auth.test", request).await?;
        decode("auth.test", body)
    }

    /// Map every visible channel name to its id.
    async fn list_channels(&self) -> TransportResult<HashMap<String, String>> {
        let mut channels = HashMap::new();
        let mut cursor = String::new();

        loop {
            let page: ChannelList = self
                .get(
                    "conversations.list",
                    &[
                        ("types", "public_channel,private_channel"),
                        ("exclude_archived", "true"),
                        ("limit", PAGE_LIMIT),
                        ("cursor", cursor.as_str()),
                    ],
                )
                .await?;

            channels.extend(page.channels.into_iter().map(|c| (c.name, c.id)));

            if page.response_metadata.next_cursor.is_empty() {
                return Ok(channels);
            }
            cursor = page.response_metadata.next_cursor;
        }
    }

    fn session(&self) -> TransportResult<&SlackSession> {
        self.session.as_ref().ok_or(TransportError::NotConnected)
    }
}

impl ChatTransport for SlackTransport {
    async fn connect(&mut self) -> TransportResult<()> {
        self.session = None;

        let auth = self.auth_test().await?;
        info!(
            "Connected to Slack as {} in {}",
            auth.user.as_deref().unwrap_or("<unknown>"),
            auth.team.as_deref().unwrap_or("<unknown>")
        );

        let channels = self.list_channels().await?;
        debug!("Resolved {} channels", channels.len());

        let watch_channel_id = channels
            .get(&self.watch_channel)
            .cloned()
            .ok_or_else(|| TransportError::ChannelNotFound {
                name: self.watch_channel.clone(),
            })?;
        info!("Watching #{} ({})", self.watch_channel, watch_channel_id);

        // First connection starts from now; reconnects resume where reading stopped
        let cursor = self.cursor.get_or_insert_with(slack_timestamp_now);
        debug!("Reading messages newer than {}", cursor);

        self.session = Some(SlackSession {
            channels,
            watch_channel_id,
        });
        Ok(())
    }

    async fn read(&mut self) -> TransportResult<Vec<InboundEvent>> {
        let session = self.session()?;
        let oldest = self.cursor.as_deref().ok_or(TransportError::NotConnected)?;
        let history: History = self
            .get(
                "conversations.history",
                &[
                    ("channel", session.watch_channel_id.as_str()),
                    ("oldest", oldest),
                    ("limit", PAGE_LIMIT),
                ],
            )
            .await?;

        Ok(oldest_first(history.messages, &mut self.cursor))
    }

    async fn send(&mut self, message: &OutboundMessage) -> TransportResult<Delivery> {
        let session = self.session()?;
        let channel = message.channel.trim_start_matches('#');
        let Some(channel_id) = session.channels.get(channel) else {
            return Ok(Delivery::ChannelUnresolved);
        };

        debug!("Sending {:?} to #{}", message.text, channel);
        let payload = json!({
            "channel": channel_id,
            "text": message.text,
            "attachments": message.attachments,
            "username": self.username,
            "icon_url": self.icon_url,
        });
        let request = self.client.post(self.url("chat.postMessage")).json(&payload);
        let body = self.call("chat.postMessage", request).await?;

        Ok(delivery_from(body))
    }

    async fn ping(&mut self) -> TransportResult<bool> {
        self.session()?;
        let request = self.client.post(self.url("auth.test"));
        let body = self.call("auth.test", request).await?;
        Ok(envelope(&body).map(|e| e.ok).unwrap_or(false))
    }
}

fn envelope(body: &Value) -> Option<Envelope> {
    Envelope::deserialize(body).ok()
}

/// Check the `ok` flag of a Web API response and decode its payload.
fn decode<T: DeserializeOwned>(method: &str, body: Value) -> TransportResult<T> {
    match envelope(&body) {
        Some(Envelope { ok: true, .. }) => {
            serde_json::from_value(body).map_err(|source| TransportError::Decode {
                method: method.to_string(),
                source,
            })
        }
        Some(Envelope { error, .. }) => Err(TransportError::Api {
            method: method.to_string(),
            error: error.unwrap_or_else(|| "unknown_error".to_string()),
        }),
        None => Err(TransportError::Api {
            method: method.to_string(),
            error: "malformed_response".to_string(),
        }),
    }
}

/// Classify a `chat.postMessage` response.
fn delivery_from(body: Value) -> Delivery {
    match envelope(&body) {
        Some(Envelope { ok: true, .. }) => Delivery::Delivered,
        Some(Envelope { error: Some(error), .. })
            if UNRESOLVED_CHANNEL_ERRORS.contains(&error.as_str()) =>
        {
            Delivery::ChannelUnresolved
        }
        Some(Envelope { error, .. }) => {
            Delivery::Rejected(error.unwrap_or_else(|| "unknown_error".to_string()))
        }
        None => Delivery::Rejected("malformed_response".to_string()),
    }
}

/// Reorder a newest-first history page and advance `cursor` to its newest message.
fn oldest_first(mut messages: Vec<InboundEvent>, cursor: &mut Option<String>) -> Vec<InboundEvent> {
    if let Some(newest) = messages.first().and_then(|m| m.ts.clone()) {
        *cursor = Some(newest);
    }
    messages.reverse();
    messages
}

/// Seconds to wait before retrying a rate-limited call.
fn retry_after_secs(headers: &HeaderMap) -> u64 {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

/// Current time in Slack's `seconds.micros` timestamp format.
fn slack_timestamp_now() -> String {
    let now = Utc::now();
    format!("{}.{:06}", now.timestamp(), now.timestamp_subsec_micros())
}
