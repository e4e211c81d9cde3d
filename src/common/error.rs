//! Error types for the application.

use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {message}")]
    IoError { path: String, message: String },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Errors while loading the card catalog at startup.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to fetch cards from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Card catalog at {url} is empty")]
    Empty { url: String },
}

/// Errors while fetching or parsing the release schedule page.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Failed to fetch release schedule: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Release schedule page has no upcoming_data marker")]
    MarkerNotFound,

    #[error("Invalid release schedule pattern: {0}")]
    Pattern(#[from] fancy_regex::Error),

    #[error("Malformed release schedule data: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Chat transport errors. Any of these moves the session to Disconnected.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error calling {method}: {source}")]
    Http {
        method: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Slack API {method} failed: {error}")]
    Api { method: String, error: String },

    #[error("Unexpected response from {method}: {source}")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Channel not found: {name}")]
    ChannelNotFound { name: String },

    #[error("Transport is not connected")]
    NotConnected,

    #[error("Liveness probe failed")]
    PingFailed,

    #[error("Rate limited calling {method}, retry after {retry_after_secs}s")]
    RateLimited { method: String, retry_after_secs: u64 },
}

/// Errors while building a reply payload from catalog data.
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("Card '{card}' has unknown faction '{faction}'")]
    UnknownFaction { card: String, faction: String },
}

/// Genuine failures while handling a single command.
///
/// "No match" is not an error; handlers report it through their outcome.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Release schedule unavailable: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("Failed to build response: {0}")]
    Response(#[from] ResponseError),

    #[error("Command extraction failed: {0}")]
    Extraction(#[from] fancy_regex::Error),
}

/// Result type alias for transport operations.
pub type TransportResult<T> = std::result::Result<T, TransportError>;
