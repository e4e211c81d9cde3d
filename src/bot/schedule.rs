//! Upcoming release schedule.
//!
//! The release page embeds its data as a JavaScript assignment
//! (`upcoming_data = [...];`), which is extracted and decoded here.

use std::time::Duration;

use fancy_regex::Regex;
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::common::error::ScheduleError;
use crate::config::types::ScheduleConfig;

/// Marker the release data is assigned to.
const UPCOMING_DATA_PATTERN: &str = r"upcoming_data = (\[.*\]);";

/// One entry of the release schedule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseItem {
    /// Product name, e.g. "The Shadow City".
    pub product: String,
    /// Release status, e.g. "Shipping Now".
    pub name: String,
    pub root_collection: String,
}

/// Source of the raw release schedule page.
#[allow(async_fn_in_trait)]
pub trait ReleaseSource {
    async fn fetch_page(&self) -> Result<String, ScheduleError>;
}

/// Fetches the release page over HTTP.
#[derive(Debug, Clone)]
pub struct HttpReleaseSource {
    client: reqwest::Client,
    url: String,
    user_agent: String,
}

impl HttpReleaseSource {
    pub fn new(config: &ScheduleConfig, timeout: Duration) -> Result<Self, ScheduleError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
            user_agent: config.user_agent.clone(),
        })
    }
}

impl ReleaseSource for HttpReleaseSource {
    async fn fetch_page(&self) -> Result<String, ScheduleError> {
        debug!("Fetching release schedule from {}", self.url);
        let page = self
            .client
            .get(&self.url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(page)
    }
}

/// Extract the releases belonging to `root_collection` from a schedule page.
pub fn parse_schedule(page: &str, root_collection: &str) -> Result<Vec<ReleaseItem>, ScheduleError> {
    let pattern = Regex::new(UPCOMING_DATA_PATTERN)?;
    let captures = pattern.captures(page)?.ok_or(ScheduleError::MarkerNotFound)?;
    let data = captures.get(1).ok_or(ScheduleError::MarkerNotFound)?;

    // Other collections' entries are not decoded; their shape is not ours to enforce
    let entries: Vec<Value> = serde_json::from_str(data.as_str())?;

    entries
        .into_iter()
        .filter(|entry| entry.get("root_collection").and_then(Value::as_str) == Some(root_collection))
        .map(|entry| serde_json::from_value(entry).map_err(ScheduleError::from))
        .collect()
}

/// Render releases one per line.
pub fn format_schedule(releases: &[ReleaseItem]) -> String {
    releases
        .iter()
        .map(|release| format!("{}  -  {}\n", release.product, release.name))
        .collect()
}
