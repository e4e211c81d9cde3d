//! Configuration type definitions.

use std::time::Duration;

use serde::Deserialize;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub slack: SlackConfig,
    pub catalog: CatalogConfig,
    pub schedule: ScheduleConfig,
    pub session: SessionConfig,
}

/// Slack workspace connection and posting identity.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    /// Bot token (`xoxb-...`).
    pub token: String,
    /// Channel to watch and reply in, without the leading `#`.
    pub channel: String,
    /// Display name used for replies.
    pub username: String,
    /// Avatar used for replies.
    pub icon_url: String,
    /// Base URL of the Slack Web API.
    pub api_base: String,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            channel: "thrones".to_string(),
            username: "ThronesBot".to_string(),
            icon_url: "https://images-cdn.fantasyflightgames.com/filer_public/63/44/63440b92-6adc-45b8-8bf3-6d30565062c2/gt01_challengeicons_power.png".to_string(),
            api_base: "https://slack.com/api".to_string(),
        }
    }
}

/// Card dataset source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Endpoint returning every card as a JSON array.
    pub cards_url: String,
    /// Site root prepended to card image paths.
    pub site_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            cards_url: "http://thronesdb.com/api/public/cards".to_string(),
            site_url: "https://thronesdb.com".to_string(),
        }
    }
}

/// Upcoming release page settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub url: String,
    /// The page refuses requests without a browser-like agent.
    pub user_agent: String,
    /// Only entries in this collection are reported.
    pub root_collection: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            url: "https://www.fantasyflightgames.com/en/upcoming/".to_string(),
            user_agent: "Magic Browser".to_string(),
            root_collection: "A Game of Thrones: The Card Game Second Edition".to_string(),
        }
    }
}

/// Session loop timing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Minimum time between liveness probes.
    pub ping_interval_secs: u64,
    /// Idle time between steady-state ticks. Every tick reads channel
    /// history, which Slack limits to about 50 calls per minute.
    pub tick_millis: u64,
    /// Pause between consecutive outbound messages.
    pub send_pause_millis: u64,
    /// First reconnect delay.
    pub reconnect_min_secs: u64,
    /// Reconnect delay ceiling.
    pub reconnect_max_secs: u64,
    /// Timeout applied to every HTTP request.
    pub http_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ping_interval_secs: 5,
            tick_millis: 1500,
            send_pause_millis: 100,
            reconnect_min_secs: 1,
            reconnect_max_secs: 60,
            http_timeout_secs: 30,
        }
    }
}

impl SessionConfig {
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }

    pub fn send_pause(&self) -> Duration {
        Duration::from_millis(self.send_pause_millis)
    }

    pub fn reconnect_min_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_min_secs)
    }

    pub fn reconnect_max_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_max_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tick_stays_under_history_rate_limit() {
        let session = SessionConfig::default();
        let reads_per_minute = Duration::from_secs(60).as_millis() / session.tick_interval().as_millis();
        assert!(reads_per_minute < 50, "{} history reads per minute", reads_per_minute);
    }
}
