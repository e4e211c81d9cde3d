//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `THRONESBOT_SLACK_TOKEN` - Slack bot token (legacy name: `token`)
//! - `THRONESBOT_SLACK_CHANNEL` - Channel to watch and reply in
//! - `THRONESBOT_CARDS_URL` - Card dataset endpoint
//! - `THRONESBOT_SCHEDULE_URL` - Upcoming release page

use std::env;

use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "THRONESBOT";

/// Token variable read by earlier deployments.
const LEGACY_TOKEN_VAR: &str = "token";

/// Apply environment variable overrides to a config.
///
/// This allows the bot token to be provided via the environment
/// instead of the config file.
pub fn apply_env_overrides(config: Config) -> Config {
    apply_overrides_from(config, |name| env::var(name).ok())
}

/// Apply overrides using `lookup` to resolve variable names.
pub fn apply_overrides_from<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    let var = |suffix: &str| lookup(&format!("{}_{}", ENV_PREFIX, suffix));

    if let Some(token) = var("SLACK_TOKEN").or_else(|| lookup(LEGACY_TOKEN_VAR)) {
        config.slack.token = token;
    }
    if let Some(channel) = var("SLACK_CHANNEL") {
        config.slack.channel = channel.trim_start_matches('#').to_string();
    }
    if let Some(url) = var("CARDS_URL") {
        config.catalog.cards_url = url;
    }
    if let Some(url) = var("SCHEDULE_URL") {
        config.schedule.url = url;
    }

    config
}

/// Get the config file path from environment or use default.
///
/// Checks `THRONESBOT_CONFIG` environment variable, otherwise returns "thronesbot.conf".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "thronesbot.conf".to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_in(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_env_prefix() {
        assert_eq!(ENV_PREFIX, "THRONESBOT");
    }

    #[test]
    fn test_no_vars_leaves_config_unchanged() {
        let result = apply_overrides_from(Config::default(), lookup_in(&[]));
        assert_eq!(result.slack.token, "");
        assert_eq!(result.slack.channel, "thrones");
    }

    #[test]
    fn test_prefixed_token_wins_over_legacy() {
        let result = apply_overrides_from(
            Config::default(),
            lookup_in(&[("THRONESBOT_SLACK_TOKEN", "xoxb-new"), ("token", "xoxb-old")]),
        );
        assert_eq!(result.slack.token, "xoxb-new");
    }

    #[test]
    fn test_legacy_token_used_when_alone() {
        let result = apply_overrides_from(Config::default(), lookup_in(&[("token", "xoxb-old")]));
        assert_eq!(result.slack.token, "xoxb-old");
    }

    #[test]
    fn test_channel_override_strips_hash() {
        let result = apply_overrides_from(
            Config::default(),
            lookup_in(&[("THRONESBOT_SLACK_CHANNEL", "#lcg")]),
        );
        assert_eq!(result.slack.channel, "lcg");
    }
}
