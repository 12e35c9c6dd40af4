//! Configuration system for fluxtree
//!
//! YAML configuration with built-in defaults, a root config file and
//! environment overrides. Keys use dot notation for `config get|set`.

mod defaults;
pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{Config, EventsConfig, LayoutConfig, LogsConfig, RealtimeConfig};

use anyhow::{Context, Result, anyhow};

/// Keys accepted by `get_config_value` and `set_config_value`
pub const CONFIG_KEYS: &[&str] = &[
    "apiUrl",
    "fluxNamespace",
    "requestTimeoutSecs",
    "layout.direction",
    "layout.nodeWidth",
    "layout.nodeHeight",
    "layout.nodeSpacing",
    "layout.layerSpacing",
    "layout.excludedKinds",
    "events.maxEvents",
    "logs.buffer",
    "realtime.maxRetries",
    "realtime.baseDelayMs",
    "realtime.maxDelayMs",
];

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &Config, key: &str) -> Result<String> {
    match key {
        "apiUrl" => Ok(config.api_url.clone()),
        "fluxNamespace" => Ok(config.flux_namespace.clone()),
        "requestTimeoutSecs" => Ok(config.request_timeout_secs.to_string()),
        "layout.direction" => Ok(config.layout.direction.to_string()),
        "layout.nodeWidth" => Ok(config.layout.node_width.to_string()),
        "layout.nodeHeight" => Ok(config.layout.node_height.to_string()),
        "layout.nodeSpacing" => Ok(config.layout.node_spacing.to_string()),
        "layout.layerSpacing" => Ok(config.layout.layer_spacing.to_string()),
        "layout.excludedKinds" => Ok(config.layout.excluded_kinds.join(",")),
        "events.maxEvents" => Ok(config.events.max_events.to_string()),
        "logs.buffer" => Ok(config.logs.buffer.to_string()),
        "realtime.maxRetries" => Ok(config.realtime.max_retries.to_string()),
        "realtime.baseDelayMs" => Ok(config.realtime.base_delay_ms.to_string()),
        "realtime.maxDelayMs" => Ok(config.realtime.max_delay_ms.to_string()),
        _ => Err(anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set a configuration value by key (dot notation)
pub fn set_config_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "apiUrl" => {
            url::Url::parse(value).with_context(|| format!("apiUrl is not a valid URL: {}", value))?;
            config.api_url = value.to_string();
        }
        "fluxNamespace" => {
            config.flux_namespace = value.to_string();
        }
        "requestTimeoutSecs" => {
            config.request_timeout_secs = value
                .parse()
                .context("requestTimeoutSecs must be a number")?;
        }
        "layout.direction" => {
            config.layout.direction = value.parse().map_err(|e: String| anyhow!(e))?;
        }
        "layout.nodeWidth" => {
            config.layout.node_width = value.parse().context("layout.nodeWidth must be a number")?;
        }
        "layout.nodeHeight" => {
            config.layout.node_height = value
                .parse()
                .context("layout.nodeHeight must be a number")?;
        }
        "layout.nodeSpacing" => {
            config.layout.node_spacing = value
                .parse()
                .context("layout.nodeSpacing must be a number")?;
        }
        "layout.layerSpacing" => {
            config.layout.layer_spacing = value
                .parse()
                .context("layout.layerSpacing must be a number")?;
        }
        "layout.excludedKinds" => {
            // Comma-separated list; empty clears the exclusions
            config.layout.excluded_kinds = value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        "events.maxEvents" => {
            config.events.max_events = value
                .parse()
                .context("events.maxEvents must be a number")?;
        }
        "logs.buffer" => {
            config.logs.buffer = value.parse().context("logs.buffer must be a number")?;
        }
        "realtime.maxRetries" => {
            config.realtime.max_retries = value
                .parse()
                .context("realtime.maxRetries must be a number")?;
        }
        "realtime.baseDelayMs" => {
            config.realtime.base_delay_ms = value
                .parse()
                .context("realtime.baseDelayMs must be a number")?;
        }
        "realtime.maxDelayMs" => {
            config.realtime.max_delay_ms = value
                .parse()
                .context("realtime.maxDelayMs must be a number")?;
        }
        _ => return Err(anyhow!("Unknown configuration key: {}", key)),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_round_trips() {
        let mut config = Config::default();
        for key in CONFIG_KEYS {
            let value = get_config_value(&config, key).unwrap();
            set_config_value(&mut config, key, &value).unwrap();
        }
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(set_config_value(&mut config, "logs.buffer", "lots").is_err());
        assert!(set_config_value(&mut config, "layout.direction", "up").is_err());
        assert!(set_config_value(&mut config, "apiUrl", "::").is_err());
        assert!(set_config_value(&mut config, "nope", "1").is_err());
    }

    #[test]
    fn test_set_excluded_kinds_list() {
        let mut config = Config::default();
        set_config_value(&mut config, "layout.excludedKinds", "Secret, ConfigMap").unwrap();
        assert_eq!(config.layout.excluded_kinds, vec!["Secret", "ConfigMap"]);
    }
}
