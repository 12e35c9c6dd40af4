//! Default configuration values
//!
//! Used both for `Config::default()` and as serde fallbacks for keys a
//! config file leaves out.

use crate::constants::{
    DEFAULT_EXCLUDED_KINDS, DEFAULT_LOG_BUFFER, DEFAULT_MAX_EVENTS, DEFAULT_MAX_RETRIES,
    DEFAULT_RETRY_BASE_DELAY_MS, DEFAULT_RETRY_MAX_DELAY_MS, FLUX_NAMESPACE, LAYOUT_LAYER_SPACING,
    LAYOUT_NODE_HEIGHT, LAYOUT_NODE_SPACING, LAYOUT_NODE_WIDTH,
};

pub const API_URL: &str = "http://localhost:8080";
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

pub fn api_url() -> String {
    API_URL.to_string()
}

pub fn flux_namespace() -> String {
    FLUX_NAMESPACE.to_string()
}

pub fn request_timeout_secs() -> u64 {
    REQUEST_TIMEOUT_SECS
}

pub fn node_width() -> f64 {
    LAYOUT_NODE_WIDTH
}

pub fn node_height() -> f64 {
    LAYOUT_NODE_HEIGHT
}

pub fn node_spacing() -> f64 {
    LAYOUT_NODE_SPACING
}

pub fn layer_spacing() -> f64 {
    LAYOUT_LAYER_SPACING
}

/// Cluster-scoped RBAC and CRDs clutter every graph they appear in
pub fn excluded_kinds() -> Vec<String> {
    DEFAULT_EXCLUDED_KINDS.iter().map(|k| k.to_string()).collect()
}

pub fn max_events() -> usize {
    DEFAULT_MAX_EVENTS
}

pub fn log_buffer() -> usize {
    DEFAULT_LOG_BUFFER
}

pub fn max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

pub fn base_delay_ms() -> u64 {
    DEFAULT_RETRY_BASE_DELAY_MS
}

pub fn max_delay_ms() -> u64 {
    DEFAULT_RETRY_MAX_DELAY_MS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let config: Config = serde_yaml::from_str("layout: {}\nrealtime: {}\n").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.api_url, API_URL);
        assert_eq!(config.request_timeout_secs, REQUEST_TIMEOUT_SECS);
        assert_eq!(config.layout.excluded_kinds, excluded_kinds());
        assert_eq!(config.realtime.max_delay_ms, max_delay_ms());
    }

    #[test]
    fn test_backoff_ceiling_exceeds_base() {
        assert!(max_delay_ms() > base_delay_ms());
        assert!(max_retries() > 0);
    }
}
