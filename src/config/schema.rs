//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::defaults;
use crate::graph::{Direction, LayoutOptions, ProjectionOptions};
use crate::realtime::ReconnectPolicy;
use crate::tree::{EventStore, TreeStore};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Base URL of the backend API
    #[serde(default = "defaults::api_url")]
    pub api_url: String,

    /// Namespace the Flux controllers and root Kustomization live in
    #[serde(default = "defaults::flux_namespace")]
    pub flux_namespace: String,

    /// Per-request timeout for backend calls
    #[serde(default = "defaults::request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub events: EventsConfig,

    #[serde(default)]
    pub logs: LogsConfig,

    #[serde(default)]
    pub realtime: RealtimeConfig,
}

/// Graph layout configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    #[serde(default)]
    pub direction: Direction,

    #[serde(default = "defaults::node_width")]
    pub node_width: f64,

    #[serde(default = "defaults::node_height")]
    pub node_height: f64,

    #[serde(default = "defaults::node_spacing")]
    pub node_spacing: f64,

    #[serde(default = "defaults::layer_spacing")]
    pub layer_spacing: f64,

    /// Kinds left out of graphs
    #[serde(default = "defaults::excluded_kinds")]
    pub excluded_kinds: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventsConfig {
    /// Events kept before the oldest are evicted
    #[serde(default = "defaults::max_events")]
    pub max_events: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogsConfig {
    /// Log lines kept per pod
    #[serde(default = "defaults::log_buffer")]
    pub buffer: usize,
}

/// Reconnect backoff for the realtime channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeConfig {
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    #[serde(default = "defaults::base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default = "defaults::max_delay_ms")]
    pub max_delay_ms: u64,
}

// Default value functions
impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: defaults::api_url(),
            flux_namespace: defaults::flux_namespace(),
            request_timeout_secs: defaults::request_timeout_secs(),
            layout: LayoutConfig::default(),
            events: EventsConfig::default(),
            logs: LogsConfig::default(),
            realtime: RealtimeConfig::default(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            direction: Direction::default(),
            node_width: defaults::node_width(),
            node_height: defaults::node_height(),
            node_spacing: defaults::node_spacing(),
            layer_spacing: defaults::layer_spacing(),
            excluded_kinds: defaults::excluded_kinds(),
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            max_events: defaults::max_events(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            buffer: defaults::log_buffer(),
        }
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            max_retries: defaults::max_retries(),
            base_delay_ms: defaults::base_delay_ms(),
            max_delay_ms: defaults::max_delay_ms(),
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            direction: self.layout.direction,
            node_width: self.layout.node_width,
            node_height: self.layout.node_height,
            node_spacing: self.layout.node_spacing,
            layer_spacing: self.layout.layer_spacing,
        }
    }

    pub fn projection_options(&self) -> ProjectionOptions {
        ProjectionOptions {
            excluded_kinds: self.layout.excluded_kinds.clone(),
        }
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            max_retries: self.realtime.max_retries,
            base_delay: Duration::from_millis(self.realtime.base_delay_ms),
            max_delay: Duration::from_millis(self.realtime.max_delay_ms),
        }
    }

    pub fn tree_store(&self) -> TreeStore {
        TreeStore::new(self.flux_namespace.clone(), self.logs.buffer)
    }

    pub fn event_store(&self) -> EventStore {
        EventStore::new(self.events.max_events)
    }
}
