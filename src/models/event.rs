//! Cluster events attached to resources

use chrono::{DateTime, Utc};

/// Event severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EventType {
    #[default]
    Normal,
    Warning,
}

impl EventType {
    /// Anything other than `Normal` is treated as a warning
    pub fn parse_lenient(s: &str) -> Self {
        if s == "Normal" {
            EventType::Normal
        } else {
            EventType::Warning
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Normal => "Normal",
            EventType::Warning => "Warning",
        }
    }
}

/// A Kubernetes event, cross-linked to the node it concerns via `resource_uid`
#[derive(Debug, Clone, PartialEq)]
pub struct KubeEvent {
    pub uid: String,
    pub kind: String,
    pub name: String,
    pub namespace: String,
    pub reason: String,
    pub message: String,
    /// Reporting controller or component
    pub source: String,
    pub event_type: EventType,
    pub first_observed: DateTime<Utc>,
    pub last_observed: DateTime<Utc>,
    /// Times the same event was observed
    pub count: i32,
    pub resource_uid: String,
}

impl KubeEvent {
    pub fn is_warning(&self) -> bool {
        self.event_type == EventType::Warning
    }
}
