//! Connection lifecycle seams
//!
//! The socket itself lives outside the crate. This module holds the pieces the
//! core needs from it: the connection state it reports, the reconnect delay
//! schedule, and an outbound sink for client-initiated messages.

use anyhow::{Result, bail};
use std::fmt;
use std::time::Duration;

use crate::constants::{
    DEFAULT_MAX_RETRIES, DEFAULT_RETRY_BASE_DELAY_MS, DEFAULT_RETRY_MAX_DELAY_MS,
};
use crate::models::{ResourceKind, ResourceNode};
use crate::realtime::message::{Envelope, MessageKind};

/// `Disconnected -> Connecting -> Connected -> Disconnected`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
        };
        write!(f, "{}", s)
    }
}

/// Capped exponential backoff between reconnect attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(DEFAULT_RETRY_BASE_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_RETRY_MAX_DELAY_MS),
        }
    }
}

impl ReconnectPolicy {
    /// Delay before 1-based `attempt`, or `None` once retries are exhausted
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_retries {
            return None;
        }
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        let delay = self
            .base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay);
        Some(delay.min(self.max_delay))
    }

    /// Full delay schedule, one entry per allowed attempt
    pub fn schedule(&self) -> Vec<Duration> {
        (1..=self.max_retries)
            .filter_map(|attempt| self.delay_for(attempt))
            .collect()
    }
}

/// Outbound half of the realtime channel
#[async_trait::async_trait]
pub trait RealtimeSink: Send + Sync {
    async fn send(&self, envelope: Envelope) -> Result<()>;
}

/// Ask the backend to stream logs for a pod
pub async fn start_watch_logs(sink: &dyn RealtimeSink, node: &ResourceNode) -> Result<()> {
    if !node.is_kind(ResourceKind::Pod) {
        bail!("{} {} is not a Pod", node.kind, node.display_name());
    }
    tracing::debug!("Requesting logs for pod {}", node.uid);
    sink.send(Envelope::new(MessageKind::StartWatchLogs, node.uid.as_str()))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_then_caps() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay_for(1), Some(Duration::from_secs(2)));
        assert_eq!(policy.delay_for(4), Some(Duration::from_secs(16)));
        assert_eq!(policy.delay_for(5), Some(Duration::from_secs(30)));
        assert_eq!(policy.delay_for(10), Some(Duration::from_secs(30)));
        assert_eq!(policy.delay_for(11), None);
        assert_eq!(policy.schedule().len(), 10);
    }

    #[test]
    fn test_huge_attempt_does_not_overflow() {
        let policy = ReconnectPolicy {
            max_retries: 64,
            ..ReconnectPolicy::default()
        };
        assert_eq!(policy.delay_for(64), Some(policy.max_delay));
    }
}
