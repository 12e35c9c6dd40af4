//! Backend API seam

use anyhow::Result;
use std::fmt;

use crate::decode::wire::{WireEvent, WireNode};
use crate::error::RemoteActionError;

/// Cluster-side actions on Flux resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceAction {
    Reconcile,
    Suspend,
    Resume,
}

impl ResourceAction {
    /// Name as used in the action's URL path
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceAction::Reconcile => "reconcile",
            ResourceAction::Suspend => "suspend",
            ResourceAction::Resume => "resume",
        }
    }

    /// Flags to show locally while the request is in flight: (reconciling, suspended)
    pub fn optimistic_flags(&self) -> (Option<bool>, Option<bool>) {
        match self {
            ResourceAction::Reconcile => (Some(true), None),
            ResourceAction::Suspend => (None, Some(true)),
            ResourceAction::Resume => (None, Some(false)),
        }
    }
}

impl fmt::Display for ResourceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Calls against the backend's HTTP API
#[async_trait::async_trait]
pub trait ResourceApi: Send + Sync {
    /// `GET /api/tree`
    async fn fetch_tree(&self) -> Result<WireNode>;

    /// `GET /api/events`
    async fn fetch_events(&self) -> Result<Vec<WireEvent>>;

    /// `GET /api/resource/{uid}/describe`, returned as raw YAML text
    async fn describe(&self, uid: &str) -> Result<String>;

    /// `PATCH /api/resource/{uid}/{action}`
    async fn perform(&self, action: ResourceAction, uid: &str) -> Result<(), RemoteActionError>;
}
