//! Realtime message envelope
//!
//! Every frame is `{type, clientId, message}`. The `tree` payload is a
//! compressed snapshot string; every other kind carries plain JSON.
//! Resource deltas come either as `resource_add`/`resource_update`/
//! `resource_remove`, or as `resource` with an `op` tag next to `type`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Message kinds understood by the router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Tree,
    ResourceAdd,
    ResourceUpdate,
    ResourceRemove,
    /// Delta whose operation is carried in the envelope's `op`
    Resource,
    Event,
    Log,
    Ping,
    Pong,
    Connected,
    StartWatchLogs,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Tree => "tree",
            MessageKind::ResourceAdd => "resource_add",
            MessageKind::ResourceUpdate => "resource_update",
            MessageKind::ResourceRemove => "resource_remove",
            MessageKind::Resource => "resource",
            MessageKind::Event => "event",
            MessageKind::Log => "log",
            MessageKind::Ping => "ping",
            MessageKind::Pong => "pong",
            MessageKind::Connected => "connected",
            MessageKind::StartWatchLogs => "start_watch_logs",
        }
    }

    /// Case-insensitive; the backend sends upper-case kinds
    pub fn parse_optional(s: &str) -> Option<Self> {
        let kind = match s.to_ascii_lowercase().as_str() {
            "tree" => MessageKind::Tree,
            "resource_add" => MessageKind::ResourceAdd,
            "resource_update" => MessageKind::ResourceUpdate,
            "resource_remove" => MessageKind::ResourceRemove,
            "resource" => MessageKind::Resource,
            "event" => MessageKind::Event,
            "log" => MessageKind::Log,
            "ping" => MessageKind::Ping,
            "pong" => MessageKind::Pong,
            "connected" => MessageKind::Connected,
            "start_watch_logs" => MessageKind::StartWatchLogs,
            _ => return None,
        };
        Some(kind)
    }

    /// Operation implied by the kind alone
    pub fn delta_op(&self) -> Option<DeltaOp> {
        match self {
            MessageKind::ResourceAdd => Some(DeltaOp::Add),
            MessageKind::ResourceUpdate => Some(DeltaOp::Update),
            MessageKind::ResourceRemove => Some(DeltaOp::Remove),
            _ => None,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaOp {
    Add,
    Update,
    Remove,
}

impl DeltaOp {
    pub fn parse_optional(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "add" | "added" => Some(DeltaOp::Add),
            "update" | "modified" => Some(DeltaOp::Update),
            "remove" | "delete" | "deleted" => Some(DeltaOp::Remove),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeltaOp::Add => "add",
            DeltaOp::Update => "update",
            DeltaOp::Remove => "remove",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
    #[serde(default)]
    pub message: Value,
}

impl Envelope {
    pub fn new(kind: MessageKind, message: impl Into<Value>) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            client_id: None,
            op: None,
            message: message.into(),
        }
    }

    pub fn delta(op: DeltaOp, message: impl Into<Value>) -> Self {
        Self {
            op: Some(op.as_str().to_string()),
            ..Self::new(MessageKind::Resource, message)
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn parse(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn message_kind(&self) -> Option<MessageKind> {
        MessageKind::parse_optional(&self.kind)
    }

    /// Delta operation from the kind, or from `op` for `resource` messages
    pub fn delta_op(&self) -> Option<DeltaOp> {
        match self.message_kind()? {
            MessageKind::Resource => self.op.as_deref().and_then(DeltaOp::parse_optional),
            kind => kind.delta_op(),
        }
    }
}
