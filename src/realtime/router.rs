//! Realtime message router
//!
//! Dispatches decoded envelopes to the tree store and the event store. A bad
//! message is logged and dropped; it never poisons the stores or stops the
//! messages behind it.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::decode::wire::{WireEvent, WireLog, WireNode, WireNodeRef};
use crate::decode::{decode_compressed_tree, decode_event, decode_log, decode_node};
use crate::error::DecodeError;
use crate::realtime::connection::ConnectionState;
use crate::realtime::message::{DeltaOp, Envelope, MessageKind};
use crate::tree::{EventStore, MutationOutcome, TreeStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Transient user notification for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

/// What handling one message did
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    TreeReplaced { nodes: usize },
    Delta { op: DeltaOp, outcome: MutationOutcome },
    LogAppended,
    Event { added: bool, notice: Option<Notice> },
    Connected { client_id: Option<String> },
    Heartbeat,
    /// Understood but not applicable, e.g. a log for an unselected pod
    Ignored { kind: String },
    /// Malformed payload; nothing was changed
    Dropped { reason: String },
}

fn payload<T: DeserializeOwned>(message: Value) -> Result<T, DecodeError> {
    Ok(serde_json::from_value(message)?)
}

pub struct MessageRouter {
    store: TreeStore,
    events: EventStore,
    connection: ConnectionState,
    client_id: Option<String>,
    needs_resync: bool,
}

impl MessageRouter {
    pub fn new(store: TreeStore, events: EventStore) -> Self {
        Self {
            store,
            events,
            connection: ConnectionState::Disconnected,
            client_id: None,
            needs_resync: true,
        }
    }

    pub fn store(&self) -> &TreeStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TreeStore {
        &mut self.store
    }

    pub fn events(&self) -> &EventStore {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventStore {
        &mut self.events
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// True until a full snapshot has arrived since the last disconnect
    pub fn needs_resync(&self) -> bool {
        self.needs_resync
    }

    /// Record a transport state change.
    ///
    /// Deltas carry no continuity across a disconnect, so the tree is marked
    /// stale until the next snapshot.
    pub fn on_connection_state(&mut self, state: ConnectionState) {
        if state == ConnectionState::Disconnected && self.connection != state {
            tracing::info!("Realtime channel disconnected, awaiting fresh snapshot");
            self.needs_resync = true;
            self.client_id = None;
        }
        self.connection = state;
    }

    /// Parse and handle one raw text frame
    pub fn handle_text(&mut self, raw: &str) -> RouteOutcome {
        match Envelope::parse(raw) {
            Ok(envelope) => self.handle(envelope),
            Err(e) => {
                tracing::error!("Dropping unparseable realtime frame: {}", e);
                RouteOutcome::Dropped {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn handle(&mut self, envelope: Envelope) -> RouteOutcome {
        let Some(kind) = envelope.message_kind() else {
            tracing::info!("Ignoring unknown message type: {}", envelope.kind);
            return RouteOutcome::Ignored {
                kind: envelope.kind,
            };
        };

        let result = match kind {
            MessageKind::Tree => self.handle_tree(envelope.message),
            MessageKind::ResourceAdd
            | MessageKind::ResourceUpdate
            | MessageKind::ResourceRemove
            | MessageKind::Resource => match envelope.delta_op() {
                Some(op) => self.handle_delta(op, envelope.message),
                None => {
                    tracing::warn!("Resource message without a usable op: {:?}", envelope.op);
                    Ok(RouteOutcome::Ignored {
                        kind: envelope.kind,
                    })
                }
            },
            MessageKind::Event => self.handle_event(envelope.message),
            MessageKind::Log => self.handle_log(envelope.message),
            MessageKind::Connected => {
                self.client_id = envelope.client_id.filter(|id| !id.is_empty());
                tracing::debug!("Connected with client id {:?}", self.client_id);
                Ok(RouteOutcome::Connected {
                    client_id: self.client_id.clone(),
                })
            }
            MessageKind::Ping | MessageKind::Pong => Ok(RouteOutcome::Heartbeat),
            MessageKind::StartWatchLogs => Ok(RouteOutcome::Ignored {
                kind: envelope.kind,
            }),
        };

        result.unwrap_or_else(|e| {
            tracing::error!("Dropping {} message: {}", kind, e);
            RouteOutcome::Dropped {
                reason: e.to_string(),
            }
        })
    }

    fn handle_tree(&mut self, message: Value) -> Result<RouteOutcome, DecodeError> {
        let root = match message {
            Value::String(compressed) => decode_compressed_tree(&compressed)?,
            other => decode_node(payload::<WireNode>(other)?)?,
        };
        let nodes = root.subtree_len();
        self.store.replace_tree(root);
        self.needs_resync = false;
        Ok(RouteOutcome::TreeReplaced { nodes })
    }

    fn handle_delta(&mut self, op: DeltaOp, message: Value) -> Result<RouteOutcome, DecodeError> {
        let outcome = match op {
            DeltaOp::Add => {
                let node = decode_node(payload::<WireNode>(message)?)?;
                self.store.add_node(node)
            }
            DeltaOp::Update => {
                let node = decode_node(payload::<WireNode>(message)?)?;
                self.store.update_node(node)
            }
            DeltaOp::Remove => {
                let target = payload::<WireNodeRef>(message)?;
                self.store.remove_node(&target.uid, target.parent())
            }
        };
        Ok(RouteOutcome::Delta { op, outcome })
    }

    fn handle_event(&mut self, message: Value) -> Result<RouteOutcome, DecodeError> {
        let wire = payload::<WireEvent>(message)?;
        let notice = match wire.event_type.as_str() {
            "Normal" => None,
            raw => Some(Notice {
                level: if raw == "Warning" {
                    NoticeLevel::Warning
                } else {
                    NoticeLevel::Error
                },
                text: format!(
                    "[{}] {} \n{} - {}",
                    wire.kind, wire.name, wire.reason, wire.message
                ),
            }),
        };
        let event = decode_event(wire)?;
        let added = self.events.add_event(event);
        Ok(RouteOutcome::Event { added, notice })
    }

    fn handle_log(&mut self, message: Value) -> Result<RouteOutcome, DecodeError> {
        let (uid, line) = decode_log(payload::<WireLog>(message)?)?;
        if self.store.selected_uid() != Some(uid.as_str()) {
            return Ok(RouteOutcome::Ignored {
                kind: MessageKind::Log.as_str().to_string(),
            });
        }
        if self.store.append_log(&uid, line) {
            Ok(RouteOutcome::LogAppended)
        } else {
            Ok(RouteOutcome::Ignored {
                kind: MessageKind::Log.as_str().to_string(),
            })
        }
    }
}

impl Default for MessageRouter {
    fn default() -> Self {
        Self::new(TreeStore::default(), EventStore::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_kind_is_ignored() {
        let mut router = MessageRouter::default();
        let outcome = router.handle_text(r#"{"type": "metrics", "message": {}}"#);
        assert_eq!(
            outcome,
            RouteOutcome::Ignored {
                kind: "metrics".to_string()
            }
        );
    }

    #[test]
    fn test_garbage_frame_is_dropped() {
        let mut router = MessageRouter::default();
        assert!(matches!(
            router.handle_text("not json"),
            RouteOutcome::Dropped { .. }
        ));
    }

    #[test]
    fn test_disconnect_requires_resync() {
        let mut router = MessageRouter::default();
        router.on_connection_state(ConnectionState::Connected);
        router.handle(Envelope::new(
            MessageKind::Tree,
            json!({"uid": "root", "kind": "Kustomization", "createdAt": "2025-01-01T00:00:00Z"}),
        ));
        assert!(!router.needs_resync());

        router.on_connection_state(ConnectionState::Disconnected);
        assert_eq!(router.connection_state(), ConnectionState::Disconnected);
        assert!(router.needs_resync());
    }

    #[test]
    fn test_connected_records_client_id() {
        let mut router = MessageRouter::default();
        let outcome = router.handle(Envelope::new(MessageKind::Connected, "hi").with_client_id("abc"));
        assert_eq!(
            outcome,
            RouteOutcome::Connected {
                client_id: Some("abc".to_string())
            }
        );
        assert_eq!(router.client_id(), Some("abc"));
    }
}
