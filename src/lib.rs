//! fluxtree library
//!
//! Core of the fluxtree binary: the resource tree model and store, snapshot
//! decoding, realtime message routing, graph projection and layout, and the
//! backend service layer. Exposed as a library so the integration tests can
//! drive it directly.

pub mod cli;
pub mod config;
pub mod constants;
pub mod decode;
pub mod error;
pub mod graph;
pub mod models;
pub mod realtime;
pub mod services;
pub mod tree;

// Re-export commonly used types for convenience
pub use error::{DecodeError, LookupError, RemoteActionError};
pub use models::{KubeEvent, ResourceKind, ResourceNode, ResourceStatus};
pub use realtime::{Envelope, MessageRouter, RouteOutcome};
pub use tree::{EventStore, Tree, TreeStore};
