//! Error types
//!
//! Decode and lookup failures stay local to a single message or navigation;
//! remote action failures are surfaced to the user.

use thiserror::Error;

/// A wire payload could not be turned into domain objects.
///
/// Fatal to the message that carried it; the tree is left untouched.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Failed to inflate gzip payload: {0}")]
    Decompress(#[from] std::io::Error),

    #[error("Malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid timestamp in {field}: {value:?}")]
    Timestamp { field: &'static str, value: String },

    #[error("Invalid resource status: {0:?}")]
    UnknownStatus(String),
}

/// A uid did not resolve to a node in the current tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Node with id {0} not found")]
    NotFound(String),
}

/// A reconcile/suspend/resume request failed.
#[derive(Debug, Error)]
pub enum RemoteActionError {
    #[error("{action} failed for {uid}: HTTP {status}")]
    Http {
        action: &'static str,
        uid: String,
        status: u16,
    },

    #[error("{action} failed for {uid}: {message}")]
    Transport {
        action: &'static str,
        uid: String,
        message: String,
    },

    #[error("{kind} {uid} cannot be reconciled, suspended or resumed")]
    NotReconcilable { uid: String, kind: String },

    #[error(transparent)]
    Lookup(#[from] LookupError),
}
