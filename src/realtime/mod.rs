//! Realtime channel handling
//!
//! Structure:
//! - `message.rs` - envelope and message kinds
//! - `router.rs` - dispatch of inbound messages to the stores
//! - `connection.rs` - connection state, reconnect backoff, outbound sink

pub mod connection;
pub mod message;
pub mod router;

pub use connection::{ConnectionState, RealtimeSink, ReconnectPolicy, start_watch_logs};
pub use message::{DeltaOp, Envelope, MessageKind};
pub use router::{MessageRouter, Notice, NoticeLevel, RouteOutcome};
