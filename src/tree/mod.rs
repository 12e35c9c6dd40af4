//! Resource tree state
//!
//! Structure:
//! - `walk.rs` - `Tree`, traversal, lookups and derived listings
//! - `store.rs` - `TreeStore`, the reconciler that applies snapshots and deltas
//! - `events.rs` - `EventStore`, the cluster-wide event list

pub mod events;
pub mod store;
pub mod walk;

pub use events::EventStore;
pub use store::{DerivedViews, MutationOutcome, TreeStore, ViewRow};
pub use walk::{Tree, Visit, traverse};
