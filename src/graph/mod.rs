//! Graph projection and layout
//!
//! Structure:
//! - `projection.rs` - pruned, deduplicated node/edge set for a subtree
//! - `layout.rs` - `LayoutEngine` seam and the deterministic `TreeLayout`
//! - `scheduler.rs` - single-flight layout tickets

pub mod layout;
pub mod projection;
pub mod scheduler;

pub use layout::{Direction, Layout, LayoutEngine, LayoutOptions, TreeLayout};
pub use projection::{
    GraphEdge, GraphNode, NodeType, Projection, ProjectionOptions, project, project_uid,
};
pub use scheduler::{LayoutScheduler, LayoutTicket, PendingLayout};
