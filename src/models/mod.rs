//! Domain model for the resource tree
//!
//! Structure:
//! - `node.rs` - `ResourceNode`, status, conditions, log lines
//! - `metadata.rs` - kind-specific metadata and the `Repository` capability
//! - `event.rs` - cluster events
//! - `resource_kind.rs` - kinds with dedicated handling

pub mod event;
pub mod metadata;
pub mod node;
pub mod resource_kind;

pub use event::{EventType, KubeEvent};
pub use metadata::{
    DeploymentMetadata, FluxMetadata, GitRepositoryMetadata, HelmReleaseMetadata, KindMetadata,
    KustomizationMetadata, OciRepositoryMetadata, PodMetadata, PvcMetadata, Repository, SourceRef,
};
pub use node::{Condition, LogLine, ResourceNode, ResourceStatus};
pub use resource_kind::ResourceKind;
