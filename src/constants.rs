//! Shared constants

/// Namespace the Flux controllers run in.
pub const FLUX_NAMESPACE: &str = "flux-system";

/// Name of the Kustomization that sits at the root of every tree.
pub const FLUX_ROOT_NAME: &str = "flux-system";

/// Kinds left out of graph projections.
pub const DEFAULT_EXCLUDED_KINDS: &[&str] =
    &["ClusterRole", "ClusterRoleBinding", "CustomResourceDefinition"];

/// Fixed node size handed to the layout engine.
pub const LAYOUT_NODE_WIDTH: f64 = 240.0;
pub const LAYOUT_NODE_HEIGHT: f64 = 80.0;
pub const LAYOUT_NODE_SPACING: f64 = 180.0;
pub const LAYOUT_LAYER_SPACING: f64 = 15.0;

/// Events kept per resource when an update merges event lists.
pub const MAX_EVENTS_PER_RESOURCE: usize = 100;

/// Events kept in the cluster-wide event store.
pub const DEFAULT_MAX_EVENTS: usize = 500;

/// Log lines kept for the selected pod.
pub const DEFAULT_LOG_BUFFER: usize = 1000;

/// Realtime reconnect policy.
pub const DEFAULT_MAX_RETRIES: u32 = 10;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1000;
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 30_000;
