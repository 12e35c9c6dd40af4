//! Tree store and reconciler
//!
//! Owns the current tree and applies snapshot and delta operations to it.
//! Every structural change bumps a version counter published on a
//! `tokio::sync::watch` channel; readers compare versions to know when their
//! derived views or layouts went stale.
//!
//! Deltas are applied in receipt order with no causal guarantee, so add,
//! update and remove each tolerate a missing parent or child as a logged no-op.

use std::cell::RefCell;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::watch;

use crate::constants::{DEFAULT_LOG_BUFFER, FLUX_NAMESPACE, FLUX_ROOT_NAME};
use crate::error::LookupError;
use crate::models::{
    FluxMetadata, LogLine, ResourceKind, ResourceNode, ResourceStatus, SourceRef,
};
use crate::tree::walk::{Tree, Visit, traverse};

/// What a delta did to the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    MissingParent,
    MissingNode,
    TombstonedParent,
    DuplicateUid,
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied)
    }
}

/// Row in a derived listing
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRow {
    pub uid: String,
    pub name: String,
    pub kind: String,
    pub namespace: Option<String>,
    pub status: ResourceStatus,
    pub is_suspended: bool,
    pub is_reconciling: bool,
}

impl From<&ResourceNode> for ViewRow {
    fn from(node: &ResourceNode) -> Self {
        let flux = node.flux();
        Self {
            uid: node.uid.clone(),
            name: node.name.clone(),
            kind: node.kind.clone(),
            namespace: node.namespace.clone(),
            status: node.status,
            is_suspended: flux.is_some_and(|f| f.is_suspended),
            is_reconciling: flux.is_some_and(|f| f.is_reconciling),
        }
    }
}

/// Listings recomputed once per tree version
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedViews {
    pub version: u64,
    /// Sorted by name
    pub applications: Vec<ViewRow>,
    /// Sorted by name
    pub repositories: Vec<ViewRow>,
    pub controllers: Vec<ViewRow>,
}

fn sorted_rows(nodes: Vec<&ResourceNode>) -> Vec<ViewRow> {
    let mut rows: Vec<ViewRow> = nodes.into_iter().map(ViewRow::from).collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    rows
}

pub struct TreeStore {
    tree: Tree,
    version: watch::Sender<u64>,
    selected: Option<String>,
    flux_namespace: String,
    log_buffer: usize,
    views: RefCell<Option<Arc<DerivedViews>>>,
}

impl Default for TreeStore {
    fn default() -> Self {
        Self::new(FLUX_NAMESPACE, DEFAULT_LOG_BUFFER)
    }
}

impl TreeStore {
    pub fn new(flux_namespace: impl Into<String>, log_buffer: usize) -> Self {
        let (version, _) = watch::channel(0);
        Self {
            tree: Tree::default(),
            version,
            selected: None,
            flux_namespace: flux_namespace.into(),
            log_buffer,
            views: RefCell::new(None),
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn root(&self) -> &ResourceNode {
        self.tree.root()
    }

    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    /// Receiver that wakes on every structural change
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    fn bump(&self) {
        self.version.send_modify(|v| *v += 1);
    }

    /// Swap in a fully decoded tree.
    ///
    /// The selection is kept by uid when the new tree still contains it.
    pub fn replace_tree(&mut self, root: ResourceNode) {
        let tree = Tree::new(root);
        let duplicates = tree.duplicate_uids();
        if !duplicates.is_empty() {
            tracing::warn!("Snapshot contains duplicate uids: {:?}", duplicates);
        }
        tracing::debug!("Replacing tree ({} nodes)", tree.len());
        self.tree = tree;
        self.drop_stale_selection();
        self.bump();
    }

    fn drop_stale_selection(&mut self) {
        let stale = self
            .selected
            .as_deref()
            .is_some_and(|uid| !self.tree.contains(uid));
        if stale {
            tracing::debug!("Clearing selection of {:?}", self.selected);
            self.selected = None;
        }
    }

    /// Attach a node under `node.parent_id`.
    ///
    /// Re-adding a uid already present under the same parent merges into it.
    pub fn add_node(&mut self, node: ResourceNode) -> MutationOutcome {
        let Some(parent_id) = node.parent_id.clone() else {
            tracing::warn!("Ignoring add of {} without a parent", node.uid);
            return MutationOutcome::MissingParent;
        };
        let Some(parent) = self.tree.find_node(&parent_id) else {
            tracing::warn!(
                "Parent {} not found for added node {}",
                parent_id,
                node.uid
            );
            return MutationOutcome::MissingParent;
        };
        if parent.is_tombstone() {
            tracing::warn!(
                "Ignoring add of {} under deleted parent {}",
                node.uid,
                parent_id
            );
            return MutationOutcome::TombstonedParent;
        }
        let existing_sibling = parent.children.iter().any(|c| c.uid == node.uid);
        if !existing_sibling {
            let mut clash = None;
            traverse(&node, |n, _| {
                if clash.is_none() && self.tree.contains(&n.uid) {
                    clash = Some(n.uid.clone());
                }
                Visit::Continue
            });
            if let Some(uid) = clash {
                tracing::warn!("Ignoring add of {}: uid {} already in tree", node.uid, uid);
                return MutationOutcome::DuplicateUid;
            }
        }

        let Some(parent) = self.tree.find_node_mut(&parent_id) else {
            return MutationOutcome::MissingParent;
        };
        match parent.children.iter_mut().find(|c| c.uid == node.uid) {
            Some(existing) => existing.merge_from(node),
            None => {
                tracing::debug!("Added {} {} under {}", node.kind, node.uid, parent_id);
                parent.children.push(node);
            }
        }
        self.bump();
        MutationOutcome::Applied
    }

    fn is_flux_root(&self, node: &ResourceNode) -> bool {
        node.name == FLUX_ROOT_NAME
            && node.is_kind(ResourceKind::Kustomization)
            && node.namespace.as_deref() == Some(self.flux_namespace.as_str())
    }

    /// Merge an update into the existing node, keeping its identity and children.
    ///
    /// The Flux root Kustomization always targets the tree root whatever its
    /// parent id says.
    pub fn update_node(&mut self, mut node: ResourceNode) -> MutationOutcome {
        let targets_root = !node.uid.is_empty() && self.tree.root().uid == node.uid;
        if targets_root || self.is_flux_root(&node) {
            let root = self.tree.root_mut();
            if root.uid.is_empty() {
                root.uid = node.uid.clone();
            }
            node.parent_id = None;
            root.merge_from(node);
            self.bump();
            return MutationOutcome::Applied;
        }

        let Some(parent_id) = node.parent_id.clone() else {
            tracing::warn!("Ignoring update of {} without a parent", node.uid);
            return MutationOutcome::MissingParent;
        };
        let Some(parent) = self.tree.find_node_mut(&parent_id) else {
            tracing::warn!(
                "Parent {} not found for updated node {}",
                parent_id,
                node.uid
            );
            return MutationOutcome::MissingParent;
        };
        if parent.is_tombstone() {
            tracing::warn!(
                "Ignoring update of {} under deleted parent {}",
                node.uid,
                parent_id
            );
            return MutationOutcome::TombstonedParent;
        }
        let Some(existing) = parent.children.iter_mut().find(|c| c.uid == node.uid) else {
            tracing::warn!("Node {} not found under {}", node.uid, parent_id);
            return MutationOutcome::MissingNode;
        };
        tracing::debug!("Updated {} {}", node.kind, node.uid);
        existing.merge_from(node);
        self.bump();
        MutationOutcome::Applied
    }

    /// Detach the child `uid` from `parent_id`
    pub fn remove_node(&mut self, uid: &str, parent_id: Option<&str>) -> MutationOutcome {
        let Some(parent_id) = parent_id else {
            tracing::warn!("Ignoring remove of {} without a parent", uid);
            return MutationOutcome::MissingParent;
        };
        let Some(parent) = self.tree.find_node_mut(parent_id) else {
            tracing::warn!("Parent {} not found for removed node {}", parent_id, uid);
            return MutationOutcome::MissingParent;
        };
        if parent.is_tombstone() {
            tracing::warn!("Ignoring remove of {} under deleted parent {}", uid, parent_id);
            return MutationOutcome::TombstonedParent;
        }
        let Some(index) = parent.children.iter().position(|c| c.uid == uid) else {
            tracing::debug!("Node {} already absent under {}", uid, parent_id);
            return MutationOutcome::MissingNode;
        };
        parent.children.remove(index);
        tracing::debug!("Removed {} from {}", uid, parent_id);
        self.drop_stale_selection();
        self.bump();
        MutationOutcome::Applied
    }

    pub fn find_by_id(&self, uid: &str) -> Result<&ResourceNode, LookupError> {
        self.tree.find_by_id(uid)
    }

    pub fn find_flux_parents(&self, uid: &str) -> Vec<&ResourceNode> {
        self.tree.find_flux_parents(uid)
    }

    /// Applications sorted by name
    pub fn applications(&self) -> Vec<&ResourceNode> {
        let mut apps = self.tree.application_resources();
        apps.sort_by(|a, b| a.name.cmp(&b.name));
        apps
    }

    /// Repositories sorted by name
    pub fn repositories(&self) -> Vec<&ResourceNode> {
        let mut repos = self.tree.repositories();
        repos.sort_by(|a, b| a.name.cmp(&b.name));
        repos
    }

    pub fn flux_controller_deployments(&self) -> Vec<&ResourceNode> {
        self.tree.flux_controller_deployments(&self.flux_namespace)
    }

    pub fn find_repository_by_ref(&self, source: &SourceRef) -> Option<&ResourceNode> {
        self.tree.find_repository_by_ref(source)
    }

    /// Listings for the current version, recomputed only after a change
    pub fn derived_views(&self) -> Arc<DerivedViews> {
        let version = self.version();
        let mut cache = self.views.borrow_mut();
        if let Some(views) = cache.as_ref().filter(|v| v.version == version) {
            return Arc::clone(views);
        }
        let views = Arc::new(DerivedViews {
            version,
            applications: sorted_rows(self.tree.application_resources()),
            repositories: sorted_rows(self.tree.repositories()),
            controllers: sorted_rows(self.flux_controller_deployments()),
        });
        *cache = Some(Arc::clone(&views));
        views
    }

    /// Select a node for drill-down; an empty uid selects the root
    pub fn select(&mut self, uid: &str) -> Result<&ResourceNode, LookupError> {
        let resolved = self.tree.find_by_id(uid)?.uid.clone();
        self.selected = Some(resolved);
        self.tree.find_by_id(uid)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_uid(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The selected node as it is in the current tree
    pub fn selected(&self) -> Option<&ResourceNode> {
        self.selected
            .as_deref()
            .and_then(|uid| self.tree.find_node(uid))
    }

    /// Prepend a log line to a pod, newest first, trimming to the buffer size.
    ///
    /// Logs are not structural, so the version is left alone.
    pub fn append_log(&mut self, uid: &str, line: LogLine) -> bool {
        let Some(node) = self.tree.find_node_mut(uid) else {
            return false;
        };
        node.logs.insert(0, line);
        node.logs.truncate(self.log_buffer);
        true
    }

    /// Overwrite reconcile flags locally, returning the previous state.
    ///
    /// `Ok(None)` when the node carries no Flux metadata.
    pub fn set_flux_flags(
        &mut self,
        uid: &str,
        reconciling: Option<bool>,
        suspended: Option<bool>,
    ) -> Result<Option<FluxMetadata>, LookupError> {
        let node = self
            .tree
            .find_node_mut(uid)
            .ok_or_else(|| LookupError::NotFound(uid.to_string()))?;
        let Some(flux) = node.metadata.flux_mut() else {
            return Ok(None);
        };
        let previous = flux.clone();
        if let Some(value) = reconciling {
            flux.is_reconciling = value;
        }
        if let Some(value) = suspended {
            flux.is_suspended = value;
        }
        self.bump();
        Ok(Some(previous))
    }

    /// Uids present anywhere in the tree
    pub fn uids(&self) -> HashSet<String> {
        let mut uids = HashSet::new();
        self.tree.traverse(|node, _| {
            uids.insert(node.uid.clone());
            Visit::Continue
        });
        uids
    }
}
