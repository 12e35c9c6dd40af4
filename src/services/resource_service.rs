//! Resource service
//!
//! Loads the initial tree and event list from the backend and runs
//! reconcile/suspend/resume actions. Actions flip the matching Flux flag
//! locally right away; the next authoritative update overwrites it. A failed
//! request rolls the flag back unless the tree changed in the meantime.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::decode::{decode_event, decode_node};
use crate::error::RemoteActionError;
use crate::models::FluxMetadata;
use crate::services::api::{ResourceAction, ResourceApi};
use crate::tree::{EventStore, TreeStore};

/// An action whose optimistic flags have been applied but not yet confirmed
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAction {
    pub action: ResourceAction,
    pub uid: String,
    previous: FluxMetadata,
    /// Tree version right after the optimistic toggle
    version: u64,
}

pub struct ResourceService {
    api: Arc<dyn ResourceApi>,
}

impl ResourceService {
    pub fn new(api: Arc<dyn ResourceApi>) -> Self {
        Self { api }
    }

    /// Fetch the full tree and swap it in. Returns the node count.
    pub async fn load_tree(&self, store: &mut TreeStore) -> Result<usize> {
        let wire = self.api.fetch_tree().await.context("Failed to load tree")?;
        let root = decode_node(wire).context("Failed to decode tree")?;
        let nodes = root.subtree_len();
        store.replace_tree(root);
        Ok(nodes)
    }

    /// Fetch the event list and replace the store's contents
    pub async fn load_events(&self, events: &mut EventStore) -> Result<usize> {
        let wire = self
            .api
            .fetch_events()
            .await
            .context("Failed to load events")?;
        let decoded = wire
            .into_iter()
            .map(decode_event)
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to decode events")?;
        events.set_events(decoded);
        Ok(events.len())
    }

    /// Raw YAML description, passed through untouched
    pub async fn describe(&self, uid: &str) -> Result<String> {
        self.api
            .describe(uid)
            .await
            .with_context(|| format!("Failed to describe {}", uid))
    }

    /// Validate the target and apply the optimistic flags
    pub fn begin(
        &self,
        store: &mut TreeStore,
        action: ResourceAction,
        uid: &str,
    ) -> Result<PendingAction, RemoteActionError> {
        let node = store.find_by_id(uid)?;
        if !node.is_reconcilable() {
            return Err(RemoteActionError::NotReconcilable {
                uid: node.uid.clone(),
                kind: node.kind.clone(),
            });
        }
        let uid = node.uid.clone();
        let (reconciling, suspended) = action.optimistic_flags();
        let previous = store
            .set_flux_flags(&uid, reconciling, suspended)?
            .ok_or_else(|| RemoteActionError::NotReconcilable {
                uid: uid.clone(),
                kind: String::new(),
            })?;
        Ok(PendingAction {
            action,
            uid,
            previous,
            version: store.version(),
        })
    }

    /// Settle a pending action with the request's result
    pub fn complete(
        &self,
        store: &mut TreeStore,
        pending: PendingAction,
        result: Result<(), RemoteActionError>,
    ) -> Result<(), RemoteActionError> {
        let Err(err) = result else {
            return Ok(());
        };
        if store.version() == pending.version {
            tracing::warn!(
                "{} failed for {}, rolling back local state",
                pending.action,
                pending.uid
            );
            // Lookup failure here means the node went away; nothing to roll back
            let _ = store.set_flux_flags(
                &pending.uid,
                Some(pending.previous.is_reconciling),
                Some(pending.previous.is_suspended),
            );
        } else {
            tracing::warn!(
                "{} failed for {}; tree changed since, leaving newer state",
                pending.action,
                pending.uid
            );
        }
        Err(err)
    }

    /// `begin`, the remote call, then `complete`
    pub async fn run_action(
        &self,
        store: &mut TreeStore,
        action: ResourceAction,
        uid: &str,
    ) -> Result<(), RemoteActionError> {
        let pending = self.begin(store, action, uid)?;
        let result = self.api.perform(action, &pending.uid).await;
        self.complete(store, pending, result)
    }

    pub async fn reconcile(&self, store: &mut TreeStore, uid: &str) -> Result<(), RemoteActionError> {
        self.run_action(store, ResourceAction::Reconcile, uid).await
    }

    pub async fn suspend(&self, store: &mut TreeStore, uid: &str) -> Result<(), RemoteActionError> {
        self.run_action(store, ResourceAction::Suspend, uid).await
    }

    pub async fn resume(&self, store: &mut TreeStore, uid: &str) -> Result<(), RemoteActionError> {
        self.run_action(store, ResourceAction::Resume, uid).await
    }
}
