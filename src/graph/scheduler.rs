//! Single-flight layout requests
//!
//! Each request gets a ticket carrying a generation number and the tree
//! version it was projected from. A newer request, or navigating away,
//! bumps the generation; a finished layout is accepted only while its ticket
//! is still the latest and the tree has not changed since.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::error::LookupError;
use crate::graph::layout::{Layout, LayoutEngine, LayoutOptions};
use crate::graph::projection::{ProjectionOptions, project_uid};
use crate::tree::TreeStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutTicket {
    pub generation: u64,
    pub root: String,
    pub version: u64,
}

/// Layout computing off the event loop
pub struct PendingLayout {
    pub ticket: LayoutTicket,
    handle: JoinHandle<Layout>,
}

impl PendingLayout {
    pub async fn finish(self) -> Result<(LayoutTicket, Layout)> {
        let layout = self
            .handle
            .await
            .with_context(|| format!("Layout task for {} failed", self.ticket.root))?;
        Ok((self.ticket, layout))
    }
}

pub struct LayoutScheduler {
    engine: Arc<dyn LayoutEngine>,
    projection: ProjectionOptions,
    options: LayoutOptions,
    generation: u64,
}

impl LayoutScheduler {
    pub fn new(
        engine: Arc<dyn LayoutEngine>,
        projection: ProjectionOptions,
        options: LayoutOptions,
    ) -> Self {
        Self {
            engine,
            projection,
            options,
            generation: 0,
        }
    }

    /// Issue a ticket for `root`, superseding any earlier one
    pub fn request(&mut self, root: &str, version: u64) -> LayoutTicket {
        self.generation += 1;
        LayoutTicket {
            generation: self.generation,
            root: root.to_string(),
            version,
        }
    }

    /// Invalidate the outstanding ticket, e.g. when the view navigates away
    pub fn cancel(&mut self) {
        self.generation += 1;
    }

    pub fn is_current(&self, ticket: &LayoutTicket, version: u64) -> bool {
        ticket.generation == self.generation && ticket.version == version
    }

    /// Keep `layout` only if its ticket is still current for `version`
    pub fn accept(&self, ticket: &LayoutTicket, version: u64, layout: Layout) -> Option<Layout> {
        if self.is_current(ticket, version) {
            Some(layout)
        } else {
            tracing::debug!(
                "Discarding stale layout for {} (generation {}, version {})",
                ticket.root,
                ticket.generation,
                ticket.version
            );
            None
        }
    }

    /// Project and lay out synchronously
    pub fn layout_now(&self, store: &TreeStore, root: &str) -> Result<Layout, LookupError> {
        let projection = project_uid(store.tree(), root, &self.projection)?;
        Ok(self.engine.layout(&projection, &self.options))
    }

    /// Project now, then lay out on the blocking pool.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(&mut self, store: &TreeStore, root: &str) -> Result<PendingLayout, LookupError> {
        let projection = project_uid(store.tree(), root, &self.projection)?;
        let ticket = self.request(&projection.root, store.version());
        let engine = Arc::clone(&self.engine);
        let options = self.options;
        let handle = tokio::task::spawn_blocking(move || engine.layout(&projection, &options));
        Ok(PendingLayout { ticket, handle })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::layout::TreeLayout;

    fn scheduler() -> LayoutScheduler {
        LayoutScheduler::new(
            Arc::new(TreeLayout),
            ProjectionOptions::default(),
            LayoutOptions::default(),
        )
    }

    #[test]
    fn test_newer_request_supersedes() {
        let mut scheduler = scheduler();
        let first = scheduler.request("a", 1);
        let second = scheduler.request("b", 1);
        assert!(!scheduler.is_current(&first, 1));
        assert!(scheduler.is_current(&second, 1));
        assert!(scheduler.accept(&first, 1, Layout::default()).is_none());
    }

    #[test]
    fn test_tree_change_and_cancel_invalidate() {
        let mut scheduler = scheduler();
        let ticket = scheduler.request("a", 1);
        assert!(!scheduler.is_current(&ticket, 2));
        scheduler.cancel();
        assert!(!scheduler.is_current(&ticket, 1));
    }
}
