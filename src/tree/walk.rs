//! Tree traversal and lookups
//!
//! `Tree` owns the root node. Every query here is read-only; mutation goes
//! through `TreeStore` so the version token stays accurate.

use std::collections::HashSet;

use crate::error::LookupError;
use crate::models::{ResourceKind, ResourceNode, SourceRef};

/// Visitor verdict for `traverse`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Continue,
    SkipChildren,
}

/// Pre-order depth-first walk starting at `start` (depth 0).
///
/// Children are visited in their stored order. Returning `Visit::SkipChildren`
/// prunes the visited node's subtree.
pub fn traverse<'a, F>(start: &'a ResourceNode, mut visitor: F)
where
    F: FnMut(&'a ResourceNode, usize) -> Visit,
{
    let mut stack = vec![(start, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        if visitor(node, depth) == Visit::SkipChildren {
            continue;
        }
        stack.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
    }
}

fn find_in<'a>(node: &'a ResourceNode, uid: &str) -> Option<&'a ResourceNode> {
    if node.uid == uid {
        return Some(node);
    }
    node.children.iter().find_map(|child| find_in(child, uid))
}

fn find_in_mut<'a>(node: &'a mut ResourceNode, uid: &str) -> Option<&'a mut ResourceNode> {
    if node.uid == uid {
        return Some(node);
    }
    node.children
        .iter_mut()
        .find_map(|child| find_in_mut(child, uid))
}

/// Copy of `node` with every children list ordered by uid
fn canonical(node: &ResourceNode) -> ResourceNode {
    let mut copy = node.clone();
    copy.children = node.children.iter().map(canonical).collect();
    copy.children.sort_by(|a, b| a.uid.cmp(&b.uid));
    copy
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    root: ResourceNode,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new(ResourceNode::placeholder())
    }
}

impl Tree {
    pub fn new(root: ResourceNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &ResourceNode {
        &self.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut ResourceNode {
        &mut self.root
    }

    /// Walk the whole tree from the root
    pub fn traverse<'a, F>(&'a self, visitor: F)
    where
        F: FnMut(&'a ResourceNode, usize) -> Visit,
    {
        traverse(&self.root, visitor);
    }

    pub fn find_node(&self, uid: &str) -> Option<&ResourceNode> {
        find_in(&self.root, uid)
    }

    pub(crate) fn find_node_mut(&mut self, uid: &str) -> Option<&mut ResourceNode> {
        find_in_mut(&mut self.root, uid)
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.find_node(uid).is_some()
    }

    /// Resolve a uid for navigation.
    ///
    /// An empty uid means "no selection" and resolves to the root. A non-empty
    /// uid that matches nothing is an error.
    pub fn find_by_id(&self, uid: &str) -> Result<&ResourceNode, LookupError> {
        if uid.is_empty() {
            return Ok(&self.root);
        }
        self.find_node(uid)
            .ok_or_else(|| LookupError::NotFound(uid.to_string()))
    }

    /// Flux-managed ancestors of `uid`, root first, excluding the node itself.
    ///
    /// Empty when the uid is empty or not in the tree.
    pub fn find_flux_parents(&self, uid: &str) -> Vec<&ResourceNode> {
        fn dfs<'a>(
            node: &'a ResourceNode,
            uid: &str,
            path: &mut Vec<&'a ResourceNode>,
        ) -> bool {
            if node.uid == uid {
                return true;
            }
            path.push(node);
            if node.children.iter().any(|child| dfs(child, uid, path)) {
                return true;
            }
            path.pop();
            false
        }

        if uid.is_empty() {
            return Vec::new();
        }
        let mut path = Vec::new();
        if !dfs(&self.root, uid, &mut path) {
            return Vec::new();
        }
        path.retain(|node| node.flux().is_some());
        path
    }

    fn collect_kinds(&self, matches: impl Fn(ResourceKind) -> bool) -> Vec<&ResourceNode> {
        let mut found = Vec::new();
        self.traverse(|node, _| {
            if !node.is_tombstone() && node.resource_kind().is_some_and(&matches) {
                found.push(node);
            }
            Visit::Continue
        });
        found
    }

    /// Kustomizations, HelmReleases and HelmCharts, in tree order
    pub fn application_resources(&self) -> Vec<&ResourceNode> {
        self.collect_kinds(|kind| kind.is_application())
    }

    /// Git, OCI and Helm repositories plus Buckets, in tree order
    pub fn repositories(&self) -> Vec<&ResourceNode> {
        self.collect_kinds(|kind| kind.is_repository())
    }

    /// Controller deployments directly under the root, sorted by name
    pub fn flux_controller_deployments(&self, namespace: &str) -> Vec<&ResourceNode> {
        let mut found: Vec<_> = self
            .root
            .children
            .iter()
            .filter(|child| {
                child.is_kind(ResourceKind::Deployment)
                    && child.namespace.as_deref() == Some(namespace)
            })
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found
    }

    /// Repository a Kustomization or HelmRelease pulls from
    pub fn find_repository_by_ref(&self, source: &SourceRef) -> Option<&ResourceNode> {
        self.repositories().into_iter().find(|repo| {
            repo.kind == source.kind
                && repo.name == source.name
                && source
                    .namespace
                    .as_deref()
                    .is_none_or(|ns| repo.namespace.as_deref() == Some(ns))
        })
    }

    /// Stable `uid:status:children` listing of a subtree in pre-order
    pub fn subtree_fingerprint(&self, uid: &str) -> Result<String, LookupError> {
        let start = self.find_by_id(uid)?;
        let mut parts = Vec::with_capacity(start.subtree_len());
        traverse(start, |node, _| {
            parts.push(format!("{}:{}:{}", node.uid, node.status, node.children.len()));
            Visit::Continue
        });
        Ok(parts.join(";"))
    }

    /// Every uid that occurs more than once, in first-seen order
    pub fn duplicate_uids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        self.traverse(|node, _| {
            if !seen.insert(node.uid.as_str()) && !duplicates.contains(&node.uid) {
                duplicates.push(node.uid.clone());
            }
            Visit::Continue
        });
        duplicates
    }

    pub fn len(&self) -> usize {
        self.root.subtree_len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.uid.is_empty() && self.root.children.is_empty()
    }

    /// Equal nodes and parent/child relations, ignoring sibling order
    pub fn structurally_equal(&self, other: &Tree) -> bool {
        canonical(&self.root) == canonical(&other.root)
    }
}
