//! Subtree to graph projection
//!
//! Walks a subtree and emits the node and edge set a graph view renders.
//! Excluded kinds and already-emitted nodes produce no output, but the walk
//! still descends through them. Nested applications (a Kustomization or
//! HelmRelease below the starting node) are emitted collapsed: their
//! children are not walked.

use std::collections::HashSet;
use std::fmt;

use crate::constants::DEFAULT_EXCLUDED_KINDS;
use crate::error::LookupError;
use crate::models::{ResourceKind, ResourceNode, ResourceStatus};
use crate::tree::{Tree, Visit, traverse};

/// Display tag selecting how a graph node is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Deployment,
    Pod,
    Resource,
}

impl NodeType {
    pub fn for_kind(kind: &str) -> Self {
        match ResourceKind::parse_optional(kind) {
            Some(ResourceKind::Deployment) => NodeType::Deployment,
            Some(ResourceKind::Pod) => NodeType::Pod,
            _ => NodeType::Resource,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Deployment => "deployment",
            NodeType::Pod => "pod",
            NodeType::Resource => "resource",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A node in the projected graph; `id` is the tree uid it stands for
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub node_type: NodeType,
    pub kind: String,
    pub name: String,
    pub namespace: Option<String>,
    pub status: ResourceStatus,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl GraphEdge {
    fn between(source: &str, target: &str) -> Self {
        Self {
            id: format!("{}-{}", source, target),
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionOptions {
    pub excluded_kinds: Vec<String>,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            excluded_kinds: DEFAULT_EXCLUDED_KINDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl ProjectionOptions {
    fn is_excluded(&self, kind: &str) -> bool {
        self.excluded_kinds.iter().any(|k| k == kind)
    }
}

/// Unpositioned graph for one subtree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    pub root: String,
    /// In walk order
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl Projection {
    pub fn contains_node(&self, uid: &str) -> bool {
        self.nodes.iter().any(|n| n.id == uid)
    }

    pub fn edges_into(&self, uid: &str) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(move |e| e.target == uid)
    }
}

/// Project the subtree rooted at `start`
pub fn project(start: &ResourceNode, options: &ProjectionOptions) -> Projection {
    let mut emitted: HashSet<&str> = HashSet::new();
    let mut nodes = Vec::new();
    let mut edges: Vec<GraphEdge> = Vec::new();

    traverse(start, |node, depth| {
        if options.is_excluded(&node.kind) || !emitted.insert(node.uid.as_str()) {
            return Visit::Continue;
        }

        nodes.push(GraphNode {
            id: node.uid.clone(),
            node_type: NodeType::for_kind(&node.kind),
            kind: node.kind.clone(),
            name: node.name.clone(),
            namespace: node.namespace.clone(),
            status: node.status,
            x: 0.0,
            y: 0.0,
        });

        let is_boundary = node
            .resource_kind()
            .is_some_and(|kind| kind.is_application_boundary());
        if is_boundary && depth > 0 {
            return Visit::SkipChildren;
        }

        for child in &node.children {
            if options.is_excluded(&child.kind) {
                continue;
            }
            // Most recently walked parent wins when a child has several
            edges.retain(|e| e.target != child.uid);
            edges.push(GraphEdge::between(&node.uid, &child.uid));
        }
        Visit::Continue
    });

    Projection {
        root: start.uid.clone(),
        nodes,
        edges,
    }
}

/// Project the subtree at `uid`; an empty uid projects from the root
pub fn project_uid(
    tree: &Tree,
    uid: &str,
    options: &ProjectionOptions,
) -> Result<Projection, LookupError> {
    let start = tree.find_by_id(uid)?;
    Ok(project(start, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(uid: &str, kind: &str, children: Vec<ResourceNode>) -> ResourceNode {
        ResourceNode {
            uid: uid.to_string(),
            name: uid.to_string(),
            kind: kind.to_string(),
            children,
            ..ResourceNode::placeholder()
        }
    }

    #[test]
    fn test_nested_application_is_collapsed() {
        let root = node(
            "root",
            "Kustomization",
            vec![node(
                "apps",
                "Kustomization",
                vec![node("web", "Deployment", vec![])],
            )],
        );
        let projection = project(&root, &ProjectionOptions::default());
        assert!(projection.contains_node("apps"));
        assert!(!projection.contains_node("web"));

        let drilled = project(&root.children[0], &ProjectionOptions::default());
        assert!(drilled.contains_node("web"));
        assert_eq!(drilled.edges.len(), 1);
    }

    #[test]
    fn test_node_type_tags() {
        assert_eq!(NodeType::for_kind("Deployment"), NodeType::Deployment);
        assert_eq!(NodeType::for_kind("Pod"), NodeType::Pod);
        assert_eq!(NodeType::for_kind("ConfigMap"), NodeType::Resource);
    }

    #[test]
    fn test_excluded_node_has_no_edge() {
        let root = node(
            "root",
            "Kustomization",
            vec![
                node("role", "ClusterRole", vec![]),
                node("cm", "ConfigMap", vec![]),
            ],
        );
        let projection = project(&root, &ProjectionOptions::default());
        assert!(!projection.contains_node("role"));
        assert_eq!(projection.edges.len(), 1);
        assert_eq!(projection.edges[0].id, "root-cm");
    }
}
