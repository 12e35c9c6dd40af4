//! Graph layout
//!
//! `LayoutEngine` is the seam for positioning a projection. `TreeLayout` is
//! the built-in engine: a tidy tree where leaves take consecutive slots on
//! the cross axis and each parent is centered over its children. Output
//! depends only on the node and edge order of its input.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    LAYOUT_LAYER_SPACING, LAYOUT_NODE_HEIGHT, LAYOUT_NODE_SPACING, LAYOUT_NODE_WIDTH,
};
use crate::graph::projection::{GraphEdge, GraphNode, Projection};

/// Flow direction of the graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Left to right
    #[default]
    Right,
    /// Top to bottom
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Right => "right",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "right" | "lr" => Ok(Direction::Right),
            "down" | "tb" => Ok(Direction::Down),
            _ => Err(format!("Invalid layout direction: {} (expected right or down)", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub direction: Direction,
    pub node_width: f64,
    pub node_height: f64,
    /// Gap between siblings on the cross axis
    pub node_spacing: f64,
    /// Gap between depths on the main axis
    pub layer_spacing: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            direction: Direction::Right,
            node_width: LAYOUT_NODE_WIDTH,
            node_height: LAYOUT_NODE_HEIGHT,
            node_spacing: LAYOUT_NODE_SPACING,
            layer_spacing: LAYOUT_LAYER_SPACING,
        }
    }
}

/// Positioned graph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl Layout {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Positions a projection. Implementations must be deterministic.
pub trait LayoutEngine: Send + Sync {
    fn layout(&self, projection: &Projection, options: &LayoutOptions) -> Layout;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TreeLayout;

struct Placement {
    depth: usize,
    slot: f64,
}

impl TreeLayout {
    /// Assign depth and cross-axis slot to `id` and its descendants
    fn place(
        id: &str,
        depth: usize,
        children: &HashMap<&str, Vec<&str>>,
        visited: &mut HashSet<String>,
        next_slot: &mut f64,
        placed: &mut HashMap<String, Placement>,
    ) -> f64 {
        visited.insert(id.to_string());
        let child_slots: Vec<f64> = children
            .get(id)
            .map(|kids| {
                kids.iter()
                    .filter(|kid| !visited.contains(**kid))
                    .copied()
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
            .into_iter()
            .map(|kid| Self::place(kid, depth + 1, children, visited, next_slot, placed))
            .collect();

        let slot = match (child_slots.first(), child_slots.last()) {
            (Some(first), Some(last)) => (first + last) / 2.0,
            _ => {
                let slot = *next_slot;
                *next_slot += 1.0;
                slot
            }
        };
        placed.insert(id.to_string(), Placement { depth, slot });
        slot
    }
}

impl LayoutEngine for TreeLayout {
    fn layout(&self, projection: &Projection, options: &LayoutOptions) -> Layout {
        let known: HashSet<&str> = projection.nodes.iter().map(|n| n.id.as_str()).collect();
        let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut has_parent: HashSet<&str> = HashSet::new();
        for edge in &projection.edges {
            if known.contains(edge.source.as_str()) && known.contains(edge.target.as_str()) {
                children
                    .entry(edge.source.as_str())
                    .or_default()
                    .push(edge.target.as_str());
                has_parent.insert(edge.target.as_str());
            }
        }

        let mut visited = HashSet::new();
        let mut placed = HashMap::new();
        let mut next_slot = 0.0;
        let roots = projection
            .nodes
            .iter()
            .filter(|n| !has_parent.contains(n.id.as_str()));
        // Nodes on a cycle have no parentless ancestor; they start their own tree
        let leftovers = projection.nodes.iter();
        for node in roots.chain(leftovers) {
            if !visited.contains(&node.id) {
                Self::place(
                    &node.id,
                    0,
                    &children,
                    &mut visited,
                    &mut next_slot,
                    &mut placed,
                );
            }
        }

        let main_step = |depth: usize, size: f64| depth as f64 * (size + options.layer_spacing);
        let nodes = projection
            .nodes
            .iter()
            .map(|node| {
                let (depth, slot) = placed
                    .get(&node.id)
                    .map(|p| (p.depth, p.slot))
                    .unwrap_or((0, 0.0));
                let (x, y) = match options.direction {
                    Direction::Right => (
                        main_step(depth, options.node_width),
                        slot * (options.node_height + options.node_spacing),
                    ),
                    Direction::Down => (
                        slot * (options.node_width + options.node_spacing),
                        main_step(depth, options.node_height),
                    ),
                };
                GraphNode {
                    x,
                    y,
                    ..node.clone()
                }
            })
            .collect();

        Layout {
            nodes,
            edges: projection.edges.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::projection::NodeType;
    use crate::models::ResourceStatus;

    fn graph_node(id: &str) -> GraphNode {
        GraphNode {
            id: id.to_string(),
            node_type: NodeType::Resource,
            kind: "ConfigMap".to_string(),
            name: id.to_string(),
            namespace: None,
            status: ResourceStatus::Unknown,
            x: 0.0,
            y: 0.0,
        }
    }

    fn edge(source: &str, target: &str) -> GraphEdge {
        GraphEdge {
            id: format!("{}-{}", source, target),
            source: source.to_string(),
            target: target.to_string(),
        }
    }

    fn fan_out() -> Projection {
        Projection {
            root: "r".to_string(),
            nodes: ["r", "a", "b"].into_iter().map(graph_node).collect(),
            edges: vec![edge("r", "a"), edge("r", "b")],
        }
    }

    #[test]
    fn test_parent_centered_over_children() {
        let layout = TreeLayout.layout(&fan_out(), &LayoutOptions::default());
        let r = layout.node("r").unwrap();
        let a = layout.node("a").unwrap();
        let b = layout.node("b").unwrap();
        assert_eq!(a.y, 0.0);
        assert_eq!(b.y, 260.0);
        assert_eq!(r.y, 130.0);
        assert_eq!(r.x, 0.0);
        assert_eq!(a.x, 255.0);
    }

    #[test]
    fn test_down_swaps_axes() {
        let options = LayoutOptions {
            direction: Direction::Down,
            ..LayoutOptions::default()
        };
        let layout = TreeLayout.layout(&fan_out(), &options);
        let b = layout.node("b").unwrap();
        assert_eq!(b.x, 420.0);
        assert_eq!(b.y, 95.0);
    }

    #[test]
    fn test_layout_is_deterministic() {
        let first = TreeLayout.layout(&fan_out(), &LayoutOptions::default());
        let second = TreeLayout.layout(&fan_out(), &LayoutOptions::default());
        assert_eq!(first, second);
    }

    #[test]
    fn test_cycle_is_still_placed() {
        let projection = Projection {
            root: "r".to_string(),
            nodes: ["r", "c", "a", "b"].into_iter().map(graph_node).collect(),
            edges: vec![edge("r", "c"), edge("a", "b"), edge("b", "a")],
        };
        let layout = TreeLayout.layout(&projection, &LayoutOptions::default());
        let a = layout.node("a").unwrap();
        let b = layout.node("b").unwrap();
        assert_eq!((a.x, a.y), (0.0, 260.0));
        assert_eq!((b.x, b.y), (255.0, 260.0));
        assert_eq!(layout.node("c").unwrap().y, 0.0);
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("DOWN".parse::<Direction>(), Ok(Direction::Down));
        assert!("sideways".parse::<Direction>().is_err());
    }
}
