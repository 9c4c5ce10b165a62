//! Path — the chain of nodes from a view's root down to one node.

use serde::{Deserialize, Serialize};

use super::{EntryId, GraphNode};

/// Root-first sequence of nodes. Always has at least one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub nodes: Vec<GraphNode>,
}

impl Path {
    pub fn single(node: GraphNode) -> Self {
        Self { nodes: vec![node] }
    }

    /// Build from nodes collected leaf-first.
    pub fn from_leaf_first(mut nodes: Vec<GraphNode>) -> Self {
        nodes.reverse();
        Self { nodes }
    }

    /// Number of hops between start and end.
    pub fn len(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn start(&self) -> &GraphNode {
        self.nodes.first().expect("Path always has at least one node")
    }

    pub fn end(&self) -> &GraphNode {
        self.nodes.last().expect("Path always has at least one node")
    }

    pub fn ids(&self) -> Vec<&EntryId> {
        self.nodes.iter().map(GraphNode::id).collect()
    }

    pub fn contains(&self, id: &EntryId) -> bool {
        self.nodes.iter().any(|n| n.id() == id)
    }
}
