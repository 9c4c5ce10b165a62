//! Relationship kinds: how a node was reached, and what can be expanded.

use serde::{Deserialize, Serialize};

/// How a [`GraphNode`](super::GraphNode) entered the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipType {
    Root,
    Parent,
    Comment,
    Neighbor,
}

impl std::fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RelationshipType::Root => "root",
            RelationshipType::Parent => "parent",
            RelationshipType::Comment => "comment",
            RelationshipType::Neighbor => "neighbor",
        })
    }
}

/// One relationship of one node that an interactive view can expand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    Parent,
    Comments,
    Neighbors,
}

impl Relationship {
    /// The type recorded on nodes emitted by this expansion.
    pub fn emits(self) -> RelationshipType {
        match self {
            Relationship::Parent => RelationshipType::Parent,
            Relationship::Comments => RelationshipType::Comment,
            Relationship::Neighbors => RelationshipType::Neighbor,
        }
    }
}
