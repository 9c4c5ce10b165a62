//! GraphNode — an entry placed in a thread view.

use serde::{Deserialize, Serialize};

use super::{Entry, EntryId, RelationshipType};

/// An [`Entry`] wrapped with its position in one thread view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub entry: Entry,
    pub relationship_type: RelationshipType,
    /// The id this node was discovered from. `None` for the root.
    pub relationship_source: Option<EntryId>,
    /// Root = 0. Neighbor nodes are always 0.
    pub level: usize,
    /// Cleared once a neighbor expansion comes back with nothing new.
    pub has_more_relations: bool,
}

impl GraphNode {
    pub fn root(entry: Entry) -> Self {
        Self {
            entry,
            relationship_type: RelationshipType::Root,
            relationship_source: None,
            level: 0,
            has_more_relations: true,
        }
    }

    pub fn discovered(
        entry: Entry,
        relationship_type: RelationshipType,
        source: &EntryId,
        level: usize,
    ) -> Self {
        Self {
            entry,
            relationship_type,
            relationship_source: Some(source.clone()),
            level,
            has_more_relations: true,
        }
    }

    pub fn id(&self) -> &EntryId {
        &self.entry.id
    }

    pub fn is_root(&self) -> bool {
        self.relationship_type == RelationshipType::Root
    }

    /// Nodes deeper than `max_depth` render as a collapsed stub and are
    /// never expanded in place.
    pub fn is_stub(&self, max_depth: usize) -> bool {
        self.level > max_depth
    }
}
