//! Edges — the resolved, typed relationship links of one entry.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::EntryId;

/// Ordered alias ids. Most entries carry only a handful.
pub type AliasList = SmallVec<[EntryId; 4]>;

/// Kind of a stored edge. Neighbor links are computed, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Child → parent (at most one per child).
    Parent,
    /// Parent → child, in list order.
    Alias,
}

/// Stored edges of one entry, as produced by the relationship resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edges {
    pub parent: Option<EntryId>,
    pub aliases: AliasList,
}

impl Edges {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_none() && self.aliases.is_empty()
    }

    /// All edge targets in traversal order: parent first, then aliases.
    pub fn targets(&self) -> impl Iterator<Item = (EdgeKind, &EntryId)> {
        self.parent
            .iter()
            .map(|p| (EdgeKind::Parent, p))
            .chain(self.aliases.iter().map(|a| (EdgeKind::Alias, a)))
    }
}
