//! Entry — the unit of content held by the entry store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata key carrying the upward (parent) edge.
pub const PARENT_KEY: &str = "parentId";
/// Metadata key carrying the ordered downward (comment/alias) edges.
pub const ALIASES_KEY: &str = "aliasIds";

/// Opaque, stable entry identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EntryId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&EntryId> for EntryId {
    fn from(id: &EntryId) -> Self {
        id.clone()
    }
}

/// A stored entry.
///
/// `metadata` is an open JSON value. It normally is an object that may carry
/// [`PARENT_KEY`] and [`ALIASES_KEY`], but stores are free to hand back
/// anything (including a JSON-encoded string); interpretation is left to
/// [`crate::resolver::resolve_edges`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: EntryId,
    pub content: String,
    /// Only used for deterministic ordering, never for invalidation.
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Value,
    /// Present only when the entry arrived through a similarity search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
}

impl Entry {
    pub fn new(
        id: impl Into<EntryId>,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            created_at,
            metadata: Value::Null,
            similarity: None,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<EntryId>) -> Self {
        let parent = parent.into();
        self.set_metadata_key(PARENT_KEY, Value::String(parent.0));
        self
    }

    pub fn with_aliases(mut self, aliases: impl IntoIterator<Item = impl Into<EntryId>>) -> Self {
        let list = aliases
            .into_iter()
            .map(|a| Value::String(a.into().0))
            .collect();
        self.set_metadata_key(ALIASES_KEY, Value::Array(list));
        self
    }

    /// Replace the metadata wholesale, malformed values included.
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Attach a similarity score, clamped to `[0, 1]`.
    pub fn with_similarity(mut self, score: f32) -> Self {
        self.similarity = Some(if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) });
        self
    }

    /// Non-object metadata is discarded before the key is written.
    fn set_metadata_key(&mut self, key: &str, value: Value) {
        let mut map = match std::mem::take(&mut self.metadata) {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        map.insert(key.to_string(), value);
        self.metadata = Value::Object(map);
    }
}
