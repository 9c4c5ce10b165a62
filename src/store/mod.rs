//! # Entry Store Contract
//!
//! This is THE contract between thread reconstruction and whatever actually
//! holds entries. The store has no graph query: the core only ever asks for
//! one id, one batch of ids, or a similarity search.
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryStore` | `memory` | In-memory, for testing/embedding |
//!
//! ## Failure semantics
//!
//! Methods return `Result` so a store can report transport failure, but the
//! traversal code never lets that escape: an `Err` for an id is treated
//! exactly like `Ok(None)` at the call site.

pub mod memory;

use async_trait::async_trait;
use futures::future::join_all;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::{Entry, EntryId};
use crate::Result;

pub use memory::MemoryStore;

// ============================================================================
// Similarity seed
// ============================================================================

/// What a similarity search is seeded with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Seed {
    Id(EntryId),
    Text(String),
}

impl Seed {
    /// Seed by content, falling back to the id for blank entries.
    pub fn for_entry(entry: &Entry) -> Self {
        if entry.content.trim().is_empty() {
            Seed::Id(entry.id.clone())
        } else {
            Seed::Text(entry.content.clone())
        }
    }
}

// ============================================================================
// EntryStore Trait
// ============================================================================

/// The external entry store, as seen by the traversal core.
#[async_trait]
pub trait EntryStore: Send + Sync + 'static {
    /// Single lookup. `Ok(None)` means the id has no entry.
    async fn fetch_by_id(&self, id: &EntryId) -> Result<Option<Entry>>;

    /// Batch lookup. Ids with no result are simply missing from the map.
    ///
    /// Default: parallel `fetch_by_id` fan-out; a failing id is logged and
    /// left out without affecting its siblings.
    async fn fetch_by_ids(&self, ids: &[EntryId]) -> Result<HashMap<EntryId, Entry>> {
        let results = join_all(ids.iter().map(|id| self.fetch_by_id(id))).await;
        let mut found = HashMap::with_capacity(ids.len());
        for (id, result) in ids.iter().zip(results) {
            match result {
                Ok(Some(entry)) => {
                    found.insert(id.clone(), entry);
                }
                Ok(None) => {}
                Err(e) => warn!(%id, error = %e, "batch fetch failed for id"),
            }
        }
        Ok(found)
    }

    /// Ranked similarity search. Results may carry `similarity` scores and
    /// may include the seed entry itself; filtering is the caller's job.
    async fn search_similar(&self, seed: &Seed) -> Result<Vec<Entry>>;
}
