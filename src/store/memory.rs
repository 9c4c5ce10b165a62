//! In-memory entry store.
//!
//! This is the reference implementation of `EntryStore`.
//! It uses simple HashMaps protected by RwLock.
//!
//! ## Extras for tests
//!
//! - **Failure injection**: `fail_on(id)` makes every fetch of that id
//!   return `Error::Store`, as a flaky network would.
//! - **Fetch accounting**: per-id fetch counters and a search counter, so
//!   callers can assert that nothing is fetched twice.
//!
//! Similarity is plain token-set Jaccard over lowercased alphanumeric words.
//! It is deterministic, which is all a reference store needs.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use hashbrown::{HashMap, HashSet};
use parking_lot::RwLock;

use crate::model::{Entry, EntryId};
use crate::{Error, Result};
use super::{EntryStore, Seed};

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory entry store. Clones share the same underlying data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    entries: RwLock<HashMap<EntryId, Entry>>,
    /// ids whose fetches fail with a transport error
    failing: RwLock<HashSet<EntryId>>,
    fetches: RwLock<HashMap<EntryId, u64>>,
    searches: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: impl IntoIterator<Item = Entry>) -> Self {
        let store = Self::new();
        for entry in entries {
            store.insert(entry);
        }
        store
    }

    /// Insert or replace an entry.
    pub fn insert(&self, entry: Entry) {
        self.inner.entries.write().insert(entry.id.clone(), entry);
    }

    pub fn remove(&self, id: &EntryId) -> Option<Entry> {
        self.inner.entries.write().remove(id)
    }

    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make every subsequent fetch of `id` fail.
    pub fn fail_on(&self, id: impl Into<EntryId>) {
        self.inner.failing.write().insert(id.into());
    }

    pub fn recover(&self, id: &EntryId) {
        self.inner.failing.write().remove(id);
    }

    /// How many times `id` was requested, batch requests included.
    pub fn fetch_count(&self, id: &EntryId) -> u64 {
        self.inner.fetches.read().get(id).copied().unwrap_or(0)
    }

    pub fn total_fetches(&self) -> u64 {
        self.inner.fetches.read().values().sum()
    }

    pub fn search_count(&self) -> u64 {
        self.inner.searches.load(Ordering::Relaxed)
    }

    pub fn reset_counters(&self) {
        self.inner.fetches.write().clear();
        self.inner.searches.store(0, Ordering::Relaxed);
    }

    fn seed_text(&self, seed: &Seed) -> Option<String> {
        match seed {
            Seed::Text(text) => Some(text.clone()),
            Seed::Id(id) => self.inner.entries.read().get(id).map(|e| e.content.clone()),
        }
    }
}

fn tokens(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f32 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f32 / union as f32
}

// ============================================================================
// EntryStore impl
// ============================================================================

#[async_trait]
impl EntryStore for MemoryStore {
    async fn fetch_by_id(&self, id: &EntryId) -> Result<Option<Entry>> {
        *self.inner.fetches.write().entry(id.clone()).or_insert(0) += 1;

        if self.inner.failing.read().contains(id) {
            return Err(Error::Store(format!("injected failure fetching {id}")));
        }
        Ok(self.inner.entries.read().get(id).cloned())
    }

    async fn search_similar(&self, seed: &Seed) -> Result<Vec<Entry>> {
        self.inner.searches.fetch_add(1, Ordering::Relaxed);

        let Some(text) = self.seed_text(seed) else {
            return Ok(Vec::new());
        };
        let query = tokens(&text);

        let entries = self.inner.entries.read();
        let mut scored: Vec<(f32, Entry)> = entries
            .values()
            .filter_map(|entry| {
                let score = jaccard(&query, &tokens(&entry.content));
                (score > 0.0).then(|| (score, entry.clone().with_similarity(score)))
            })
            .collect();

        // Highest score first, ties by id for a stable ranking.
        scored.sort_by(|(sa, a), (sb, b)| {
            sb.total_cmp(sa).then_with(|| a.id.cmp(&b.id))
        });
        Ok(scored.into_iter().map(|(_, e)| e).collect())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn entry(id: &str, content: &str) -> Entry {
        Entry::new(id, content, DateTime::from_timestamp(0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_fetch_and_count() {
        let store = MemoryStore::with_entries([entry("a", "alpha")]);

        let found = store.fetch_by_id(&"a".into()).await.unwrap();
        assert_eq!(found.unwrap().content, "alpha");
        assert!(store.fetch_by_id(&"zz".into()).await.unwrap().is_none());

        assert_eq!(store.fetch_count(&"a".into()), 1);
        assert_eq!(store.total_fetches(), 2);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let store = MemoryStore::with_entries([entry("a", "alpha")]);
        store.fail_on("a");
        assert!(store.fetch_by_id(&"a".into()).await.is_err());

        store.recover(&"a".into());
        assert!(store.fetch_by_id(&"a".into()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_batch_fetch_skips_failures_and_absences() {
        let store = MemoryStore::with_entries([entry("a", "x"), entry("b", "y")]);
        store.fail_on("b");

        let ids: Vec<EntryId> = vec!["a".into(), "b".into(), "c".into()];
        let found = store.fetch_by_ids(&ids).await.unwrap();

        assert_eq!(found.len(), 1);
        assert!(found.contains_key(&EntryId::from("a")));
    }

    #[tokio::test]
    async fn test_search_ranks_by_overlap_and_includes_seed() {
        let store = MemoryStore::with_entries([
            entry("seed", "rust async traversal"),
            entry("close", "rust async"),
            entry("far", "rust gardening"),
            entry("none", "baking bread"),
        ]);

        let results = store.search_similar(&Seed::Id("seed".into())).await.unwrap();
        let ids: Vec<&str> = results.iter().map(|e| e.id.as_str()).collect();

        assert_eq!(ids, vec!["seed", "close", "far"]);
        assert_eq!(results[0].similarity, Some(1.0));
        assert!(results.iter().all(|e| e.similarity.is_some()));
        assert_eq!(store.search_count(), 1);
    }

    #[tokio::test]
    async fn test_search_unknown_seed_is_empty() {
        let store = MemoryStore::with_entries([entry("a", "alpha")]);
        let results = store.search_similar(&Seed::Id("missing".into())).await.unwrap();
        assert!(results.is_empty());
    }
}
