//! Hydrator — attaches full entry bodies to a discovered id graph.
//!
//! One batch per thread. Bodies the builder already holds are reused and
//! ids the builder saw as unavailable are not retried, so a body is fetched
//! at most once per reconstruction. Partial failure is the norm: an id that
//! comes back without a body is dropped from the rendered node set while
//! its edges stay in the id graph.

use futures::future::join_all;
use hashbrown::HashMap;
use tracing::{debug, warn};

use crate::builder::{Diagnostic, IdGraph};
use crate::model::{Entry, EntryId};
use crate::store::EntryStore;

/// Bodies for the ids of one id graph.
#[derive(Debug, Clone, Default)]
pub struct Hydrated {
    bodies: HashMap<EntryId, Entry>,
    missing: Vec<EntryId>,
    diagnostics: Vec<Diagnostic>,
}

impl Hydrated {
    pub fn get(&self, id: &EntryId) -> Option<&Entry> {
        self.bodies.get(id)
    }

    pub fn contains(&self, id: &EntryId) -> bool {
        self.bodies.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Discovered ids that ended up without a body, in discovery order.
    pub fn missing(&self) -> &[EntryId] {
        &self.missing
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// Fetch bodies for every discovered id except `focal` and those already
/// held by `graph`.
pub async fn hydrate<S: EntryStore + ?Sized>(store: &S, graph: &IdGraph, focal: Entry) -> Hydrated {
    let mut bodies: HashMap<EntryId, Entry> = HashMap::with_capacity(graph.len());
    let mut wanted: Vec<EntryId> = Vec::new();

    for id in graph.discovered() {
        if *id == focal.id || graph.is_unavailable(id) {
            continue;
        }
        match graph.body(id) {
            Some(entry) => {
                bodies.insert(id.clone(), entry.clone());
            }
            None => wanted.push(id.clone()),
        }
    }
    bodies.insert(focal.id.clone(), focal);

    let mut diagnostics = Vec::new();
    if !wanted.is_empty() {
        debug!(count = wanted.len(), "hydrating bodies");
        let fetched = match store.fetch_by_ids(&wanted).await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, count = wanted.len(), "batch fetch failed, falling back to per-id fetches");
                fan_out(store, &wanted, &mut diagnostics).await
            }
        };
        for id in &wanted {
            match fetched.get(id) {
                Some(entry) => {
                    bodies.insert(id.clone(), entry.clone());
                }
                None if !diagnostics.iter().any(|d: &Diagnostic| d.id() == id) => {
                    diagnostics.push(Diagnostic::Missing { id: id.clone() });
                }
                None => {}
            }
        }
    }

    let missing = graph
        .discovered()
        .filter(|id| !bodies.contains_key(*id))
        .cloned()
        .collect();

    Hydrated { bodies, missing, diagnostics }
}

/// Parallel single fetches; every id resolves or fails on its own.
async fn fan_out<S: EntryStore + ?Sized>(
    store: &S,
    ids: &[EntryId],
    diagnostics: &mut Vec<Diagnostic>,
) -> HashMap<EntryId, Entry> {
    let results = join_all(ids.iter().map(|id| store.fetch_by_id(id))).await;

    let mut found = HashMap::with_capacity(ids.len());
    for (id, result) in ids.iter().zip(results) {
        match result {
            Ok(Some(entry)) => {
                found.insert(id.clone(), entry);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(%id, error = %e, "hydration fetch failed");
                diagnostics.push(Diagnostic::FetchFailed { id: id.clone(), reason: e.to_string() });
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::builder::GraphBuilder;
    use crate::store::{MemoryStore, Seed};
    use crate::{Error, Result};
    use chrono::DateTime;

    fn entry(id: &str) -> Entry {
        Entry::new(id, id, DateTime::from_timestamp(0, 0).unwrap())
    }

    /// Store whose batch endpoint is down while single lookups work.
    struct NoBatch(MemoryStore);

    #[async_trait]
    impl EntryStore for NoBatch {
        async fn fetch_by_id(&self, id: &EntryId) -> Result<Option<Entry>> {
            self.0.fetch_by_id(id).await
        }

        async fn fetch_by_ids(&self, _ids: &[EntryId]) -> Result<HashMap<EntryId, Entry>> {
            Err(Error::Store("batch endpoint unavailable".into()))
        }

        async fn search_similar(&self, seed: &Seed) -> Result<Vec<Entry>> {
            self.0.search_similar(seed).await
        }
    }

    #[tokio::test]
    async fn test_retained_bodies_are_not_refetched() {
        let focal = entry("r").with_aliases(["a", "b"]);
        let store = MemoryStore::with_entries([focal.clone(), entry("a"), entry("b")]);

        let graph = GraphBuilder::new(&store).build(&"r".into(), Some(focal.clone())).await;
        store.reset_counters();
        let hydrated = hydrate(&store, &graph, focal).await;

        assert_eq!(hydrated.len(), 3);
        assert_eq!(store.total_fetches(), 0);
    }

    #[tokio::test]
    async fn test_lean_build_hydrates_in_one_batch_with_partial_failure() {
        let focal = entry("r").with_aliases(["a", "b"]);
        let store = MemoryStore::with_entries([focal.clone(), entry("a"), entry("b")]);

        let graph = GraphBuilder::new(&store)
            .retain_bodies(false)
            .build(&"r".into(), Some(focal.clone()))
            .await;
        store.fail_on("b");
        let hydrated = hydrate(&store, &graph, focal).await;

        assert!(hydrated.contains(&"a".into()));
        assert!(!hydrated.contains(&"b".into()));
        assert_eq!(hydrated.missing(), &[EntryId::from("b")]);
        assert_eq!(store.fetch_count(&"r".into()), 0);
    }

    #[tokio::test]
    async fn test_batch_failure_falls_back_to_single_fetches() {
        let focal = entry("r").with_aliases(["a", "b"]);
        let inner = MemoryStore::with_entries([focal.clone(), entry("a"), entry("b")]);
        let store = NoBatch(inner.clone());

        let graph = GraphBuilder::new(&store)
            .retain_bodies(false)
            .build(&"r".into(), Some(focal.clone()))
            .await;
        inner.fail_on("a");
        let hydrated = hydrate(&store, &graph, focal).await;

        assert!(hydrated.contains(&"b".into()));
        assert!(!hydrated.contains(&"a".into()));
        assert!(matches!(hydrated.diagnostics(), [Diagnostic::FetchFailed { id, .. }] if id.as_str() == "a"));
    }
}
