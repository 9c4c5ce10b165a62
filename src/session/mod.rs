//! # Incremental Expansion
//!
//! The live, click-to-expand side of thread viewing. Instead of rebuilding
//! the whole graph, a view expands one relationship of one node at a time:
//!
//! | Relationship | Emits | Level |
//! |--------------|-------|-------|
//! | `Parent` | the node's parent | node level + 1 |
//! | `Comments` | the node's aliases, fetched in parallel | node level + 1 |
//! | `Neighbors` | similarity-search hits | 0 |
//!
//! Every expansion of one [`ExpansionSession`] shares a single seen set, so
//! an id reached through several paths is materialized once: the first
//! arrival wins and later arrivals are dropped. Insertion is an atomic
//! check-and-insert under the session lock, committed per arrival, so
//! expansions running concurrently on clones of the same session cannot
//! both add an id.
//!
//! Navigating to another focal entry means a new session. Cancel the old
//! one first: results that arrive after `cancel()` are discarded and the
//! expansion reports `Error::Cancelled`.

pub mod path;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use hashbrown::{HashMap, HashSet};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::config::TraversalConfig;
use crate::model::{Entry, EntryId, GraphNode, Path, Relationship, RelationshipType};
use crate::resolver::resolve_edges;
use crate::store::{EntryStore, Seed};
use crate::{Error, Result};

struct SessionState {
    root: EntryId,
    seen: HashSet<EntryId>,
    nodes: HashMap<EntryId, GraphNode>,
    /// materialization order
    order: Vec<EntryId>,
}

/// One interactive thread view. Clones share state.
pub struct ExpansionSession<S: EntryStore> {
    store: Arc<S>,
    config: TraversalConfig,
    state: Arc<Mutex<SessionState>>,
    cancelled: Arc<AtomicBool>,
}

impl<S: EntryStore> Clone for ExpansionSession<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
            state: Arc::clone(&self.state),
            cancelled: Arc::clone(&self.cancelled),
        }
    }
}

impl<S: EntryStore> ExpansionSession<S> {
    /// Start a view with `focal` as its root.
    pub fn new(store: Arc<S>, focal: Entry, config: TraversalConfig) -> Self {
        let root = GraphNode::root(focal);
        let root_id = root.id().clone();

        let mut seen = HashSet::new();
        seen.insert(root_id.clone());
        let mut nodes = HashMap::new();
        nodes.insert(root_id.clone(), root);

        Self {
            store,
            config,
            state: Arc::new(Mutex::new(SessionState {
                root: root_id.clone(),
                seen,
                nodes,
                order: vec![root_id],
            })),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &TraversalConfig {
        &self.config
    }

    pub fn root_id(&self) -> EntryId {
        self.state.lock().root.clone()
    }

    pub fn node(&self, id: &EntryId) -> Option<GraphNode> {
        self.state.lock().nodes.get(id).cloned()
    }

    /// All materialized nodes, in the order they were added.
    pub fn nodes(&self) -> Vec<GraphNode> {
        let state = self.state.lock();
        state.order.iter().filter_map(|id| state.nodes.get(id).cloned()).collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_seen(&self, id: &EntryId) -> bool {
        self.state.lock().seen.contains(id)
    }

    /// Whether `id` renders as a collapsed "open separately" stub.
    pub fn is_stub(&self, id: &EntryId) -> bool {
        self.state
            .lock()
            .nodes
            .get(id)
            .is_some_and(|n| n.is_stub(self.config.expand_max_depth))
    }

    /// Discard every result that arrives from now on.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Root-first chain of loaded nodes leading to `id`. Never fetches.
    pub fn path_to_root(&self, id: &EntryId) -> Option<Path> {
        let state = self.state.lock();
        let nodes = &state.nodes;
        let focal = nodes.get(id)?;
        let root = nodes.get(&state.root)?;
        Some(path::path_to_root(focal, root, |source| nodes.get(source)))
    }

    /// Expand one relationship of a materialized node and return the nodes
    /// it added, which may be none.
    pub async fn expand(&self, id: &EntryId, relationship: Relationship) -> Result<Vec<GraphNode>> {
        self.ensure_live()?;
        let node = self
            .node(id)
            .ok_or_else(|| Error::NotFound(format!("node {id} is not in this view")))?;

        if node.is_stub(self.config.expand_max_depth) {
            debug!(%id, level = node.level, "stub node is only opened separately");
            return Ok(Vec::new());
        }

        let emitted = match relationship {
            Relationship::Parent => self.expand_parent(&node).await?,
            Relationship::Comments => self.expand_comments(&node).await?,
            Relationship::Neighbors => self.expand_neighbors(&node).await?,
        };
        debug!(%id, ?relationship, emitted = emitted.len(), "expanded");
        Ok(emitted)
    }

    async fn expand_parent(&self, node: &GraphNode) -> Result<Vec<GraphNode>> {
        let Some(parent) = resolve_edges(&node.entry).parent else {
            return Ok(Vec::new());
        };
        if self.is_seen(&parent) {
            return Ok(Vec::new());
        }
        let result = self.store.fetch_by_id(&parent).await;
        let Some(entry) = absorb(&parent, result) else {
            return Ok(Vec::new());
        };
        let added = self.commit(entry, RelationshipType::Parent, node.id(), node.level + 1)?;
        Ok(added.into_iter().collect())
    }

    async fn expand_comments(&self, node: &GraphNode) -> Result<Vec<GraphNode>> {
        let aliases = resolve_edges(&node.entry).aliases;
        let wanted: Vec<EntryId> = {
            let state = self.state.lock();
            aliases.iter().filter(|a| !state.seen.contains(*a)).cloned().collect()
        };

        let store = &self.store;
        let mut pending: FuturesUnordered<_> = wanted
            .into_iter()
            .map(|id| async move {
                let result = store.fetch_by_id(&id).await;
                (id, result)
            })
            .collect();

        let mut emitted = Vec::new();
        while let Some((id, result)) = pending.next().await {
            let Some(entry) = absorb(&id, result) else {
                continue;
            };
            if let Some(added) = self.commit(entry, RelationshipType::Comment, node.id(), node.level + 1)? {
                emitted.push(added);
            }
        }

        // Arrival order is arbitrary; report in alias-list order.
        emitted.sort_by_key(|n| aliases.iter().position(|a| a == n.id()));
        Ok(emitted)
    }

    async fn expand_neighbors(&self, node: &GraphNode) -> Result<Vec<GraphNode>> {
        let seed = Seed::for_entry(&node.entry);
        let results = match self.store.search_similar(&seed).await {
            Ok(results) => results,
            Err(e) => {
                warn!(id = %node.id(), error = %e, "similarity search failed");
                return Ok(Vec::new());
            }
        };

        let fresh: Vec<Entry> = {
            let state = self.state.lock();
            let mut in_batch = HashSet::new();
            results
                .into_iter()
                .filter(|e| &e.id != node.id() && !state.seen.contains(&e.id))
                .filter(|e| in_batch.insert(e.id.clone()))
                .take(self.config.neighbor_limit)
                .collect()
        };

        let mut emitted = Vec::new();
        for entry in fresh {
            if let Some(added) = self.commit(entry, RelationshipType::Neighbor, node.id(), 0)? {
                emitted.push(added);
            }
        }
        if emitted.is_empty() {
            self.exhaust(node.id())?;
        }
        Ok(emitted)
    }

    /// Atomic check-and-insert of one arrival into the view.
    fn commit(
        &self,
        entry: Entry,
        kind: RelationshipType,
        source: &EntryId,
        level: usize,
    ) -> Result<Option<GraphNode>> {
        let mut state = self.state.lock();
        self.ensure_live()?;

        if !state.seen.insert(entry.id.clone()) {
            debug!(id = %entry.id, %source, "already in view, dropping arrival");
            return Ok(None);
        }
        let node = GraphNode::discovered(entry, kind, source, level);
        state.order.push(node.id().clone());
        state.nodes.insert(node.id().clone(), node.clone());
        Ok(Some(node))
    }

    fn exhaust(&self, id: &EntryId) -> Result<()> {
        let mut state = self.state.lock();
        self.ensure_live()?;
        if let Some(node) = state.nodes.get_mut(id) {
            node.has_more_relations = false;
        }
        Ok(())
    }

    fn ensure_live(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}

/// Fold a store result into "entry or absent".
fn absorb(id: &EntryId, result: Result<Option<Entry>>) -> Option<Entry> {
    match result {
        Ok(Some(entry)) => Some(entry),
        Ok(None) => {
            debug!(%id, "entry absent");
            None
        }
        Err(e) => {
            warn!(%id, error = %e, "fetch failed, treating as absent");
            None
        }
    }
}
