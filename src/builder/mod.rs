//! # Graph Builder
//!
//! Depth-capped depth-first discovery of an entry's relationship graph,
//! following both parent and alias edges, one fetch per id.
//!
//! The walk runs on an explicit work stack instead of recursion, so the
//! depth cap and the cycle guard are plain checks on frame entry:
//!
//! ```text
//! enter(id, d):  d > max_depth   → DepthExceeded, stop
//!                id discovered   → stop
//!                id in progress  → CycleDetected, stop
//!                else            → mark in progress, resolve edges, push frame
//! frame step:    next target → record edge, enter(target, d + 1)
//! frame done:    in progress → discovered
//! ```
//!
//! Alias targets are walked strictly one after another; the in-progress
//! bookkeeping relies on it.

use hashbrown::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::model::{EdgeKind, Entry, EntryId};
use crate::resolver::resolve_edges;
use crate::store::EntryStore;

pub use crate::config::DEFAULT_MAX_DEPTH;

// ============================================================================
// Diagnostics
// ============================================================================

/// Non-fatal conditions met while building or hydrating a thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A branch was cut at the depth cap; `id` was not resolved.
    DepthExceeded { id: EntryId, depth: usize },
    /// `id` was reached again while its own edges were still being resolved.
    CycleDetected { id: EntryId },
    /// The store has no entry for `id`.
    Missing { id: EntryId },
    /// The store failed while fetching `id`; treated as missing.
    FetchFailed { id: EntryId, reason: String },
}

impl Diagnostic {
    pub fn id(&self) -> &EntryId {
        match self {
            Diagnostic::DepthExceeded { id, .. }
            | Diagnostic::CycleDetected { id }
            | Diagnostic::Missing { id }
            | Diagnostic::FetchFailed { id, .. } => id,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::DepthExceeded { id, depth } => {
                write!(f, "depth {depth} exceeded at {id}")
            }
            Diagnostic::CycleDetected { id } => write!(f, "cycle detected at {id}"),
            Diagnostic::Missing { id } => write!(f, "no entry for {id}"),
            Diagnostic::FetchFailed { id, reason } => {
                write!(f, "fetch failed for {id}: {reason}")
            }
        }
    }
}

// ============================================================================
// IdGraph
// ============================================================================

/// Outcome of [`IdGraph::record_edge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attach {
    New,
    /// The same edge was already recorded, typically from the other end
    /// (a child's `parentId` mirrored by the parent's alias list).
    Existing,
    /// The child already hangs under a different parent.
    Rejected,
}

/// Id-level relationship graph produced by [`GraphBuilder::build`].
///
/// The node set is the set of discovered ids. Edge maps may also mention
/// ids that were never resolved (cut by the depth cap).
#[derive(Debug, Clone)]
pub struct IdGraph {
    focal: EntryId,
    discovered: HashSet<EntryId>,
    /// discovery completion order, for deterministic iteration
    order: Vec<EntryId>,
    parent_of: HashMap<EntryId, EntryId>,
    /// which edge kind attached each child to its parent
    attached_by: HashMap<EntryId, EdgeKind>,
    children_of: HashMap<EntryId, HashSet<EntryId>>,
    bodies: HashMap<EntryId, Entry>,
    /// ids the store could not produce during the walk
    unavailable: HashSet<EntryId>,
    /// ids left unresolved by the depth cap
    cut: HashSet<EntryId>,
    diagnostics: Vec<Diagnostic>,
}

impl IdGraph {
    pub fn new(focal: EntryId) -> Self {
        Self {
            focal,
            discovered: HashSet::new(),
            order: Vec::new(),
            parent_of: HashMap::new(),
            attached_by: HashMap::new(),
            children_of: HashMap::new(),
            bodies: HashMap::new(),
            unavailable: HashSet::new(),
            cut: HashSet::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn focal(&self) -> &EntryId {
        &self.focal
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn is_discovered(&self, id: &EntryId) -> bool {
        self.discovered.contains(id)
    }

    /// Discovered ids in the order their edges finished resolving.
    pub fn discovered(&self) -> impl Iterator<Item = &EntryId> {
        self.order.iter()
    }

    pub fn parent_of(&self, id: &EntryId) -> Option<&EntryId> {
        self.parent_of.get(id)
    }

    pub fn attached_by(&self, id: &EntryId) -> Option<EdgeKind> {
        self.attached_by.get(id).copied()
    }

    pub fn children_of(&self, id: &EntryId) -> impl Iterator<Item = &EntryId> {
        self.children_of.get(id).into_iter().flatten()
    }

    pub fn body(&self, id: &EntryId) -> Option<&Entry> {
        self.bodies.get(id)
    }

    pub fn is_unavailable(&self, id: &EntryId) -> bool {
        self.unavailable.contains(id)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Record `parent → child`. The first parent recorded for a child wins;
    /// later claims are ignored so every child hangs under exactly one node.
    /// The child's own `parentId` confirming an alias edge marks the
    /// attachment as [`EdgeKind::Parent`].
    pub fn record_edge(&mut self, parent: &EntryId, child: &EntryId, kind: EdgeKind) -> Attach {
        match self.parent_of.get(child) {
            Some(existing) if existing == parent => {
                if kind == EdgeKind::Parent {
                    self.attached_by.insert(child.clone(), EdgeKind::Parent);
                }
                Attach::Existing
            }
            Some(existing) => {
                debug!(%child, %parent, %existing, "child already attached, ignoring edge");
                Attach::Rejected
            }
            None => {
                self.parent_of.insert(child.clone(), parent.clone());
                self.attached_by.insert(child.clone(), kind);
                self.children_of
                    .entry(parent.clone())
                    .or_default()
                    .insert(child.clone());
                Attach::New
            }
        }
    }

    pub(crate) fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn mark_discovered(&mut self, id: EntryId) {
        if self.discovered.insert(id.clone()) {
            self.order.push(id);
        }
    }
}

// ============================================================================
// GraphBuilder
// ============================================================================

/// One frame of the explicit DFS stack.
struct Frame {
    id: EntryId,
    depth: usize,
    targets: std::vec::IntoIter<(EdgeKind, EntryId)>,
}

/// Discovers the id graph around one focal entry.
pub struct GraphBuilder<'s, S: EntryStore + ?Sized> {
    store: &'s S,
    max_depth: usize,
    retain_bodies: bool,
}

impl<'s, S: EntryStore + ?Sized> GraphBuilder<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store, max_depth: DEFAULT_MAX_DEPTH, retain_bodies: true }
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn retain_bodies(mut self, retain: bool) -> Self {
        self.retain_bodies = retain;
        self
    }

    /// Walk from `focal`. A pre-known `focal_entry` saves the first fetch;
    /// it is ignored if its id does not match.
    pub async fn build(&self, focal: &EntryId, focal_entry: Option<Entry>) -> IdGraph {
        let mut graph = IdGraph::new(focal.clone());
        let mut in_progress: HashSet<EntryId> = HashSet::new();
        let mut stack: Vec<Frame> = Vec::new();

        let known = focal_entry.filter(|e| {
            let matches = &e.id == focal;
            if !matches {
                debug!(%focal, given = %e.id, "pre-known entry does not match focal id");
            }
            matches
        });

        if let Some(frame) = self.enter(&mut graph, &mut in_progress, focal.clone(), 0, known).await {
            stack.push(frame);
        }

        while let Some(top) = stack.last_mut() {
            let Some((kind, target)) = top.targets.next() else {
                if let Some(done) = stack.pop() {
                    in_progress.remove(&done.id);
                    graph.mark_discovered(done.id);
                }
                continue;
            };
            let from = top.id.clone();
            let depth = top.depth + 1;

            let attach = match kind {
                EdgeKind::Parent => graph.record_edge(&target, &from, kind),
                EdgeKind::Alias => graph.record_edge(&from, &target, kind),
            };

            if graph.is_discovered(&target) {
                continue;
            }
            if in_progress.contains(&target) {
                // A mirrored edge back to the discoverer is ordinary.
                if attach != Attach::Existing {
                    warn!(id = %target, via = %from, "cycle detected, not re-entering");
                    graph.push_diagnostic(Diagnostic::CycleDetected { id: target });
                }
                continue;
            }
            if let Some(frame) = self.enter(&mut graph, &mut in_progress, target, depth, None).await {
                stack.push(frame);
            }
        }

        debug!(%focal, nodes = graph.len(), diagnostics = graph.diagnostics.len(), "graph built");
        graph
    }

    async fn enter(
        &self,
        graph: &mut IdGraph,
        in_progress: &mut HashSet<EntryId>,
        id: EntryId,
        depth: usize,
        known: Option<Entry>,
    ) -> Option<Frame> {
        if depth > self.max_depth {
            if graph.cut.insert(id.clone()) {
                warn!(%id, depth, max_depth = self.max_depth, "depth cap exceeded, branch not extended");
                graph.push_diagnostic(Diagnostic::DepthExceeded { id, depth });
            }
            return None;
        }
        if graph.is_discovered(&id) {
            return None;
        }
        if in_progress.contains(&id) {
            warn!(%id, "cycle detected, not re-entering");
            graph.push_diagnostic(Diagnostic::CycleDetected { id });
            return None;
        }
        in_progress.insert(id.clone());

        let entry = match known {
            Some(entry) => Some(entry),
            None => self.fetch(graph, &id).await,
        };
        let targets: Vec<(EdgeKind, EntryId)> = match entry {
            Some(entry) => {
                let edges = resolve_edges(&entry);
                let targets = edges.targets().map(|(k, t)| (k, t.clone())).collect();
                if self.retain_bodies || id == graph.focal {
                    graph.bodies.insert(id.clone(), entry);
                }
                targets
            }
            None => Vec::new(),
        };

        Some(Frame { id, depth, targets: targets.into_iter() })
    }

    async fn fetch(&self, graph: &mut IdGraph, id: &EntryId) -> Option<Entry> {
        match self.store.fetch_by_id(id).await {
            Ok(Some(entry)) => Some(entry),
            Ok(None) => {
                debug!(%id, "entry absent");
                graph.unavailable.insert(id.clone());
                graph.push_diagnostic(Diagnostic::Missing { id: id.clone() });
                None
            }
            Err(e) => {
                warn!(%id, error = %e, "fetch failed, treating as absent");
                graph.unavailable.insert(id.clone());
                graph.push_diagnostic(Diagnostic::FetchFailed {
                    id: id.clone(),
                    reason: e.to_string(),
                });
                None
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
