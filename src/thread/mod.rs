//! Full thread reconstruction.
//!
//! Runs the batch pipeline end to end and bundles the result:
//!
//! ```text
//! GraphBuilder::build → find_root / assign_levels → hydrate → order → Thread
//! ```

use hashbrown::HashMap;
use tracing::debug;

use crate::builder::{Diagnostic, GraphBuilder};
use crate::config::TraversalConfig;
use crate::hydrator::hydrate;
use crate::leveler::{assign_levels, find_root};
use crate::model::{Entry, EntryId, GraphNode, Path};
use crate::orderer::order;
use crate::session::path::path_to_root;
use crate::store::EntryStore;

/// The reconstructed, leveled, ordered view of one entry's relationships.
#[derive(Debug, Clone)]
pub struct Thread {
    focal: EntryId,
    root: EntryId,
    nodes: Vec<GraphNode>,
    index: HashMap<EntryId, usize>,
    missing: Vec<EntryId>,
    diagnostics: Vec<Diagnostic>,
}

impl Thread {
    pub fn focal_id(&self) -> &EntryId {
        &self.focal
    }

    pub fn root_id(&self) -> &EntryId {
        &self.root
    }

    /// The root node, unless its body could not be loaded.
    pub fn root(&self) -> Option<&GraphNode> {
        self.get(&self.root)
    }

    /// Nodes in render order: parents before children, siblings by time.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<GraphNode> {
        self.nodes
    }

    pub fn ids(&self) -> impl Iterator<Item = &EntryId> {
        self.nodes.iter().map(GraphNode::id)
    }

    pub fn get(&self, id: &EntryId) -> Option<&GraphNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &EntryId) -> bool {
        self.index.contains_key(id)
    }

    pub fn level(&self, id: &EntryId) -> Option<usize> {
        self.get(id).map(|n| n.level)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Discovered ids that could not be given a body.
    pub fn missing(&self) -> &[EntryId] {
        &self.missing
    }

    /// Depth cuts, cycles, absences and fetch failures met along the way.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Root-first chain of nodes leading to `id`.
    pub fn path_to_root(&self, id: &EntryId) -> Option<Path> {
        let focal = self.get(id)?;
        let root = self.root()?;
        Some(path_to_root(focal, root, |source| self.get(source)))
    }
}

/// Reconstruct the thread around `focal` with an already-loaded focal entry.
pub async fn reconstruct<S: EntryStore + ?Sized>(
    store: &S,
    focal: Entry,
    config: &TraversalConfig,
) -> Thread {
    let focal_id = focal.id.clone();

    let graph = GraphBuilder::new(store)
        .max_depth(config.max_depth)
        .retain_bodies(config.retain_bodies)
        .build(&focal_id, Some(focal.clone()))
        .await;

    let root = find_root(&graph);
    let levels = assign_levels(&graph, &root);
    let hydrated = hydrate(store, &graph, focal).await;
    let nodes = order(&graph, &levels, &hydrated, &root);

    let index = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id().clone(), i))
        .collect();
    let mut diagnostics = graph.diagnostics().to_vec();
    diagnostics.extend_from_slice(hydrated.diagnostics());

    debug!(
        focal = %focal_id,
        root = %root,
        nodes = nodes.len(),
        discovered = graph.len(),
        "thread reconstructed"
    );

    Thread {
        focal: focal_id,
        root,
        nodes,
        index,
        missing: hydrated.missing().to_vec(),
        diagnostics,
    }
}
