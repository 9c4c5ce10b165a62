//! Leveler — root selection and breadth-first level assignment.

use std::collections::VecDeque;

use hashbrown::{HashMap, HashSet};
use tracing::debug;

use crate::builder::IdGraph;
use crate::model::EntryId;

/// Level (distance in parent-edge hops from the root) of every id reachable
/// from the root over recorded child edges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Levels(HashMap<EntryId, usize>);

impl Levels {
    pub fn get(&self, id: &EntryId) -> Option<usize> {
        self.0.get(id).copied()
    }

    pub fn contains(&self, id: &EntryId) -> bool {
        self.0.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntryId, usize)> {
        self.0.iter().map(|(id, level)| (id, *level))
    }
}

/// Follow recorded parents up from the focal id.
///
/// Only discovered parents are followed, so an id cut by the depth cap is
/// never chosen. On a parent cycle the walk stops at the first id it sees
/// twice; any id on the cycle is an acceptable root.
pub fn find_root(graph: &IdGraph) -> EntryId {
    let mut visited: HashSet<&EntryId> = HashSet::new();
    let mut current = graph.focal();

    loop {
        if !visited.insert(current) {
            debug!(root = %current, "parent cycle while finding root");
            return current.clone();
        }
        match graph.parent_of(current).filter(|p| graph.is_discovered(p)) {
            Some(parent) => current = parent,
            None => return current.clone(),
        }
    }
}

/// BFS from `root`: `level[root] = 0`, `level[child] = level[parent] + 1`.
/// Ids already leveled are skipped, which makes reconvergent shapes safe.
pub fn assign_levels(graph: &IdGraph, root: &EntryId) -> Levels {
    let mut levels = HashMap::new();
    let mut queue = VecDeque::new();

    levels.insert(root.clone(), 0);
    queue.push_back(root.clone());

    while let Some(id) = queue.pop_front() {
        let next = levels[&id] + 1;
        for child in graph.children_of(&id) {
            if levels.contains_key(child) {
                continue;
            }
            levels.insert(child.clone(), next);
            queue.push_back(child.clone());
        }
    }

    Levels(levels)
}
