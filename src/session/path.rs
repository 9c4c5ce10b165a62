//! Path-to-root over already-materialized nodes.
//!
//! Works only off loaded state and never fetches. Each node's
//! `relationship_source` is followed back until a root node is reached.
//! When a source is not among the loaded nodes, or the source chain loops,
//! the view's recorded root is put at the top and the walk stops.

use hashbrown::HashSet;
use tracing::warn;

use crate::model::{EntryId, GraphNode, Path};

/// Root-first path ending at `focal`.
///
/// `lookup` resolves a source id to a loaded node.
pub fn path_to_root<'a, F>(focal: &'a GraphNode, root: &'a GraphNode, lookup: F) -> Path
where
    F: Fn(&EntryId) -> Option<&'a GraphNode>,
{
    let mut visited: HashSet<&EntryId> = HashSet::new();
    let mut chain: Vec<GraphNode> = Vec::new();
    let mut current = focal;

    loop {
        if !visited.insert(current.id()) {
            warn!(id = %current.id(), "relationship sources loop, substituting root");
            break;
        }
        chain.push(current.clone());
        if current.is_root() {
            return Path::from_leaf_first(chain);
        }
        match current.relationship_source.as_ref().and_then(|s| lookup(s)) {
            Some(source) => current = source,
            None => break,
        }
    }

    if !visited.contains(root.id()) {
        chain.push(root.clone());
    }
    Path::from_leaf_first(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entry, RelationshipType};
    use chrono::DateTime;
    use hashbrown::HashMap;

    fn entry(id: &str) -> Entry {
        Entry::new(id, id, DateTime::from_timestamp(0, 0).unwrap())
    }

    fn node(id: &str, kind: RelationshipType, source: &str, level: usize) -> GraphNode {
        GraphNode::discovered(entry(id), kind, &source.into(), level)
    }

    fn index(nodes: &[GraphNode]) -> HashMap<EntryId, GraphNode> {
        nodes.iter().map(|n| (n.id().clone(), n.clone())).collect()
    }

    fn ids(path: &Path) -> Vec<&str> {
        path.ids().into_iter().map(EntryId::as_str).collect()
    }

    #[test]
    fn test_walks_sources_to_root() {
        let nodes = index(&[
            GraphNode::root(entry("r")),
            node("a", RelationshipType::Comment, "r", 1),
            node("b", RelationshipType::Comment, "a", 2),
            node("n", RelationshipType::Neighbor, "b", 0),
        ]);
        let root = &nodes[&EntryId::from("r")];

        let path = path_to_root(&nodes[&EntryId::from("n")], root, |s| nodes.get(s));

        assert_eq!(ids(&path), vec!["r", "a", "b", "n"]);
        assert_eq!(path.len(), 3);
        assert!(path.start().is_root());
    }

    #[test]
    fn test_missing_source_substitutes_root() {
        let nodes = index(&[
            GraphNode::root(entry("r")),
            node("b", RelationshipType::Comment, "unloaded", 2),
        ]);
        let root = &nodes[&EntryId::from("r")];

        let path = path_to_root(&nodes[&EntryId::from("b")], root, |s| nodes.get(s));

        assert_eq!(ids(&path), vec!["r", "b"]);
    }

    #[test]
    fn test_source_loop_terminates() {
        let nodes = index(&[
            GraphNode::root(entry("r")),
            node("x", RelationshipType::Comment, "y", 1),
            node("y", RelationshipType::Comment, "x", 1),
        ]);
        let root = &nodes[&EntryId::from("r")];

        let path = path_to_root(&nodes[&EntryId::from("x")], root, |s| nodes.get(s));

        assert_eq!(ids(&path), vec!["r", "y", "x"]);
    }

    #[test]
    fn test_root_alone() {
        let root = GraphNode::root(entry("r"));
        let path = path_to_root(&root, &root, |_| None);
        assert!(path.is_empty());
        assert_eq!(ids(&path), vec!["r"]);
    }
}
