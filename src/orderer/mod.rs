//! Orderer — flattens a hydrated, leveled id graph into render order.
//!
//! Depth-first from the root; siblings ascend by `created_at`, ties by id.
//! Parents always precede their children and every id is emitted at most
//! once. An id without a body is not emitted, but its hydrated descendants
//! still are, at their own levels.
//!
//! A node attached through its own `parentId` is typed `Parent`; one reached
//! through its parent's alias list is typed `Comment`.

use hashbrown::HashSet;

use crate::builder::IdGraph;
use crate::hydrator::Hydrated;
use crate::leveler::Levels;
use crate::model::{EdgeKind, EntryId, GraphNode, RelationshipType};

/// Produce the flat, hierarchically ordered node sequence.
pub fn order(graph: &IdGraph, levels: &Levels, hydrated: &Hydrated, root: &EntryId) -> Vec<GraphNode> {
    let mut visited: HashSet<&EntryId> = HashSet::new();
    let mut out = Vec::with_capacity(hydrated.len());
    let mut stack: Vec<&EntryId> = vec![root];

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        if let (Some(level), Some(entry)) = (levels.get(id), hydrated.get(id)) {
            let node = if id == root {
                GraphNode::root(entry.clone())
            } else {
                let kind = match graph.attached_by(id) {
                    Some(EdgeKind::Parent) => RelationshipType::Parent,
                    _ => RelationshipType::Comment,
                };
                match graph.parent_of(id) {
                    Some(source) => GraphNode::discovered(entry.clone(), kind, source, level),
                    None => GraphNode::root(entry.clone()),
                }
            };
            out.push(node);
        }

        let mut children: Vec<&EntryId> = graph
            .children_of(id)
            .filter(|c| levels.contains(c) && !visited.contains(*c))
            .collect();
        children.sort_by(|a, b| {
            let at = |id: &EntryId| hydrated.get(id).map(|e| e.created_at);
            // Bodiless children sort after dated ones.
            (at(a).is_none(), at(a), *a).cmp(&(at(b).is_none(), at(b), *b))
        });
        // Reverse so the earliest child is popped first.
        stack.extend(children.into_iter().rev());
    }

    out
}
