//! Property tests over randomly shaped entry graphs.
//!
//! MemoryStore never suspends, so every async call is driven with
//! `futures::executor::block_on` inside the proptest body.

use std::collections::HashSet;

use chrono::DateTime;
use futures::executor::block_on;
use proptest::prelude::*;
use thread_graph::{
    Entry, EntryId, GraphBuilder, MemoryStore, Relationship, ThreadGraph, TraversalConfig,
};

/// One random entry: optional parent index (may point at itself) and
/// alias indices (may repeat, may loop).
#[derive(Debug, Clone)]
struct Shape {
    parent: Option<usize>,
    aliases: Vec<usize>,
    created: i64,
}

fn entry_shapes() -> impl Strategy<Value = Vec<Shape>> {
    (1usize..24).prop_flat_map(|n| {
        prop::collection::vec(
            (
                prop::option::of(0..n),
                prop::collection::vec(0..n, 0..4),
                0i64..5,
            )
                .prop_map(|(parent, aliases, created)| Shape { parent, aliases, created }),
            n,
        )
    })
}

fn store_of(shapes: &[Shape]) -> MemoryStore {
    MemoryStore::with_entries(shapes.iter().enumerate().map(|(i, s)| {
        let mut e = Entry::new(
            format!("n{}", i),
            format!("topic{} topic{}", i % 3, i % 5),
            DateTime::from_timestamp(s.created, 0).unwrap(),
        );
        if let Some(p) = s.parent {
            e = e.with_parent(format!("n{p}"));
        }
        if !s.aliases.is_empty() {
            e = e.with_aliases(s.aliases.iter().map(|a| format!("n{a}")));
        }
        e
    }))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn thread_nodes_are_unique_and_leveled(shapes in entry_shapes(), focal in 0usize..24) {
        let focal = EntryId::from(format!("n{}", focal % shapes.len()));
        let graph = ThreadGraph::with_store(store_of(&shapes));

        let thread = block_on(graph.reconstruct(&focal)).unwrap();

        let ids: HashSet<&EntryId> = thread.ids().collect();
        prop_assert_eq!(ids.len(), thread.len());
        prop_assert!(thread.contains(&focal));

        let root = thread.root().unwrap();
        prop_assert_eq!(root.level, 0);
        prop_assert_eq!(thread.nodes()[0].id(), root.id());

        for node in thread.nodes().iter().filter(|n| !n.is_root()) {
            let source = node.relationship_source.as_ref().unwrap();
            let parent = thread.get(source).unwrap();
            prop_assert_eq!(node.level, parent.level + 1);
        }

        for i in 0..shapes.len() {
            let id = format!("n{i}");
            prop_assert!(graph.store().fetch_count(&id.into()) <= 1);
        }
    }

    #[test]
    fn parents_precede_children(shapes in entry_shapes(), focal in 0usize..24) {
        let focal = EntryId::from(format!("n{}", focal % shapes.len()));
        let graph = ThreadGraph::with_store(store_of(&shapes));

        let thread = block_on(graph.reconstruct(&focal)).unwrap();

        let position = |id: &EntryId| thread.ids().position(|x| x == id);
        for node in thread.nodes().iter().filter(|n| !n.is_root()) {
            let source = node.relationship_source.as_ref().unwrap();
            prop_assert!(position(source) < position(node.id()));
        }
    }

    #[test]
    fn reconstruction_is_repeatable(shapes in entry_shapes(), focal in 0usize..24) {
        let focal = EntryId::from(format!("n{}", focal % shapes.len()));
        let graph = ThreadGraph::with_store(store_of(&shapes));

        let first = block_on(graph.reconstruct(&focal)).unwrap();
        let second = block_on(graph.reconstruct(&focal)).unwrap();

        prop_assert_eq!(first.nodes(), second.nodes());
    }

    #[test]
    fn parent_chain_respects_depth_cap(len in 0usize..90, max_depth in 0usize..60) {
        let store = MemoryStore::with_entries((0..=len).map(|i| {
            let e = Entry::new(format!("c{i}"), "", DateTime::from_timestamp(0, 0).unwrap());
            if i < len { e.with_parent(format!("c{}", i + 1)) } else { e }
        }));

        let id_graph = block_on(
            GraphBuilder::new(&store).max_depth(max_depth).build(&"c0".into(), None),
        );

        prop_assert_eq!(id_graph.len(), len.min(max_depth) + 1);
        prop_assert!(id_graph.len() <= max_depth + 1);
    }

    #[test]
    fn session_never_materializes_twice(
        shapes in entry_shapes(),
        steps in prop::collection::vec((0usize..24, 0u8..3), 1..20),
    ) {
        let graph = ThreadGraph::with_store(store_of(&shapes))
            .with_config(TraversalConfig::default().with_neighbor_limit(3));
        let session = block_on(graph.session(&"n0".into())).unwrap();

        for (pick, rel) in steps {
            let nodes = session.nodes();
            let target = nodes[pick % nodes.len()].id().clone();
            let relationship = match rel {
                0 => Relationship::Parent,
                1 => Relationship::Comments,
                _ => Relationship::Neighbors,
            };
            block_on(session.expand(&target, relationship)).unwrap();
        }

        let nodes = session.nodes();
        let ids: HashSet<&EntryId> = nodes.iter().map(|n| n.id()).collect();
        prop_assert_eq!(ids.len(), nodes.len());
        for node in &nodes {
            if let Some(source) = &node.relationship_source {
                prop_assert!(ids.contains(source));
                prop_assert_ne!(source, node.id());
            }
        }
    }
}
