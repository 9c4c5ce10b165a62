//! Relationship resolver — turns an entry's open metadata into typed edges.
//!
//! Never fails. Anything unexpected degrades to "no edge":
//! - metadata that is not a JSON object (null, a JSON-encoded string, ...)
//! - a parent that is not a non-empty string, or equals the entry's own id
//! - an alias list that is not an array; non-string or empty items in it
//!
//! Both camelCase (`parentId`, `aliasIds`) and snake_case (`parent_id`,
//! `alias_ids`) keys are read; camelCase wins when both are present.

use hashbrown::HashSet;
use serde_json::{Map, Value};
use tracing::debug;

use crate::model::entry::{ALIASES_KEY, PARENT_KEY};
use crate::model::{AliasList, Edges, Entry, EntryId};

const PARENT_KEYS: [&str; 2] = [PARENT_KEY, "parent_id"];
const ALIAS_KEYS: [&str; 2] = [ALIASES_KEY, "alias_ids"];

/// Extract the parent and alias edges of `entry`.
pub fn resolve_edges(entry: &Entry) -> Edges {
    let Some(map) = entry.metadata.as_object() else {
        if !entry.metadata.is_null() {
            debug!(id = %entry.id, "metadata is not an object, treating as no edges");
        }
        return Edges::none();
    };

    Edges {
        parent: resolve_parent(&entry.id, map),
        aliases: resolve_aliases(&entry.id, map),
    }
}

fn lookup<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| map.get(*k).filter(|v| !v.is_null()))
}

fn resolve_parent(own: &EntryId, map: &Map<String, Value>) -> Option<EntryId> {
    let parent = lookup(map, &PARENT_KEYS)?.as_str()?;
    if parent.is_empty() {
        return None;
    }
    if parent == own.as_str() {
        debug!(id = %own, "ignoring self-parent edge");
        return None;
    }
    Some(EntryId::from(parent))
}

fn resolve_aliases(own: &EntryId, map: &Map<String, Value>) -> AliasList {
    let Some(raw) = lookup(map, &ALIAS_KEYS) else {
        return AliasList::new();
    };
    let Some(items) = raw.as_array() else {
        debug!(id = %own, "alias list is not an array, dropping it");
        return AliasList::new();
    };

    let mut seen = HashSet::new();
    items
        .iter()
        .filter_map(Value::as_str)
        .filter(|a| !a.is_empty() && *a != own.as_str())
        .filter(|a| seen.insert(*a))
        .map(EntryId::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use serde_json::json;

    fn entry(id: &str) -> Entry {
        Entry::new(id, "", DateTime::from_timestamp(0, 0).unwrap())
    }

    fn ids(edges: &Edges) -> Vec<&str> {
        edges.aliases.iter().map(EntryId::as_str).collect()
    }

    #[test]
    fn test_missing_metadata_has_no_edges() {
        assert!(resolve_edges(&entry("a")).is_empty());
    }

    #[test]
    fn test_string_metadata_has_no_edges() {
        let e = entry("a").with_metadata(Value::String(r#"{"parentId":"p"}"#.into()));
        assert_eq!(resolve_edges(&e), Edges::none());
    }

    #[test]
    fn test_parent_and_aliases() {
        let e = entry("a").with_parent("p").with_aliases(["b", "c"]);
        let edges = resolve_edges(&e);
        assert_eq!(edges.parent, Some(EntryId::from("p")));
        assert_eq!(ids(&edges), vec!["b", "c"]);
    }

    #[test]
    fn test_self_parent_is_absent() {
        let e = entry("a").with_parent("a");
        assert_eq!(resolve_edges(&e).parent, None);
    }

    #[test]
    fn test_bad_alias_items_are_dropped() {
        let e = entry("a").with_metadata(json!({
            "aliasIds": ["b", 7, "", null, "a", "c", "b", {"id": "d"}]
        }));
        assert_eq!(ids(&resolve_edges(&e)), vec!["b", "c"]);
    }

    #[test]
    fn test_alias_list_not_an_array() {
        let e = entry("a").with_metadata(json!({ "aliasIds": "b,c", "parentId": 12 }));
        assert!(resolve_edges(&e).is_empty());
    }

    #[test]
    fn test_snake_case_keys_and_precedence() {
        let e = entry("a").with_metadata(json!({
            "parent_id": "snake",
            "alias_ids": ["x"],
        }));
        let edges = resolve_edges(&e);
        assert_eq!(edges.parent, Some(EntryId::from("snake")));
        assert_eq!(ids(&edges), vec!["x"]);

        let both = entry("a").with_metadata(json!({
            "parentId": "camel",
            "parent_id": "snake",
        }));
        assert_eq!(resolve_edges(&both).parent, Some(EntryId::from("camel")));
    }
}
