//! Thread export — render node sequences for hosts without a UI.
//!
//! ```text
//! Thread::nodes() / ExpansionSession::nodes()
//!   → write_outline() → indented text, one node per line
//!   → to_json()       → JSON array of GraphNode
//! ```
//!
//! Indentation is the node's level, so an ordered thread reads as a tree.

use std::io::Write;

use crate::model::GraphNode;
use crate::Result;

/// Longest content preview written per line, in characters.
pub const PREVIEW_CHARS: usize = 80;

/// Write `nodes` as an indented outline.
pub fn write_outline(nodes: &[GraphNode], writer: &mut dyn Write) -> Result<()> {
    writeln!(writer, "# thread-graph outline")?;
    writeln!(writer, "# nodes: {}", nodes.len())?;

    for node in nodes {
        let indent = "  ".repeat(node.level);
        let score = node
            .entry
            .similarity
            .map(|s| format!(" ({s:.2})"))
            .unwrap_or_default();
        writeln!(
            writer,
            "{indent}- [{}] {}{score}: {}",
            node.relationship_type,
            node.id(),
            preview(&node.entry.content),
        )?;
    }
    Ok(())
}

/// Outline as a `String`.
pub fn outline(nodes: &[GraphNode]) -> Result<String> {
    let mut buf = Vec::new();
    write_outline(nodes, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn to_json(nodes: &[GraphNode]) -> Result<String> {
    Ok(serde_json::to_string_pretty(nodes)?)
}

/// First line of `content`, cut to [`PREVIEW_CHARS`].
fn preview(content: &str) -> String {
    let line = content.lines().next().unwrap_or_default().trim();
    if line.chars().count() <= PREVIEW_CHARS {
        return line.to_string();
    }
    let cut: String = line.chars().take(PREVIEW_CHARS - 1).collect();
    format!("{cut}…")
}
