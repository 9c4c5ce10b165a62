//! Traversal configuration.
//!
//! Every field has a default, so hosts only need to spell out what they
//! change:
//!
//! ```json
//! { "max_depth": 20, "neighbor_limit": 5 }
//! ```

use serde::{Deserialize, Serialize};

use crate::Result;

/// Depth cap for full reconstruction.
pub const DEFAULT_MAX_DEPTH: usize = 50;
/// Level beyond which interactive views show a collapsed stub.
pub const DEFAULT_EXPAND_MAX_DEPTH: usize = 8;
/// Neighbors emitted per expansion, after filtering.
pub const DEFAULT_NEIGHBOR_LIMIT: usize = 10;

/// Knobs shared by [`ThreadGraph`](crate::ThreadGraph) reconstruction and
/// [`ExpansionSession`](crate::ExpansionSession) expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    /// Graph builder stops extending a branch beyond this depth.
    pub max_depth: usize,
    /// Interactive nodes deeper than this are stubs, never expanded in place.
    pub expand_max_depth: usize,
    pub neighbor_limit: usize,
    /// Keep entry bodies fetched while resolving edges, so hydration only
    /// fills gaps. With `false` the builder keeps edges only and the
    /// hydrator fetches every body in one batch.
    pub retain_bodies: bool,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            expand_max_depth: DEFAULT_EXPAND_MAX_DEPTH,
            neighbor_limit: DEFAULT_NEIGHBOR_LIMIT,
            retain_bodies: true,
        }
    }
}

impl TraversalConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_expand_max_depth(mut self, expand_max_depth: usize) -> Self {
        self.expand_max_depth = expand_max_depth;
        self
    }

    pub fn with_neighbor_limit(mut self, neighbor_limit: usize) -> Self {
        self.neighbor_limit = neighbor_limit;
        self
    }

    pub fn with_retain_bodies(mut self, retain_bodies: bool) -> Self {
        self.retain_bodies = retain_bodies;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = TraversalConfig::from_json(r#"{ "max_depth": 20 }"#).unwrap();
        assert_eq!(config.max_depth, 20);
        assert_eq!(config.expand_max_depth, DEFAULT_EXPAND_MAX_DEPTH);
        assert!(config.retain_bodies);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(TraversalConfig::from_json(r#"{ "max_depth": "deep" }"#).is_err());
    }
}
