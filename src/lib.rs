//! # thread-graph — bounded thread reconstruction over an entry store
//!
//! Rebuilds a de-duplicated, leveled view of an entry's relationship graph
//! from a store that only answers per-id lookups, batch lookups and
//! similarity searches.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `EntryStore` is the contract between traversal and storage
//! 2. **Clean DTOs**: `Entry`, `GraphNode`, `Edges` cross all boundaries
//! 3. **Partial over all-or-nothing**: absence, malformed metadata, cycles and
//!    depth cuts degrade a branch, never the whole thread
//! 4. **Explicit sessions**: interactive state lives in an `ExpansionSession`,
//!    never in a global
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use thread_graph::{Entry, EntryId, Relationship, ThreadGraph};
//!
//! # async fn example() -> thread_graph::Result<()> {
//! let graph = ThreadGraph::open_memory();
//! let now = chrono::Utc::now();
//! graph.store().insert(Entry::new("root", "first thought", now).with_aliases(["reply"]));
//! graph.store().insert(Entry::new("reply", "a reply", now).with_parent("root"));
//!
//! // Whole thread up front
//! let thread = graph.reconstruct(&EntryId::from("reply")).await?;
//! for node in thread.nodes() {
//!     println!("{}{}", "  ".repeat(node.level), node.entry.content);
//! }
//!
//! // Or click-to-expand
//! let session = graph.session(&EntryId::from("root")).await?;
//! let replies = session.expand(&EntryId::from("root"), Relationship::Comments).await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod config;
pub mod store;
pub mod resolver;
pub mod builder;
pub mod leveler;
pub mod hydrator;
pub mod orderer;
pub mod thread;
pub mod session;
pub mod export;

use std::sync::Arc;

use tracing::warn;

// ============================================================================
// Re-exports
// ============================================================================

pub use model::{
    Entry, EntryId, Edges, EdgeKind, GraphNode, Path,
    Relationship, RelationshipType,
};
pub use config::TraversalConfig;
pub use store::{EntryStore, MemoryStore, Seed};
pub use builder::{Diagnostic, GraphBuilder, IdGraph};
pub use thread::Thread;
pub use session::ExpansionSession;

// ============================================================================
// Top-level ThreadGraph handle
// ============================================================================

/// The primary entry point. A `ThreadGraph` wraps an entry store and hands
/// out reconstructed threads and interactive sessions.
pub struct ThreadGraph<S: EntryStore> {
    store: Arc<S>,
    config: TraversalConfig,
}

impl<S: EntryStore> ThreadGraph<S> {
    pub fn with_store(store: S) -> Self {
        Self::with_shared_store(Arc::new(store))
    }

    pub fn with_shared_store(store: Arc<S>) -> Self {
        Self { store, config: TraversalConfig::default() }
    }

    pub fn with_config(mut self, config: TraversalConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &TraversalConfig {
        &self.config
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reconstruct the full thread around `focal`.
    ///
    /// Fails only when the focal entry itself cannot be loaded.
    pub async fn reconstruct(&self, focal: &EntryId) -> Result<Thread> {
        let entry = self.load_focal(focal).await?;
        Ok(self.reconstruct_entry(entry).await)
    }

    /// Reconstruct around an entry the caller already holds.
    pub async fn reconstruct_entry(&self, focal: Entry) -> Thread {
        thread::reconstruct(&*self.store, focal, &self.config).await
    }

    /// Open an interactive session rooted at `focal`.
    pub async fn session(&self, focal: &EntryId) -> Result<ExpansionSession<S>> {
        let entry = self.load_focal(focal).await?;
        Ok(self.session_for(entry))
    }

    pub fn session_for(&self, focal: Entry) -> ExpansionSession<S> {
        ExpansionSession::new(Arc::clone(&self.store), focal, self.config.clone())
    }

    async fn load_focal(&self, focal: &EntryId) -> Result<Entry> {
        match self.store.fetch_by_id(focal).await {
            Ok(Some(entry)) => Ok(entry),
            Ok(None) => Err(Error::NotFound(format!("entry {focal}"))),
            Err(e) => {
                warn!(%focal, error = %e, "could not load focal entry");
                Err(Error::NotFound(format!("entry {focal} ({e})")))
            }
        }
    }
}

/// In-memory store for testing and embedding.
impl ThreadGraph<MemoryStore> {
    pub fn open_memory() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Store error: {0}")]
    Store(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Session cancelled")]
    Cancelled,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
