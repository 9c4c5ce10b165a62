//! # Thread Model
//!
//! Plain DTOs shared by every stage of thread reconstruction:
//! store ↔ resolver ↔ builder ↔ orderer ↔ session ↔ caller.
//!
//! Design rule: this module is pure data — no I/O, no state, no async.

pub mod entry;
pub mod edges;
pub mod node;
pub mod relationship;
pub mod path;

pub use entry::{Entry, EntryId};
pub use edges::{AliasList, EdgeKind, Edges};
pub use node::GraphNode;
pub use relationship::{Relationship, RelationshipType};
pub use path::Path;
