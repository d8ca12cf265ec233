//! trellis-graph: the graph-store boundary.
//!
//! All edge writes, edge removals, and traversals flow through the
//! `GraphStore` trait. Two backends are provided: `MemoryGraph` for tests
//! and embedded use, and `Neo4jGraph` for a live Neo4j server.
//! Quads are deduplicated on (subject, predicate, object) by every backend.

pub mod client;
pub mod cursor;
pub mod memory;
pub mod mutations;
pub mod path;
pub mod queries;
pub mod store;

pub use client::{GraphConfig, GraphError, Neo4jGraph};
pub use cursor::{CursorSource, NodeCursor};
pub use memory::MemoryGraph;
pub use path::{Hop, Path};
pub use store::GraphStore;
