//! trellis-catalog: relationships (predicates) and views (traversal templates).
//!
//! The catalog owns the single `RelationshipManager` record in the document
//! store. Every mutation loads the record, checks its invariants, and writes
//! it back with a compare-and-swap on the loaded revision. The catalog never
//! touches the graph store.

pub mod catalog;
pub mod error;
pub mod repository;
pub mod views;

pub use catalog::RelationshipCatalog;
pub use error::CatalogError;
pub use repository::{ManagerRepository, Snapshot};
