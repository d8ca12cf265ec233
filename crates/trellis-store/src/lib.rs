//! trellis-store: document-store repository boundary.
//!
//! Catalog records are plain JSON documents addressed by (collection, key).
//! Every write carries an expectation about the current revision so callers
//! can turn a load-check-write sequence into a single compare-and-swap.

pub mod document;
pub mod file;
pub mod memory;

pub use document::{Document, DocumentStore, Expect, StoreError};
pub use file::FileDocumentStore;
pub use memory::InMemoryDocumentStore;
