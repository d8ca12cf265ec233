//! trellis-wire: infer relationships from content items and keep the graph
//! in step with them.
//!
//! An ingestion collaborator hands each created or updated item to
//! [`Wire::add_to_graph`]; the active patterns turn it into triples, and the
//! synchronizer writes them as quads. Edges are removed only through
//! validated [`QuadParam`](trellis_core::QuadParam) batches.

pub mod error;
pub mod matcher;
pub mod pattern;
pub mod source;
pub mod sync;
pub mod wire;

pub use error::WireError;
pub use matcher::match_item;
pub use pattern::{Condition, FieldRule, Pattern};
pub use source::{DocumentPatternSource, FilePatternSource, PatternSource};
pub use sync::GraphSynchronizer;
pub use wire::Wire;
