//! Error types for the trellis-wire crate.

use thiserror::Error;
use trellis_catalog::CatalogError;
use trellis_core::{Quad, Triple, ValidationError};
use trellis_graph::GraphError;
use trellis_store::StoreError;

#[derive(Error, Debug)]
pub enum WireError {
    #[error("Invalid quad parameter at index {index}: {source}")]
    InvalidQuadParam {
        index: usize,
        #[source]
        source: ValidationError,
    },

    #[error("Failed to write {triple} to the graph: {source}")]
    GraphWrite {
        triple: Triple,
        #[source]
        source: GraphError,
    },

    #[error("Failed to remove {quad} from the graph: {source}")]
    GraphRemove {
        quad: Quad,
        #[source]
        source: GraphError,
    },

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid pattern definition in {origin}: {reason}")]
    PatternSource { origin: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WireError>;
