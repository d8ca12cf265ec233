//! Error types for the trellis-catalog crate.

use thiserror::Error;
use trellis_core::ValidationError;
use trellis_store::StoreError;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Predicate already exists: {predicate}")]
    PredicateExists { predicate: String },

    #[error("Relationship not found: {id}")]
    RelationshipNotFound { id: String },

    #[error("View not found: {id}")]
    ViewNotFound { id: String },

    #[error("View name already exists: {name}")]
    ViewExists { name: String },

    #[error("Active view is utilizing relationship {relationship_id}: {}", .views.join(", "))]
    ActiveViewDependency {
        relationship_id: String,
        views: Vec<String>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
