//! trellis-core: Shared types, validation, and configuration for Trellis.
//!
//! This crate provides the foundational types used across all Trellis crates:
//! - Catalog types (Relationship, View, Segment, RelationshipManager)
//! - Content items and the tagged `Value` model their attributes are read through
//! - Graph edge types (Triple, Quad, QuadParam)
//! - Configuration loading
//! - Structural validation errors

pub mod config;
pub mod error;
pub mod types;
pub mod value;

pub use config::TrellisConfig;
pub use error::ValidationError;
pub use types::{
    new_id, Direction, Item, Quad, QuadParam, Relationship, RelationshipManager, Segment, Triple,
    View,
};
pub use value::{CoercionError, Map, Value};
