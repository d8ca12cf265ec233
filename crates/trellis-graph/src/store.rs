//! The graph-store trait every backend implements.

use async_trait::async_trait;
use trellis_core::Quad;

use crate::client::GraphError;
use crate::cursor::NodeCursor;
use crate::path::Path;

/// Graph persistence backend.
///
/// Implementations treat (subject, predicate, object) as the dedup key:
/// upserting an existing quad and removing an absent one are both no-ops.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Insert the quad if it is not already present.
    async fn upsert_quad(&self, quad: &Quad) -> Result<(), GraphError>;

    /// Remove the quad. Returns whether it was present.
    async fn remove_quad(&self, quad: &Quad) -> Result<bool, GraphError>;

    /// Whether the exact quad is stored.
    async fn contains(&self, quad: &Quad) -> Result<bool, GraphError>;

    /// Start a traversal. The returned cursor yields distinct node ids in
    /// ascending order and must be drained, closed, or dropped.
    async fn traverse(&self, path: &Path) -> Result<NodeCursor, GraphError>;
}
