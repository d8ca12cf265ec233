//! Write operations against Neo4j.
//!
//! Quads use MERGE (upsert) semantics so re-ingesting the same item never
//! duplicates an edge. Nodes are identified by `id` alone.

use neo4rs::query;
use trellis_core::Quad;

use crate::client::{GraphError, Neo4jGraph};

impl Neo4jGraph {
    /// Merge both endpoint nodes and the edge between them.
    pub async fn merge_quad(&self, quad: &Quad) -> Result<(), GraphError> {
        let q = query(
            "MERGE (s:Node {id: $subject})
             MERGE (o:Node {id: $object})
             MERGE (s)-[:QUAD {predicate: $predicate}]->(o)",
        )
        .param("subject", quad.subject.clone())
        .param("predicate", quad.predicate.clone())
        .param("object", quad.object.clone());

        self.run(q).await.map_err(|e| write_error(quad, e))
    }

    /// Delete the edge matching the quad. Returns the number of edges removed.
    pub async fn delete_quad(&self, quad: &Quad) -> Result<i64, GraphError> {
        let q = query(
            "MATCH (:Node {id: $subject})-[r:QUAD {predicate: $predicate}]->(:Node {id: $object})
             DELETE r
             RETURN count(r) AS removed",
        )
        .param("subject", quad.subject.clone())
        .param("predicate", quad.predicate.clone())
        .param("object", quad.object.clone());

        self.query_count(q, "removed")
            .await
            .map_err(|e| write_error(quad, e))
    }
}

fn write_error(quad: &Quad, err: GraphError) -> GraphError {
    GraphError::Write {
        quad: quad.clone(),
        reason: err.to_string(),
    }
}
