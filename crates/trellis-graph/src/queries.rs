//! Read operations and Cypher path builder for Neo4j.

use async_trait::async_trait;
use futures::StreamExt;
use neo4rs::{query, Query};
use trellis_core::{Direction, Quad};

use crate::client::{ColumnStream, GraphError, Neo4jGraph};
use crate::cursor::{CursorSource, NodeCursor};
use crate::path::Path;

/// Build the Cypher for a traversal.
///
/// Each hop gets its own MATCH clause so a later hop may reuse an edge an
/// earlier hop already crossed, matching the in-memory frontier walk.
pub fn path_cypher(path: &Path) -> String {
    let mut cypher = String::from("MATCH (n0:Node {id: $start})");
    for (i, hop) in path.hops().iter().enumerate() {
        let (from, to) = (i, i + 1);
        let edge = match hop.direction {
            Direction::Out => format!("-[:QUAD {{predicate: $p{i}}}]->"),
            Direction::In => format!("<-[:QUAD {{predicate: $p{i}}}]-"),
        };
        cypher.push_str(&format!("\nMATCH (n{from}){edge}(n{to}:Node)"));
    }
    let last = path.hops().len();
    cypher.push_str(&format!("\nRETURN DISTINCT n{last}.id AS id\nORDER BY id"));
    cypher
}

fn path_query(path: &Path) -> Query {
    let mut q = query(&path_cypher(path)).param("start", path.start_node().to_string());
    for (i, hop) in path.hops().iter().enumerate() {
        q = q.param(&format!("p{i}"), hop.predicate.clone());
    }
    q
}

/// Cursor over a live Neo4j result stream. Dropping the stream returns the
/// connection to the pool.
struct RowCursor {
    stream: Option<ColumnStream>,
    path: String,
}

#[async_trait]
impl CursorSource for RowCursor {
    async fn fetch(&mut self) -> Result<Option<String>, GraphError> {
        let Some(stream) = self.stream.as_mut() else {
            return Ok(None);
        };
        match stream.next().await {
            Some(Ok(id)) => Ok(Some(id)),
            Some(Err(e)) => Err(GraphError::Read {
                path: self.path.clone(),
                reason: e.to_string(),
            }),
            None => Ok(None),
        }
    }

    fn release(&mut self) {
        self.stream.take();
    }
}

impl Neo4jGraph {
    /// Open a streaming traversal.
    pub async fn match_path(&self, path: &Path) -> Result<NodeCursor, GraphError> {
        path.validate()?;
        let stream = self
            .stream(path_query(path), "id")
            .await
            .map_err(|e| GraphError::Read {
                path: path.to_string(),
                reason: e.to_string(),
            })?;

        Ok(NodeCursor::new(
            path,
            RowCursor {
                stream: Some(stream),
                path: path.to_string(),
            },
        ))
    }

    /// Whether the exact edge exists.
    pub async fn has_quad(&self, quad: &Quad) -> Result<bool, GraphError> {
        let q = query(
            "MATCH (:Node {id: $subject})-[r:QUAD {predicate: $predicate}]->(:Node {id: $object})
             RETURN count(r) AS cnt",
        )
        .param("subject", quad.subject.clone())
        .param("predicate", quad.predicate.clone())
        .param("object", quad.object.clone());

        Ok(self.query_count(q, "cnt").await? > 0)
    }

    /// Count edges carrying a predicate.
    pub async fn count_predicate(&self, predicate: &str) -> Result<i64, GraphError> {
        let q = query(
            "MATCH ()-[r:QUAD {predicate: $predicate}]->()
             RETURN count(r) AS cnt",
        )
        .param("predicate", predicate.to_string());

        self.query_count(q, "cnt").await
    }
}
