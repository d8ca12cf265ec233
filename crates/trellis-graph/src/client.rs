//! Neo4j connection management and the shared graph error type.

use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use neo4rs::{ConfigBuilder, Graph, Query};
use trellis_core::config::Neo4jSettings;
use trellis_core::Quad;

use crate::cursor::NodeCursor;
use crate::path::Path;
use crate::store::GraphStore;

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("Neo4j query error: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("Graph write failed for {quad}: {reason}")]
    Write { quad: Quad, reason: String },

    #[error("Graph read failed for path {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Invalid traversal path: {0}")]
    InvalidPath(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A single string column streamed out of a result set.
pub(crate) type ColumnStream = Pin<Box<dyn Stream<Item = Result<String, neo4rs::Error>> + Send>>;

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub fetch_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Neo4jSettings::default().into()
    }
}

impl From<Neo4jSettings> for GraphConfig {
    fn from(s: Neo4jSettings) -> Self {
        Self {
            uri: s.uri,
            user: s.user,
            password: s.password,
            max_connections: s.max_connections,
            fetch_size: s.fetch_size,
        }
    }
}

/// Neo4j-backed graph store with connection pooling.
///
/// Nodes are stored as `(:Node {id})` and quads as `[:QUAD {predicate}]`
/// relationships, so predicates never need to be spliced into Cypher.
/// Clone is cheap (inner Arc).
#[derive(Clone)]
pub struct Neo4jGraph {
    graph: Graph,
}

impl Neo4jGraph {
    /// Connect to Neo4j with the given configuration.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let neo_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        tracing::info!(uri = %config.uri, "Connected to Neo4j");
        Ok(Self { graph })
    }

    /// Create the node-id uniqueness constraint MERGE relies on.
    pub async fn ensure_schema(&self) -> Result<(), GraphError> {
        self.run(neo4rs::query(
            "CREATE CONSTRAINT trellis_node_id IF NOT EXISTS
             FOR (n:Node) REQUIRE n.id IS UNIQUE",
        ))
        .await
    }

    /// Execute a write-only query (CREATE, MERGE, DELETE, SET).
    pub async fn run(&self, query: Query) -> Result<(), GraphError> {
        self.graph.run(query).await?;
        Ok(())
    }

    /// Execute a read query and return the first row, if any.
    pub async fn query_one(&self, query: Query) -> Result<Option<neo4rs::Row>, GraphError> {
        let mut stream = self.graph.execute(query).await?;
        Ok(stream.next().await?)
    }

    /// Execute a read query and return its single count column.
    /// No row reads as zero; an undecodable value is an error.
    pub(crate) async fn query_count(&self, query: Query, column: &str) -> Result<i64, GraphError> {
        match self.query_one(query).await? {
            Some(row) => decode_count(column, row.get::<i64>(column)),
            None => Ok(0),
        }
    }

    /// Execute a read query and stream one string column of its rows.
    /// The connection goes back to the pool when the stream is dropped.
    pub(crate) async fn stream(
        &self,
        query: Query,
        column: &'static str,
    ) -> Result<ColumnStream, GraphError> {
        let rows = self.graph.execute(query).await?;
        Ok(Box::pin(rows.column_into_stream::<String>(column).into_stream()))
    }
}

pub(crate) fn decode_count<E: std::fmt::Display>(
    column: &str,
    value: Result<i64, E>,
) -> Result<i64, GraphError> {
    value.map_err(|e| GraphError::Serialization(format!("Failed to read `{column}`: {e}")))
}

#[async_trait]
impl GraphStore for Neo4jGraph {
    async fn upsert_quad(&self, quad: &Quad) -> Result<(), GraphError> {
        self.merge_quad(quad).await
    }

    async fn remove_quad(&self, quad: &Quad) -> Result<bool, GraphError> {
        Ok(self.delete_quad(quad).await? > 0)
    }

    async fn contains(&self, quad: &Quad) -> Result<bool, GraphError> {
        self.has_quad(quad).await
    }

    async fn traverse(&self, path: &Path) -> Result<NodeCursor, GraphError> {
        self.match_path(path).await
    }
}
