//! The `Wire` facade: catalog mutations, item ingestion, edge removal, and
//! traversal behind one handle.

use std::sync::Arc;

use trellis_catalog::{views, CatalogError, RelationshipCatalog};
use trellis_core::config::CatalogSettings;
use trellis_core::{Item, QuadParam, Relationship, Triple, View};
use trellis_graph::{GraphStore, NodeCursor, Path};
use trellis_store::DocumentStore;

use crate::error::Result;
use crate::matcher::match_item;
use crate::source::PatternSource;
use crate::sync::GraphSynchronizer;

pub struct Wire<G> {
    catalog: RelationshipCatalog,
    patterns: Arc<dyn PatternSource>,
    sync: GraphSynchronizer<G>,
}

impl<G: GraphStore> Wire<G> {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        graph: Arc<G>,
        patterns: Arc<dyn PatternSource>,
    ) -> Self {
        Self {
            catalog: RelationshipCatalog::new(store),
            patterns,
            sync: GraphSynchronizer::new(graph),
        }
    }

    pub fn with_catalog_settings(mut self, settings: &CatalogSettings) -> Self {
        self.catalog = self.catalog.with_settings(settings);
        self
    }

    pub fn catalog(&self) -> &RelationshipCatalog {
        &self.catalog
    }

    pub fn graph(&self) -> &G {
        self.sync.graph()
    }

    // ── Catalog ──────────────────────────────────────────────────

    pub fn add_relationship(&self, rel: Relationship) -> Result<String> {
        Ok(self.catalog.add_relationship(rel)?)
    }

    pub fn remove_relationship(&self, id: &str) -> Result<()> {
        Ok(self.catalog.remove_relationship(id)?)
    }

    pub fn update_relationship(&self, rel: Relationship) -> Result<()> {
        Ok(self.catalog.update_relationship(rel)?)
    }

    pub fn add_view(&self, view: View) -> Result<String> {
        Ok(self.catalog.add_view(view)?)
    }

    pub fn remove_view(&self, id: &str) -> Result<()> {
        Ok(self.catalog.remove_view(id)?)
    }

    // ── Graph ────────────────────────────────────────────────────

    /// Candidate triples for an item under the active patterns. Writes nothing.
    pub fn infer(&self, item: &Item) -> Result<Vec<Triple>> {
        let patterns = self.patterns.patterns()?;
        Ok(match_item(item, &patterns))
    }

    /// Infer an item's relationships and write them to the graph.
    /// Called whenever an item is created or updated.
    pub async fn add_to_graph(&self, item: &Item) -> Result<usize> {
        tracing::debug!(item_id = %item.id, item_type = %item.item_type, "Adding item to graph");
        let triples = self.infer(item)?;
        self.sync.apply_triples(item, &triples).await
    }

    pub async fn remove_from_graph(&self, params: &[QuadParam]) -> Result<usize> {
        tracing::debug!(count = params.len(), "Removing quads from graph");
        self.sync.remove_quads(params).await
    }

    /// Nodes reached from `start` along one outgoing `predicate` edge.
    pub async fn traverse(&self, start: &str, predicate: &str) -> Result<NodeCursor> {
        let path = Path::start(start).out(predicate);
        Ok(self.sync.graph().traverse(&path).await?)
    }

    /// Run a named view from `start`, following each segment's relationship
    /// in its configured direction.
    pub async fn execute_view(&self, view_name: &str, start: &str) -> Result<NodeCursor> {
        let manager = self.catalog.manager()?;
        let view = manager
            .view_by_name(view_name)
            .ok_or_else(|| CatalogError::ViewNotFound {
                id: view_name.to_string(),
            })?;
        let path = views::resolve_hops(&manager, view)?
            .into_iter()
            .fold(Path::start(start), |path, (predicate, direction)| {
                path.hop(predicate, direction)
            });

        tracing::debug!(view = %view_name, %path, "Executing view");
        Ok(self.sync.graph().traverse(&path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{FieldRule, Pattern};
    use trellis_core::{Map, Segment, Value};
    use trellis_graph::MemoryGraph;
    use trellis_store::InMemoryDocumentStore;

    use crate::error::WireError;

    fn wire() -> Wire<MemoryGraph> {
        let patterns: Vec<Pattern> = vec![
            Pattern::new(
                "author",
                FieldRule::Field("user_id".into()),
                "authored",
                FieldRule::ItemId,
            ),
            Pattern::new(
                "asset",
                FieldRule::ItemId,
                "on",
                FieldRule::Field("asset_id".into()),
            ),
        ];
        Wire::new(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(MemoryGraph::new()),
            Arc::new(patterns),
        )
    }

    fn comment(id: &str, user: &str, asset: &str) -> Item {
        let mut data = Map::new();
        data.insert("user_id".into(), Value::from(user));
        data.insert("asset_id".into(), Value::from(asset));
        Item::new(id, "comment", data)
    }

    #[tokio::test]
    async fn infer_writes_nothing() {
        let wire = wire();
        let triples = wire.infer(&comment("c1", "u1", "a1")).unwrap();
        assert_eq!(triples.len(), 2);
        assert!(wire.graph().is_empty());
    }

    #[tokio::test]
    async fn traverse_follows_single_predicate() {
        let wire = wire();
        wire.add_to_graph(&comment("c1", "u1", "a1")).await.unwrap();
        wire.add_to_graph(&comment("c2", "u1", "a2")).await.unwrap();

        let nodes = wire.traverse("u1", "authored").await.unwrap().collect().await.unwrap();
        assert_eq!(nodes, vec!["c1", "c2"]);
        assert_eq!(wire.graph().open_cursors(), 0);
    }

    #[tokio::test]
    async fn execute_view_walks_segments_in_direction() {
        let wire = wire();
        let authored = wire.add_relationship(Relationship::new("authored")).unwrap();
        let on = wire.add_relationship(Relationship::new("on")).unwrap();
        wire.add_view(View::new(
            "asset commenters",
            vec![Segment::inbound(&on), Segment::inbound(&authored)],
        ))
        .unwrap();

        wire.add_to_graph(&comment("c1", "u1", "a1")).await.unwrap();
        wire.add_to_graph(&comment("c2", "u2", "a1")).await.unwrap();
        wire.add_to_graph(&comment("c3", "u3", "a2")).await.unwrap();

        let users = wire
            .execute_view("asset commenters", "a1")
            .await
            .unwrap()
            .collect()
            .await
            .unwrap();
        assert_eq!(users, vec!["u1", "u2"]);
    }

    #[tokio::test]
    async fn execute_unknown_view_is_not_found() {
        let err = wire().execute_view("nope", "a1").await.unwrap_err();
        assert!(matches!(
            err,
            WireError::Catalog(CatalogError::ViewNotFound { .. })
        ));
    }

    #[test]
    fn catalog_errors_pass_through() {
        let wire = wire();
        wire.add_relationship(Relationship::new("authored")).unwrap();
        assert!(matches!(
            wire.add_relationship(Relationship::new("authored")),
            Err(WireError::Catalog(CatalogError::PredicateExists { .. }))
        ));
    }
}
