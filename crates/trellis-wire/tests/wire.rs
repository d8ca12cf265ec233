//! End-to-end ingestion and removal against the in-memory stores.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use trellis_core::{Item, Quad, QuadParam};
use trellis_graph::{GraphError, GraphStore, MemoryGraph, NodeCursor, Path};
use trellis_store::InMemoryDocumentStore;
use trellis_wire::{FilePatternSource, Wire, WireError};

const USER: &str = "80aa936a-f618-4234-a7be-df59a14cf8de";
const COMMENT: &str = "d1dfa366-d2f7-4a4a-a64f-af89d4c97d82";
const ASSET: &str = "c1b2bbfe-af9f-4903-8777-bd47c4d5b20a";

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn items() -> Vec<Item> {
    let json = std::fs::read_to_string(fixture("items.json")).unwrap();
    serde_json::from_str(&json).unwrap()
}

fn wire_with<G: GraphStore>(graph: Arc<G>) -> Wire<G> {
    Wire::new(
        Arc::new(InMemoryDocumentStore::new()),
        graph,
        Arc::new(FilePatternSource::new(fixture("patterns.json"))),
    )
}

fn setup() -> Wire<MemoryGraph> {
    wire_with(Arc::new(MemoryGraph::new()))
}

async fn out(wire: &Wire<MemoryGraph>, from: &str, predicate: &str) -> Vec<String> {
    wire.traverse(from, predicate)
        .await
        .unwrap()
        .collect()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_add_remove_graph() {
    let wire = setup();
    let items = items();

    wire.add_to_graph(&items[0]).await.unwrap();
    assert_eq!(out(&wire, USER, "authored").await, vec![COMMENT]);
    assert_eq!(out(&wire, COMMENT, "on").await, vec![ASSET]);

    let params = vec![
        QuadParam::new(USER, "authored", COMMENT),
        QuadParam::new(COMMENT, "on", ASSET),
    ];
    assert_eq!(wire.remove_from_graph(&params).await.unwrap(), 2);

    assert!(out(&wire, USER, "authored").await.is_empty());
    assert!(out(&wire, COMMENT, "on").await.is_empty());
    assert!(wire.graph().is_empty());
    assert_eq!(wire.graph().open_cursors(), 0);
}

#[tokio::test]
async fn test_graph_param_fail() {
    let wire = setup();
    wire.graph()
        .upsert_quad(&Quad::new("orcs", "chase", "frodo"))
        .await
        .unwrap();

    let params = vec![
        QuadParam::new("", "", "the ring"),
        QuadParam::new("orcs", "chase", "frodo"),
    ];
    let err = wire.remove_from_graph(&params).await.unwrap_err();
    assert!(matches!(err, WireError::InvalidQuadParam { index: 0, .. }));
    assert_eq!(wire.graph().quads(), vec![Quad::new("orcs", "chase", "frodo")]);
}

#[tokio::test]
async fn test_reapply_is_idempotent() {
    let wire = setup();
    let items = items();

    for item in &items {
        wire.add_to_graph(item).await.unwrap();
    }
    let once = wire.graph().quads();
    for item in &items {
        wire.add_to_graph(item).await.unwrap();
    }
    assert_eq!(wire.graph().quads(), once);
}

#[tokio::test]
async fn test_null_field_and_list_fan_out() {
    let wire = setup();
    let items = items();

    // parent_id is null: the reply pattern contributes nothing.
    let comment = wire.infer(&items[0]).unwrap();
    assert_eq!(comment.len(), 2);
    assert!(comment.iter().all(|t| t.predicate != "replied_to"));

    // Two authors, each flattened to its id.
    wire.add_to_graph(&items[1]).await.unwrap();
    let writers = wire
        .graph()
        .traverse(&Path::start(ASSET).in_("wrote"))
        .await
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert_eq!(
        writers,
        vec![
            "5a1b8c2e-4a43-4d6f-9d57-0c6f2b7d8e11",
            "7f3c9e4a-1b2d-4e5f-8a6b-9c0d1e2f3a4b"
        ]
    );
}

#[tokio::test]
async fn test_dropped_cursor_is_released() {
    let wire = setup();
    wire.add_to_graph(&items()[0]).await.unwrap();

    let mut cursor = wire.traverse(USER, "authored").await.unwrap();
    assert_eq!(wire.graph().open_cursors(), 1);
    assert_eq!(cursor.next().await.unwrap().as_deref(), Some(COMMENT));
    drop(cursor);
    assert_eq!(wire.graph().open_cursors(), 0);
}

/// Fails writes for one predicate and counts every attempt.
#[derive(Default)]
struct FlakyGraph {
    inner: MemoryGraph,
    attempts: AtomicUsize,
}

#[async_trait]
impl GraphStore for FlakyGraph {
    async fn upsert_quad(&self, quad: &Quad) -> Result<(), GraphError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if quad.predicate == "authored" {
            return Err(GraphError::Write {
                quad: quad.clone(),
                reason: "store unavailable".into(),
            });
        }
        self.inner.upsert_quad(quad).await
    }

    async fn remove_quad(&self, quad: &Quad) -> Result<bool, GraphError> {
        self.inner.remove_quad(quad).await
    }

    async fn contains(&self, quad: &Quad) -> Result<bool, GraphError> {
        self.inner.contains(quad).await
    }

    async fn traverse(&self, path: &Path) -> Result<NodeCursor, GraphError> {
        self.inner.traverse(path).await
    }
}

#[tokio::test]
async fn test_write_failure_names_triple_and_rest_still_applied() {
    let graph = Arc::new(FlakyGraph::default());
    let wire = wire_with(graph.clone());

    let err = wire.add_to_graph(&items()[0]).await.unwrap_err();
    match err {
        WireError::GraphWrite { triple, .. } => {
            assert_eq!(triple.subject, USER);
            assert_eq!(triple.predicate, "authored");
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(graph.attempts.load(Ordering::SeqCst), 2);
    assert!(graph
        .inner
        .contains(&Quad::new(COMMENT, "on", ASSET))
        .await
        .unwrap());
}
