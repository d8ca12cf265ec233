//! In-memory graph store.
//!
//! Keeps the quad set plus two adjacency indexes keyed by
//! (node, predicate), one per direction, so traversal hops are lookups.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use trellis_core::{Direction, Quad};

use crate::client::GraphError;
use crate::cursor::{CursorSource, NodeCursor};
use crate::path::Path;
use crate::store::GraphStore;

type Adjacency = HashMap<(String, String), BTreeSet<String>>;

#[derive(Debug, Default)]
struct Index {
    quads: BTreeSet<Quad>,
    /// (subject, predicate) -> objects
    outgoing: Adjacency,
    /// (object, predicate) -> subjects
    incoming: Adjacency,
}

impl Index {
    fn insert(&mut self, quad: &Quad) -> bool {
        if !self.quads.insert(quad.clone()) {
            return false;
        }
        self.outgoing
            .entry((quad.subject.clone(), quad.predicate.clone()))
            .or_default()
            .insert(quad.object.clone());
        self.incoming
            .entry((quad.object.clone(), quad.predicate.clone()))
            .or_default()
            .insert(quad.subject.clone());
        true
    }

    fn remove(&mut self, quad: &Quad) -> bool {
        if !self.quads.remove(quad) {
            return false;
        }
        unlink(&mut self.outgoing, &quad.subject, &quad.predicate, &quad.object);
        unlink(&mut self.incoming, &quad.object, &quad.predicate, &quad.subject);
        true
    }

    fn neighbors(&self, node: &str, predicate: &str, direction: Direction) -> Option<&BTreeSet<String>> {
        let index = match direction {
            Direction::Out => &self.outgoing,
            Direction::In => &self.incoming,
        };
        index.get(&(node.to_string(), predicate.to_string()))
    }

    fn walk(&self, path: &Path) -> Vec<String> {
        let mut frontier: BTreeSet<String> = BTreeSet::new();
        frontier.insert(path.start_node().to_string());

        for hop in path.hops() {
            let mut next = BTreeSet::new();
            for node in &frontier {
                if let Some(found) = self.neighbors(node, &hop.predicate, hop.direction) {
                    next.extend(found.iter().cloned());
                }
            }
            if next.is_empty() {
                return Vec::new();
            }
            frontier = next;
        }

        frontier.into_iter().collect()
    }
}

fn unlink(index: &mut Adjacency, node: &str, predicate: &str, other: &str) {
    let key = (node.to_string(), predicate.to_string());
    if let Some(set) = index.get_mut(&key) {
        set.remove(other);
        if set.is_empty() {
            index.remove(&key);
        }
    }
}

/// Thread-safe in-memory graph. Clone shares the same graph.
#[derive(Debug, Clone, Default)]
pub struct MemoryGraph {
    index: Arc<RwLock<Index>>,
    open_cursors: Arc<AtomicUsize>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored quad, in (subject, predicate, object) order.
    pub fn quads(&self) -> Vec<Quad> {
        self.index.read().quads.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.index.read().quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of cursors handed out and not yet released.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }
}

struct MemoryCursor {
    nodes: VecDeque<String>,
    open: Arc<AtomicUsize>,
}

#[async_trait]
impl CursorSource for MemoryCursor {
    async fn fetch(&mut self) -> Result<Option<String>, GraphError> {
        Ok(self.nodes.pop_front())
    }

    fn release(&mut self) {
        self.nodes.clear();
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl GraphStore for MemoryGraph {
    async fn upsert_quad(&self, quad: &Quad) -> Result<(), GraphError> {
        if self.index.write().insert(quad) {
            tracing::trace!(%quad, "Quad inserted");
        }
        Ok(())
    }

    async fn remove_quad(&self, quad: &Quad) -> Result<bool, GraphError> {
        Ok(self.index.write().remove(quad))
    }

    async fn contains(&self, quad: &Quad) -> Result<bool, GraphError> {
        Ok(self.index.read().quads.contains(quad))
    }

    async fn traverse(&self, path: &Path) -> Result<NodeCursor, GraphError> {
        path.validate()?;
        let nodes = self.index.read().walk(path);
        self.open_cursors.fetch_add(1, Ordering::SeqCst);
        Ok(NodeCursor::new(
            path,
            MemoryCursor {
                nodes: nodes.into(),
                open: self.open_cursors.clone(),
            },
        ))
    }
}
