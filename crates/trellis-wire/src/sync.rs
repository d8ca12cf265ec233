//! Graph synchronizer: writes matched triples and removes caller-described quads.

use std::sync::Arc;

use trellis_core::{Item, Quad, QuadParam, Triple};
use trellis_graph::GraphStore;

use crate::error::{Result, WireError};

pub struct GraphSynchronizer<G> {
    graph: Arc<G>,
}

impl<G> Clone for GraphSynchronizer<G> {
    fn clone(&self) -> Self {
        Self {
            graph: Arc::clone(&self.graph),
        }
    }
}

impl<G: GraphStore> GraphSynchronizer<G> {
    pub fn new(graph: Arc<G>) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    /// Upsert one quad per triple.
    ///
    /// Triples are applied independently. Every triple is attempted even
    /// after a failure; the first failure is returned with its triple.
    /// Returns the number of triples written.
    pub async fn apply_triples(&self, item: &Item, triples: &[Triple]) -> Result<usize> {
        let mut first_err = None;
        let mut written = 0;

        for triple in triples {
            match self.graph.upsert_quad(&Quad::from(triple)).await {
                Ok(()) => written += 1,
                Err(e) => {
                    tracing::warn!(item_id = %item.id, %triple, error = %e, "Graph write failed");
                    if first_err.is_none() {
                        first_err = Some(WireError::GraphWrite {
                            triple: triple.clone(),
                            source: e,
                        });
                    }
                }
            }
        }

        tracing::info!(item_id = %item.id, written, total = triples.len(), "Triples applied");
        match first_err {
            Some(e) => Err(e),
            None => Ok(written),
        }
    }

    /// Remove the quads described by `params`.
    ///
    /// The whole batch is validated before anything is removed; one bad
    /// entry fails the call with its index and nothing is deleted. After
    /// validation, removals are independent and a store failure only affects
    /// its own entry. Returns the number of quads that existed and were removed.
    pub async fn remove_quads(&self, params: &[QuadParam]) -> Result<usize> {
        let quads = params
            .iter()
            .enumerate()
            .map(|(index, p)| {
                p.to_quad()
                    .map_err(|source| WireError::InvalidQuadParam { index, source })
            })
            .collect::<Result<Vec<_>>>()
            .map_err(|e| {
                tracing::warn!(error = %e, "Quad removal batch rejected");
                e
            })?;

        let mut first_err = None;
        let mut removed = 0;

        for quad in quads {
            match self.graph.remove_quad(&quad).await {
                Ok(true) => removed += 1,
                Ok(false) => tracing::debug!(%quad, "Quad not present"),
                Err(e) => {
                    tracing::warn!(%quad, error = %e, "Graph removal failed");
                    if first_err.is_none() {
                        first_err = Some(WireError::GraphRemove { quad, source: e });
                    }
                }
            }
        }

        tracing::info!(removed, total = params.len(), "Quads removed");
        match first_err {
            Some(e) => Err(e),
            None => Ok(removed),
        }
    }
}
