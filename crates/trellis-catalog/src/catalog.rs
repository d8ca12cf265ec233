//! Relationship catalog operations.

use std::sync::Arc;

use trellis_core::config::CatalogSettings;
use trellis_core::{new_id, Relationship, RelationshipManager, View};
use trellis_store::DocumentStore;

use crate::error::{CatalogError, Result};
use crate::repository::ManagerRepository;
use crate::views;

/// The catalog of relationships and views.
///
/// Clone is cheap; clones share the underlying store.
#[derive(Clone)]
pub struct RelationshipCatalog {
    repo: ManagerRepository,
    recheck_predicate_on_update: bool,
}

impl RelationshipCatalog {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            repo: ManagerRepository::new(store),
            recheck_predicate_on_update: false,
        }
    }

    pub fn with_settings(mut self, settings: &CatalogSettings) -> Self {
        self.recheck_predicate_on_update = settings.recheck_predicate_on_update;
        self
    }

    // ── Relationships ────────────────────────────────────────────

    /// Add a relationship. Assigns a fresh identifier when none is supplied.
    /// Returns the relationship's identifier.
    pub fn add_relationship(&self, mut rel: Relationship) -> Result<String> {
        tracing::debug!(predicate = %rel.predicate, "Adding relationship");

        rel.validate_predicate()?;
        if rel.id.is_empty() {
            rel.id = new_id();
        }
        rel.validate()?;

        let id = rel.id.clone();
        let predicate = rel.predicate.clone();
        self.repo
            .update(|rm| {
                if rm.relationship_by_predicate(&rel.predicate).is_some() {
                    return Err(CatalogError::PredicateExists {
                        predicate: rel.predicate.clone(),
                    });
                }
                rm.upsert_relationship(rel);
                Ok(())
            })
            .map_err(|e| {
                tracing::warn!(%predicate, error = %e, "Relationship not added");
                e
            })?;

        tracing::info!(relationship_id = %id, %predicate, "Relationship added");
        Ok(id)
    }

    /// Remove a relationship unless a view's path still references it.
    pub fn remove_relationship(&self, id: &str) -> Result<()> {
        tracing::debug!(relationship_id = %id, "Removing relationship");

        self.repo
            .update(|rm| {
                views::ensure_removable(rm, id)?;
                rm.remove_relationship(id)
                    .ok_or_else(|| CatalogError::RelationshipNotFound { id: id.to_string() })
            })
            .map_err(|e| {
                tracing::warn!(relationship_id = %id, error = %e, "Relationship not removed");
                e
            })?;

        tracing::info!(relationship_id = %id, "Relationship removed");
        Ok(())
    }

    /// Replace a stored relationship, keyed by identifier.
    ///
    /// Predicate uniqueness against sibling relationships is only re-checked
    /// when `recheck_predicate_on_update` is enabled.
    pub fn update_relationship(&self, rel: Relationship) -> Result<()> {
        tracing::debug!(relationship_id = %rel.id, "Updating relationship");
        rel.validate()?;

        let id = rel.id.clone();
        let recheck = self.recheck_predicate_on_update;
        self.repo
            .update(|rm| {
                if rm.relationship(&rel.id).is_none() {
                    return Err(CatalogError::RelationshipNotFound { id: rel.id.clone() });
                }
                if recheck {
                    if let Some(other) = rm.relationship_by_predicate(&rel.predicate) {
                        if other.id != rel.id {
                            return Err(CatalogError::PredicateExists {
                                predicate: rel.predicate.clone(),
                            });
                        }
                    }
                }
                rm.upsert_relationship(rel);
                Ok(())
            })
            .map_err(|e| {
                tracing::warn!(relationship_id = %id, error = %e, "Relationship not updated");
                e
            })?;

        tracing::info!(relationship_id = %id, "Relationship updated");
        Ok(())
    }

    // ── Views ────────────────────────────────────────────────────

    /// Add a view. Every segment must reference an existing relationship.
    pub fn add_view(&self, mut view: View) -> Result<String> {
        tracing::debug!(view = %view.name, "Adding view");
        if view.id.is_empty() {
            view.id = new_id();
        }
        let id = view.id.clone();
        let name = view.name.clone();

        self.repo
            .update(|rm| {
                if rm.view(&view.id).is_some() {
                    return Err(CatalogError::ViewExists {
                        name: view.name.clone(),
                    });
                }
                views::validate_view(rm, &view)?;
                rm.upsert_view(view);
                Ok(())
            })
            .map_err(|e| {
                tracing::warn!(view = %name, error = %e, "View not added");
                e
            })?;

        tracing::info!(view_id = %id, view = %name, "View added");
        Ok(id)
    }

    /// Replace a stored view, keyed by identifier. The new path is validated
    /// as a whole before anything is written.
    pub fn update_view(&self, view: View) -> Result<()> {
        tracing::debug!(view_id = %view.id, "Updating view");

        let id = view.id.clone();
        self.repo
            .update(|rm| {
                if rm.view(&view.id).is_none() {
                    return Err(CatalogError::ViewNotFound { id: view.id.clone() });
                }
                views::validate_view(rm, &view)?;
                rm.upsert_view(view);
                Ok(())
            })
            .map_err(|e| {
                tracing::warn!(view_id = %id, error = %e, "View not updated");
                e
            })?;

        tracing::info!(view_id = %id, "View updated");
        Ok(())
    }

    pub fn remove_view(&self, id: &str) -> Result<()> {
        tracing::debug!(view_id = %id, "Removing view");

        self.repo
            .update(|rm| {
                rm.remove_view(id)
                    .map(|_| ())
                    .ok_or_else(|| CatalogError::ViewNotFound { id: id.to_string() })
            })
            .map_err(|e| {
                tracing::warn!(view_id = %id, error = %e, "View not removed");
                e
            })?;

        tracing::info!(view_id = %id, "View removed");
        Ok(())
    }

    // ── Reads ────────────────────────────────────────────────────

    /// The current manager record.
    pub fn manager(&self) -> Result<RelationshipManager> {
        Ok(self.repo.load()?.manager)
    }

    pub fn relationships(&self) -> Result<Vec<Relationship>> {
        Ok(self.manager()?.relationships)
    }

    pub fn relationship(&self, id: &str) -> Result<Relationship> {
        self.manager()?
            .relationship(id)
            .cloned()
            .ok_or_else(|| CatalogError::RelationshipNotFound { id: id.to_string() })
    }

    pub fn relationship_by_predicate(&self, predicate: &str) -> Result<Relationship> {
        self.manager()?
            .relationship_by_predicate(predicate)
            .cloned()
            .ok_or_else(|| CatalogError::RelationshipNotFound {
                id: predicate.to_string(),
            })
    }

    pub fn views(&self) -> Result<Vec<View>> {
        Ok(self.manager()?.views)
    }

    pub fn view(&self, id: &str) -> Result<View> {
        self.manager()?
            .view(id)
            .cloned()
            .ok_or_else(|| CatalogError::ViewNotFound { id: id.to_string() })
    }

    pub fn view_by_name(&self, name: &str) -> Result<View> {
        self.manager()?
            .view_by_name(name)
            .cloned()
            .ok_or_else(|| CatalogError::ViewNotFound {
                id: name.to_string(),
            })
    }
}
