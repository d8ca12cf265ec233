//! Repository for the singleton `RelationshipManager` record.

use std::sync::Arc;

use trellis_core::RelationshipManager;
use trellis_store::{DocumentStore, Expect, StoreError};

use crate::error::{CatalogError, Result};

pub const MANAGER_COLLECTION: &str = "relationship_manager";
pub const MANAGER_KEY: &str = "manager";

/// A loaded manager plus the revision it was loaded at.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub manager: RelationshipManager,
    expect: Expect,
}

impl Snapshot {
    /// The revision this snapshot was read at; `None` before the first write.
    pub fn revision(&self) -> Option<u64> {
        match self.expect {
            Expect::Revision(r) => Some(r),
            _ => None,
        }
    }
}

/// Loads and saves the relationship manager with compare-and-swap semantics.
#[derive(Clone)]
pub struct ManagerRepository {
    store: Arc<dyn DocumentStore>,
}

impl ManagerRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Load the manager. A deployment with no record yet yields an empty one.
    pub fn load(&self) -> std::result::Result<Snapshot, StoreError> {
        let doc = self.store.find_one(MANAGER_COLLECTION, MANAGER_KEY)?;
        let manager = match &doc {
            Some(d) => d.decode()?,
            None => RelationshipManager::default(),
        };
        Ok(Snapshot {
            manager,
            expect: Expect::matching(doc.as_ref()),
        })
    }

    /// Save a manager, failing with `StoreError::Conflict` if the record
    /// changed since `snapshot` was loaded.
    pub fn save(&self, snapshot: &Snapshot) -> std::result::Result<u64, StoreError> {
        let body = serde_json::to_value(&snapshot.manager)?;
        self.store
            .upsert(MANAGER_COLLECTION, MANAGER_KEY, body, snapshot.expect)
    }

    /// Load, mutate, and conditionally save in one step.
    ///
    /// When `mutate` fails nothing is written. A concurrent writer between
    /// load and save surfaces as `CatalogError::Store(StoreError::Conflict)`;
    /// no retry is attempted.
    pub fn update<T>(
        &self,
        mutate: impl FnOnce(&mut RelationshipManager) -> Result<T>,
    ) -> Result<T> {
        let mut snapshot = self.load()?;
        let out = mutate(&mut snapshot.manager)?;
        let revision = self.save(&snapshot).map_err(CatalogError::from)?;
        tracing::trace!(revision, "Relationship manager saved");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::Relationship;
    use trellis_store::InMemoryDocumentStore;

    fn repo() -> ManagerRepository {
        ManagerRepository::new(Arc::new(InMemoryDocumentStore::new()))
    }

    #[test]
    fn empty_store_loads_default_manager() {
        let snapshot = repo().load().unwrap();
        assert_eq!(snapshot.manager, RelationshipManager::default());
        assert_eq!(snapshot.revision(), None);
    }

    #[test]
    fn update_persists_and_bumps_revision() {
        let repo = repo();
        repo.update(|rm| {
            rm.upsert_relationship(Relationship::new("authored").with_id("r1"));
            Ok(())
        })
        .unwrap();

        let snapshot = repo.load().unwrap();
        assert_eq!(snapshot.revision(), Some(1));
        assert_eq!(snapshot.manager.relationships.len(), 1);
    }

    #[test]
    fn failed_mutation_writes_nothing() {
        let repo = repo();
        let result: Result<()> = repo.update(|rm| {
            rm.upsert_relationship(Relationship::new("authored").with_id("r1"));
            Err(CatalogError::PredicateExists {
                predicate: "authored".into(),
            })
        });
        assert!(result.is_err());
        assert_eq!(repo.load().unwrap().revision(), None);
    }

    #[test]
    fn interleaved_writer_causes_conflict() {
        let repo = repo();
        let other = repo.clone();

        let result = repo.update(|rm| {
            // Another caller commits between our load and our save.
            other
                .update(|rm2| {
                    rm2.upsert_relationship(Relationship::new("on").with_id("r2"));
                    Ok(())
                })
                .unwrap();
            rm.upsert_relationship(Relationship::new("on").with_id("r3"));
            Ok(())
        });

        assert!(matches!(
            result,
            Err(CatalogError::Store(StoreError::Conflict { .. }))
        ));
        let stored = repo.load().unwrap().manager;
        assert_eq!(stored.relationships.len(), 1);
        assert_eq!(stored.relationships[0].id, "r2");
    }
}
