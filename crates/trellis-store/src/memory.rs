//! In-memory document store, used by tests and the `memory` backend.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use parking_lot::RwLock;

use crate::document::{not_found, Document, DocumentStore, Expect, StoreError};

/// Thread-safe in-memory document store.
///
/// The write lock is held across the revision check and the write, so the
/// compare-and-swap in `upsert` is atomic.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Document>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn find_one(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(key))
            .cloned())
    }

    fn upsert(
        &self,
        collection: &str,
        key: &str,
        body: serde_json::Value,
        expect: Expect,
    ) -> Result<u64, StoreError> {
        let mut collections = self.collections.write();
        let docs = collections.entry(collection.to_string()).or_default();
        let current = docs.get(key).map(|d| d.revision);
        expect.check(collection, key, current)?;

        let revision = current.unwrap_or(0) + 1;
        docs.insert(
            key.to_string(),
            Document {
                key: key.to_string(),
                revision,
                updated_at: Utc::now(),
                body,
            },
        );
        Ok(revision)
    }

    fn remove(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.write();
        collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(key))
            .map(|_| ())
            .ok_or_else(|| not_found(collection, key))
    }

    fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }
}
