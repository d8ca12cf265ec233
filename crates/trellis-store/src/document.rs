//! Document store trait, revisioned documents, and write expectations.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Errors that can occur during document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Document not found: {collection}/{key}")]
    NotFound { collection: String, key: String },

    #[error("Revision conflict on {collection}/{key}: expected {expected}, found {found}")]
    Conflict {
        collection: String,
        key: String,
        expected: String,
        found: String,
    },

    #[error("Invalid document key: {0:?}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A stored document with its store-assigned revision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub key: String,
    /// Starts at 1 and increases by one on every successful write.
    pub revision: u64,
    pub updated_at: DateTime<Utc>,
    pub body: serde_json::Value,
}

impl Document {
    /// Deserialize the body into a typed record.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        Ok(serde_json::from_value(self.body.clone())?)
    }
}

/// What the caller believes about the current state of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// Write unconditionally.
    Any,
    /// The document must not exist yet.
    Absent,
    /// The document must exist at exactly this revision.
    Revision(u64),
}

impl Expect {
    /// Check the expectation against the current revision (`None` = absent).
    pub fn check(&self, collection: &str, key: &str, current: Option<u64>) -> Result<(), StoreError> {
        let ok = match (self, current) {
            (Expect::Any, _) => true,
            (Expect::Absent, None) => true,
            (Expect::Revision(want), Some(have)) => *want == have,
            _ => false,
        };
        if ok {
            return Ok(());
        }
        Err(StoreError::Conflict {
            collection: collection.to_string(),
            key: key.to_string(),
            expected: match self {
                Expect::Any => "any".to_string(),
                Expect::Absent => "absent".to_string(),
                Expect::Revision(r) => format!("revision {r}"),
            },
            found: match current {
                Some(r) => format!("revision {r}"),
                None => "absent".to_string(),
            },
        })
    }

    /// The expectation that matches a previously loaded document.
    pub fn matching(doc: Option<&Document>) -> Self {
        match doc {
            Some(d) => Expect::Revision(d.revision),
            None => Expect::Absent,
        }
    }
}

/// Trait for document persistence backends, parameterized by collection name.
pub trait DocumentStore: Send + Sync {
    /// Find a document by key. Returns `Ok(None)` when absent.
    fn find_one(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError>;

    /// Insert or replace a document if `expect` holds. Returns the new revision.
    /// On a failed expectation nothing is written and `StoreError::Conflict` is returned.
    fn upsert(
        &self,
        collection: &str,
        key: &str,
        body: serde_json::Value,
        expect: Expect,
    ) -> Result<u64, StoreError>;

    /// Remove a document. Returns `StoreError::NotFound` when absent.
    fn remove(&self, collection: &str, key: &str) -> Result<(), StoreError>;

    /// All documents in a collection, ordered by key.
    fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError>;
}

pub(crate) fn not_found(collection: &str, key: &str) -> StoreError {
    StoreError::NotFound {
        collection: collection.to_string(),
        key: key.to_string(),
    }
}
