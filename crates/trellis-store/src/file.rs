//! File-system backed document store.
//!
//! Stores documents as JSON files in a directory tree:
//! ```text
//! {root}/
//!   relationship_manager/
//!     manager.json
//!   patterns/
//!     {key}.json
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use chrono::Utc;
use parking_lot::Mutex;

use crate::document::{not_found, Document, DocumentStore, Expect, StoreError};

/// Distinguishes concurrent temp files for the same document.
static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// The write lock for a canonical root. Every handle opened on the same
/// directory in this process gets the same lock.
fn root_lock(root: &Path) -> Arc<Mutex<()>> {
    static LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();
    LOCKS
        .get_or_init(Default::default)
        .lock()
        .entry(root.to_path_buf())
        .or_default()
        .clone()
}

pub struct FileDocumentStore {
    root: PathBuf,
    /// Serializes check-and-write across all handles on this root.
    write_lock: Arc<Mutex<()>>,
}

impl FileDocumentStore {
    /// Create a new store rooted at the given directory.
    /// Creates the directory if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let root = fs::canonicalize(&root)?;
        Ok(Self {
            write_lock: root_lock(&root),
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, collection: &str) -> Result<PathBuf, StoreError> {
        check_segment(collection)?;
        Ok(self.root.join(collection))
    }

    fn document_path(&self, collection: &str, key: &str) -> Result<PathBuf, StoreError> {
        check_segment(key)?;
        Ok(self.collection_dir(collection)?.join(format!("{key}.json")))
    }
}

/// Collection names and keys become path segments; keep them to one level.
fn check_segment(segment: &str) -> Result<(), StoreError> {
    let bad = segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains(['/', '\\'])
        || segment.chars().any(char::is_control);
    if bad {
        return Err(StoreError::InvalidKey(segment.to_string()));
    }
    Ok(())
}

fn read_document(path: &Path) -> Result<Option<Document>, StoreError> {
    if !path.is_file() {
        return Ok(None);
    }
    let json = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&json)?))
}

impl DocumentStore for FileDocumentStore {
    fn find_one(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        read_document(&self.document_path(collection, key)?)
    }

    fn upsert(
        &self,
        collection: &str,
        key: &str,
        body: serde_json::Value,
        expect: Expect,
    ) -> Result<u64, StoreError> {
        let path = self.document_path(collection, key)?;
        let _guard = self.write_lock.lock();

        let current = read_document(&path)?.map(|d| d.revision);
        expect.check(collection, key, current)?;

        let doc = Document {
            key: key.to_string(),
            revision: current.unwrap_or(0) + 1,
            updated_at: Utc::now(),
            body,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension(format!(
            "json.{}.{}.tmp",
            std::process::id(),
            TMP_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&tmp, serde_json::to_string_pretty(&doc)?)?;
        fs::rename(&tmp, &path)?;

        tracing::debug!(
            collection,
            key,
            revision = doc.revision,
            path = %path.display(),
            "Document saved"
        );

        Ok(doc.revision)
    }

    fn remove(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        let path = self.document_path(collection, key)?;
        let _guard = self.write_lock.lock();
        if !path.is_file() {
            return Err(not_found(collection, key));
        }
        fs::remove_file(&path)?;
        Ok(())
    }

    fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let dir = self.collection_dir(collection)?;
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut results = Vec::new();
        for entry in fs::read_dir(&dir)?.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(doc) = read_document(&path)? {
                    results.push(doc);
                }
            }
        }
        results.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(results)
    }
}
