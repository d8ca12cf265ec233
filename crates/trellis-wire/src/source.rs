//! Sources for the active pattern set.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use trellis_store::{DocumentStore, Expect};

use crate::error::{Result, WireError};
use crate::pattern::Pattern;

pub const PATTERN_COLLECTION: &str = "patterns";

/// Supplies the active set of patterns. Read on every match so edits to the
/// underlying source take effect without a restart.
pub trait PatternSource: Send + Sync {
    fn patterns(&self) -> Result<Vec<Pattern>>;
}

impl PatternSource for Vec<Pattern> {
    fn patterns(&self) -> Result<Vec<Pattern>> {
        Ok(self.clone())
    }
}

/// Patterns read from a JSON array on disk.
pub struct FilePatternSource {
    path: PathBuf,
}

impl FilePatternSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PatternSource for FilePatternSource {
    fn patterns(&self) -> Result<Vec<Pattern>> {
        let json = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&json).map_err(|e| WireError::PatternSource {
            origin: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

/// Patterns stored one per document in the `patterns` collection, keyed by
/// pattern name.
pub struct DocumentPatternSource {
    store: Arc<dyn DocumentStore>,
}

impl DocumentPatternSource {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Insert or replace a pattern.
    pub fn put(&self, pattern: &Pattern) -> Result<()> {
        let body = serde_json::to_value(pattern).map_err(trellis_store::StoreError::from)?;
        let revision = self
            .store
            .upsert(PATTERN_COLLECTION, &pattern.name, body, Expect::Any)?;
        tracing::info!(pattern = %pattern.name, revision, "Pattern saved");
        Ok(())
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        self.store.remove(PATTERN_COLLECTION, name)?;
        tracing::info!(pattern = %name, "Pattern removed");
        Ok(())
    }

    /// Save every pattern in a JSON file holding one pattern or an array of
    /// them. The whole file is parsed before anything is written.
    pub fn import(&self, path: &Path) -> Result<usize> {
        let json = std::fs::read_to_string(path)?;
        let patterns = match serde_json::from_str(&json) {
            Ok(OneOrMany::One(pattern)) => vec![pattern],
            Ok(OneOrMany::Many(patterns)) => patterns,
            Err(e) => {
                return Err(WireError::PatternSource {
                    origin: path.display().to_string(),
                    reason: e.to_string(),
                })
            }
        };
        for pattern in &patterns {
            self.put(pattern)?;
        }
        Ok(patterns.len())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Pattern>),
    One(Pattern),
}

impl PatternSource for DocumentPatternSource {
    fn patterns(&self) -> Result<Vec<Pattern>> {
        self.store
            .list(PATTERN_COLLECTION)?
            .iter()
            .map(|doc| {
                doc.decode().map_err(|e| WireError::PatternSource {
                    origin: format!("{PATTERN_COLLECTION}/{}", doc.key),
                    reason: e.to_string(),
                })
            })
            .collect()
    }
}
