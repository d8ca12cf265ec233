//! Scoped traversal cursors.
//!
//! A `NodeCursor` owns a backend cursor and releases it exactly once: when
//! iteration is exhausted, when a fetch fails, on an explicit `close`, or on
//! drop, whichever comes first.

use std::fmt;

use async_trait::async_trait;

use crate::client::GraphError;
use crate::path::Path;

/// A backend cursor producing node identifiers.
#[async_trait]
pub trait CursorSource: Send {
    /// Fetch the next node identifier, or `None` when exhausted.
    async fn fetch(&mut self) -> Result<Option<String>, GraphError>;

    /// Release the underlying resources. Called at most once.
    fn release(&mut self);
}

pub struct NodeCursor {
    source: Option<Box<dyn CursorSource>>,
    path: String,
}

impl NodeCursor {
    pub fn new(path: &Path, source: impl CursorSource + 'static) -> Self {
        Self {
            source: Some(Box::new(source)),
            path: path.to_string(),
        }
    }

    /// The next node reached by the traversal.
    pub async fn next(&mut self) -> Result<Option<String>, GraphError> {
        let Some(source) = self.source.as_mut() else {
            return Ok(None);
        };
        let fetched = source.fetch().await;
        match fetched {
            Ok(Some(node)) => Ok(Some(node)),
            Ok(None) => {
                self.close();
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(path = %self.path, error = %e, "Traversal failed, releasing cursor");
                self.close();
                Err(e)
            }
        }
    }

    /// Drain the cursor into a vector.
    pub async fn collect(mut self) -> Result<Vec<String>, GraphError> {
        let mut nodes = Vec::new();
        while let Some(node) = self.next().await? {
            nodes.push(node);
        }
        Ok(nodes)
    }

    /// Release the cursor early. Further calls to `next` return `None`.
    pub fn close(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.release();
            tracing::trace!(path = %self.path, "Cursor released");
        }
    }

    pub fn is_open(&self) -> bool {
        self.source.is_some()
    }
}

impl fmt::Debug for NodeCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeCursor")
            .field("path", &self.path)
            .field("open", &self.is_open())
            .finish()
    }
}

impl Drop for NodeCursor {
    fn drop(&mut self) {
        self.close();
    }
}
