//! Traversal paths: a start node followed by predicate-labelled hops.

use std::fmt;

use trellis_core::Direction;

use crate::client::GraphError;

/// One hop of a traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hop {
    pub predicate: String,
    pub direction: Direction,
}

/// A traversal that starts at a node and follows a sequence of hops.
///
/// ```
/// # use trellis_graph::Path;
/// let path = Path::start("user-1").out("authored").out("on");
/// assert_eq!(path.hops().len(), 2);
/// assert_eq!(path.to_string(), "(user-1)-[authored]->-[on]->");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    start: String,
    hops: Vec<Hop>,
}

impl Path {
    pub fn start(node: impl Into<String>) -> Self {
        Self {
            start: node.into(),
            hops: Vec::new(),
        }
    }

    /// Follow edges labelled `predicate` from subject to object.
    pub fn out(self, predicate: impl Into<String>) -> Self {
        self.hop(predicate, Direction::Out)
    }

    /// Follow edges labelled `predicate` from object back to subject.
    pub fn in_(self, predicate: impl Into<String>) -> Self {
        self.hop(predicate, Direction::In)
    }

    pub fn hop(mut self, predicate: impl Into<String>, direction: Direction) -> Self {
        self.hops.push(Hop {
            predicate: predicate.into(),
            direction,
        });
        self
    }

    pub fn start_node(&self) -> &str {
        &self.start
    }

    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    /// A path needs a start node, at least one hop, and no empty predicates.
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.start.is_empty() {
            return Err(GraphError::InvalidPath("empty start node".to_string()));
        }
        if self.hops.is_empty() {
            return Err(GraphError::InvalidPath(format!("{self} has no hops")));
        }
        if let Some(i) = self.hops.iter().position(|h| h.predicate.is_empty()) {
            return Err(GraphError::InvalidPath(format!(
                "{self} has an empty predicate at hop {i}"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.start)?;
        for hop in &self.hops {
            match hop.direction {
                Direction::Out => write!(f, "-[{}]->", hop.predicate)?,
                Direction::In => write!(f, "<-[{}]-", hop.predicate)?,
            }
        }
        Ok(())
    }
}
