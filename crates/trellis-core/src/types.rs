//! Core domain types for the relationship catalog and the derived graph.
//!
//! The catalog side (Relationship, View, Segment) lives in the document store
//! as a single `RelationshipManager` record. The graph side (Triple, Quad)
//! lives in the graph store as subject-predicate-object edges.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::value::{Map, Value};

/// Generate a new globally-unique string identifier.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn check_identifier(entity: &'static str, field: &'static str, id: &str) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::missing(entity, field));
    }
    if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ValidationError::malformed(
            entity,
            field,
            "must not contain whitespace or control characters",
        ));
    }
    Ok(())
}

// ── Relationships ─────────────────────────────────────────────────

/// A typed predicate usable as a graph edge label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Relationship {
    /// Stable identifier. Assigned by the catalog when empty.
    #[serde(default)]
    pub id: String,
    /// The edge label, unique across the catalog.
    pub predicate: String,
    /// Free-form description for operators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Relationship {
    /// A relationship with no identifier yet.
    pub fn new(predicate: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            predicate: predicate.into(),
            description: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Validate the structural fields (non-empty predicate, well-formed identifier).
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_identifier("relationship", "id", &self.id)?;
        self.validate_predicate()
    }

    /// Validate only the predicate; used before an identifier is assigned.
    pub fn validate_predicate(&self) -> Result<(), ValidationError> {
        if self.predicate.trim().is_empty() {
            return Err(ValidationError::missing("relationship", "predicate"));
        }
        if self.predicate.trim() != self.predicate {
            return Err(ValidationError::malformed(
                "relationship",
                "predicate",
                "must not have leading or trailing whitespace",
            ));
        }
        Ok(())
    }
}

// ── Views ─────────────────────────────────────────────────────────

/// Which way a hop follows its edge.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Subject to object.
    #[default]
    Out,
    /// Object to subject.
    In,
}

/// One hop within a View's path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Segment {
    pub relationship_id: String,
    #[serde(default)]
    pub direction: Direction,
}

impl Segment {
    pub fn out(relationship_id: impl Into<String>) -> Self {
        Self {
            relationship_id: relationship_id.into(),
            direction: Direction::Out,
        }
    }

    pub fn inbound(relationship_id: impl Into<String>) -> Self {
        Self {
            relationship_id: relationship_id.into(),
            direction: Direction::In,
        }
    }
}

/// A named, ordered multi-hop traversal template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct View {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub path: Vec<Segment>,
}

impl View {
    pub fn new(name: impl Into<String>, path: Vec<Segment>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            path,
        }
    }

    /// Validate the view's own fields. Reference checks against the catalog
    /// happen in the catalog crate.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_identifier("view", "id", &self.id)?;
        if self.name.trim().is_empty() {
            return Err(ValidationError::missing("view", "name"));
        }
        if self.path.is_empty() {
            return Err(ValidationError::missing("view", "path"));
        }
        for segment in &self.path {
            check_identifier("segment", "relationship_id", &segment.relationship_id)?;
        }
        Ok(())
    }

    /// Relationship identifiers referenced by this view's path, in path order.
    pub fn relationship_ids(&self) -> impl Iterator<Item = &str> {
        self.path.iter().map(|s| s.relationship_id.as_str())
    }

    pub fn references(&self, relationship_id: &str) -> bool {
        self.relationship_ids().any(|id| id == relationship_id)
    }
}

// ── Relationship Manager ──────────────────────────────────────────

/// Aggregate root holding all Relationships and Views, loaded and saved as a unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelationshipManager {
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub views: Vec<View>,
}

impl RelationshipManager {
    pub fn relationship(&self, id: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.id == id)
    }

    pub fn relationship_by_predicate(&self, predicate: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.predicate == predicate)
    }

    pub fn view(&self, id: &str) -> Option<&View> {
        self.views.iter().find(|v| v.id == id)
    }

    pub fn view_by_name(&self, name: &str) -> Option<&View> {
        self.views.iter().find(|v| v.name == name)
    }

    /// Insert or replace the relationship keyed by its identifier.
    pub fn upsert_relationship(&mut self, rel: Relationship) {
        match self.relationships.iter_mut().find(|r| r.id == rel.id) {
            Some(existing) => *existing = rel,
            None => self.relationships.push(rel),
        }
    }

    pub fn remove_relationship(&mut self, id: &str) -> Option<Relationship> {
        let pos = self.relationships.iter().position(|r| r.id == id)?;
        Some(self.relationships.remove(pos))
    }

    /// Insert or replace the view keyed by its identifier.
    pub fn upsert_view(&mut self, view: View) {
        match self.views.iter_mut().find(|v| v.id == view.id) {
            Some(existing) => *existing = view,
            None => self.views.push(view),
        }
    }

    pub fn remove_view(&mut self, id: &str) -> Option<View> {
        let pos = self.views.iter().position(|v| v.id == id)?;
        Some(self.views.remove(pos))
    }
}

// ── Items ─────────────────────────────────────────────────────────

/// An external content record handed over by the ingestion collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: String,
    #[serde(rename = "type", default)]
    pub item_type: String,
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub data: Map,
}

impl Item {
    pub fn new(id: impl Into<String>, item_type: impl Into<String>, data: Map) -> Self {
        Self {
            id: id.into(),
            item_type: item_type.into(),
            version: 1,
            data,
        }
    }

    /// Resolve a dotted path (`"author.id"`, `"tags.0"`) against the item's data.
    pub fn field(&self, path: &str) -> Option<&Value> {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let root = self.data.get(head)?;
        match rest {
            Some(rest) => root.get_path(rest),
            None => Some(root),
        }
    }
}

// ── Graph Edges ───────────────────────────────────────────────────

/// A candidate edge produced by pattern matching.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl Triple {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})-[{}]->({})", self.subject, self.predicate, self.object)
    }
}

/// A stored graph edge. All three fields are non-empty once persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Quad {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl Quad {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

impl From<Triple> for Quad {
    fn from(t: Triple) -> Self {
        Self {
            subject: t.subject,
            predicate: t.predicate,
            object: t.object,
        }
    }
}

impl From<&Triple> for Quad {
    fn from(t: &Triple) -> Self {
        t.clone().into()
    }
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})-[{}]->({})", self.subject, self.predicate, self.object)
    }
}

/// Caller-supplied descriptor of an edge to remove.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuadParam {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub predicate: String,
    #[serde(default)]
    pub object: String,
}

impl QuadParam {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// All three fields must be non-empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.subject.is_empty() {
            return Err(ValidationError::missing("quad", "subject"));
        }
        if self.predicate.is_empty() {
            return Err(ValidationError::missing("quad", "predicate"));
        }
        if self.object.is_empty() {
            return Err(ValidationError::missing("quad", "object"));
        }
        Ok(())
    }

    /// Validate and convert into the quad it describes.
    pub fn to_quad(&self) -> Result<Quad, ValidationError> {
        self.validate()?;
        Ok(Quad::new(&self.subject, &self.predicate, &self.object))
    }
}
