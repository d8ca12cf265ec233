//! Extraction patterns: when a pattern applies to an item, and how its
//! subject and object are read from the item.

use serde::{Deserialize, Serialize};
use trellis_core::{Item, Value};

/// A rule deriving candidate triples from an item's attributes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pattern {
    pub name: String,
    #[serde(default)]
    pub when: Condition,
    pub subject: FieldRule,
    pub predicate: String,
    pub object: FieldRule,
}

impl Pattern {
    pub fn new(
        name: impl Into<String>,
        subject: FieldRule,
        predicate: impl Into<String>,
        object: FieldRule,
    ) -> Self {
        Self {
            name: name.into(),
            when: Condition::Always,
            subject,
            predicate: predicate.into(),
            object,
        }
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.when = condition;
        self
    }
}

/// Applicability condition evaluated against an item.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    #[default]
    Always,
    /// The item's type equals the given name.
    ItemType(String),
    /// The field resolves to a non-null value.
    Present(String),
    Equals {
        path: String,
        value: Value,
    },
    All(Vec<Condition>),
    Any(Vec<Condition>),
}

impl Condition {
    pub fn holds(&self, item: &Item) -> bool {
        match self {
            Condition::Always => true,
            Condition::ItemType(t) => item.item_type == *t,
            Condition::Present(path) => item.field(path).is_some_and(|v| !v.is_null()),
            Condition::Equals { path, value } => item.field(path) == Some(value),
            Condition::All(conditions) => conditions.iter().all(|c| c.holds(item)),
            Condition::Any(conditions) => conditions.iter().any(|c| c.holds(item)),
        }
    }
}

/// Where a subject or object identifier comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldRule {
    /// The item's own identifier.
    ItemId,
    /// A dotted path into the item's data.
    Field(String),
    Constant(String),
}

impl FieldRule {
    /// Resolve to zero or more identifiers. Lists fan out element by
    /// element; values that do not coerce to an identifier are dropped.
    pub fn resolve(&self, item: &Item) -> Vec<String> {
        match self {
            FieldRule::ItemId => non_empty(item.id.clone()),
            FieldRule::Constant(c) => non_empty(c.clone()),
            FieldRule::Field(path) => match item.field(path) {
                None => Vec::new(),
                Some(Value::List(elements)) => elements
                    .iter()
                    .filter_map(|v| v.to_identifier().ok())
                    .collect(),
                Some(value) => match value.to_identifier() {
                    Ok(id) => vec![id],
                    Err(e) => {
                        tracing::trace!(item_id = %item.id, path = %path, reason = %e, "Field not usable as identifier");
                        Vec::new()
                    }
                },
            },
        }
    }
}

fn non_empty(s: String) -> Vec<String> {
    if s.trim().is_empty() {
        Vec::new()
    } else {
        vec![s]
    }
}
