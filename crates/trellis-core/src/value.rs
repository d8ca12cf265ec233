//! Tagged value model for semi-structured item attributes.
//!
//! Item data arrives as arbitrary JSON. Pattern extraction reads it through
//! `Value`, and every conversion to a graph identifier goes through the
//! fallible `to_identifier` coercion.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ordered map of attribute values. Ordering keeps serialization canonical.
pub type Map = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    /// Integers above `i64::MAX`.
    UInt(u64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(Map),
}

/// Why a value could not be used as a graph identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoercionError {
    #[error("value is null")]
    Null,

    #[error("value is empty")]
    Empty,

    #[error("a list is not a single identifier")]
    List,

    #[error("number is not finite")]
    NonFinite,
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Bool(_) | Value::Int(_) | Value::UInt(_) | Value::Float(_) | Value::String(_)
        )
    }

    /// Walk a dotted path. Map segments are keys, list segments are indices.
    /// An empty path resolves to `self`.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return Some(self);
        }
        path.split('.').try_fold(self, |current, segment| match current {
            Value::Map(m) => m.get(segment),
            Value::List(l) => segment.parse::<usize>().ok().and_then(|i| l.get(i)),
            _ => None,
        })
    }

    /// Flatten this value into a stable scalar identifier.
    ///
    /// Maps use their scalar `id` field when present, otherwise their
    /// key-sorted JSON encoding.
    pub fn to_identifier(&self) -> Result<String, CoercionError> {
        match self {
            Value::Null => Err(CoercionError::Null),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Int(i) => Ok(i.to_string()),
            Value::UInt(u) => Ok(u.to_string()),
            Value::Float(f) if !f.is_finite() => Err(CoercionError::NonFinite),
            Value::Float(f) => Ok(f.to_string()),
            Value::String(s) if s.trim().is_empty() => Err(CoercionError::Empty),
            Value::String(s) => Ok(s.clone()),
            Value::List(_) => Err(CoercionError::List),
            Value::Map(m) if m.is_empty() => Err(CoercionError::Empty),
            Value::Map(m) => match m.get("id") {
                Some(id) if id.is_scalar() => id.to_identifier(),
                _ => serde_json::to_string(self).map_err(|_| CoercionError::NonFinite),
            },
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => Value::Int(i),
                (None, Some(u)) => Value::UInt(u),
                (None, None) => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(a) => Value::List(a.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(o) => {
                Value::Map(o.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
