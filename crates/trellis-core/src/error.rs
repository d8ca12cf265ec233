use thiserror::Error;

/// A structurally invalid Relationship, View, or QuadParam.
///
/// Never retried; surfaced to the caller verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{entity} field `{field}` is required")]
    Missing {
        entity: &'static str,
        field: &'static str,
    },

    #[error("{entity} field `{field}` is malformed: {reason}")]
    Malformed {
        entity: &'static str,
        field: &'static str,
        reason: String,
    },
}

impl ValidationError {
    pub fn missing(entity: &'static str, field: &'static str) -> Self {
        Self::Missing { entity, field }
    }

    pub fn malformed(entity: &'static str, field: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            entity,
            field,
            reason: reason.into(),
        }
    }
}
