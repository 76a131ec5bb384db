use thiserror::Error;

/// Failure to resolve a section or field by identifier or label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaLookupError {
    #[error("no {kind} matches \"{key}\"")]
    NotFound { kind: &'static str, key: String },

    #[error("{kind} label \"{key}\" is ambiguous; use one of the identifiers: {}", candidates.join(", "))]
    Ambiguous {
        kind: &'static str,
        key: String,
        candidates: Vec<String>,
    },

    #[error("field \"{key}\" does not exist in section \"{section}\"")]
    UnknownField { section: String, key: String },
}

impl SchemaLookupError {
    pub fn section_not_found(key: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "section",
            key: key.into(),
        }
    }
}

/// The loose input was not shaped as field/value pairs where they were expected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected field/value pairs for {context}, found {found}")]
pub struct StructuralInputError {
    /// Section label or record key where the mismatch was found.
    pub context: String,
    /// Short description of what was supplied instead.
    pub found: String,
}

impl StructuralInputError {
    pub fn new(context: impl Into<String>, found: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            found: found.into(),
        }
    }
}
