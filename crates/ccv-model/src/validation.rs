//! Per-record validation findings, reported in batch.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationErrorKind {
    UnknownField,
    DuplicateField,
    TypeMismatch,
    InvalidChoice { accepted: Vec<String> },
    DateFormat { expected: String },
    InvalidValue,
    MissingRequired,
    ConstraintViolated,
}

impl ValidationErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationErrorKind::UnknownField => "unknown_field",
            ValidationErrorKind::DuplicateField => "duplicate_field",
            ValidationErrorKind::TypeMismatch => "type_mismatch",
            ValidationErrorKind::InvalidChoice { .. } => "invalid_choice",
            ValidationErrorKind::DateFormat { .. } => "date_format",
            ValidationErrorKind::InvalidValue => "invalid_value",
            ValidationErrorKind::MissingRequired => "missing_required",
            ValidationErrorKind::ConstraintViolated => "constraint_violated",
        }
    }
}

/// One problem found while normalizing a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Label path of the section, e.g. `Education > Degrees`.
    pub section: String,
    /// Field key as written in the input, or the field label for
    /// missing-required findings.
    pub field: String,
    /// Raw input, when there was any.
    pub raw: Option<String>,
    #[serde(flatten)]
    pub kind: ValidationErrorKind,
    pub message: String,
}

impl ValidationError {
    pub fn new(
        section: impl Into<String>,
        field: impl Into<String>,
        raw: Option<String>,
        kind: ValidationErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            section: section.into(),
            field: field.into(),
            raw,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.section, self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}
