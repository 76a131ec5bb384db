use ccv_model::{StructuralInputError, ValidationError, ValidationErrorKind};
use thiserror::Error;

/// A single value could not be decoded or encoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("\"{value}\" does not match the date format {expected}")]
    DateFormat { value: String, expected: String },

    #[error("\"{value}\" is not an accepted value; expected one of: {}", accepted.join(", "))]
    InvalidChoice { value: String, accepted: Vec<String> },

    #[error("\"{value}\" is published under several codes ({}); give the code instead", ids.join(", "))]
    AmbiguousChoice { value: String, ids: Vec<String> },

    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("\"{value}\" is not a whole number")]
    InvalidNumber { value: String },

    #[error("\"{value}\" is not a date and time (yyyy-mm-dd hh:mm[:ss])")]
    InvalidDateTime { value: String },

    #[error("\"{value}\" is not an elapsed time such as \"3 months\"")]
    InvalidElapsedTime { value: String },

    #[error("\"{value}\" is not a PubMed identifier (1 to 8 digits)")]
    InvalidIdentifier { value: String },
}

impl CodecError {
    pub fn validation_kind(&self) -> ValidationErrorKind {
        match self {
            CodecError::DateFormat { expected, .. } => ValidationErrorKind::DateFormat {
                expected: expected.clone(),
            },
            CodecError::InvalidChoice { accepted, .. } => ValidationErrorKind::InvalidChoice {
                accepted: accepted.clone(),
            },
            CodecError::TypeMismatch { .. } => ValidationErrorKind::TypeMismatch,
            CodecError::AmbiguousChoice { .. }
            | CodecError::InvalidNumber { .. }
            | CodecError::InvalidDateTime { .. }
            | CodecError::InvalidElapsedTime { .. }
            | CodecError::InvalidIdentifier { .. } => ValidationErrorKind::InvalidValue,
        }
    }
}

/// Outcome of a failed normalization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// The input was not shaped as field/value pairs; nothing was validated.
    #[error(transparent)]
    Structural(#[from] StructuralInputError),

    /// Every problem found in the record, in input order.
    #[error("{} validation error(s)", .0.len())]
    Invalid(Vec<ValidationError>),
}

impl NormalizeError {
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            NormalizeError::Invalid(errors) => errors,
            NormalizeError::Structural(_) => &[],
        }
    }
}
