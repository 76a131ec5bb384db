//! Validation rules attached to sections and fields.
//!
//! The rule set is schema data: the loader turns each `<constraint>` element
//! into one of these variants, and rules this crate does not know how to check
//! are kept as [`Constraint::Unchecked`] so templates can still mention them.

use serde::{Deserialize, Serialize};

use crate::section::SectionSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    Equals,
    NotEquals,
}

impl Condition {
    pub fn holds(&self, actual: Option<&str>, expected: &str) -> bool {
        match self {
            Condition::Equals => actual == Some(expected),
            Condition::NotEquals => actual != Some(expected),
        }
    }
}

/// A rule over the field values of one section instance.
///
/// All field references are field identifiers of the owning section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Constraint {
    /// Text (each half for bilingual values) at most `max` characters.
    MaxLength { field: String, max: usize },
    /// The field must be present and non-blank.
    NotBlank { field: String },
    /// The field is required when `other` satisfies `condition` against `value`.
    RequiredIf {
        field: String,
        other: String,
        condition: Condition,
        value: String,
    },
    /// At most one of the two fields may be filled in.
    MutuallyExclusive { field: String, other: String },
    /// `start` must not fall after `end` when both are present.
    DateOrder { start: String, end: String },
    /// At most `max` instances of the section side by side.
    MaxEntries { max: usize },
    /// A registry rule that is recorded but not evaluated.
    Unchecked {
        rule: String,
        field: Option<String>,
        parameters: Option<String>,
    },
}

impl Constraint {
    /// The field this rule is displayed under in templates.
    pub fn owner(&self) -> Option<&str> {
        match self {
            Constraint::MaxLength { field, .. }
            | Constraint::NotBlank { field }
            | Constraint::RequiredIf { field, .. }
            | Constraint::MutuallyExclusive { field, .. } => Some(field),
            Constraint::DateOrder { end, .. } => Some(end),
            Constraint::MaxEntries { .. } => None,
            Constraint::Unchecked { field, .. } => field.as_deref(),
        }
    }

    /// Every field identifier the rule reads.
    pub fn referenced_fields(&self) -> Vec<&str> {
        match self {
            Constraint::MaxLength { field, .. } | Constraint::NotBlank { field } => vec![field],
            Constraint::RequiredIf { field, other, .. }
            | Constraint::MutuallyExclusive { field, other } => vec![field, other],
            Constraint::DateOrder { start, end } => vec![start, end],
            Constraint::MaxEntries { .. } => Vec::new(),
            Constraint::Unchecked { field, .. } => field.iter().map(String::as_str).collect(),
        }
    }

    /// Human-readable prompt, using field labels from `section`.
    pub fn describe(&self, section: &SectionSchema) -> String {
        let label = |id: &str| {
            section
                .field_by_id(id)
                .map(|f| f.label.clone())
                .unwrap_or_else(|| id.to_string())
        };
        match self {
            Constraint::MaxLength { max, .. } => {
                format!("Must be at most {max} characters long.")
            }
            Constraint::NotBlank { .. } => "Must not be left blank.".to_string(),
            Constraint::RequiredIf {
                other,
                condition,
                value,
                ..
            } => match condition {
                Condition::Equals => format!("Required if {} is {value}.", label(other)),
                Condition::NotEquals => format!("Required if {} is not {value}.", label(other)),
            },
            Constraint::MutuallyExclusive { other, .. } => {
                format!("Mutually exclusive with {}.", label(other))
            }
            Constraint::DateOrder { start, end } => {
                format!("{} must not be before {}.", label(end), label(start))
            }
            Constraint::MaxEntries { max } => format!("Must have {max} entries or fewer."),
            Constraint::Unchecked { rule, .. } => {
                format!("Registry rule \"{rule}\" -- not currently checked.")
            }
        }
    }
}
