use serde::{Deserialize, Serialize};

use crate::constraint::Constraint;
use crate::error::SchemaLookupError;
use crate::field::FieldSchema;

/// A section of the CV: either a pure container (e.g. `Education`) or a
/// record-bearing section with fields (e.g. `Degrees`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSchema {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    pub order: u32,
    /// Identifier of the enclosing section, `None` for top-level sections.
    pub parent: Option<String>,
    /// Fields sorted by `order`.
    pub fields: Vec<FieldSchema>,
    /// Child section identifiers sorted by their `order`.
    pub children: Vec<String>,
    pub constraints: Vec<Constraint>,
    /// Whether a document may hold several instances of this section.
    pub repeatable: bool,
}

impl SectionSchema {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: None,
            order: 0,
            parent: None,
            fields: Vec::new(),
            children: Vec::new(),
            constraints: Vec::new(),
            repeatable: false,
        }
    }

    /// Resolve a field by identifier first, then by exact label.
    pub fn field(&self, key: &str) -> Result<&FieldSchema, SchemaLookupError> {
        if let Some(field) = self.field_by_id(key) {
            return Ok(field);
        }
        let mut matches = self.fields.iter().filter(|f| f.label == key);
        match (matches.next(), matches.next()) {
            (Some(field), None) => Ok(field),
            (Some(first), Some(second)) => {
                let mut candidates = vec![first.id.clone(), second.id.clone()];
                candidates.extend(matches.map(|f| f.id.clone()));
                Err(SchemaLookupError::Ambiguous {
                    kind: "field",
                    key: key.to_string(),
                    candidates,
                })
            }
            (None, _) => Err(SchemaLookupError::UnknownField {
                section: self.label.clone(),
                key: key.to_string(),
            }),
        }
    }

    pub fn field_by_id(&self, id: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Fields carrying a not-blank rule, in declared order.
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter().filter(|f| self.is_required(&f.id))
    }

    pub fn is_required(&self, field_id: &str) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c, Constraint::NotBlank { field } if field == field_id))
    }

    /// Tightest entry-count rule, if any.
    pub fn max_entries(&self) -> Option<usize> {
        self.constraints
            .iter()
            .filter_map(|c| match c {
                Constraint::MaxEntries { max } => Some(*max),
                _ => None,
            })
            .min()
    }

    /// Rules displayed under the given field.
    pub fn constraints_for<'a>(&'a self, field_id: &'a str) -> impl Iterator<Item = &'a Constraint> {
        self.constraints
            .iter()
            .filter(move |c| c.owner() == Some(field_id))
    }

    /// Position of a field in declared order, used to sort records.
    pub fn field_position(&self, field_id: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.id == field_id)
    }

    pub fn child_position(&self, section_id: &str) -> Option<usize> {
        self.children.iter().position(|c| c == section_id)
    }

    pub(crate) fn sort_fields(&mut self) {
        self.fields.sort_by_key(|f| f.order);
    }
}
