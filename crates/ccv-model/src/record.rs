use serde::{Deserialize, Serialize};

use crate::value::TypedValue;

/// One decoded field of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEntry {
    pub field_id: String,
    pub value: TypedValue,
}

/// A validated section instance.
///
/// Fields are keyed by field identifier and kept in schema order; blank
/// fields are absent. Child records are ordered by child-section order, and
/// instances of the same child keep their input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub section_id: String,
    pub fields: Vec<FieldEntry>,
    pub subsections: Vec<NormalizedRecord>,
}

impl NormalizedRecord {
    pub fn new(section_id: impl Into<String>) -> Self {
        Self {
            section_id: section_id.into(),
            fields: Vec::new(),
            subsections: Vec::new(),
        }
    }

    pub fn get(&self, field_id: &str) -> Option<&TypedValue> {
        self.fields
            .iter()
            .find(|entry| entry.field_id == field_id)
            .map(|entry| &entry.value)
    }

    pub fn contains(&self, field_id: &str) -> bool {
        self.get(field_id).is_some()
    }

    /// Child records belonging to the given child section.
    pub fn subsections_of<'a>(&'a self, section_id: &'a str) -> impl Iterator<Item = &'a NormalizedRecord> {
        self.subsections
            .iter()
            .filter(move |child| child.section_id == section_id)
    }
}
