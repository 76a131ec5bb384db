//! Lists of values (LOV) backing Choice fields.
//!
//! A value list is a closed enumeration published by the registry, e.g.
//! `Degree Status` = {`In Progress`, `Completed`}. Each value carries a
//! registry identifier that is written back into generated XML.
//!
//! Membership is exact: case-sensitive and code-point exact. Registry labels
//! often use typographic punctuation (`Bachelor’s` with U+2019), and this
//! layer never folds it to ASCII.
//!
//! Identifiers are unique within a list, labels are not: the registry has
//! published the same literal under more than one code. Every code is kept
//! so documents using any of them can be read back.

use serde::{Deserialize, Serialize};

/// One permitted literal of a value list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListValue {
    /// Registry identifier of the value.
    pub id: String,
    /// Literal label in the schema language.
    pub label: String,
}

/// A closed enumeration of permitted literals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueList {
    pub id: String,
    pub label: String,
    values: Vec<ListValue>,
}

impl ValueList {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            values: Vec::new(),
        }
    }

    /// Append a value; an identifier that is already present is ignored.
    pub fn add_value(&mut self, value: ListValue) {
        if self.by_id(&value.id).is_none() {
            self.values.push(value);
        }
    }

    pub fn values(&self) -> &[ListValue] {
        &self.values
    }

    /// All accepted literals, in publication order, each once.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::with_capacity(self.values.len());
        for value in &self.values {
            if !labels.contains(&value.label.as_str()) {
                labels.push(&value.label);
            }
        }
        labels
    }

    /// Exact-match lookup by literal; the first code published under it.
    pub fn by_label(&self, label: &str) -> Option<&ListValue> {
        self.values.iter().find(|v| v.label == label)
    }

    /// Every code published under `label`.
    pub fn all_by_label(&self, label: &str) -> Vec<&ListValue> {
        self.values.iter().filter(|v| v.label == label).collect()
    }

    pub fn by_id(&self, id: &str) -> Option<&ListValue> {
        self.values.iter().find(|v| v.id == id)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.by_label(label).is_some()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn degree_types() -> ValueList {
        let mut list = ValueList::new("00000000000000000000000000000060", "Degree Type");
        list.add_value(ListValue {
            id: "00000000000000000000000000000071".to_string(),
            label: "Bachelor\u{2019}s".to_string(),
        });
        list.add_value(ListValue {
            id: "00000000000000000000000000000073".to_string(),
            label: "Doctorate".to_string(),
        });
        list
    }

    #[test]
    fn membership_is_exact() {
        let list = degree_types();
        assert!(list.contains("Bachelor\u{2019}s"));
        assert!(!list.contains("Bachelor's"));
        assert!(!list.contains("doctorate"));
        assert!(list.contains("Doctorate"));
    }

    #[test]
    fn repeated_labels_keep_every_code() {
        let mut list = degree_types();
        list.add_value(ListValue {
            id: "other".to_string(),
            label: "Doctorate".to_string(),
        });
        list.add_value(ListValue {
            id: "other".to_string(),
            label: "Something Else".to_string(),
        });
        assert_eq!(list.len(), 3);
        assert_eq!(list.by_id("other").map(|v| v.label.as_str()), Some("Doctorate"));
        assert_eq!(list.all_by_label("Doctorate").len(), 2);
        assert_eq!(list.labels(), vec!["Bachelor\u{2019}s", "Doctorate"]);
    }
}
