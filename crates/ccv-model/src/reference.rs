//! Reference tables backing Reference fields.
//!
//! A reference table is a list of values whose entries are each linked to a
//! value of other lists, e.g. an organization and the country and
//! subdivision it belongs to. Records select an entry the same way they
//! select a list-of-values literal; generated XML names the entry together
//! with every value it is linked with.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::lov::{ListValue, ValueList};

/// A list an entry is linked through, e.g. `Country`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefColumn {
    /// Registry identifier of the linked list or reference table.
    pub id: String,
    pub label: String,
}

/// One `linkedWith` line of a selected entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedValue<'a> {
    pub ref_or_lov_id: &'a str,
    pub label: &'a str,
    pub value: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefTable {
    pub id: String,
    pub label: String,
    columns: Vec<RefColumn>,
    entries: ValueList,
    /// Linked value literals per entry identifier, one per column.
    links: BTreeMap<String, Vec<String>>,
}

impl RefTable {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        let (id, label) = (id.into(), label.into());
        Self {
            entries: ValueList::new(id.clone(), label.clone()),
            id,
            label,
            columns: Vec::new(),
            links: BTreeMap::new(),
        }
    }

    pub fn add_column(&mut self, column: RefColumn) {
        self.columns.push(column);
    }

    pub fn columns(&self) -> &[RefColumn] {
        &self.columns
    }

    /// Append an entry with its linked literals, in column order.
    pub fn add_entry(&mut self, value: ListValue, links: Vec<String>) {
        if self.entries.by_id(&value.id).is_none() {
            self.links.insert(value.id.clone(), links);
            self.entries.add_value(value);
        }
    }

    /// Entries as a list of values, for matching and display.
    pub fn entries(&self) -> &ValueList {
        &self.entries
    }

    /// The columns with the entry's linked literals, then the entry itself
    /// under the table.
    pub fn linked_with(&self, id: &str) -> Option<Vec<LinkedValue<'_>>> {
        let entry = self.entries.by_id(id)?;
        let links = self.links.get(id).map(Vec::as_slice).unwrap_or_default();
        let mut linked: Vec<LinkedValue<'_>> = self
            .columns
            .iter()
            .zip(links)
            .map(|(column, value)| LinkedValue {
                ref_or_lov_id: &column.id,
                label: &column.label,
                value,
            })
            .collect();
        linked.push(LinkedValue {
            ref_or_lov_id: &self.id,
            label: &self.label,
            value: &entry.label,
        });
        Some(linked)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linked_values_end_with_the_entry() {
        let mut table = RefTable::new("R1", "Organization");
        table.add_column(RefColumn {
            id: "L1".to_string(),
            label: "Country".to_string(),
        });
        table.add_entry(
            ListValue {
                id: "O1".to_string(),
                label: "Dalhousie University".to_string(),
            },
            vec!["Canada".to_string()],
        );
        let linked = table.linked_with("O1").expect("entry");
        let values: Vec<(&str, &str)> = linked.iter().map(|l| (l.ref_or_lov_id, l.value)).collect();
        assert_eq!(values, vec![("L1", "Canada"), ("R1", "Dalhousie University")]);
        assert!(table.linked_with("O2").is_none());
        assert_eq!(table.entries().labels(), vec!["Dalhousie University"]);
    }
}
