//! Loader for `cv-lov.xml`.
//!
//! ```xml
//! <lov>
//!   <table id="..." englishName="Degree Status" frenchName="Statut du diplôme">
//!     <code id="..." englishName="In Progress" frenchName="En cours"/>
//!   </table>
//! </lov>
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use ccv_model::{Language, ListValue, RefTable, ValueList};
use roxmltree::{Document, Node};
use tracing::debug;

use crate::error::{Result, StandardsError};

/// All value lists and reference tables of one schema, keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct ValueListSet {
    lists: BTreeMap<String, ValueList>,
    references: BTreeMap<String, RefTable>,
}

impl ValueListSet {
    pub fn get(&self, id: &str) -> Option<&ValueList> {
        self.lists.get(id)
    }

    pub fn reference(&self, id: &str) -> Option<&RefTable> {
        self.references.get(id)
    }

    /// Reference table named `label`, for fields declared without a
    /// `lookupId`.
    pub fn reference_by_label(&self, label: &str) -> Option<&RefTable> {
        self.references.values().find(|t| t.label == label)
    }

    pub fn add_references(&mut self, tables: Vec<RefTable>) -> Result<()> {
        for table in tables {
            let id = table.id.clone();
            if self.references.insert(id.clone(), table).is_some() {
                return Err(StandardsError::DuplicateId {
                    kind: "reference table",
                    id,
                });
            }
        }
        Ok(())
    }

    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValueList> {
        self.lists.values()
    }
}

pub fn load_value_lists(path: &Path, language: Language) -> Result<ValueListSet> {
    let text = std::fs::read_to_string(path).map_err(|e| StandardsError::io(path, e))?;
    parse_value_lists(&text, &path.display().to_string(), language)
}

/// Parse a value-list document. `origin` names the source in errors.
pub fn parse_value_lists(text: &str, origin: &str, language: Language) -> Result<ValueListSet> {
    let doc = Document::parse(text).map_err(|e| StandardsError::xml(origin, &e))?;
    let mut set = ValueListSet::default();
    for table in doc
        .root_element()
        .children()
        .filter(|n| n.has_tag_name("table"))
    {
        let id = required(table, "table", "id")?;
        let mut list = ValueList::new(id, label(table, language));
        for code in table.children().filter(|n| n.has_tag_name("code")) {
            list.add_value(ListValue {
                id: required(code, "code", "id")?.to_string(),
                label: label(code, language),
            });
        }
        debug!(list = %list.label, values = list.len(), "loaded value list");
        if set.lists.insert(id.to_string(), list).is_some() {
            return Err(StandardsError::DuplicateId {
                kind: "value list",
                id: id.to_string(),
            });
        }
    }
    Ok(set)
}

/// Label in the requested language, falling back to English.
pub(crate) fn label(node: Node<'_, '_>, language: Language) -> String {
    let attr = format!("{}Name", language.attribute_prefix());
    node.attribute(attr.as_str())
        .or_else(|| node.attribute("englishName"))
        .unwrap_or_default()
        .trim()
        .to_string()
}

pub(crate) fn required<'a>(
    node: Node<'a, '_>,
    element: &'static str,
    attribute: &'static str,
) -> Result<&'a str> {
    node.attribute(attribute)
        .ok_or(StandardsError::MissingAttribute { element, attribute })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTS: &str = r#"<lov>
  <table id="L1" englishName="Degree Status" frenchName="Statut du diplôme">
    <code id="C1" englishName="In Progress" frenchName="En cours"/>
    <code id="C2" englishName="Completed" frenchName="Terminé"/>
  </table>
</lov>"#;

    #[test]
    fn labels_follow_language() {
        let english = parse_value_lists(LISTS, "inline", Language::English).expect("parse");
        assert_eq!(english.get("L1").map(ValueList::labels), Some(vec!["In Progress", "Completed"]));
        let french = parse_value_lists(LISTS, "inline", Language::French).expect("parse");
        assert_eq!(french.get("L1").map(|l| l.label.as_str()), Some("Statut du diplôme"));
        assert_eq!(french.get("L1").map(ValueList::labels), Some(vec!["En cours", "Terminé"]));
    }

    #[test]
    fn duplicate_tables_are_rejected() {
        let text = r#"<lov><table id="L1" englishName="A"/><table id="L1" englishName="B"/></lov>"#;
        let err = parse_value_lists(text, "inline", Language::English).expect_err("duplicate");
        assert!(matches!(err, StandardsError::DuplicateId { .. }));
    }
}
