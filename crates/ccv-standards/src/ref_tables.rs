//! Loader for `cv-ref-table.xml`.
//!
//! ```xml
//! <refTables>
//!   <table id="..." englishName="Organization" frenchName="Organisme">
//!     <column id="..." englishName="Country" frenchName="Pays"/>
//!     <entry id="..." englishName="Dalhousie University" frenchName="Université Dalhousie">
//!       <link englishName="Canada" frenchName="Canada"/>
//!     </entry>
//!   </table>
//! </refTables>
//! ```
//!
//! Every entry carries one `<link>` per `<column>`, in column order.

use std::path::Path;

use ccv_model::{Language, ListValue, RefColumn, RefTable};
use roxmltree::Document;
use tracing::debug;

use crate::error::{Result, StandardsError};
use crate::value_lists::{label, required};

pub fn load_reference_tables(path: &Path, language: Language) -> Result<Vec<RefTable>> {
    let text = std::fs::read_to_string(path).map_err(|e| StandardsError::io(path, e))?;
    parse_reference_tables(&text, &path.display().to_string(), language)
}

/// Parse a reference-table document. `origin` names the source in errors.
pub fn parse_reference_tables(text: &str, origin: &str, language: Language) -> Result<Vec<RefTable>> {
    let doc = Document::parse(text).map_err(|e| StandardsError::xml(origin, &e))?;
    let mut tables = Vec::new();
    for node in doc
        .root_element()
        .children()
        .filter(|n| n.has_tag_name("table"))
    {
        let mut table = RefTable::new(required(node, "table", "id")?, label(node, language));
        for column in node.children().filter(|n| n.has_tag_name("column")) {
            table.add_column(RefColumn {
                id: required(column, "column", "id")?.to_string(),
                label: label(column, language),
            });
        }
        for entry in node.children().filter(|n| n.has_tag_name("entry")) {
            let value = ListValue {
                id: required(entry, "entry", "id")?.to_string(),
                label: label(entry, language),
            };
            let links: Vec<String> = entry
                .children()
                .filter(|n| n.has_tag_name("link"))
                .map(|link| label(link, language))
                .collect();
            if links.len() != table.columns().len() {
                return Err(StandardsError::InvalidSchema {
                    origin: origin.to_string(),
                    message: format!(
                        "entry {} of {} has {} links for {} columns",
                        value.id,
                        table.label,
                        links.len(),
                        table.columns().len()
                    ),
                });
            }
            table.add_entry(value, links);
        }
        debug!(table = %table.label, entries = table.len(), "loaded reference table");
        tables.push(table);
    }
    Ok(tables)
}
