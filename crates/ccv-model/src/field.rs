use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lov::ValueList;
use crate::reference::RefTable;

/// Precision of a registry date type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateGranularity {
    /// `yyyy`
    Year,
    /// `yyyy/MM`
    YearMonth,
    /// `MM/dd`, no year component.
    MonthDay,
    /// `yyyy-MM-dd`
    FullDate,
}

impl DateGranularity {
    /// Registry type label, as written in the `type` attribute of values.
    pub const fn type_label(&self) -> &'static str {
        match self {
            DateGranularity::Year => "Year",
            DateGranularity::YearMonth => "Year Month",
            DateGranularity::MonthDay => "Month Day",
            DateGranularity::FullDate => "Date",
        }
    }

    /// Registry format string, as written in the `format` attribute of values.
    pub const fn xml_format(&self) -> &'static str {
        match self {
            DateGranularity::Year => "yyyy",
            DateGranularity::YearMonth => "yyyy/MM",
            DateGranularity::MonthDay => "MM/dd",
            DateGranularity::FullDate => "yyyy-MM-dd",
        }
    }

    /// Input hint shown to people editing records.
    pub const fn prompt(&self) -> &'static str {
        match self {
            DateGranularity::Year => "yyyy",
            DateGranularity::YearMonth => "yyyy/mm",
            DateGranularity::MonthDay => "mm/dd",
            DateGranularity::FullDate => "yyyy-mm-dd",
        }
    }
}

/// Declared type of a field.
///
/// Codec and projector dispatch on this tag; there is no runtime attribute
/// probing on the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    PlainText,
    /// English/French pair.
    BilingualText,
    /// Signed integer (`Integer` in the registry).
    Number,
    Date(DateGranularity),
    DateTime,
    ElapsedTime,
    /// Closed enumeration of literals.
    Choice(ValueList),
    /// Entry of a reference table, written with the values it is linked to.
    Reference(RefTable),
    /// PubMed identifier.
    Identifier,
}

impl FieldType {
    /// Registry type label written in the `type` attribute of `<value>` nodes.
    pub fn type_label(&self) -> &'static str {
        match self {
            FieldType::PlainText => "String",
            FieldType::BilingualText => "Bilingual",
            FieldType::Number => "Number",
            FieldType::Date(granularity) => granularity.type_label(),
            FieldType::DateTime => "Datetime",
            FieldType::ElapsedTime => "Elapsed-Time",
            FieldType::Choice(_) => "LOV",
            FieldType::Reference(_) => "Reference",
            FieldType::Identifier => "PubMed",
        }
    }

    /// Map a registry type label onto a tag. Choice types need their list;
    /// Reference types are built from their table by the caller.
    pub fn from_type_label(label: &str, list: Option<ValueList>) -> Option<Self> {
        let field_type = match label.trim() {
            "String" => FieldType::PlainText,
            "Bilingual" => FieldType::BilingualText,
            "Integer" | "Number" => FieldType::Number,
            "Year" => FieldType::Date(DateGranularity::Year),
            "Year Month" | "YearMonth" => FieldType::Date(DateGranularity::YearMonth),
            "Month Day" | "MonthDay" => FieldType::Date(DateGranularity::MonthDay),
            "Date" => FieldType::Date(DateGranularity::FullDate),
            "Datetime" | "DateTime" => FieldType::DateTime,
            "Elapsed-Time" | "Elapsed Time" => FieldType::ElapsedTime,
            "PubMed" => FieldType::Identifier,
            "LOV" => FieldType::Choice(list?),
            _ => return None,
        };
        Some(field_type)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Choice(list) => write!(f, "LOV ({})", list.label),
            FieldType::Reference(table) => write!(f, "Reference ({})", table.label),
            other => write!(f, "{}", other.type_label()),
        }
    }
}

/// One field of a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    /// `orderIndex` from the schema; fields are kept sorted by it.
    pub order: u32,
    pub field_type: FieldType,
}

impl FieldSchema {
    pub fn new(id: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: None,
            order: 0,
            field_type,
        }
    }

    #[must_use]
    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_bilingual(&self) -> bool {
        matches!(self.field_type, FieldType::BilingualText)
    }

    /// The closed enumeration for Choice fields, or the entries of a
    /// Reference field's table.
    pub fn choices(&self) -> Option<&ValueList> {
        match &self.field_type {
            FieldType::Choice(list) => Some(list),
            FieldType::Reference(table) => Some(table.entries()),
            _ => None,
        }
    }

    /// Matches the field's identifier or its exact label.
    pub fn matches(&self, key: &str) -> bool {
        self.id == key || self.label == key
    }

    /// Short input hint used by record templates.
    pub fn prompt(&self) -> Option<String> {
        match &self.field_type {
            FieldType::Date(granularity) => Some(granularity.prompt().to_string()),
            FieldType::DateTime => Some("yyyy-mm-dd hh:mm:ss".to_string()),
            FieldType::ElapsedTime => Some("amount and unit, e.g. 3 months".to_string()),
            FieldType::Identifier => Some("PubMed ID, digits only".to_string()),
            FieldType::Number => Some("whole number".to_string()),
            FieldType::BilingualText => Some("text, or english/french pair".to_string()),
            FieldType::Choice(list) => Some(list.labels().join(", ")),
            FieldType::Reference(table) => Some(table.entries().labels().join(", ")),
            FieldType::PlainText => None,
        }
    }
}
