#![deny(unsafe_code)]

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, StandardsError>;

#[derive(Debug, thiserror::Error)]
pub enum StandardsError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse XML {origin}: {message}")]
    Xml { origin: String, message: String },

    #[error("invalid schema in {origin}: {message}")]
    InvalidSchema { origin: String, message: String },

    #[error("<{element}> is missing required attribute \"{attribute}\"")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("duplicate {kind} identifier: {id}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("field {field} declares unknown data type {type_id}")]
    UnknownType { field: String, type_id: String },

    #[error("field {field} refers to unknown list of values {list_id}")]
    UnknownValueList { field: String, list_id: String },

    #[error("field {field} refers to unknown reference table {table}")]
    UnknownReferenceTable { field: String, table: String },

    #[error("rule {rule} in section {section} refers to unknown field \"{field}\"")]
    UnknownConstraintField {
        section: String,
        rule: String,
        field: String,
    },

    #[error("rule {rule} in section {section} has invalid parameters \"{parameters}\"")]
    InvalidConstraint {
        section: String,
        rule: String,
        parameters: String,
    },
}

impl StandardsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn xml(origin: impl Into<String>, source: &roxmltree::Error) -> Self {
        Self::Xml {
            origin: origin.into(),
            message: source.to_string(),
        }
    }
}
