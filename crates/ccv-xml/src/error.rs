use std::path::PathBuf;

use ccv_model::SchemaLookupError;
use ccv_transform::CodecError;

pub type Result<T> = std::result::Result<T, XmlError>;

#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// The document is not XML, or not a generic-cv document of the loaded
    /// schema version.
    #[error("cannot read CV document {origin}: {message}")]
    DocumentParse { origin: String, message: String },

    /// A section subtree does not have the shape its schema declares.
    #[error("malformed section {section}: {message}")]
    MalformedSection { section: String, message: String },

    #[error("section {section} is not present in the document")]
    SectionNotFound { section: String },

    /// Dependent sections only exist inside a record of their parent.
    #[error("section {section} can only be added as part of a {parent} record")]
    DependentSection { section: String, parent: String },

    #[error(transparent)]
    Lookup(#[from] SchemaLookupError),

    #[error("field {field}: {source}")]
    Codec {
        field: String,
        #[source]
        source: CodecError,
    },

    #[error("failed to write XML: {0}")]
    Write(String),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl XmlError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(section: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedSection {
            section: section.into(),
            message: message.into(),
        }
    }

    pub(crate) fn write(source: impl std::fmt::Display) -> Self {
        Self::Write(source.to_string())
    }
}
