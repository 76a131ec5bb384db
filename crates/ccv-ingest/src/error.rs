//! Error types for record file ingestion.

use std::path::PathBuf;

use ccv_model::{SchemaLookupError, StructuralInputError};
use ccv_transform::CodecError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IngestError>;

/// File-level failures. Each carries the file it concerns; per-record
/// validation problems are reported separately and never end up here.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported record file {path}: expected .yaml, .yml or .toml")]
    UnsupportedFormat { path: PathBuf },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid file pattern \"{pattern}\": {message}")]
    Pattern { pattern: String, message: String },

    #[error("{path}: {source}")]
    Structural {
        path: PathBuf,
        #[source]
        source: StructuralInputError,
    },

    #[error("{path}: {source}")]
    Section {
        path: PathBuf,
        #[source]
        source: SchemaLookupError,
    },

    #[error("{path}: {section} can only be written inside its parent record")]
    DependentSection { path: PathBuf, section: String },

    #[error(transparent)]
    Lookup(#[from] SchemaLookupError),

    #[error("cannot render field {field}: {source}")]
    Render {
        field: String,
        #[source]
        source: CodecError,
    },

    #[error("failed to write YAML: {message}")]
    Serialize { message: String },
}

impl IngestError {
    pub(crate) fn structural(path: impl Into<PathBuf>, source: StructuralInputError) -> Self {
        Self::Structural {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn section(path: impl Into<PathBuf>, source: SchemaLookupError) -> Self {
        Self::Section {
            path: path.into(),
            source,
        }
    }
}
