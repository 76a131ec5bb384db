//! Settings from `ccv.toml` and command-line overrides.
//!
//! ```toml
//! language = "french"
//! schema_dir = "/opt/ccv/standards"
//! normalize_punctuation = true
//! ```
//!
//! Flags given on the command line win over the file; anything left unset
//! falls back to English, the bundled standards directory and exact choice
//! matching.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use ccv_model::{Language, SchemaDefinition};
use ccv_transform::{CodecOptions, ValueCodec};

pub const CONFIG_FILE: &str = "ccv.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CcvConfig {
    pub language: Option<Language>,
    pub schema_dir: Option<PathBuf>,
    pub normalize_punctuation: Option<bool>,
}

impl CcvConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config: Self =
            toml::from_str(&text).with_context(|| format!("parse config {}", path.display()))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// `explicit` when given, otherwise `ccv.toml` in `dir` if there is one.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let candidate = dir.join(CONFIG_FILE);
                if candidate.is_file() {
                    Self::load(&candidate)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Apply command-line values on top of the file.
    #[must_use]
    pub fn with_overrides(
        mut self,
        language: Option<Language>,
        schema_dir: Option<PathBuf>,
        normalize_punctuation: bool,
    ) -> Self {
        if language.is_some() {
            self.language = language;
        }
        if schema_dir.is_some() {
            self.schema_dir = schema_dir;
        }
        if normalize_punctuation {
            self.normalize_punctuation = Some(true);
        }
        self
    }

    pub fn language(&self) -> Language {
        self.language.unwrap_or_default()
    }

    pub fn codec(&self) -> ValueCodec {
        ValueCodec::new(self.language()).with_options(CodecOptions {
            normalize_punctuation: self.normalize_punctuation.unwrap_or(false),
        })
    }

    /// Load the schema from `schema_dir`, or the standards root.
    pub fn load_schema(&self) -> Result<SchemaDefinition> {
        let dir = self
            .schema_dir
            .clone()
            .unwrap_or_else(ccv_standards::standards_root);
        let schema = ccv_standards::load_schema_dir(&dir, self.language())
            .with_context(|| format!("load schema from {}", dir.display()))?;
        info!(
            dir = %dir.display(),
            version = schema.version(),
            sections = schema.len(),
            "schema loaded"
        );
        Ok(schema)
    }
}
