use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Label language of a loaded schema.
///
/// The registry publishes every label twice (`englishName`, `frenchName`);
/// a schema is loaded in one language and all label lookups use it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    French,
}

impl Language {
    /// Prefix of the schema attributes carrying labels in this language.
    pub const fn attribute_prefix(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::French => "french",
        }
    }

    /// Value of the `lang` attribute on generated documents.
    pub const fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::French => "fr",
        }
    }

    /// Element name used for this half of a bilingual value.
    pub const fn element_name(&self) -> &'static str {
        self.attribute_prefix()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.attribute_prefix())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            "french" | "fr" | "français" | "francais" => Ok(Language::French),
            _ => Err(format!("Unknown language: {s}")),
        }
    }
}
