//! Loose input as parsed from record files, before any schema is applied.

/// A value as written by a person editing a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// Any leaf; blank leaves (including YAML `null`) are empty strings.
    Scalar(String),
    /// A sub-mapping made only of `english` / `french` keys.
    Bilingual(RawBilingual),
    /// Field/value pairs. A list of instances holds one record per instance.
    Group(Vec<RawRecord>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBilingual {
    pub english: Option<String>,
    pub french: Option<String>,
}

/// Ordered field/value pairs. Duplicate keys are preserved so that the
/// normalizer can report them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub entries: Vec<(String, RawValue)>,
}

impl RawValue {
    pub fn scalar(text: impl Into<String>) -> Self {
        RawValue::Scalar(text.into())
    }

    /// A group holding one record.
    pub fn record(record: RawRecord) -> Self {
        RawValue::Group(vec![record])
    }

    /// Short description used in structural error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Scalar(_) => "a scalar",
            RawValue::Bilingual(_) => "a bilingual pair",
            RawValue::Group(records) if records.len() == 1 => "a mapping",
            RawValue::Group(_) => "a list",
        }
    }

    /// Literal text of scalars, used to echo raw input back in errors.
    pub fn display_text(&self) -> String {
        match self {
            RawValue::Scalar(text) => text.clone(),
            RawValue::Bilingual(pair) => match (&pair.english, &pair.french) {
                (Some(en), Some(fr)) => format!("{en} / {fr}"),
                (Some(text), None) | (None, Some(text)) => text.clone(),
                (None, None) => String::new(),
            },
            RawValue::Group(records) => format!("<{} record(s)>", records.len()),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            RawValue::Scalar(text) => text.trim().is_empty(),
            RawValue::Bilingual(pair) => {
                pair.english.as_deref().is_none_or(|t| t.trim().is_empty())
                    && pair.french.as_deref().is_none_or(|t| t.trim().is_empty())
            }
            RawValue::Group(records) => records.is_empty(),
        }
    }
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: RawValue) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: RawValue) {
        self.entries.push((key.into(), value));
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, RawValue)> for RawRecord {
    fn from_iter<T: IntoIterator<Item = (String, RawValue)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
