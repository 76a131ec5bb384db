//! Record files: YAML or TOML documents holding section instances.
//!
//! A file is either explicit, with section headings as top-level keys,
//!
//! ```yaml
//! Courses Taught:
//!   - Course Title: Ecology
//!     Course Code: BIO301
//! ```
//!
//! or implicit, one flat field map whose section is inferred from its keys.
//! Headings may name container sections (`Activities:`), whose values then
//! hold headings of their child sections. `Parent > Child` picks between
//! sections that share a label. YAML files may hold several `---`
//! documents.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use ccv_model::{
    Language, RawBilingual, RawRecord, RawValue, SchemaDefinition, SchemaLookupError, SectionSchema,
    StructuralInputError,
};

use crate::error::{IngestError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Yaml,
    Toml,
}

impl RecordFormat {
    /// Format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "yaml" | "yml" => Some(RecordFormat::Yaml),
            "toml" => Some(RecordFormat::Toml),
            _ => None,
        }
    }
}

/// Instances of one section read from a record file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRecords {
    pub section_id: String,
    pub instances: Vec<RawRecord>,
}

/// Parsed file content before it is given record shape.
#[derive(Debug)]
enum Loose {
    Null,
    Scalar(String),
    Map(Vec<(String, Loose)>),
    List(Vec<Loose>),
}

impl Loose {
    fn from_yaml(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;
        match value {
            Value::Null => Loose::Null,
            Value::Bool(b) => Loose::Scalar(b.to_string()),
            Value::Number(n) => Loose::Scalar(n.to_string()),
            Value::String(s) => Loose::Scalar(s),
            Value::Sequence(items) => Loose::List(items.into_iter().map(Loose::from_yaml).collect()),
            Value::Mapping(map) => Loose::Map(
                map.into_iter()
                    .map(|(key, value)| (yaml_key(key), Loose::from_yaml(value)))
                    .collect(),
            ),
            Value::Tagged(tagged) => Loose::from_yaml(tagged.value),
        }
    }

    fn from_toml(value: toml::Value) -> Self {
        use toml::Value;
        match value {
            Value::String(s) => Loose::Scalar(s),
            Value::Integer(i) => Loose::Scalar(i.to_string()),
            Value::Float(f) => Loose::Scalar(f.to_string()),
            Value::Boolean(b) => Loose::Scalar(b.to_string()),
            Value::Datetime(dt) => Loose::Scalar(dt.to_string()),
            Value::Array(items) => Loose::List(items.into_iter().map(Loose::from_toml).collect()),
            Value::Table(table) => Loose::Map(
                table
                    .into_iter()
                    .map(|(key, value)| (key, Loose::from_toml(value)))
                    .collect(),
            ),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Loose::Null => "nothing",
            Loose::Scalar(_) => "a single value",
            Loose::Map(_) => "field/value pairs",
            Loose::List(_) => "a list",
        }
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => String::new(),
        other => format!("{other:?}"),
    }
}

/// Read every section instance from a record file.
pub fn read_records(path: &Path, schema: &SchemaDefinition) -> Result<Vec<SectionRecords>> {
    let format = RecordFormat::from_path(path).ok_or_else(|| IngestError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    let text = std::fs::read_to_string(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_records(&text, format, path, schema)
}

/// Parse record text; `path` is only used in error messages.
pub fn parse_records(
    text: &str,
    format: RecordFormat,
    path: &Path,
    schema: &SchemaDefinition,
) -> Result<Vec<SectionRecords>> {
    let parse_error = |message: String| IngestError::Parse {
        path: path.to_path_buf(),
        message,
    };
    let documents = match format {
        RecordFormat::Yaml => serde_yaml::Deserializer::from_str(text)
            .map(|document| {
                serde_yaml::Value::deserialize(document)
                    .map(Loose::from_yaml)
                    .map_err(|e| parse_error(e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?,
        RecordFormat::Toml => {
            let table = toml::from_str::<toml::Table>(text).map_err(|e| parse_error(e.to_string()))?;
            vec![Loose::from_toml(toml::Value::Table(table))]
        }
    };

    let mut collector = Collector {
        schema,
        path,
        out: Vec::new(),
    };
    for document in documents {
        match document {
            Loose::Null => {}
            Loose::Map(entries) => collector.document(entries)?,
            Loose::List(items) => {
                for item in items {
                    match item {
                        Loose::Map(entries) => collector.document(entries)?,
                        Loose::Null => {}
                        other => return Err(collector.structural("a record", &other)),
                    }
                }
            }
            other => return Err(collector.structural("a record file", &other)),
        }
    }
    Ok(collector.out)
}

/// Resolve a section heading: identifier, label, or `Parent > Child`.
pub fn resolve_heading<'s>(schema: &'s SchemaDefinition, key: &str) -> std::result::Result<&'s SectionSchema, SchemaLookupError> {
    match key.rsplit_once(" > ") {
        Some((parents, label)) => {
            let parent = parents.rsplit(" > ").next().unwrap_or(parents);
            schema.resolve_in(label.trim(), parent.trim())
        }
        None => schema.resolve(key.trim()),
    }
}

struct Collector<'a> {
    schema: &'a SchemaDefinition,
    path: &'a Path,
    out: Vec<SectionRecords>,
}

impl<'a> Collector<'a> {
    fn structural(&self, context: &str, found: &Loose) -> IngestError {
        IngestError::structural(self.path, StructuralInputError::new(context, found.kind()))
    }

    fn lookup(&self, source: SchemaLookupError) -> IngestError {
        IngestError::section(self.path, source)
    }

    fn document(&mut self, entries: Vec<(String, Loose)>) -> Result<()> {
        let schema = self.schema;
        let headings: Option<Vec<&'a SectionSchema>> = entries
            .iter()
            .map(|(key, _)| resolve_heading(schema, key).ok())
            .collect();
        if let Some(sections) = headings {
            for ((_, value), section) in entries.into_iter().zip(sections) {
                self.section(section, value)?;
            }
            return Ok(());
        }

        let keys: Vec<&str> = entries.iter().map(|(key, _)| key.as_str()).collect();
        if let [only] = keys.as_slice() {
            if let Err(e @ SchemaLookupError::Ambiguous { .. }) = resolve_heading(schema, only) {
                return Err(self.lookup(e));
            }
        }
        let section = schema.infer_section(&keys).map_err(|e| self.lookup(e))?;
        debug!(path = %self.path.display(), section = %section.label, "section inferred from keys");
        let record = to_record(&section.label, entries).map_err(|e| IngestError::structural(self.path, e))?;
        self.push(section, vec![record]);
        Ok(())
    }

    fn section(&mut self, section: &'a SectionSchema, value: Loose) -> Result<()> {
        let schema = self.schema;
        if !section.has_fields() {
            return match value {
                Loose::Null => Ok(()),
                Loose::Map(entries) => {
                    for (key, value) in entries {
                        let child = schema.child(section, &key).ok_or_else(|| {
                            self.lookup(SchemaLookupError::section_not_found(format!("{} > {key}", section.label)))
                        })?;
                        self.section(child, value)?;
                    }
                    Ok(())
                }
                other => Err(self.structural(&section.label, &other)),
            };
        }

        if schema.is_dependent(&section.id) {
            return Err(IngestError::DependentSection {
                path: self.path.to_path_buf(),
                section: schema.label_path(&section.id),
            });
        }

        let instances = match value {
            Loose::Null => Vec::new(),
            Loose::Map(entries) => vec![to_record(&section.label, entries).map_err(|e| IngestError::structural(self.path, e))?],
            Loose::List(items) => items
                .into_iter()
                .filter(|item| !matches!(item, Loose::Null))
                .map(|item| match item {
                    Loose::Map(entries) => to_record(&section.label, entries),
                    other => Err(StructuralInputError::new(section.label.clone(), other.kind())),
                })
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| IngestError::structural(self.path, e))?,
            other => return Err(self.structural(&section.label, &other)),
        };
        self.push(section, instances);
        Ok(())
    }

    fn push(&mut self, section: &SectionSchema, instances: Vec<RawRecord>) {
        debug!(section = %section.label, instances = instances.len(), "records read");
        self.out.push(SectionRecords {
            section_id: section.id.clone(),
            instances,
        });
    }
}

fn to_record(context: &str, entries: Vec<(String, Loose)>) -> std::result::Result<RawRecord, StructuralInputError> {
    if entries.is_empty() {
        debug!(context, "empty record");
    }
    entries
        .into_iter()
        .map(|(key, value)| {
            let raw = to_raw(&key, value)?;
            Ok((key, raw))
        })
        .collect()
}

fn to_raw(key: &str, value: Loose) -> std::result::Result<RawValue, StructuralInputError> {
    match value {
        Loose::Null => Ok(RawValue::scalar("")),
        Loose::Scalar(text) => Ok(RawValue::Scalar(text)),
        Loose::Map(entries) if is_bilingual(&entries) => {
            let mut pair = RawBilingual::default();
            for (language, text) in entries {
                let text = match text {
                    Loose::Scalar(text) => Some(text),
                    _ => None,
                };
                match language.parse::<Language>() {
                    Ok(Language::English) => pair.english = text,
                    Ok(Language::French) => pair.french = text,
                    Err(_) => {}
                }
            }
            Ok(RawValue::Bilingual(pair))
        }
        Loose::Map(entries) => Ok(RawValue::Group(vec![to_record(key, entries)?])),
        Loose::List(items) => items
            .into_iter()
            .map(|item| match item {
                Loose::Map(entries) => to_record(key, entries),
                other => Err(StructuralInputError::new(key, format!("a list holding {}", other.kind()))),
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(RawValue::Group),
    }
}

/// A mapping whose keys are all language names holding plain values.
fn is_bilingual(entries: &[(String, Loose)]) -> bool {
    !entries.is_empty()
        && entries.iter().all(|(key, value)| {
            key.parse::<Language>().is_ok() && matches!(value, Loose::Scalar(_) | Loose::Null)
        })
}
