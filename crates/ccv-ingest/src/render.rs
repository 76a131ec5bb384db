//! Records written back out as an explicit record file.
//!
//! The output reads back through [`crate::parse_records`] to the same
//! records: keys are labels (identifiers where a label is ambiguous),
//! values are the registry text forms (codes for literals published under
//! several codes) and child sections are lists under their label.

use serde_yaml::{Mapping, Value};

use ccv_model::{FieldSchema, NormalizedRecord, SchemaDefinition, SchemaLookupError, SectionSchema, TypedValue};
use ccv_transform::{EncodedValue, ValueCodec};

use crate::error::{IngestError, Result};
use crate::records::resolve_heading;

/// Render instances of `section` as a YAML document.
pub fn render_records(
    schema: &SchemaDefinition,
    codec: &ValueCodec,
    section: &SectionSchema,
    records: &[NormalizedRecord],
) -> Result<String> {
    let instances = records
        .iter()
        .map(|record| record_value(schema, codec, section, record))
        .collect::<Result<Vec<_>>>()?;
    let body = match instances.as_slice() {
        [single] if !section.repeatable => single.clone(),
        _ => Value::Sequence(instances),
    };
    let mut document = Mapping::new();
    document.insert(Value::String(heading(schema, section)), body);
    serde_yaml::to_string(&Value::Mapping(document)).map_err(|e| IngestError::Serialize {
        message: e.to_string(),
    })
}

/// The shortest heading that resolves back to `section`.
pub fn heading(schema: &SchemaDefinition, section: &SectionSchema) -> String {
    let resolves = |key: &str| resolve_heading(schema, key).is_ok_and(|found| found.id == section.id);
    if resolves(&section.label) {
        return section.label.clone();
    }
    if let Some(parent) = schema.parent_of(&section.id) {
        let qualified = format!("{} > {}", parent.label, section.label);
        if resolves(&qualified) {
            return qualified;
        }
    }
    section.id.clone()
}

/// Code of a selected literal the registry publishes under several codes;
/// the literal alone would not read back.
fn choice_key(field: &FieldSchema, value: &TypedValue) -> Option<String> {
    let (TypedValue::Choice(choice) | TypedValue::Reference(choice)) = value else {
        return None;
    };
    let list = field.choices()?;
    (list.all_by_label(&choice.label).len() > 1).then(|| choice.id.clone())
}

fn record_value(
    schema: &SchemaDefinition,
    codec: &ValueCodec,
    section: &SectionSchema,
    record: &NormalizedRecord,
) -> Result<Value> {
    if record.section_id != section.id {
        return Err(SchemaLookupError::section_not_found(record.section_id.as_str()).into());
    }
    let mut map = Mapping::new();
    for entry in &record.fields {
        let field = section
            .field_by_id(&entry.field_id)
            .ok_or_else(|| SchemaLookupError::UnknownField {
                section: section.label.clone(),
                key: entry.field_id.clone(),
            })?;
        let key = match section.field(&field.label) {
            Ok(found) if found.id == field.id => field.label.clone(),
            _ => field.id.clone(),
        };
        let encoded = codec.encode(field, &entry.value).map_err(|source| IngestError::Render {
            field: field.label.clone(),
            source,
        })?;
        let value = match encoded {
            EncodedValue::Text(text) => Value::String(choice_key(field, &entry.value).unwrap_or(text)),
            EncodedValue::Pair { english, french } => {
                let mut pair = Mapping::new();
                for (language, text) in [("english", english), ("french", french)] {
                    if let Some(text) = text {
                        pair.insert(Value::String(language.to_string()), Value::String(text));
                    }
                }
                Value::Mapping(pair)
            }
        };
        map.insert(Value::String(key), value);
    }

    for child in schema.children(section) {
        let instances = record
            .subsections_of(&child.id)
            .map(|instance| record_value(schema, codec, child, instance))
            .collect::<Result<Vec<_>>>()?;
        if !instances.is_empty() {
            map.insert(Value::String(child.label.clone()), Value::Sequence(instances));
        }
    }
    Ok(Value::Mapping(map))
}
