//! Validation of loose records against a section.
//!
//! Every key is resolved (field identifier, field label, then child
//! section), every value decoded, and every rule checked before anything is
//! reported, so one call returns all problems with a record. Only input that
//! is not shaped as field/value pairs stops normalization early.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use ccv_model::{
    FieldEntry, NormalizedRecord, RawRecord, RawValue, SchemaDefinition, SchemaLookupError,
    SectionSchema, StructuralInputError, ValidationError, ValidationErrorKind,
};

use crate::codec::ValueCodec;
use crate::constraints::{FieldValues, check_entries, check_values, missing_required};
use crate::error::NormalizeError;

/// Normalize one section instance.
pub fn normalize(
    schema: &SchemaDefinition,
    codec: &ValueCodec,
    section: &SectionSchema,
    raw: &RawValue,
) -> Result<NormalizedRecord, NormalizeError> {
    Normalizer::new(schema, *codec).normalize(section, raw)
}

/// Normalizer bound to a schema and codec.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'a> {
    schema: &'a SchemaDefinition,
    codec: ValueCodec,
}

/// What the input said about one field.
struct Seen<'r> {
    key: &'r str,
    raw: String,
}

impl<'a> Normalizer<'a> {
    pub fn new(schema: &'a SchemaDefinition, codec: ValueCodec) -> Self {
        Self { schema, codec }
    }

    pub fn schema(&self) -> &'a SchemaDefinition {
        self.schema
    }

    pub fn codec(&self) -> &ValueCodec {
        &self.codec
    }

    /// Normalize a value that must hold exactly one instance of `section`.
    pub fn normalize(&self, section: &SectionSchema, raw: &RawValue) -> Result<NormalizedRecord, NormalizeError> {
        match raw {
            RawValue::Group(records) if records.len() == 1 => self.normalize_record(section, &records[0]),
            other => Err(StructuralInputError::new(section.label.clone(), other.kind()).into()),
        }
    }

    /// Problem with holding `count` instances of `section` side by side:
    /// more than one of a section that is not repeatable, or more than its
    /// entry limit.
    pub fn check_entry_count(&self, section: &SectionSchema, count: usize) -> Option<ValidationError> {
        let violation = check_entries(section, count)?;
        let kind = if section.repeatable {
            ValidationErrorKind::ConstraintViolated
        } else {
            ValidationErrorKind::InvalidValue
        };
        Some(ValidationError::new(
            self.schema.label_path(&section.id),
            violation.field,
            None,
            kind,
            violation.message,
        ))
    }

    /// Normalize one instance given as field/value pairs.
    pub fn normalize_record(&self, section: &SectionSchema, record: &RawRecord) -> Result<NormalizedRecord, NormalizeError> {
        let mut errors = Vec::new();
        let normalized = self.record(section, record, &mut errors)?;
        if errors.is_empty() {
            debug!(section = %section.label, fields = normalized.fields.len(), "record normalized");
            Ok(normalized)
        } else {
            warn!(section = %section.label, errors = errors.len(), "record rejected");
            Err(NormalizeError::Invalid(errors))
        }
    }

    fn record(
        &self,
        section: &SectionSchema,
        record: &RawRecord,
        errors: &mut Vec<ValidationError>,
    ) -> Result<NormalizedRecord, StructuralInputError> {
        let path = self.schema.label_path(&section.id);
        let error = |field: &str, raw: Option<String>, kind: ValidationErrorKind, message: String| {
            ValidationError::new(path.clone(), field, raw, kind, message)
        };

        let mut values = FieldValues::new();
        let mut seen: BTreeMap<String, Seen<'_>> = BTreeMap::new();
        let mut failed: BTreeSet<String> = BTreeSet::new();
        let mut children: Vec<(usize, NormalizedRecord)> = Vec::new();
        let mut seen_children: BTreeSet<String> = BTreeSet::new();

        for (key, raw) in &record.entries {
            let field = match section.field(key) {
                Ok(field) => field,
                Err(lookup) => {
                    if let Some(child) = self.schema.child(section, key) {
                        if !seen_children.insert(child.id.clone()) {
                            errors.push(error(
                                key,
                                None,
                                ValidationErrorKind::DuplicateField,
                                format!("\"{key}\" is given more than once"),
                            ));
                            continue;
                        }
                        let position = section.child_position(&child.id).unwrap_or(usize::MAX);
                        for instance in self.child_instances(child, raw, errors)? {
                            children.push((position, instance));
                        }
                        continue;
                    }
                    let message = match lookup {
                        SchemaLookupError::Ambiguous { .. } => lookup.to_string(),
                        _ => format!("\"{key}\" is not a field of {}", section.label),
                    };
                    errors.push(error(
                        key,
                        Some(raw.display_text()),
                        ValidationErrorKind::UnknownField,
                        message,
                    ));
                    continue;
                }
            };

            if seen.contains_key(&field.id) {
                errors.push(error(
                    key,
                    Some(raw.display_text()),
                    ValidationErrorKind::DuplicateField,
                    format!("{} is given more than once", field.label),
                ));
                continue;
            }
            seen.insert(
                field.id.clone(),
                Seen {
                    key,
                    raw: raw.display_text(),
                },
            );

            match self.codec.decode(field, raw) {
                Ok(Some(value)) => {
                    values.insert(field.id.clone(), value);
                }
                Ok(None) => {}
                Err(e) => {
                    failed.insert(field.id.clone());
                    errors.push(error(key, Some(raw.display_text()), e.validation_kind(), e.to_string()));
                }
            }
        }

        let is_failed = |id: &str| failed.contains(id);
        let report_key = |id: &str| -> (String, Option<String>) {
            match seen.get(id) {
                Some(s) => (s.key.to_string(), Some(s.raw.clone())),
                None => (
                    section.field_by_id(id).map_or_else(|| id.to_string(), |f| f.label.clone()),
                    None,
                ),
            }
        };

        for violation in check_values(section, &values, &is_failed) {
            let (key, raw) = report_key(&violation.field);
            errors.push(error(&key, raw, ValidationErrorKind::ConstraintViolated, violation.message));
        }
        for violation in missing_required(section, &values, &is_failed) {
            let (key, raw) = report_key(&violation.field);
            let label = section
                .field_by_id(&violation.field)
                .map_or(violation.field.as_str(), |f| f.label.as_str());
            errors.push(error(
                &key,
                raw,
                ValidationErrorKind::MissingRequired,
                format!("{label}: {}", violation.message),
            ));
        }

        let mut fields: Vec<FieldEntry> = values
            .into_iter()
            .map(|(field_id, value)| FieldEntry { field_id, value })
            .collect();
        fields.sort_by_key(|entry| section.field_position(&entry.field_id));
        children.sort_by_key(|(position, _)| *position);

        Ok(NormalizedRecord {
            section_id: section.id.clone(),
            fields,
            subsections: children.into_iter().map(|(_, record)| record).collect(),
        })
    }

    /// Instances of a child section written under a parent record.
    fn child_instances(
        &self,
        child: &SectionSchema,
        raw: &RawValue,
        errors: &mut Vec<ValidationError>,
    ) -> Result<Vec<NormalizedRecord>, StructuralInputError> {
        let records = match raw {
            RawValue::Group(records) => records,
            blank if blank.is_blank() => return Ok(Vec::new()),
            other => return Err(StructuralInputError::new(child.label.clone(), other.kind())),
        };
        errors.extend(self.check_entry_count(child, records.len()));
        records
            .iter()
            .map(|record| self.record(child, record, errors))
            .collect()
    }
}
