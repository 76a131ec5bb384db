//! Loader for `cv.xml`, the registry's section and field catalogue.
//!
//! Sections nest the way they nest in CV documents. Fields name their
//! data type by identifier (resolved through `<types>`) and, for LOV
//! fields, their list of values through `lookupId`. Validator rules are
//! `<constraint>` elements at field or section level. Their parameters use
//! the registry grammar, where identifiers may carry a `:Label` suffix:
//!
//! - rule 20 (required if): `_;fieldId:Label;lovId:Label;359:Equals;valueId`,
//!   or the short form `field;359;value`
//! - rule 24 (mutually exclusive): `fieldId:Label`
//! - rule 18 (entry limit): the largest number of entries

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use ccv_model::{
    Condition, Constraint, FieldSchema, FieldType, Language, SchemaDefinition, SectionSchema,
};
use roxmltree::{Document, Node};
use tracing::{debug, info, warn};

use crate::error::{Result, StandardsError};
use crate::paths::{REF_TABLE_FILE, SCHEMA_FILE, VALUE_LIST_FILE, standards_root};
use crate::ref_tables::load_reference_tables;
use crate::value_lists::{ValueListSet, label, load_value_lists, required};

const RULE_MAX_LENGTH: &str = "8";
const RULE_NOT_BLANK: &str = "11";
const RULE_MAX_ENTRIES: &str = "18";
const RULE_REQUIRED_IF: &str = "20";
const RULE_MUTUALLY_EXCLUSIVE: &str = "24";
const RULE_DATE_ORDER: &str = "dateOrder";

/// Load the bundled schema from the standards directory.
pub fn load_default_schema(language: Language) -> Result<SchemaDefinition> {
    load_schema_dir(&standards_root(), language)
}

/// Load `cv.xml`, `cv-lov.xml` and, when present, `cv-ref-table.xml` from
/// one directory.
pub fn load_schema_dir(dir: &Path, language: Language) -> Result<SchemaDefinition> {
    let mut lists = load_value_lists(&dir.join(VALUE_LIST_FILE), language)?;
    let references = dir.join(REF_TABLE_FILE);
    if references.is_file() {
        lists.add_references(load_reference_tables(&references, language)?)?;
    }
    load_schema_with(&dir.join(SCHEMA_FILE), &lists, language)
}

pub fn load_schema(schema_path: &Path, lists_path: &Path, language: Language) -> Result<SchemaDefinition> {
    let lists = load_value_lists(lists_path, language)?;
    load_schema_with(schema_path, &lists, language)
}

fn load_schema_with(schema_path: &Path, lists: &ValueListSet, language: Language) -> Result<SchemaDefinition> {
    let text = std::fs::read_to_string(schema_path).map_err(|e| StandardsError::io(schema_path, e))?;
    let schema = parse_schema(&text, &schema_path.display().to_string(), lists, language)?;
    info!(
        path = %schema_path.display(),
        version = schema.version(),
        sections = schema.len(),
        value_lists = lists.len(),
        reference_tables = lists.reference_count(),
        "loaded CCV schema"
    );
    Ok(schema)
}

/// Parse a schema document against already-loaded value lists.
pub fn parse_schema(
    text: &str,
    origin: &str,
    lists: &ValueListSet,
    language: Language,
) -> Result<SchemaDefinition> {
    let doc = Document::parse(text).map_err(|e| StandardsError::xml(origin, &e))?;
    let root = doc.root_element();
    if !root.has_tag_name("schema") {
        return Err(StandardsError::InvalidSchema {
            origin: origin.to_string(),
            message: format!("expected <schema> root, found <{}>", root.tag_name().name()),
        });
    }
    let version = required(root, "schema", "version")?;

    let types = parse_types(root)?;
    let mut loader = SectionLoader {
        lists,
        types: &types,
        language,
        sections: Vec::new(),
        seen: BTreeSet::new(),
    };
    for node in root.children().filter(|n| n.has_tag_name("section")) {
        loader.load(node, None)?;
    }
    if loader.sections.is_empty() {
        return Err(StandardsError::InvalidSchema {
            origin: origin.to_string(),
            message: "no sections declared".to_string(),
        });
    }

    let sections = loader.sections;
    Ok(match root.attribute("namespace") {
        Some(namespace) => SchemaDefinition::with_namespace(version, namespace, language, sections),
        None => SchemaDefinition::new(version, language, sections),
    })
}

/// Type identifier to registry type label. Labels are always English; they
/// name the codec, not anything shown to people.
fn parse_types(root: Node<'_, '_>) -> Result<BTreeMap<String, String>> {
    let mut types = BTreeMap::new();
    for types_node in root.children().filter(|n| n.has_tag_name("types")) {
        for node in types_node.children().filter(|n| n.has_tag_name("type")) {
            let id = required(node, "type", "id")?;
            let name = required(node, "type", "englishName")?;
            if types.insert(id.to_string(), name.to_string()).is_some() {
                return Err(StandardsError::DuplicateId {
                    kind: "type",
                    id: id.to_string(),
                });
            }
        }
    }
    Ok(types)
}

struct SectionLoader<'a> {
    lists: &'a ValueListSet,
    types: &'a BTreeMap<String, String>,
    language: Language,
    sections: Vec<SectionSchema>,
    seen: BTreeSet<String>,
}

impl SectionLoader<'_> {
    fn load(&mut self, node: Node<'_, '_>, parent: Option<&str>) -> Result<()> {
        let id = required(node, "section", "id")?;
        if !self.seen.insert(id.to_string()) {
            return Err(StandardsError::DuplicateId {
                kind: "section",
                id: id.to_string(),
            });
        }

        let mut section = SectionSchema::new(id, label(node, self.language));
        section.parent = parent.map(str::to_string);
        section.order = order_index(node);
        section.description = description(node, self.language);

        let mut field_ids = BTreeSet::new();
        for field_node in node.children().filter(|n| n.has_tag_name("field")) {
            let field = self.field(field_node)?;
            if !field_ids.insert(field.id.clone()) {
                return Err(StandardsError::DuplicateId {
                    kind: "field",
                    id: field.id,
                });
            }
            section.fields.push(field);
        }
        section.fields.sort_by_key(|f| f.order);

        let mut constraints = Vec::new();
        for field_node in node.children().filter(|n| n.has_tag_name("field")) {
            let field_id = required(field_node, "field", "id")?;
            for rule in field_node.children().filter(|n| n.has_tag_name("constraint")) {
                constraints.push(field_constraint(&section, field_id, rule, self.lists)?);
            }
        }
        for rule in node.children().filter(|n| n.has_tag_name("constraint")) {
            constraints.push(section_constraint(&section, rule)?);
        }
        section.constraints = constraints;

        section.repeatable = match node.attribute("repeatable") {
            Some(flag) => matches!(flag.trim(), "yes" | "true" | "1"),
            None => section.has_fields(),
        };

        debug!(
            section = %section.label,
            fields = section.fields.len(),
            constraints = section.constraints.len(),
            repeatable = section.repeatable,
            "loaded section"
        );
        self.sections.push(section);

        for child in node.children().filter(|n| n.has_tag_name("section")) {
            self.load(child, Some(id))?;
        }
        Ok(())
    }

    fn field(&self, node: Node<'_, '_>) -> Result<FieldSchema> {
        let id = required(node, "field", "id")?;
        let type_id = required(node, "field", "dataType")?;
        let type_label = self
            .types
            .get(type_id)
            .ok_or_else(|| StandardsError::UnknownType {
                field: id.to_string(),
                type_id: type_id.to_string(),
            })?;

        let field_label = label(node, self.language);
        let field_type = if type_label == "Reference" {
            let table = match node.attribute("lookupId") {
                Some(table_id) => self.lists.reference(table_id),
                None => self.lists.reference_by_label(&field_label),
            };
            FieldType::Reference(table.cloned().ok_or_else(|| StandardsError::UnknownReferenceTable {
                field: id.to_string(),
                table: node.attribute("lookupId").unwrap_or(&field_label).to_string(),
            })?)
        } else {
            let list = match node.attribute("lookupId") {
                Some(list_id) => Some(self.lists.get(list_id).cloned().ok_or_else(|| {
                    StandardsError::UnknownValueList {
                        field: id.to_string(),
                        list_id: list_id.to_string(),
                    }
                })?),
                None => None,
            };
            if type_label == "LOV" && list.is_none() {
                return Err(StandardsError::UnknownValueList {
                    field: id.to_string(),
                    list_id: String::new(),
                });
            }
            FieldType::from_type_label(type_label, list).ok_or_else(|| StandardsError::UnknownType {
                field: id.to_string(),
                type_id: format!("{type_id} ({type_label})"),
            })?
        };

        let mut field = FieldSchema::new(id, field_label, field_type)
            .with_order(order_index(node));
        field.description = description(node, self.language);
        Ok(field)
    }
}

fn order_index(node: Node<'_, '_>) -> u32 {
    node.attribute("orderIndex")
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

fn description(node: Node<'_, '_>, language: Language) -> Option<String> {
    let attr = format!("{}Description", language.attribute_prefix());
    node.attribute(attr.as_str())
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

fn field_constraint(
    section: &SectionSchema,
    field_id: &str,
    node: Node<'_, '_>,
    lists: &ValueListSet,
) -> Result<Constraint> {
    let rule = required(node, "constraint", "validatorRule")?.trim();
    let parameters = node.attribute("parameters").map(str::trim);
    let invalid = || StandardsError::InvalidConstraint {
        section: section.label.clone(),
        rule: rule.to_string(),
        parameters: parameters.unwrap_or_default().to_string(),
    };
    let field = field_id.to_string();

    let constraint = match rule {
        RULE_MAX_LENGTH => Constraint::MaxLength {
            field,
            max: parameters.and_then(|p| p.parse().ok()).ok_or_else(invalid)?,
        },
        RULE_NOT_BLANK => Constraint::NotBlank { field },
        RULE_MAX_ENTRIES => Constraint::MaxEntries {
            max: parameters.and_then(|p| p.parse().ok()).ok_or_else(invalid)?,
        },
        RULE_REQUIRED_IF => {
            let parts: Vec<&str> = parameters.ok_or_else(invalid)?.split(';').map(str::trim).collect();
            let (other, list_id, op, value) = match parts.as_slice() {
                [_, other, list_id, .., op, value] => (*other, Some(*list_id), *op, *value),
                [other, op, value] => (*other, None, *op, *value),
                _ => return Err(invalid()),
            };
            let condition = match registry_key(op) {
                "359" | "equals" => Condition::Equals,
                "360" | "notEquals" => Condition::NotEquals,
                _ => return Err(invalid()),
            };
            let other = resolve_field(section, rule, registry_key(other))?;
            let list = section
                .field_by_id(&other)
                .and_then(FieldSchema::choices)
                .or_else(|| list_id.and_then(|id| lists.get(registry_key(id))));
            let value = match list {
                Some(list) => list
                    .by_id(registry_key(value))
                    .or_else(|| list.by_label(value))
                    .map(|v| v.label.clone())
                    .ok_or_else(invalid)?,
                None => value.to_string(),
            };
            Constraint::RequiredIf {
                field,
                other,
                condition,
                value,
            }
        }
        RULE_MUTUALLY_EXCLUSIVE => Constraint::MutuallyExclusive {
            field,
            other: resolve_field(section, rule, registry_key(parameters.ok_or_else(invalid)?))?,
        },
        _ => {
            warn!(section = %section.label, rule, "validator rule is not checked");
            Constraint::Unchecked {
                rule: rule.to_string(),
                field: Some(field),
                parameters: parameters.map(str::to_string),
            }
        }
    };
    Ok(constraint)
}

fn section_constraint(section: &SectionSchema, node: Node<'_, '_>) -> Result<Constraint> {
    let rule = required(node, "constraint", "validatorRule")?.trim();
    let parameters = node.attribute("parameters").map(str::trim);

    if rule == RULE_DATE_ORDER {
        let raw = parameters.unwrap_or_default();
        let Some((start, end)) = raw.split_once(';') else {
            return Err(StandardsError::InvalidConstraint {
                section: section.label.clone(),
                rule: rule.to_string(),
                parameters: raw.to_string(),
            });
        };
        return Ok(Constraint::DateOrder {
            start: resolve_field(section, rule, registry_key(start))?,
            end: resolve_field(section, rule, registry_key(end))?,
        });
    }

    if rule == RULE_MAX_ENTRIES {
        let max = parameters.and_then(|p| p.parse().ok()).ok_or_else(|| StandardsError::InvalidConstraint {
            section: section.label.clone(),
            rule: rule.to_string(),
            parameters: parameters.unwrap_or_default().to_string(),
        })?;
        return Ok(Constraint::MaxEntries { max });
    }

    debug!(section = %section.label, rule, "section rule kept unchecked");
    Ok(Constraint::Unchecked {
        rule: rule.to_string(),
        field: None,
        parameters: parameters.map(str::to_string),
    })
}

/// Identifier part of a registry parameter such as `22de...:Publishing Status`.
/// Parts without an identifier prefix (plain labels) are kept whole.
fn registry_key(part: &str) -> &str {
    match part.split_once(':') {
        Some((id, _)) if !id.trim().is_empty() && !id.trim().contains(char::is_whitespace) => id.trim(),
        _ => part.trim(),
    }
}

/// Constraint parameters may name fields by identifier or label.
fn resolve_field(section: &SectionSchema, rule: &str, key: &str) -> Result<String> {
    section
        .field(key)
        .map(|f| f.id.clone())
        .map_err(|_| StandardsError::UnknownConstraintField {
            section: section.label.clone(),
            rule: rule.to_string(),
            field: key.to_string(),
        })
}
