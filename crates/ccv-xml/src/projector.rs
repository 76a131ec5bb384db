//! Projection of normalized records to `<section>` elements and back.
//!
//! A section instance is written as
//!
//! ```xml
//! <section id="9dc7..." label="Courses Taught">
//!   <field id="6f4d..." label="Course Code">
//!     <value type="String">BIO101</value>
//!   </field>
//!   <field id="cefd..." label="Role">
//!     <lov id="00000000000000000000000000000101">Instructor</lov>
//!   </field>
//! </section>
//! ```
//!
//! Reference fields hold a `<refTable refValueId="..">` node with one
//! `<linkedWith>` line per linked value, ending with the entry itself.
//! Bilingual values hold `<english>` and `<french>` children. Dates and
//! date-times carry their registry format in a `format` attribute. Child
//! sections are nested after the fields.

use ccv_model::{
    BilingualText, FieldEntry, FieldSchema, FieldType, NormalizedRecord, SchemaDefinition, SchemaLookupError,
    SectionSchema, TypedValue,
};
use ccv_transform::{EncodedValue, ValueCodec};
use tracing::trace;

use crate::error::{Result, XmlError};
use crate::tree::XmlElement;

pub const SECTION_ELEMENT: &str = "section";
pub const FIELD_ELEMENT: &str = "field";
const VALUE_ELEMENT: &str = "value";
const LOV_ELEMENT: &str = "lov";
const REF_TABLE_ELEMENT: &str = "refTable";
const LINKED_WITH_ELEMENT: &str = "linkedWith";
const DATETIME_FORMAT: &str = "yyyy-MM-dd HH:mm:ss";

/// Build the element for one section instance and its child records.
pub fn project(schema: &SchemaDefinition, codec: &ValueCodec, record: &NormalizedRecord) -> Result<XmlElement> {
    let section = schema
        .section_by_id(&record.section_id)
        .ok_or_else(|| SchemaLookupError::section_not_found(record.section_id.as_str()))?;
    let mut element = section_element(section);

    let mut fields: Vec<_> = record.fields.iter().collect();
    fields.sort_by_key(|entry| section.field_position(&entry.field_id));
    for entry in fields {
        let field = section
            .field_by_id(&entry.field_id)
            .ok_or_else(|| SchemaLookupError::UnknownField {
                section: section.label.clone(),
                key: entry.field_id.clone(),
            })?;
        element.push(field_element(codec, field, &entry.value)?);
    }

    let mut children: Vec<_> = record.subsections.iter().collect();
    children.sort_by_key(|child| section.child_position(&child.section_id));
    for child in children {
        if schema.parent_of(&child.section_id).map(|p| p.id.as_str()) != Some(section.id.as_str()) {
            return Err(XmlError::malformed(
                &section.label,
                format!("section {} is not a child of {}", child.section_id, section.label),
            ));
        }
        element.push(project(schema, codec, child)?);
    }
    trace!(section = %section.label, "projected record");
    Ok(element)
}

/// An empty `<section>` element, also used for container sections.
pub fn section_element(section: &SectionSchema) -> XmlElement {
    XmlElement::new(SECTION_ELEMENT)
        .with_attribute("id", section.id.as_str())
        .with_attribute("label", section.label.as_str())
}

fn field_element(codec: &ValueCodec, field: &FieldSchema, value: &TypedValue) -> Result<XmlElement> {
    let encoded = codec.encode(field, value).map_err(|source| XmlError::Codec {
        field: field.label.clone(),
        source,
    })?;
    let element = XmlElement::new(FIELD_ELEMENT)
        .with_attribute("id", field.id.as_str())
        .with_attribute("label", field.label.as_str());

    let content = match (&field.field_type, value, encoded) {
        (FieldType::Choice(_), TypedValue::Choice(choice), EncodedValue::Text(literal)) => {
            XmlElement::new(LOV_ELEMENT)
                .with_attribute("id", choice.id.as_str())
                .with_text(literal)
        }
        (FieldType::Reference(table), TypedValue::Reference(choice), EncodedValue::Text(_)) => {
            let linked = table.linked_with(&choice.id).ok_or_else(|| {
                XmlError::malformed(field.label.as_str(), format!("{} is not an entry of {}", choice.id, table.label))
            })?;
            linked.into_iter().fold(
                XmlElement::new(REF_TABLE_ELEMENT).with_attribute("refValueId", choice.id.as_str()),
                |element, link| {
                    element.with_child(
                        XmlElement::new(LINKED_WITH_ELEMENT)
                            .with_attribute("label", link.label)
                            .with_attribute("value", link.value)
                            .with_attribute("refOrLovId", link.ref_or_lov_id),
                    )
                },
            )
        }
        (_, _, EncodedValue::Pair { english, french }) => {
            let half = |name: &str, text: Option<String>| match text {
                Some(text) => XmlElement::new(name).with_text(text),
                None => XmlElement::new(name),
            };
            XmlElement::new(VALUE_ELEMENT)
                .with_attribute("type", field.field_type.type_label())
                .with_child(half("english", english))
                .with_child(half("french", french))
        }
        (field_type, _, EncodedValue::Text(text)) => {
            let mut element = XmlElement::new(VALUE_ELEMENT).with_attribute("type", field_type.type_label());
            match field_type {
                FieldType::Date(granularity) => element.set_attribute("format", granularity.xml_format()),
                FieldType::DateTime => element.set_attribute("format", DATETIME_FORMAT),
                _ => {}
            }
            element.with_text(text)
        }
    };
    Ok(element.with_child(content))
}

/// Read a `<section>` element back into a record of `section`.
///
/// Fields whose value node is empty are absent from the result; required
/// fields are not enforced here, since registry documents may be partial.
pub fn extract(
    schema: &SchemaDefinition,
    codec: &ValueCodec,
    element: &XmlElement,
    section: &SectionSchema,
) -> Result<NormalizedRecord> {
    if element.local_name() != SECTION_ELEMENT {
        return Err(XmlError::malformed(
            &section.label,
            format!("expected <{SECTION_ELEMENT}>, found <{}>", element.name),
        ));
    }
    if element.attribute("id") != Some(section.id.as_str()) {
        return Err(XmlError::malformed(
            &section.label,
            format!(
                "element is section {}, expected {}",
                element.attribute("id").unwrap_or("(no id)"),
                section.id
            ),
        ));
    }

    let mut record = NormalizedRecord::new(section.id.as_str());
    let mut children: Vec<(Option<usize>, NormalizedRecord)> = Vec::new();
    let mut seen_fields: Vec<&str> = Vec::new();

    for child in element.elements() {
        match child.local_name() {
            FIELD_ELEMENT => {
                let id = required_id(child, section)?;
                let field = section.field_by_id(id).ok_or_else(|| {
                    XmlError::malformed(&section.label, format!("{id} is not a field of {}", section.label))
                })?;
                if seen_fields.contains(&id) {
                    return Err(XmlError::malformed(
                        &section.label,
                        format!("field {} appears more than once", field.label),
                    ));
                }
                seen_fields.push(id);
                if let Some(value) = field_value(codec, section, field, child)? {
                    record.fields.push(FieldEntry {
                        field_id: field.id.clone(),
                        value,
                    });
                }
            }
            SECTION_ELEMENT => {
                let id = required_id(child, section)?;
                let nested = schema
                    .section_by_id(id)
                    .filter(|candidate| candidate.parent.as_deref() == Some(section.id.as_str()))
                    .ok_or_else(|| {
                        XmlError::malformed(
                            &section.label,
                            format!("section {id} is not a child of {}", section.label),
                        )
                    })?;
                if !nested.repeatable && children.iter().any(|(_, r)| r.section_id == nested.id) {
                    return Err(XmlError::malformed(
                        &section.label,
                        format!("{} allows a single entry", nested.label),
                    ));
                }
                let position = section.child_position(&nested.id);
                children.push((position, extract(schema, codec, child, nested)?));
            }
            other => {
                return Err(XmlError::malformed(
                    &section.label,
                    format!("unexpected element <{other}>"),
                ));
            }
        }
    }

    record.fields.sort_by_key(|entry| section.field_position(&entry.field_id));
    children.sort_by_key(|(position, _)| *position);
    record.subsections = children.into_iter().map(|(_, child)| child).collect();
    Ok(record)
}

fn required_id<'e>(element: &'e XmlElement, section: &SectionSchema) -> Result<&'e str> {
    element.attribute("id").ok_or_else(|| {
        XmlError::malformed(
            &section.label,
            format!("<{}> without an id attribute", element.name),
        )
    })
}

fn field_value(
    codec: &ValueCodec,
    section: &SectionSchema,
    field: &FieldSchema,
    element: &XmlElement,
) -> Result<Option<TypedValue>> {
    let undecodable = |message: String| XmlError::malformed(&section.label, format!("{}: {message}", field.label));

    if let FieldType::Choice(_) = field.field_type {
        let lov = element
            .child(LOV_ELEMENT)
            .ok_or_else(|| undecodable(format!("missing <{LOV_ELEMENT}> node")))?;
        let Some(id) = lov.attribute("id").map(str::trim).filter(|id| !id.is_empty()) else {
            return Ok(None);
        };
        return codec
            .decode_choice_id(field, id, lov.text().trim())
            .map(Some)
            .map_err(|e| undecodable(e.to_string()));
    }

    if let FieldType::Reference(_) = field.field_type {
        let reference = element
            .child(REF_TABLE_ELEMENT)
            .ok_or_else(|| undecodable(format!("missing <{REF_TABLE_ELEMENT}> node")))?;
        let Some(id) = reference
            .attribute("refValueId")
            .map(str::trim)
            .filter(|id| !id.is_empty())
        else {
            return Ok(None);
        };
        let literal = reference
            .elements()
            .filter(|e| e.local_name() == LINKED_WITH_ELEMENT)
            .last()
            .and_then(|e| e.attribute("value"))
            .unwrap_or_default();
        return codec
            .decode_choice_id(field, id, literal)
            .map(Some)
            .map_err(|e| undecodable(e.to_string()));
    }

    let value = element
        .child(VALUE_ELEMENT)
        .ok_or_else(|| undecodable(format!("missing <{VALUE_ELEMENT}> node")))?;
    if field.is_bilingual() {
        let half = |name: &str| {
            value
                .child(name)
                .map(|e| e.text().trim().to_string())
                .filter(|text| !text.is_empty())
        };
        let pair = BilingualText::new(half("english"), half("french"));
        return Ok((!pair.is_blank()).then_some(TypedValue::Bilingual(pair)));
    }
    codec
        .decode_text(field, &value.text())
        .map_err(|e| undecodable(e.to_string()))
}
