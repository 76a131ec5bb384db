//! The generic-cv document a session builds or updates.
//!
//! Sections are `<section id=..>` elements nested the way the schema nests
//! them under the `generic-cv:generic-cv` root. Adding a section creates
//! any missing container sections on the way down and inserts in schema
//! order; everything else in the document is left as loaded.

use std::path::Path;

use chrono::Local;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, Event};
use tracing::{debug, info};

use ccv_model::{NormalizedRecord, SchemaDefinition, SchemaLookupError, SectionSchema};
use ccv_transform::ValueCodec;

use crate::error::{Result, XmlError};
use crate::projector::{SECTION_ELEMENT, extract, section_element};
use crate::tree::{XmlElement, XmlNode};

pub const ROOT_ELEMENT: &str = "generic-cv:generic-cv";
const ROOT_LOCAL_NAME: &str = "generic-cv";
const GENERATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: XmlElement,
}

impl Document {
    /// An empty document for the schema's version and language, stamped
    /// with the local wall-clock time it was generated at.
    pub fn new(schema: &SchemaDefinition) -> Self {
        let root = XmlElement::new(ROOT_ELEMENT)
            .with_attribute("xmlns:generic-cv", schema.namespace())
            .with_attribute("lang", schema.language().code())
            .with_attribute(
                "dateTimeGenerated",
                Local::now().format(GENERATED_FORMAT).to_string(),
            );
        Self { root }
    }

    pub fn load(path: &Path, schema: &SchemaDefinition) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| XmlError::io(path, e))?;
        Self::parse_str(&text, &path.display().to_string(), schema)
    }

    /// Parse a document, checking that it belongs to the schema's version.
    pub fn parse_str(text: &str, origin: &str, schema: &SchemaDefinition) -> Result<Self> {
        let root = XmlElement::parse(text, origin)?;
        let parse_error = |message: String| XmlError::DocumentParse {
            origin: origin.to_string(),
            message,
        };
        if root.local_name() != ROOT_LOCAL_NAME {
            return Err(parse_error(format!(
                "root element is <{}>, expected <{ROOT_ELEMENT}>",
                root.name
            )));
        }
        let declaration = match root.name.split_once(':') {
            Some((prefix, _)) => format!("xmlns:{prefix}"),
            None => "xmlns".to_string(),
        };
        match root.attribute(&declaration) {
            Some(namespace) if namespace == schema.namespace() => {}
            Some(namespace) => {
                return Err(parse_error(format!(
                    "document namespace {namespace} does not match schema version {} ({})",
                    schema.version(),
                    schema.namespace()
                )));
            }
            None => return Err(parse_error("root element declares no generic-cv namespace".to_string())),
        }
        let document = Self { root };
        info!(
            origin,
            sections = document.root.elements().count(),
            "loaded CV document"
        );
        Ok(document)
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// Add one projected section instance.
    ///
    /// A non-repeatable section replaces the instance already present; a
    /// repeatable one is appended after the existing instances.
    pub fn add_section(&mut self, schema: &SchemaDefinition, section_id: &str, element: XmlElement) -> Result<()> {
        let section = schema
            .section_by_id(section_id)
            .ok_or_else(|| SchemaLookupError::section_not_found(section_id))?;
        if schema.is_dependent(section_id) {
            let parent = schema
                .ancestors(section_id)
                .into_iter()
                .rev()
                .find(|s| s.has_fields())
                .map_or_else(String::new, |s| s.label.clone());
            return Err(XmlError::DependentSection {
                section: section.label.clone(),
                parent,
            });
        }
        if element.local_name() != SECTION_ELEMENT || element.attribute("id") != Some(section_id) {
            return Err(XmlError::malformed(
                &section.label,
                format!("element to add is not an instance of {}", section.label),
            ));
        }

        let mut cursor = &mut self.root;
        for ancestor in schema.ancestors(section_id) {
            let index = match find_section(cursor, &ancestor.id) {
                Some(index) => index,
                None => {
                    debug!(section = %ancestor.label, "creating container section");
                    insert_ordered(schema, cursor, section_element(ancestor))
                }
            };
            cursor = match cursor.children.get_mut(index) {
                Some(XmlNode::Element(next)) => next,
                _ => return Err(XmlError::malformed(&ancestor.label, "container section vanished")),
            };
        }

        match find_section(cursor, section_id) {
            Some(index) if !section.repeatable => {
                debug!(section = %section.label, "replacing existing instance");
                cursor.children[index] = XmlNode::Element(element);
            }
            _ => {
                insert_ordered(schema, cursor, element);
            }
        }
        debug!(section = %section.label, "section added");
        Ok(())
    }

    /// First instance of a section, looked up by identifier or label.
    pub fn extract_section(&self, schema: &SchemaDefinition, key: &str) -> Result<&XmlElement> {
        let section = schema.resolve(key)?;
        self.instances_of(schema, section)
            .into_iter()
            .next()
            .ok_or_else(|| XmlError::SectionNotFound {
                section: section.label.clone(),
            })
    }

    /// Every instance of a section in document order; empty when absent.
    pub fn section_instances(&self, schema: &SchemaDefinition, key: &str) -> Result<Vec<&XmlElement>> {
        let section = schema.resolve(key)?;
        Ok(self.instances_of(schema, section))
    }

    /// Decode every instance of a section into records.
    pub fn section_records(
        &self,
        schema: &SchemaDefinition,
        codec: &ValueCodec,
        key: &str,
    ) -> Result<Vec<NormalizedRecord>> {
        let section = schema.resolve(key)?;
        let instances = self.instances_of(schema, section);
        if instances.is_empty() {
            return Err(XmlError::SectionNotFound {
                section: section.label.clone(),
            });
        }
        instances
            .into_iter()
            .map(|element| extract(schema, codec, element, section))
            .collect()
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(XmlError::write)?;
        self.root.write_to(&mut writer)?;
        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        Ok(bytes)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.serialize()?;
        std::fs::write(path, &bytes).map_err(|e| XmlError::io(path, e))?;
        info!(path = %path.display(), bytes = bytes.len(), "wrote CV document");
        Ok(())
    }

    fn instances_of<'d>(&'d self, schema: &SchemaDefinition, section: &SectionSchema) -> Vec<&'d XmlElement> {
        let mut level: Vec<&'d XmlElement> = vec![&self.root];
        for step in schema.ancestors(&section.id).into_iter().chain(std::iter::once(section)) {
            let id = step.id.as_str();
            level = level
                .into_iter()
                .flat_map(|element| element.elements().filter(move |child| is_section(child, id)))
                .collect();
        }
        level
    }
}

fn is_section(element: &XmlElement, id: &str) -> bool {
    element.local_name() == SECTION_ELEMENT && element.attribute("id") == Some(id)
}

/// Index in `parent.children` of the last instance of a section.
fn find_section(parent: &XmlElement, id: &str) -> Option<usize> {
    parent
        .children
        .iter()
        .rposition(|node| matches!(node, XmlNode::Element(element) if is_section(element, id)))
}

/// Insert a section before the first sibling the schema orders after it and
/// return its index. Elements the schema does not know keep their place.
fn insert_ordered(schema: &SchemaDefinition, parent: &mut XmlElement, element: XmlElement) -> usize {
    let order_of = |element: &XmlElement| {
        element
            .attribute("id")
            .and_then(|id| schema.section_by_id(id))
            .map(|section| section.order)
    };
    let index = match order_of(&element) {
        Some(order) => parent
            .children
            .iter()
            .position(|node| match node {
                XmlNode::Element(sibling) if sibling.local_name() == SECTION_ELEMENT => {
                    order_of(sibling).is_some_and(|sibling_order| sibling_order > order)
                }
                _ => false,
            })
            .unwrap_or(parent.children.len()),
        None => parent.children.len(),
    };
    parent.children.insert(index, XmlNode::Element(element));
    index
}
