//! Owned XML element tree.
//!
//! Documents are read with `roxmltree` and written back with `quick-xml`.
//! Element and attribute names keep their prefixes, namespace declarations
//! are kept as `xmlns` attributes on the element that declared them, and
//! comments survive. Whitespace-only text is dropped on read and the writer
//! re-indents, so layout is normalized but content is not.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use roxmltree::Node;

use crate::error::{Result, XmlError};

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// Qualified name, e.g. `generic-cv:generic-cv`.
    pub name: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.push(child);
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Replace an existing attribute in place or append a new one.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let (name, value) = (name.into(), value.into());
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    /// Child elements, skipping text and comments.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    /// First child element with the given local name.
    pub fn child(&self, local_name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.local_name() == local_name)
    }

    /// Concatenated text of the direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Parse a document and return its root element.
    pub fn parse(text: &str, origin: &str) -> Result<XmlElement> {
        let doc = roxmltree::Document::parse(text).map_err(|e| XmlError::DocumentParse {
            origin: origin.to_string(),
            message: e.to_string(),
        })?;
        Ok(convert(doc.root_element()))
    }

    /// Serialize this element as an indented fragment without declaration.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        self.write_to(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(XmlError::write)
    }

    pub(crate) fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (name, value) in &self.attributes {
            start.push_attribute((name.as_str(), value.as_str()));
        }
        if self.children.is_empty() {
            return writer.write_event(Event::Empty(start)).map_err(XmlError::write);
        }
        writer.write_event(Event::Start(start)).map_err(XmlError::write)?;
        for child in &self.children {
            match child {
                XmlNode::Element(element) => element.write_to(writer)?,
                XmlNode::Text(text) => writer
                    .write_event(Event::Text(BytesText::new(text)))
                    .map_err(XmlError::write)?,
                XmlNode::Comment(text) => writer
                    .write_event(Event::Comment(BytesText::from_escaped(text.as_str())))
                    .map_err(XmlError::write)?,
            }
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(XmlError::write)
    }
}

fn convert(node: Node<'_, '_>) -> XmlElement {
    let tag = node.tag_name();
    let mut element = XmlElement::new(qualified_name(node, tag.namespace(), tag.name()));

    // Only declarations new at this element; inherited ones stay on the ancestor.
    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|parent| parent.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();
    for ns in node.namespaces() {
        if ns.name() == Some("xml") || inherited.contains(&(ns.name(), ns.uri())) {
            continue;
        }
        let name = match ns.name() {
            Some(prefix) => format!("xmlns:{prefix}"),
            None => "xmlns".to_string(),
        };
        element.attributes.push((name, ns.uri().to_string()));
    }
    for attr in node.attributes() {
        element.attributes.push((
            qualified_name(node, attr.namespace(), attr.name()),
            attr.value().to_string(),
        ));
    }

    for child in node.children() {
        if child.is_element() {
            element.children.push(XmlNode::Element(convert(child)));
        } else if child.is_text() {
            if let Some(text) = child.text().filter(|t| !t.trim().is_empty()) {
                element.children.push(XmlNode::Text(text.to_string()));
            }
        } else if child.is_comment() {
            if let Some(text) = child.text() {
                element.children.push(XmlNode::Comment(text.to_string()));
            }
        }
    }
    element
}

fn qualified_name(node: Node<'_, '_>, namespace: Option<&str>, local: &str) -> String {
    match namespace {
        Some(XML_NAMESPACE) => format!("xml:{local}"),
        Some(uri) => match node.lookup_prefix(uri) {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local}"),
            _ => local.to_string(),
        },
        None => local.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_comments_and_escapes_survive() {
        let text = r#"<cv:doc xmlns:cv="urn:cv" lang="en">
  <!-- kept -->
  <cv:item xml:lang="fr" note="a &amp; b">x &lt; y</cv:item>
  <plain/>
</cv:doc>"#;
        let root = XmlElement::parse(text, "inline").expect("parse");
        assert_eq!(root.name, "cv:doc");
        assert_eq!(root.local_name(), "doc");
        assert_eq!(root.attribute("xmlns:cv"), Some("urn:cv"));
        assert!(matches!(&root.children[0], XmlNode::Comment(c) if c == " kept "));

        let item = root.child("item").expect("item");
        assert_eq!(item.attribute("xml:lang"), Some("fr"));
        assert_eq!(item.attribute("note"), Some("a & b"));
        assert_eq!(item.text(), "x < y");
        assert_eq!(item.attribute("xmlns:cv"), None);

        let written = root.to_xml_string().expect("write");
        let reread = XmlElement::parse(&written, "written").expect("reparse");
        assert_eq!(reread, root);
    }

    #[test]
    fn text_stays_inline_when_indenting() {
        let element = XmlElement::new("field")
            .with_attribute("id", "f1")
            .with_child(XmlElement::new("value").with_text("2001/05"));
        let written = element.to_xml_string().expect("write");
        assert_eq!(written, "<field id=\"f1\">\n  <value>2001/05</value>\n</field>");
    }

    #[test]
    fn malformed_input_is_a_parse_error() {
        let err = XmlElement::parse("<a><b></a>", "broken.xml").expect_err("mismatched tags");
        assert!(matches!(err, XmlError::DocumentParse { ref origin, .. } if origin == "broken.xml"));
    }
}
