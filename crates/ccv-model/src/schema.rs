//! The process-wide schema handle.

use std::collections::BTreeMap;

use crate::error::SchemaLookupError;
use crate::language::Language;
use crate::section::SectionSchema;

/// Namespace prefix of generated documents; the schema version is appended.
pub const GENERIC_CV_NAMESPACE_BASE: &str = "http://www.cihr-irsc.gc.ca/generic-cv";

/// Immutable, loaded-once description of every section and field.
///
/// Callers pass `&SchemaDefinition` explicitly to every normalization and
/// projection call; the type holds no interior mutability, so one instance
/// can be shared freely across threads.
#[derive(Debug, Clone)]
pub struct SchemaDefinition {
    version: String,
    namespace: String,
    language: Language,
    sections: BTreeMap<String, SectionSchema>,
    by_label: BTreeMap<String, Vec<String>>,
    roots: Vec<String>,
}

impl SchemaDefinition {
    /// Index a set of sections.
    ///
    /// Parent/child links are taken from `SectionSchema::parent`; child lists
    /// are rebuilt here in `order` so callers need not fill them in.
    pub fn new(version: impl Into<String>, language: Language, sections: Vec<SectionSchema>) -> Self {
        let version = version.into();
        let namespace = format!("{GENERIC_CV_NAMESPACE_BASE}/{version}");
        Self::with_namespace(version, namespace, language, sections)
    }

    pub fn with_namespace(
        version: impl Into<String>,
        namespace: impl Into<String>,
        language: Language,
        sections: Vec<SectionSchema>,
    ) -> Self {
        let mut map: BTreeMap<String, SectionSchema> = BTreeMap::new();
        for mut section in sections {
            section.sort_fields();
            section.children.clear();
            map.insert(section.id.clone(), section);
        }

        let mut child_lists: BTreeMap<String, Vec<(u32, String)>> = BTreeMap::new();
        let mut roots: Vec<(u32, String)> = Vec::new();
        for section in map.values() {
            match section.parent.as_ref().filter(|p| map.contains_key(*p)) {
                Some(parent) => child_lists
                    .entry(parent.clone())
                    .or_default()
                    .push((section.order, section.id.clone())),
                None => roots.push((section.order, section.id.clone())),
            }
        }
        for (parent, mut children) in child_lists {
            children.sort();
            if let Some(section) = map.get_mut(&parent) {
                section.children = children.into_iter().map(|(_, id)| id).collect();
            }
        }
        roots.sort();

        let mut by_label: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for section in map.values() {
            by_label
                .entry(section.label.clone())
                .or_default()
                .push(section.id.clone());
        }

        Self {
            version: version.into(),
            namespace: namespace.into(),
            language,
            sections: map,
            by_label,
            roots: roots.into_iter().map(|(_, id)| id).collect(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// XML namespace of documents conforming to this schema version.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// All sections, keyed by identifier.
    pub fn sections(&self) -> impl Iterator<Item = &SectionSchema> {
        self.sections.values()
    }

    /// Top-level sections in declared order.
    pub fn roots(&self) -> impl Iterator<Item = &SectionSchema> {
        self.roots.iter().filter_map(|id| self.sections.get(id))
    }

    pub fn section_by_id(&self, id: &str) -> Option<&SectionSchema> {
        self.sections.get(id)
    }

    /// Resolve a section by identifier first, then by exact label.
    ///
    /// Two sections sharing a label are ambiguous; they can only be reached by
    /// identifier or through [`SchemaDefinition::resolve_in`].
    pub fn resolve(&self, key: &str) -> Result<&SectionSchema, SchemaLookupError> {
        if let Some(section) = self.sections.get(key) {
            return Ok(section);
        }
        let ids = self
            .by_label
            .get(key)
            .ok_or_else(|| SchemaLookupError::section_not_found(key))?;
        match ids.as_slice() {
            [id] => self
                .sections
                .get(id)
                .ok_or_else(|| SchemaLookupError::section_not_found(key)),
            _ => Err(SchemaLookupError::Ambiguous {
                kind: "section",
                key: key.to_string(),
                candidates: ids
                    .iter()
                    .map(|id| match self.parent_of(id) {
                        Some(parent) => format!("{id} (in {})", parent.label),
                        None => id.clone(),
                    })
                    .collect(),
            }),
        }
    }

    /// Resolve a section label qualified by the label of its parent.
    pub fn resolve_in(&self, label: &str, parent_label: &str) -> Result<&SectionSchema, SchemaLookupError> {
        let key = format!("{parent_label} > {label}");
        let ids = self
            .by_label
            .get(label)
            .ok_or_else(|| SchemaLookupError::section_not_found(&key))?;
        let mut matches = ids
            .iter()
            .filter_map(|id| self.sections.get(id))
            .filter(|s| self.parent_of(&s.id).is_some_and(|p| p.label == parent_label));
        match (matches.next(), matches.next()) {
            (Some(section), None) => Ok(section),
            (Some(_), Some(_)) => Err(SchemaLookupError::Ambiguous {
                kind: "section",
                key,
                candidates: ids.clone(),
            }),
            (None, _) => Err(SchemaLookupError::section_not_found(key)),
        }
    }

    pub fn parent_of(&self, id: &str) -> Option<&SectionSchema> {
        self.sections
            .get(id)
            .and_then(|s| s.parent.as_ref())
            .and_then(|p| self.sections.get(p))
    }

    /// Enclosing sections, outermost first (the section itself excluded).
    pub fn ancestors(&self, id: &str) -> Vec<&SectionSchema> {
        let mut chain = Vec::new();
        let mut current = self.parent_of(id);
        while let Some(section) = current {
            chain.push(section);
            current = self.parent_of(&section.id);
        }
        chain.reverse();
        chain
    }

    /// Child sections in declared order.
    pub fn children<'a>(&'a self, section: &'a SectionSchema) -> impl Iterator<Item = &'a SectionSchema> {
        section.children.iter().filter_map(|id| self.sections.get(id))
    }

    /// Resolve a child section of `section` by identifier, then label.
    pub fn child<'a>(&'a self, section: &'a SectionSchema, key: &str) -> Option<&'a SectionSchema> {
        self.children(section)
            .find(|c| c.id == key)
            .or_else(|| self.children(section).find(|c| c.label == key))
    }

    /// A section nested inside a record-bearing ancestor; its instances only
    /// exist inside an instance of that ancestor.
    pub fn is_dependent(&self, id: &str) -> bool {
        self.ancestors(id).iter().any(|s| s.has_fields())
    }

    /// Label path from the outermost ancestor, e.g. `Education > Degrees`.
    pub fn label_path(&self, id: &str) -> String {
        let mut labels: Vec<&str> = self.ancestors(id).iter().map(|s| s.label.as_str()).collect();
        if let Some(section) = self.sections.get(id) {
            labels.push(section.label.as_str());
        }
        labels.join(" > ")
    }

    /// Pick the section whose field and child labels cover every key.
    ///
    /// Used for records written without a section heading. Keys may be
    /// labels or identifiers. Dependent sections are never inferred.
    pub fn infer_section<S: AsRef<str>>(&self, keys: &[S]) -> Result<&SectionSchema, SchemaLookupError> {
        let joined = keys.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", ");
        if keys.is_empty() {
            return Err(SchemaLookupError::section_not_found(joined));
        }
        let candidates: Vec<&SectionSchema> = self
            .sections
            .values()
            .filter(|s| s.has_fields() && !self.is_dependent(&s.id))
            .filter(|s| {
                keys.iter().all(|key| {
                    let key = key.as_ref();
                    s.fields.iter().any(|f| f.matches(key)) || self.child(s, key).is_some()
                })
            })
            .collect();
        match candidates.as_slice() {
            [section] => Ok(section),
            [] => Err(SchemaLookupError::section_not_found(joined)),
            many => Err(SchemaLookupError::Ambiguous {
                kind: "section",
                key: joined,
                candidates: many.iter().map(|s| s.id.clone()).collect(),
            }),
        }
    }
}
