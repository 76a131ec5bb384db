//! Empty record skeletons used to start new records.
//!
//! Rendered YAML follows the registry's own annotation style:
//!
//! ```yaml
//! Courses Taught:
//!     # [Type] LOV -- Instructor, Co-Instructor, Teaching Assistant, Guest Lecturer
//!     Role:
//!     # [Type] Bilingual -- text, or english/french pair
//!     # [Constraint] Must not be left blank.
//!     Course Title:
//! ```

use serde::Serialize;

use ccv_model::{SchemaDefinition, SectionSchema};

/// One field of a template; `value` is always empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateField {
    pub id: String,
    pub label: String,
    pub type_label: String,
    pub prompt: Option<String>,
    pub description: Option<String>,
    pub constraints: Vec<String>,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordTemplate {
    pub section_id: String,
    pub label: String,
    pub description: Option<String>,
    /// Section-level rules, e.g. date ordering.
    pub constraints: Vec<String>,
    pub fields: Vec<TemplateField>,
    pub subsections: Vec<RecordTemplate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateOptions {
    pub descriptions: bool,
    pub types: bool,
    pub constraints: bool,
    /// Write field identifiers instead of labels as keys.
    pub use_ids: bool,
    /// Comment lines are wrapped at this width.
    pub width: usize,
    /// Comments longer than this many lines are cut with ` ...`.
    pub max_lines: usize,
    pub indent: String,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            descriptions: true,
            types: true,
            constraints: true,
            use_ids: false,
            width: 80,
            max_lines: 2,
            indent: "    ".to_string(),
        }
    }
}

/// Build the skeleton of `section` and its child sections.
pub fn template(schema: &SchemaDefinition, section: &SectionSchema) -> RecordTemplate {
    let fields = section
        .fields
        .iter()
        .map(|field| TemplateField {
            id: field.id.clone(),
            label: field.label.clone(),
            type_label: field.field_type.type_label().to_string(),
            prompt: field.prompt(),
            description: field.description.clone(),
            constraints: section
                .constraints_for(&field.id)
                .map(|c| c.describe(section))
                .collect(),
            value: String::new(),
        })
        .collect();

    RecordTemplate {
        section_id: section.id.clone(),
        label: section.label.clone(),
        description: section.description.clone(),
        constraints: section
            .constraints
            .iter()
            .filter(|c| c.owner().is_none())
            .map(|c| c.describe(section))
            .collect(),
        fields,
        subsections: schema
            .children(section)
            .map(|child| template(schema, child))
            .collect(),
    }
}

impl RecordTemplate {
    /// Field identifiers in declared order.
    pub fn field_ids(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.id.as_str()).collect()
    }

    /// Render as a YAML document headed by the section label.
    pub fn render_yaml(&self, options: &TemplateOptions) -> String {
        let mut lines = Vec::new();
        self.render_into(&mut lines, options, 0);
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    fn render_into(&self, lines: &mut Vec<String>, options: &TemplateOptions, level: usize) {
        let indent = options.indent.repeat(level);
        if options.descriptions {
            if let Some(description) = &self.description {
                comment(lines, &indent, &format!("[Description] {description}"), options);
            }
        }
        if options.constraints {
            for rule in &self.constraints {
                comment(lines, &indent, &format!("[Constraint] {rule}"), options);
            }
        }
        lines.push(format!("{indent}{}:", self.key(options)));

        let inner = options.indent.repeat(level + 1);
        for field in &self.fields {
            if options.descriptions {
                if let Some(description) = &field.description {
                    comment(lines, &inner, &format!("[Description] {description}"), options);
                }
            }
            if options.types {
                let line = match &field.prompt {
                    Some(prompt) => format!("[Type] {} -- {prompt}", field.type_label),
                    None => format!("[Type] {}", field.type_label),
                };
                comment(lines, &inner, &line, options);
            }
            if options.constraints {
                for rule in &field.constraints {
                    comment(lines, &inner, &format!("[Constraint] {rule}"), options);
                }
            }
            let key = if options.use_ids { &field.id } else { &field.label };
            lines.push(format!("{inner}{}:", yaml_key(key)));
        }
        for child in &self.subsections {
            child.render_into(lines, options, level + 1);
        }
    }

    fn key(&self, options: &TemplateOptions) -> String {
        yaml_key(if options.use_ids { &self.section_id } else { &self.label })
    }
}

/// Quote keys YAML would otherwise misread, such as a leading `?`.
fn yaml_key(key: &str) -> String {
    let needs_quotes = key.starts_with(['?', '-', '[', '{', '&', '*', '!', '|', '>', '\'', '"', '%', '@', '`'])
        || key.contains(": ")
        || key.contains(" #")
        || key.ends_with(':');
    if needs_quotes {
        format!("\"{}\"", key.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        key.to_string()
    }
}

/// Wrap a comment at `options.width`, cutting after `options.max_lines`.
fn comment(lines: &mut Vec<String>, indent: &str, text: &str, options: &TemplateOptions) {
    let prefix = format!("{indent}# ");
    let room = options.width.saturating_sub(prefix.chars().count()).max(20);
    let mut wrapped: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > room {
            wrapped.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        wrapped.push(current);
    }
    if options.max_lines > 0 && wrapped.len() > options.max_lines {
        wrapped.truncate(options.max_lines);
        if let Some(last) = wrapped.last_mut() {
            last.push_str(" ...");
        }
    }
    lines.extend(wrapped.into_iter().map(|line| format!("{prefix}{line}")));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_comments_are_wrapped_and_cut() {
        let options = TemplateOptions {
            width: 30,
            ..TemplateOptions::default()
        };
        let mut lines = Vec::new();
        let text = "one two three four five six seven eight nine ten eleven twelve thirteen fourteen";
        comment(&mut lines, "", text, &options);
        assert_eq!(
            lines,
            vec![
                "# one two three four five six".to_string(),
                "# seven eight nine ten eleven ...".to_string(),
            ]
        );
    }

    #[test]
    fn awkward_keys_are_quoted() {
        assert_eq!(yaml_key("Invited?"), "Invited?");
        assert_eq!(yaml_key("? odd"), "\"? odd\"");
        assert_eq!(yaml_key("Conference / Event Name"), "Conference / Event Name");
    }
}
