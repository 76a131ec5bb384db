//! A working CV document and the schema it is built against.
//!
//! Record files are read, normalized and projected one section instance at
//! a time. A record that fails validation is left out and reported with all
//! of its problems; the rest of the file still goes in. Instances beyond
//! what a section holds (a second instance of a single-entry section, or
//! more than its entry limit) are rejected the same way. Anything wrong
//! with a file as a whole (syntax, shape, unknown or dependent sections)
//! stops ingestion with the file named and the document untouched: a
//! file's instances are staged and only added once the whole file went
//! through.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, info_span, warn};

use ccv_ingest::{SectionRecords, discover_record_files, read_records, render_records, resolve_heading};
use ccv_model::{SchemaDefinition, SchemaLookupError, ValidationError};
use ccv_transform::{NormalizeError, Normalizer, ValueCodec};
use ccv_xml::{Document, project};

/// Outcome of ingesting one or more record files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub files: Vec<FileReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub sections: Vec<SectionReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionReport {
    /// Label path, e.g. `Activities > Teaching Activities > Courses Taught`.
    pub section: String,
    pub added: usize,
    pub rejected: Vec<RejectedRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRecord {
    /// 1-based position of the instance under its heading.
    pub instance: usize,
    pub errors: Vec<ValidationError>,
}

impl IngestReport {
    pub fn added(&self) -> usize {
        self.files.iter().map(FileReport::added).sum()
    }

    pub fn rejected(&self) -> usize {
        self.files.iter().map(FileReport::rejected).sum()
    }

    pub fn has_rejections(&self) -> bool {
        self.rejected() > 0
    }
}

impl FileReport {
    pub fn added(&self) -> usize {
        self.sections.iter().map(|s| s.added).sum()
    }

    pub fn rejected(&self) -> usize {
        self.sections.iter().map(|s| s.rejected.len()).sum()
    }

    pub fn has_rejections(&self) -> bool {
        self.rejected() > 0
    }
}

pub struct Session {
    schema: SchemaDefinition,
    codec: ValueCodec,
    document: Document,
}

impl Session {
    /// A session on an empty document.
    pub fn new(schema: SchemaDefinition, codec: ValueCodec) -> Self {
        let document = Document::new(&schema);
        Self {
            schema,
            codec,
            document,
        }
    }

    /// A session on an existing document.
    pub fn open(schema: SchemaDefinition, codec: ValueCodec, path: &Path) -> Result<Self> {
        let document =
            Document::load(path, &schema).with_context(|| format!("open CV document {}", path.display()))?;
        Ok(Self {
            schema,
            codec,
            document,
        })
    }

    pub fn schema(&self) -> &SchemaDefinition {
        &self.schema
    }

    pub fn codec(&self) -> &ValueCodec {
        &self.codec
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn ingest_file(&mut self, path: &Path) -> Result<FileReport> {
        let records = read_records(path, &self.schema)?;
        self.ingest_records(path, records)
    }

    /// Ingest every record file under `dir` (or `dir` itself when it is a
    /// file) whose path matches `pattern`.
    pub fn ingest_dir(&mut self, dir: &Path, pattern: Option<&str>) -> Result<IngestReport> {
        let files = discover_record_files(dir, pattern)?;
        if files.is_empty() {
            warn!(path = %dir.display(), "no record files found");
        }
        let mut report = IngestReport::default();
        for file in files {
            report.files.push(self.ingest_file(&file)?);
        }
        info!(
            files = report.files.len(),
            added = report.added(),
            rejected = report.rejected(),
            "ingest finished"
        );
        Ok(report)
    }

    /// Add already-parsed records; `path` names them in reports and errors.
    pub fn ingest_records(&mut self, path: &Path, records: Vec<SectionRecords>) -> Result<FileReport> {
        let span = info_span!("ingest", path = %path.display());
        let _guard = span.enter();
        let normalizer = Normalizer::new(&self.schema, self.codec);
        let mut report = FileReport {
            path: path.to_path_buf(),
            sections: Vec::new(),
        };

        let mut in_file: BTreeMap<&str, usize> = BTreeMap::new();
        for group in &records {
            *in_file.entry(group.section_id.as_str()).or_default() += group.instances.len();
        }
        let mut placed: BTreeMap<&str, usize> = BTreeMap::new();
        let mut staged = Vec::new();

        for group in &records {
            let section = self
                .schema
                .section_by_id(&group.section_id)
                .ok_or_else(|| SchemaLookupError::section_not_found(group.section_id.as_str()))?;
            let mut section_report = SectionReport {
                section: self.schema.label_path(&section.id),
                added: 0,
                rejected: Vec::new(),
            };
            let too_many = if section.repeatable {
                None
            } else {
                normalizer.check_entry_count(section, in_file.get(section.id.as_str()).copied().unwrap_or_default())
            };
            for (index, instance) in group.instances.iter().enumerate() {
                let (record, mut errors) = match normalizer.normalize_record(section, instance) {
                    Ok(record) => (Some(record), Vec::new()),
                    Err(NormalizeError::Invalid(errors)) => (None, errors),
                    Err(NormalizeError::Structural(e)) => {
                        return Err(e).with_context(|| format!("{}: {}", path.display(), section.label));
                    }
                };
                errors.extend(too_many.clone());
                if errors.is_empty() && section.repeatable {
                    let count = match placed.get(section.id.as_str()) {
                        Some(count) => count + 1,
                        None => self.document.section_instances(&self.schema, &section.id)?.len() + 1,
                    };
                    match normalizer.check_entry_count(section, count) {
                        Some(error) => errors.push(error),
                        None => {
                            placed.insert(section.id.as_str(), count);
                        }
                    }
                }
                match record {
                    Some(record) if errors.is_empty() => {
                        let element = project(&self.schema, &self.codec, &record)?;
                        staged.push((section, element));
                        section_report.added += 1;
                    }
                    _ => {
                        warn!(
                            section = %section.label,
                            instance = index + 1,
                            errors = errors.len(),
                            "record left out"
                        );
                        section_report.rejected.push(RejectedRecord {
                            instance: index + 1,
                            errors,
                        });
                    }
                }
            }
            report.sections.push(section_report);
        }

        let mut document = self.document.clone();
        for (section, element) in staged {
            document
                .add_section(&self.schema, &section.id, element)
                .with_context(|| format!("{}: add {}", path.display(), section.label))?;
        }
        self.document = document;
        info!(added = report.added(), rejected = report.rejected(), "file ingested");
        Ok(report)
    }

    pub fn export(&self, path: &Path) -> Result<()> {
        self.document
            .save(path)
            .with_context(|| format!("write CV document {}", path.display()))
    }

    /// Every instance of one section as a record file, headed by the section.
    ///
    /// `key` is an identifier, a label or `Parent > Child`.
    pub fn export_section(&self, key: &str) -> Result<String> {
        let section = resolve_heading(&self.schema, key)?;
        let records = self
            .document
            .section_records(&self.schema, &self.codec, &section.id)?;
        let text = render_records(&self.schema, &self.codec, section, &records)?;
        info!(section = %section.label, instances = records.len(), "section exported");
        Ok(text)
    }
}
