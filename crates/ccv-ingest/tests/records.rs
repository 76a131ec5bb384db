//! Record files against the bundled schema.

use std::path::Path;

use ccv_ingest::{IngestError, RecordFormat, SectionRecords, parse_records, read_records, render_records};
use ccv_model::{Language, RawValue, SchemaDefinition, SchemaLookupError};
use ccv_transform::{ValueCodec, normalize};

const COURSES_TAUGHT: &str = "9dc74140d0ff4b26a2d4a559bc9b5a2b";
const IDENTIFICATION: &str = "c789b445f7b7db9daf56d34293d887c8";

fn schema() -> SchemaDefinition {
    ccv_standards::load_default_schema(Language::English).expect("load schema")
}

fn yaml(text: &str, schema: &SchemaDefinition) -> Result<Vec<SectionRecords>, IngestError> {
    parse_records(text, RecordFormat::Yaml, Path::new("cv.yaml"), schema)
}

fn sections(records: &[SectionRecords]) -> Vec<(&str, usize)> {
    records
        .iter()
        .map(|r| (r.section_id.as_str(), r.instances.len()))
        .collect()
}

#[test]
fn explicit_headings_group_instances() {
    let schema = schema();
    let records = yaml(
        r#"
Identification:
  Family Name: Tremblay
  First Name: Marie
Courses Taught:
  - Course Title: Ecology
    Course Code: BIO301
    Number of Students: 42
  - Course Title:
      english: Genetics
      french: Génétique
"#,
        &schema,
    )
    .expect("parse");
    assert_eq!(sections(&records), vec![(IDENTIFICATION, 1), (COURSES_TAUGHT, 2)]);

    let courses = &records[1].instances;
    assert_eq!(courses[0].get("Number of Students"), Some(&RawValue::scalar("42")));
    assert!(matches!(courses[1].get("Course Title"), Some(RawValue::Bilingual(_))));

    let codec = ValueCodec::default();
    let section = schema.resolve("Courses Taught").expect("section");
    for instance in courses {
        normalize(&schema, &codec, section, &RawValue::record(instance.clone())).expect("valid course");
    }
}

#[test]
fn container_headings_descend_to_children() {
    let schema = schema();
    let records = yaml(
        r#"
Activities:
  Teaching Activities:
    Courses Taught:
      Course Title: Ecology
"#,
        &schema,
    )
    .expect("parse");
    assert_eq!(sections(&records), vec![(COURSES_TAUGHT, 1)]);

    let err = yaml("Activities:\n  Hobbies:\n    Name: chess\n", &schema).expect_err("unknown child");
    assert!(matches!(
        err,
        IngestError::Section {
            source: SchemaLookupError::NotFound { .. },
            ..
        }
    ));
}

#[test]
fn headingless_records_are_inferred() {
    let schema = schema();
    let records = yaml("Course Title: Ecology\nCourse Code: BIO301\n", &schema).expect("parse");
    assert_eq!(sections(&records), vec![(COURSES_TAUGHT, 1)]);

    let err = yaml("Favourite Colour: blue\n", &schema).expect_err("unknown keys");
    assert!(matches!(err, IngestError::Section { .. }));
}

#[test]
fn dependent_sections_need_their_parent() {
    let schema = schema();
    let err = yaml("Supervisors:\n  Supervisor Name: Dr. Roy\n", &schema).expect_err("dependent");
    assert!(matches!(err, IngestError::DependentSection { ref section, .. } if section.ends_with("Degrees > Supervisors")));

    let err = yaml(
        "Journal Articles > Funding Sources:\n  Funding Organization: NSERC\n",
        &schema,
    )
    .expect_err("dependent");
    assert!(matches!(err, IngestError::DependentSection { .. }));

    let err = yaml("Funding Sources:\n  Funding Organization: NSERC\n", &schema).expect_err("ambiguous");
    assert!(matches!(
        err,
        IngestError::Section {
            source: SchemaLookupError::Ambiguous { .. },
            ..
        }
    ));
}

#[test]
fn malformed_shapes_are_structural() {
    let schema = schema();
    let err = yaml("Courses Taught: Ecology\n", &schema).expect_err("scalar section");
    assert!(matches!(err, IngestError::Structural { .. }));

    let err = yaml("Courses Taught:\n  Course Title: [a, b]\n", &schema).expect_err("scalar list");
    assert!(err.to_string().contains("Course Title"));

    let err = yaml("Courses Taught: [\n", &schema).expect_err("syntax");
    assert!(matches!(err, IngestError::Parse { .. }));
}

#[test]
fn yaml_documents_and_toml_tables() {
    let schema = schema();
    let records = yaml(
        "Course Title: Ecology\n---\nFamily Name: Tremblay\nFirst Name: Marie\n---\n",
        &schema,
    )
    .expect("parse");
    assert_eq!(sections(&records), vec![(COURSES_TAUGHT, 1), (IDENTIFICATION, 1)]);

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("courses.toml");
    std::fs::write(
        &path,
        r#"
[["Courses Taught"]]
"Course Title" = "Ecology"
"Number of Students" = 42

[["Courses Taught"]]
"Course Title" = { english = "Genetics", french = "Génétique" }
"#,
    )
    .expect("write");
    let records = read_records(&path, &schema).expect("read");
    assert_eq!(sections(&records), vec![(COURSES_TAUGHT, 2)]);
    assert_eq!(
        records[0].instances[0].get("Number of Students"),
        Some(&RawValue::scalar("42"))
    );

    let err = read_records(&dir.path().join("notes.txt"), &schema).expect_err("format");
    assert!(matches!(err, IngestError::UnsupportedFormat { .. }));
}

#[test]
fn rendered_records_read_back_unchanged() {
    let schema = schema();
    let codec = ValueCodec::default();
    let section = schema.resolve("Degrees").expect("section");
    let records = yaml(
        r#"
Degrees:
  - Degree Type: "Master’s Thesis"
    Degree Name:
      english: MSc Ecology
      french: M. Sc. écologie
    Degree Start Date: 2008/09
    Supervisors:
      - Supervisor Name: Dr. Tremblay
        Start Date: 2009/01
      - Supervisor Name: Dr. Roy
"#,
        &schema,
    )
    .expect("parse");
    let normalized: Vec<_> = records[0]
        .instances
        .iter()
        .map(|raw| normalize(&schema, &codec, section, &RawValue::record(raw.clone())).expect("valid degree"))
        .collect();
    assert_eq!(normalized[0].subsections.len(), 2);

    let rendered = render_records(&schema, &codec, section, &normalized).expect("render");
    assert!(rendered.starts_with("Degrees:"));
    assert!(rendered.contains("Degree Type:"));
    assert!(rendered.contains("Supervisor Name: Dr. Roy"));

    let reread = yaml(&rendered, &schema).expect("reparse");
    let renormalized: Vec<_> = reread[0]
        .instances
        .iter()
        .map(|raw| normalize(&schema, &codec, section, &RawValue::record(raw.clone())).expect("valid degree"))
        .collect();
    assert_eq!(renormalized, normalized);
}
