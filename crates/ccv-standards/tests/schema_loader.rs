//! Tests against the bundled standards directory.

use ccv_model::{Constraint, DateGranularity, FieldType, Language, SchemaLookupError};
use ccv_standards::{StandardsError, load_default_schema, load_schema_dir};

#[test]
fn loads_bundled_schema() {
    let schema = load_default_schema(Language::English).expect("load schema");
    assert_eq!(schema.version(), "1.0.0");
    assert_eq!(schema.namespace(), "http://www.cihr-irsc.gc.ca/generic-cv/1.0.0");
    let roots: Vec<&str> = schema.roots().map(|s| s.label.as_str()).collect();
    assert_eq!(
        roots,
        vec!["Personal Information", "Education", "Activities", "Contributions"]
    );
}

#[test]
fn courses_taught_fields_in_declared_order() {
    let schema = load_default_schema(Language::English).expect("load schema");
    let section = schema.resolve("Courses Taught").expect("courses taught");
    assert_eq!(section.id, "9dc74140d0ff4b26a2d4a559bc9b5a2b");
    let labels: Vec<&str> = section.fields.iter().map(|f| f.label.as_str()).collect();
    insta::assert_debug_snapshot!(labels, @r#"
    [
        "Role",
        "Course Start Date",
        "Course End Date",
        "Organization",
        "Department",
        "Academic Session",
        "Course Code",
        "Course Title",
        "Course Level",
        "Number of Students",
    ]
    "#);
    let role = section.field("cefdb78ecd9e43fb8554d21e7d454132").expect("role by id");
    assert_eq!(role.label, "Role");
    assert!(section.constraints.iter().any(|c| matches!(c, Constraint::DateOrder { .. })));
}

#[test]
fn degree_type_keeps_typographic_apostrophe() {
    let schema = load_default_schema(Language::English).expect("load schema");
    let degrees = schema.resolve("Degrees").expect("degrees");
    let degree_type = degrees.field("Degree Type").expect("degree type");
    assert_eq!(degree_type.id, "a83a0af883924c57bb66107cc32b6d5e");
    let list = degree_type.choices().expect("choice field");
    assert!(list.contains("Bachelor\u{2019}s"));
    assert!(!list.contains("Bachelor's"));
    assert_eq!(
        degrees.field("Degree Received Date").map(|f| f.field_type.clone()),
        Ok(FieldType::Date(DateGranularity::YearMonth))
    );
}

#[test]
fn shared_labels_are_ambiguous() {
    let schema = load_default_schema(Language::English).expect("load schema");
    let err = schema.resolve("Funding Sources").expect_err("ambiguous");
    let SchemaLookupError::Ambiguous { candidates, .. } = err else {
        panic!("expected ambiguity, got {err:?}");
    };
    assert_eq!(candidates.len(), 2);
    let funding = schema
        .resolve_in("Funding Sources", "Presentations")
        .expect("qualified lookup");
    assert_eq!(schema.label_path(&funding.id), "Contributions > Presentations > Funding Sources");
}

#[test]
fn nested_record_sections_are_dependent() {
    let schema = load_default_schema(Language::English).expect("load schema");
    let supervisors = schema.resolve("Supervisors").expect("supervisors");
    assert!(schema.is_dependent(&supervisors.id));
    let degrees = schema.resolve("Degrees").expect("degrees");
    assert!(!schema.is_dependent(&degrees.id));
    let identification = schema.resolve("Identification").expect("identification");
    assert!(!identification.repeatable);
    assert!(degrees.repeatable);
}

#[test]
fn registry_rule_parameters_resolve() {
    let schema = load_default_schema(Language::English).expect("load schema");
    let articles = schema.resolve("Journal Articles").expect("journal articles");
    assert!(articles.constraints.iter().any(|c| matches!(
        c,
        Constraint::RequiredIf { other, value, .. }
            if other == "22de7fb1d587e550a230ad135e4d4d07" && value == "Published"
    )));
    let presentations = schema.resolve("Presentations").expect("presentations");
    assert!(presentations.constraints.iter().any(|c| matches!(
        c,
        Constraint::MutuallyExclusive { other, .. } if other == "d2139a609f54c5dfc0e5c3bf26948e22"
    )));
    let funding = schema
        .resolve_in("Funding Sources", "Presentations")
        .expect("qualified lookup");
    assert_eq!(funding.max_entries(), Some(5));
}

#[test]
fn organizations_come_from_the_reference_table() {
    let schema = load_default_schema(Language::English).expect("load schema");
    let courses = schema.resolve("Courses Taught").expect("courses taught");
    let organization = courses.field("Organization").expect("organization");
    let FieldType::Reference(table) = &organization.field_type else {
        panic!("expected a reference field, got {:?}", organization.field_type);
    };
    assert_eq!(table.label, "Organization");
    let dalhousie = table.entries().by_label("Dalhousie University").expect("entry");
    let linked: Vec<&str> = table
        .linked_with(&dalhousie.id)
        .expect("links")
        .iter()
        .map(|l| l.value)
        .collect();
    assert_eq!(linked, vec!["Canada", "Nova Scotia", "Dalhousie University"]);
}

#[test]
fn french_labels_are_loaded() {
    let schema = load_default_schema(Language::French).expect("load schema");
    let section = schema.resolve("Cours enseignés").expect("french label");
    assert_eq!(section.id, "9dc74140d0ff4b26a2d4a559bc9b5a2b");
    assert!(section.field("Titre du cours").is_ok());
}

#[test]
fn missing_directory_reports_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = load_schema_dir(dir.path(), Language::English).expect_err("no files");
    assert!(matches!(err, StandardsError::Io { .. }));
    assert!(err.to_string().contains("cv-lov.xml"));
}
