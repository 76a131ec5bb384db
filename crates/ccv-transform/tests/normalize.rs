//! Normalization against the bundled schema.

use ccv_model::{
    ChoiceValue, DateValue, Language, RawBilingual, RawRecord, RawValue, SchemaDefinition,
    TypedValue, ValidationErrorKind,
};
use ccv_transform::{CodecOptions, NormalizeError, ValueCodec, normalize};

fn schema() -> SchemaDefinition {
    ccv_standards::load_default_schema(Language::English).expect("load schema")
}

fn record(pairs: &[(&str, &str)]) -> RawValue {
    RawValue::record(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), RawValue::scalar(*v)))
            .collect(),
    )
}

fn validation_errors(result: Result<ccv_model::NormalizedRecord, NormalizeError>) -> Vec<ccv_model::ValidationError> {
    match result {
        Err(NormalizeError::Invalid(errors)) => errors,
        other => panic!("expected validation errors, got {other:?}"),
    }
}

#[test]
fn two_invalid_fields_yield_exactly_two_errors() {
    let schema = schema();
    let section = schema
        .resolve("Student/Postdoctoral Supervision")
        .expect("section");
    let raw = record(&[("Degree Name", ""), ("Student Degree Status", "Finished")]);
    let errors = validation_errors(normalize(&schema, &ValueCodec::default(), section, &raw));

    assert_eq!(errors.len(), 2, "{errors:#?}");
    let invalid = errors
        .iter()
        .find(|e| e.field == "Student Degree Status")
        .expect("choice error");
    assert_eq!(
        invalid.kind,
        ValidationErrorKind::InvalidChoice {
            accepted: vec!["In Progress".to_string(), "Completed".to_string()]
        }
    );
    assert_eq!(invalid.raw.as_deref(), Some("Finished"));
    let missing = errors
        .iter()
        .find(|e| e.field == "Degree Name")
        .expect("required error");
    assert_eq!(missing.kind, ValidationErrorKind::MissingRequired);
    assert_eq!(missing.section, "Activities > Supervisory Activities > Student/Postdoctoral Supervision");
}

#[test]
fn absent_required_field_blocks_the_record() {
    let schema = schema();
    let section = schema.resolve("Courses Taught").expect("section");
    let raw = record(&[("Course Code", "BIO101")]);
    let errors = validation_errors(normalize(&schema, &ValueCodec::default(), section, &raw));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "Course Title");
    assert_eq!(errors[0].kind, ValidationErrorKind::MissingRequired);
    assert_eq!(errors[0].raw, None);
}

#[test]
fn valid_record_is_ordered_by_schema() {
    let schema = schema();
    let section = schema.resolve("Degrees").expect("section");
    let raw = record(&[
        ("Degree Received Date", "2012/05"),
        ("Degree Name", "BSc Biology"),
        ("Degree Type", "Bachelor\u{2019}s"),
        ("Degree Start Date", "2008-09"),
    ]);
    let normalized = normalize(&schema, &ValueCodec::default(), section, &raw).expect("valid");
    let order: Vec<&str> = normalized
        .fields
        .iter()
        .filter_map(|f| section.field_by_id(&f.field_id))
        .map(|f| f.label.as_str())
        .collect();
    assert_eq!(
        order,
        vec!["Degree Type", "Degree Name", "Degree Start Date", "Degree Received Date"]
    );
    assert_eq!(
        normalized.get("a83a0af883924c57bb66107cc32b6d5e"),
        Some(&TypedValue::Choice(ChoiceValue {
            id: "00000000000000000000000000000071".to_string(),
            label: "Bachelor\u{2019}s".to_string(),
        }))
    );
    let start = section.field("Degree Start Date").expect("field");
    assert_eq!(
        normalized.get(&start.id),
        Some(&TypedValue::Date(DateValue::YearMonth { year: 2008, month: 9 }))
    );
}

#[test]
fn ascii_apostrophe_needs_the_opt_in() {
    let schema = schema();
    let section = schema.resolve("Degrees").expect("section");
    let raw = record(&[("Degree Name", "BSc"), ("Degree Type", "Bachelor's")]);

    let strict = validation_errors(normalize(&schema, &ValueCodec::default(), section, &raw));
    assert!(matches!(strict[0].kind, ValidationErrorKind::InvalidChoice { .. }));

    let lenient = ValueCodec::new(Language::English).with_options(CodecOptions {
        normalize_punctuation: true,
    });
    let normalized = normalize(&schema, &lenient, section, &raw).expect("folded");
    assert_eq!(
        normalized.get("a83a0af883924c57bb66107cc32b6d5e"),
        Some(&TypedValue::Choice(ChoiceValue {
            id: "00000000000000000000000000000071".to_string(),
            label: "Bachelor\u{2019}s".to_string(),
        }))
    );
}

#[test]
fn date_errors_and_date_order_are_batched() {
    let schema = schema();
    let section = schema.resolve("Degrees").expect("section");
    let raw = record(&[
        ("Degree Type", "Doctorate"),
        ("Degree Name", "BSc"),
        ("Degree Start Date", "2000/13"),
        ("Degree Received Date", "1999/01"),
        ("Honours", "yes"),
    ]);
    let errors = validation_errors(normalize(&schema, &ValueCodec::default(), section, &raw));
    let kinds: Vec<&ValidationErrorKind> = errors.iter().map(|e| &e.kind).collect();
    // Date order is not checked while the start date fails to decode.
    assert_eq!(
        kinds,
        vec![
            &ValidationErrorKind::DateFormat {
                expected: "yyyy/MM".to_string()
            },
            &ValidationErrorKind::UnknownField,
        ]
    );

    let raw = record(&[
        ("Degree Type", "Doctorate"),
        ("Degree Name", "BSc"),
        ("Degree Start Date", "2000/09"),
        ("Degree Received Date", "1999/01"),
    ]);
    let errors = validation_errors(normalize(&schema, &ValueCodec::default(), section, &raw));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "Degree Received Date");
    assert_eq!(errors[0].kind, ValidationErrorKind::ConstraintViolated);
}

#[test]
fn required_if_and_mutual_exclusion() {
    let schema = schema();
    let articles = schema.resolve("Journal Articles").expect("section");
    let raw = record(&[("Article Title", "On Things"), ("Publishing Status", "Published")]);
    let errors = validation_errors(normalize(&schema, &ValueCodec::default(), articles, &raw));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "Year");
    assert!(errors[0].message.contains("Required if Publishing Status is Published"));

    let raw = record(&[("Article Title", "On Things"), ("Publishing Status", "Submitted")]);
    assert!(normalize(&schema, &ValueCodec::default(), articles, &raw).is_ok());

    let presentations = schema.resolve("Presentations").expect("section");
    let raw = record(&[
        ("Presentation Title", "Talk"),
        ("City", "Ottawa"),
        ("Online Event URL", "https://example.org/talk"),
    ]);
    let errors = validation_errors(normalize(&schema, &ValueCodec::default(), presentations, &raw));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ValidationErrorKind::ConstraintViolated);
    assert_eq!(errors[0].message, "Mutually exclusive with City.");
}

#[test]
fn bilingual_pairs_and_child_sections() {
    let schema = schema();
    let section = schema.resolve("Degrees").expect("section");
    let supervisor = RawRecord::new()
        .with("Supervisor Name", RawValue::scalar("Dr. Tremblay"))
        .with("Start Date", RawValue::scalar("2009/01"));
    let raw = RawValue::record(
        RawRecord::new()
            .with("Degree Type", RawValue::scalar("Doctorate"))
            .with(
                "Degree Name",
                RawValue::Bilingual(RawBilingual {
                    english: Some("Bachelor of Science".to_string()),
                    french: Some("Baccalauréat en sciences".to_string()),
                }),
            )
            .with("Supervisors", RawValue::Group(vec![supervisor.clone(), supervisor])),
    );
    let normalized = normalize(&schema, &ValueCodec::default(), section, &raw).expect("valid");
    assert_eq!(normalized.subsections.len(), 2);
    let degree_name = section.field("Degree Name").expect("field");
    let Some(TypedValue::Bilingual(pair)) = normalized.get(&degree_name.id) else {
        panic!("expected a bilingual value");
    };
    assert_eq!(pair.french.as_deref(), Some("Baccalauréat en sciences"));
}

#[test]
fn non_mapping_input_is_structural() {
    let schema = schema();
    let section = schema.resolve("Degrees").expect("section");
    let codec = ValueCodec::default();
    assert!(matches!(
        normalize(&schema, &codec, section, &RawValue::scalar("BSc")),
        Err(NormalizeError::Structural(_))
    ));
    let raw = RawValue::record(
        RawRecord::new()
            .with("Degree Name", RawValue::scalar("BSc"))
            .with("Supervisors", RawValue::scalar("Dr. Tremblay")),
    );
    let err = normalize(&schema, &codec, section, &raw).expect_err("structural");
    assert!(matches!(err, NormalizeError::Structural(_)));
    assert!(err.to_string().contains("Supervisors"));
}

#[test]
fn duplicate_keys_are_reported() {
    let schema = schema();
    let section = schema.resolve("Courses Taught").expect("section");
    let raw = RawValue::record(
        RawRecord::new()
            .with("Course Title", RawValue::scalar("Biology"))
            .with("9dc74140d0ff4b26a2d4a559bc9b5a2b", RawValue::scalar("x"))
            .with("8049e5caec1b2aea9fd5b7ee27158264", RawValue::scalar("Biology")),
    );
    let errors = validation_errors(normalize(&schema, &ValueCodec::default(), section, &raw));
    let kinds: Vec<&str> = errors.iter().map(|e| e.kind.code()).collect();
    assert_eq!(kinds, vec!["unknown_field", "duplicate_field"]);
}
