//! `extract(project(record)) == record` for every field type.

use std::sync::LazyLock;

use chrono::NaiveDate;
use proptest::prelude::*;

use ccv_model::{
    BilingualText, ChoiceValue, DateGranularity, DateValue, ElapsedTime, FieldEntry, FieldSchema,
    FieldType, Language, ListValue, NormalizedRecord, RawBilingual, RawRecord, RawValue,
    SchemaDefinition, SectionSchema, TimeUnit, TypedValue, ValueList,
};
use ccv_transform::{ValueCodec, normalize};
use ccv_xml::{XmlElement, extract, project};

const STATUSES: [(&str, &str); 3] = [
    ("00000000000000000000000000000081", "In Progress"),
    ("00000000000000000000000000000082", "Completed"),
    ("00000000000000000000000000000072", "Master\u{2019}s Thesis"),
];

const FIELD_IDS: [&str; 11] = [
    "title", "note", "count", "year", "started", "birthday", "day", "at", "length", "pmid", "status",
];

static SCHEMA: LazyLock<SchemaDefinition> = LazyLock::new(|| {
    let mut statuses = ValueList::new("L1", "Status");
    for (id, label) in STATUSES {
        statuses.add_value(ListValue {
            id: id.to_string(),
            label: label.to_string(),
        });
    }
    let types = [
        FieldType::BilingualText,
        FieldType::PlainText,
        FieldType::Number,
        FieldType::Date(DateGranularity::Year),
        FieldType::Date(DateGranularity::YearMonth),
        FieldType::Date(DateGranularity::MonthDay),
        FieldType::Date(DateGranularity::FullDate),
        FieldType::DateTime,
        FieldType::ElapsedTime,
        FieldType::Identifier,
        FieldType::Choice(statuses),
    ];
    let mut parent = SectionSchema::new("S", "Everything");
    parent.repeatable = true;
    parent.fields = FIELD_IDS
        .iter()
        .zip(types)
        .zip(1..)
        .map(|((id, field_type), order)| FieldSchema::new(*id, id.to_uppercase(), field_type).with_order(order))
        .collect();

    let mut child = SectionSchema::new("C", "Funding");
    child.parent = Some("S".to_string());
    child.repeatable = true;
    child.fields = vec![FieldSchema::new("org", "Organization", FieldType::PlainText)];

    SchemaDefinition::new("1.0.0", Language::English, vec![parent, child])
});

fn text() -> impl Strategy<Value = String> {
    r#"[A-Za-z0-9&<>"'é][A-Za-z0-9 &<>"'é,.-]{0,24}"#.prop_map(|s| s.trim_end().to_string())
}

fn date() -> impl Strategy<Value = NaiveDate> {
    (1900..2100i32, 1..=12u32, 1..=28u32)
        .prop_filter_map("calendar date", |(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
}

fn value(index: usize) -> BoxedStrategy<TypedValue> {
    match index {
        0 => (proptest::option::of(text()), proptest::option::of(text()))
            .prop_filter("one half present", |(en, fr)| en.is_some() || fr.is_some())
            .prop_map(|(en, fr)| TypedValue::Bilingual(BilingualText::new(en, fr)))
            .boxed(),
        1 => text().prop_map(TypedValue::Text).boxed(),
        2 => any::<i64>().prop_map(TypedValue::Number).boxed(),
        3 => (1900..2100i32).prop_map(|y| TypedValue::Date(DateValue::Year(y))).boxed(),
        4 => (1900..2100i32, 1..=12u32)
            .prop_map(|(year, month)| TypedValue::Date(DateValue::YearMonth { year, month }))
            .boxed(),
        5 => (1..=12u32, 1..=28u32)
            .prop_map(|(month, day)| TypedValue::Date(DateValue::MonthDay { month, day }))
            .boxed(),
        6 => date().prop_map(|d| TypedValue::Date(DateValue::Date(d))).boxed(),
        7 => (date(), 0..24u32, 0..60u32, 0..60u32)
            .prop_filter_map("time of day", |(d, h, m, s)| d.and_hms_opt(h, m, s))
            .prop_map(TypedValue::DateTime)
            .boxed(),
        8 => (-1000..1000i64, 0..TimeUnit::ALL.len())
            .prop_map(|(amount, unit)| {
                TypedValue::Elapsed(ElapsedTime {
                    amount,
                    unit: TimeUnit::ALL[unit],
                })
            })
            .boxed(),
        9 => (1..100_000_000u32)
            .prop_map(|n| TypedValue::Identifier(n.to_string()))
            .boxed(),
        _ => (0..STATUSES.len())
            .prop_map(|i| {
                TypedValue::Choice(ChoiceValue {
                    id: STATUSES[i].0.to_string(),
                    label: STATUSES[i].1.to_string(),
                })
            })
            .boxed(),
    }
}

fn record() -> impl Strategy<Value = NormalizedRecord> {
    let fields: Vec<_> = (0..FIELD_IDS.len())
        .map(|i| proptest::option::of(value(i)))
        .collect();
    let child = proptest::option::of(text()).prop_map(|org| NormalizedRecord {
        section_id: "C".to_string(),
        fields: org
            .map(|org| FieldEntry {
                field_id: "org".to_string(),
                value: TypedValue::Text(org),
            })
            .into_iter()
            .collect(),
        subsections: Vec::new(),
    });
    (fields, proptest::collection::vec(child, 0..3)).prop_map(|(values, subsections)| NormalizedRecord {
        section_id: "S".to_string(),
        fields: FIELD_IDS
            .iter()
            .zip(values)
            .filter_map(|(id, value)| {
                value.map(|value| FieldEntry {
                    field_id: id.to_string(),
                    value,
                })
            })
            .collect(),
        subsections,
    })
}

proptest! {
    #[test]
    fn extract_inverts_project(record in record()) {
        let codec = ValueCodec::default();
        let section = SCHEMA.section_by_id("S").expect("section");
        let element = project(&SCHEMA, &codec, &record).expect("project");
        prop_assert_eq!(&extract(&SCHEMA, &codec, &element, section).expect("extract"), &record);

        let written = element.to_xml_string().expect("write");
        let reread = XmlElement::parse(&written, "generated").expect("parse");
        prop_assert_eq!(extract(&SCHEMA, &codec, &reread, section).expect("extract"), record);
    }
}

#[test]
fn normalized_degree_with_supervisors_round_trips() {
    let schema = ccv_standards::load_default_schema(Language::English).expect("load schema");
    let codec = ValueCodec::default();
    let section = schema.resolve("Degrees").expect("section");
    let supervisor = |name: &str| {
        RawRecord::new()
            .with("Supervisor Name", RawValue::scalar(name))
            .with("Start Date", RawValue::scalar("2009/01"))
    };
    let raw = RawValue::record(
        RawRecord::new()
            .with("Degree Type", RawValue::scalar("Master\u{2019}s Thesis"))
            .with(
                "Degree Name",
                RawValue::Bilingual(RawBilingual {
                    english: Some("MSc Ecology".to_string()),
                    french: Some("M. Sc. écologie".to_string()),
                }),
            )
            .with("Degree Start Date", RawValue::scalar("2008/09"))
            .with(
                "Supervisors",
                RawValue::Group(vec![supervisor("Dr. Tremblay"), supervisor("Dr. Roy")]),
            ),
    );
    let normalized = normalize(&schema, &codec, section, &raw).expect("valid");
    let element = project(&schema, &codec, &normalized).expect("project");
    let reread = XmlElement::parse(&element.to_xml_string().expect("write"), "degree").expect("parse");

    assert_eq!(extract(&schema, &codec, &reread, section).expect("extract"), normalized);
    let lov = reread
        .elements()
        .find(|f| f.attribute("label") == Some("Degree Type"))
        .and_then(|f| f.child("lov"))
        .expect("lov node");
    assert_eq!(lov.text(), "Master\u{2019}s Thesis");
}
