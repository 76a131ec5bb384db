//! Per-type decode/encode between record text and typed values.
//!
//! Dispatch is on [`FieldType`]. Decoding trims surrounding whitespace and
//! maps blank input to `None`; it never guesses a value for input that does
//! not match the type's format.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use ccv_model::{
    BilingualText, ChoiceValue, DateGranularity, DateValue, ElapsedTime, FieldSchema, FieldType,
    Language, ListValue, RawValue, TimeUnit, TypedValue, ValueList,
};

use crate::error::CodecError;

/// Longest PubMed identifier accepted.
const PUBMED_MAX_DIGITS: usize = 8;

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATETIME_OUTPUT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecOptions {
    /// Match choice literals after folding typographic quotes and apostrophes
    /// to ASCII. The registry literal is always what gets emitted.
    pub normalize_punctuation: bool,
}

/// Text form of a value as written into XML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedValue {
    Text(String),
    Pair {
        english: Option<String>,
        french: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ValueCodec {
    language: Language,
    options: CodecOptions,
}

impl ValueCodec {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            options: CodecOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: CodecOptions) -> Self {
        self.options = options;
        self
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn options(&self) -> CodecOptions {
        self.options
    }

    /// Decode a loose value. `Ok(None)` means the value is blank.
    pub fn decode(&self, field: &FieldSchema, raw: &RawValue) -> Result<Option<TypedValue>, CodecError> {
        match raw {
            RawValue::Scalar(text) => self.decode_text(field, text),
            RawValue::Bilingual(pair) if field.is_bilingual() => {
                let text = BilingualText::new(clean(pair.english.as_deref()), clean(pair.french.as_deref()));
                Ok((!text.is_blank()).then_some(TypedValue::Bilingual(text)))
            }
            other => Err(CodecError::TypeMismatch {
                expected: field.field_type.to_string(),
                found: other.kind().to_string(),
            }),
        }
    }

    /// Decode scalar text. `Ok(None)` means the text is blank.
    pub fn decode_text(&self, field: &FieldSchema, text: &str) -> Result<Option<TypedValue>, CodecError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let value = match &field.field_type {
            FieldType::PlainText => TypedValue::Text(text.to_string()),
            FieldType::BilingualText => {
                let mut pair = BilingualText::default();
                match self.language {
                    Language::English => pair.english = Some(text.to_string()),
                    Language::French => pair.french = Some(text.to_string()),
                }
                TypedValue::Bilingual(pair)
            }
            FieldType::Number => TypedValue::Number(text.parse().map_err(|_| CodecError::InvalidNumber {
                value: text.to_string(),
            })?),
            FieldType::Date(granularity) => {
                TypedValue::Date(parse_date(text, *granularity).ok_or_else(|| CodecError::DateFormat {
                    value: text.to_string(),
                    expected: granularity.xml_format().to_string(),
                })?)
            }
            FieldType::DateTime => {
                TypedValue::DateTime(parse_datetime(text).ok_or_else(|| CodecError::InvalidDateTime {
                    value: text.to_string(),
                })?)
            }
            FieldType::ElapsedTime => {
                TypedValue::Elapsed(parse_elapsed(text).ok_or_else(|| CodecError::InvalidElapsedTime {
                    value: text.to_string(),
                })?)
            }
            FieldType::Identifier => {
                if !is_pubmed_id(text) {
                    return Err(CodecError::InvalidIdentifier {
                        value: text.to_string(),
                    });
                }
                TypedValue::Identifier(text.to_string())
            }
            FieldType::Choice(list) => TypedValue::Choice(self.match_choice(list, text)?),
            FieldType::Reference(table) => TypedValue::Reference(self.match_choice(table.entries(), text)?),
        };
        Ok(Some(value))
    }

    /// Decode a choice or reference stored in XML, where the value
    /// identifier is authoritative and the literal is informational.
    pub fn decode_choice_id(&self, field: &FieldSchema, id: &str, text: &str) -> Result<TypedValue, CodecError> {
        let wrap = match field.field_type {
            FieldType::Choice(_) => TypedValue::Choice,
            FieldType::Reference(_) => TypedValue::Reference,
            _ => {
                return Err(CodecError::TypeMismatch {
                    expected: field.field_type.to_string(),
                    found: "a list-of-values entry".to_string(),
                });
            }
        };
        let Some(list) = field.choices() else {
            return Err(CodecError::TypeMismatch {
                expected: field.field_type.to_string(),
                found: "a list-of-values entry".to_string(),
            });
        };
        match list.by_id(id.trim()) {
            Some(value) => Ok(wrap(ChoiceValue {
                id: value.id.clone(),
                label: value.label.clone(),
            })),
            None => Err(invalid_choice(list, text)),
        }
    }

    /// A literal published under several codes must be given by code.
    fn match_choice(&self, list: &ValueList, text: &str) -> Result<ChoiceValue, CodecError> {
        let mut found = list.all_by_label(text);
        if found.is_empty() && self.options.normalize_punctuation {
            let folded = fold_punctuation(text);
            found = list
                .values()
                .iter()
                .filter(|v| fold_punctuation(&v.label) == folded)
                .collect();
        }
        let to_choice = |v: &ListValue| ChoiceValue {
            id: v.id.clone(),
            label: v.label.clone(),
        };
        match found.as_slice() {
            [single] => Ok(to_choice(*single)),
            [] => list.by_id(text).map(to_choice).ok_or_else(|| invalid_choice(list, text)),
            several => Err(CodecError::AmbiguousChoice {
                value: text.to_string(),
                ids: several.iter().map(|v| v.id.clone()).collect(),
            }),
        }
    }

    /// Encode a typed value for the given field.
    pub fn encode(&self, field: &FieldSchema, value: &TypedValue) -> Result<EncodedValue, CodecError> {
        let text = match (&field.field_type, value) {
            (FieldType::PlainText, TypedValue::Text(text)) => text.clone(),
            (FieldType::BilingualText, TypedValue::Bilingual(pair)) => {
                return Ok(EncodedValue::Pair {
                    english: pair.english.clone(),
                    french: pair.french.clone(),
                });
            }
            (FieldType::Number, TypedValue::Number(n)) => n.to_string(),
            (FieldType::Date(granularity), TypedValue::Date(date)) if granularity_of(date) == *granularity => {
                date.to_string()
            }
            (FieldType::DateTime, TypedValue::DateTime(dt)) => dt.format(DATETIME_OUTPUT).to_string(),
            (FieldType::ElapsedTime, TypedValue::Elapsed(elapsed)) => elapsed.to_string(),
            (FieldType::Identifier, TypedValue::Identifier(id)) if is_pubmed_id(id) => id.clone(),
            (FieldType::Choice(list), TypedValue::Choice(choice)) => selected_label(list, choice)?,
            (FieldType::Reference(table), TypedValue::Reference(choice)) => selected_label(table.entries(), choice)?,
            (field_type, other) => {
                return Err(CodecError::TypeMismatch {
                    expected: field_type.to_string(),
                    found: format!("{other:?}"),
                });
            }
        };
        Ok(EncodedValue::Text(text))
    }
}

fn clean(text: Option<&str>) -> Option<String> {
    text.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string)
}

fn selected_label(list: &ValueList, choice: &ChoiceValue) -> Result<String, CodecError> {
    match list.by_id(&choice.id) {
        Some(entry) if entry.label == choice.label => Ok(entry.label.clone()),
        _ => Err(invalid_choice(list, &choice.label)),
    }
}

fn invalid_choice(list: &ValueList, value: &str) -> CodecError {
    CodecError::InvalidChoice {
        value: value.to_string(),
        accepted: list.labels().into_iter().map(str::to_string).collect(),
    }
}

fn granularity_of(date: &DateValue) -> DateGranularity {
    match date {
        DateValue::Year(_) => DateGranularity::Year,
        DateValue::YearMonth { .. } => DateGranularity::YearMonth,
        DateValue::MonthDay { .. } => DateGranularity::MonthDay,
        DateValue::Date(_) => DateGranularity::FullDate,
    }
}

/// Parse a date at exactly the given granularity.
///
/// Components are separated by `/` or `-` (not mixed); years have four
/// digits, months and days one or two.
pub fn parse_date(text: &str, granularity: DateGranularity) -> Option<DateValue> {
    let separator = if text.contains('/') { '/' } else { '-' };
    let parts: Vec<&str> = text.split(separator).collect();
    if parts
        .iter()
        .any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }
    fn short(part: &str) -> bool {
        part.len() <= 2
    }
    match (granularity, parts.as_slice()) {
        (DateGranularity::Year, [y]) if y.len() == 4 => Some(DateValue::Year(y.parse().ok()?)),
        (DateGranularity::YearMonth, [y, m]) if y.len() == 4 && short(m) => {
            let month: u32 = m.parse().ok()?;
            (1..=12).contains(&month).then_some(DateValue::YearMonth {
                year: y.parse().ok()?,
                month,
            })
        }
        (DateGranularity::MonthDay, [m, d]) if short(m) && short(d) => {
            let (month, day) = (m.parse().ok()?, d.parse().ok()?);
            // Leap year, so 02/29 is accepted.
            NaiveDate::from_ymd_opt(2000, month, day).map(|_| DateValue::MonthDay { month, day })
        }
        (DateGranularity::FullDate, [y, m, d]) if y.len() == 4 && short(m) && short(d) => {
            NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?).map(DateValue::Date)
        }
        _ => None,
    }
}

pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
}

/// `[+-]N unit`, e.g. `3 months` or `-1 year`.
pub fn parse_elapsed(text: &str) -> Option<ElapsedTime> {
    let mut parts = text.split_whitespace();
    let (amount, unit) = (parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    Some(ElapsedTime {
        amount: amount.parse().ok()?,
        unit: TimeUnit::parse(unit)?,
    })
}

pub fn is_pubmed_id(text: &str) -> bool {
    !text.is_empty()
        && text.len() <= PUBMED_MAX_DIGITS
        && !text.starts_with('0')
        && text.bytes().all(|b| b.is_ascii_digit())
}

/// Fold typographic quotes and apostrophes to their ASCII forms.
pub fn fold_punctuation(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{02BC}' | '\u{2032}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' => '"',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccv_model::RefTable;

    #[test]
    fn year_month_granularity_is_enforced() {
        assert_eq!(
            parse_date("2000/01", DateGranularity::YearMonth),
            Some(DateValue::YearMonth { year: 2000, month: 1 })
        );
        assert_eq!(
            parse_date("2000-1", DateGranularity::YearMonth),
            Some(DateValue::YearMonth { year: 2000, month: 1 })
        );
        assert_eq!(parse_date("2000/13", DateGranularity::YearMonth), None);
        assert_eq!(parse_date("2000", DateGranularity::YearMonth), None);
        assert_eq!(parse_date("2000/01/05", DateGranularity::YearMonth), None);
        assert_eq!(parse_date("2000/01-05", DateGranularity::FullDate), None);
    }

    #[test]
    fn full_dates_are_calendar_checked() {
        assert!(parse_date("2023-02-28", DateGranularity::FullDate).is_some());
        assert!(parse_date("2023-02-29", DateGranularity::FullDate).is_none());
        assert!(parse_date("02/29", DateGranularity::MonthDay).is_some());
        assert!(parse_date("04/31", DateGranularity::MonthDay).is_none());
    }

    #[test]
    fn elapsed_time_forms() {
        assert_eq!(
            parse_elapsed("-3 Months"),
            Some(ElapsedTime {
                amount: -3,
                unit: TimeUnit::Months
            })
        );
        assert_eq!(parse_elapsed("+1 day").map(|e| e.amount), Some(1));
        assert_eq!(parse_elapsed("3"), None);
        assert_eq!(parse_elapsed("three days"), None);
        assert_eq!(parse_elapsed("3 days ago"), None);
    }

    #[test]
    fn pubmed_grammar() {
        assert!(is_pubmed_id("12345678"));
        assert!(is_pubmed_id("7"));
        assert!(!is_pubmed_id("123456789"));
        assert!(!is_pubmed_id("0123"));
        assert!(!is_pubmed_id("PMC123"));
    }

    #[test]
    fn datetime_accepts_space_or_t() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(14, 30, 0));
        assert_eq!(parse_datetime("2024-05-01 14:30"), expected);
        assert_eq!(parse_datetime("2024-05-01T14:30:00"), expected);
        assert_eq!(parse_datetime("2024-05-01"), None);
    }

    fn listed(values: &[(&str, &str)]) -> ValueList {
        let mut list = ValueList::new("L", "Status");
        for (id, label) in values {
            list.add_value(ListValue {
                id: id.to_string(),
                label: label.to_string(),
            });
        }
        list
    }

    #[test]
    fn literal_under_several_codes_needs_the_code() {
        let field = FieldSchema::new(
            "f",
            "Status",
            FieldType::Choice(listed(&[("V1", "Published"), ("V2", "Published"), ("V3", "Submitted")])),
        );
        let codec = ValueCodec::default();
        let err = codec.decode_text(&field, "Published").expect_err("ambiguous");
        assert_eq!(
            err,
            CodecError::AmbiguousChoice {
                value: "Published".to_string(),
                ids: vec!["V1".to_string(), "V2".to_string()],
            }
        );
        let by_code = codec.decode_text(&field, "V2").expect("decode").expect("value");
        assert_eq!(
            by_code,
            TypedValue::Choice(ChoiceValue {
                id: "V2".to_string(),
                label: "Published".to_string(),
            })
        );
        assert_eq!(
            codec.decode_choice_id(&field, "V2", "Published").expect("stored id"),
            by_code
        );
        assert!(matches!(
            codec.decode_text(&field, "Submitted"),
            Ok(Some(TypedValue::Choice(ChoiceValue { ref id, .. }))) if id == "V3"
        ));
    }

    #[test]
    fn reference_entries_decode_and_encode_like_choices() {
        let mut table = RefTable::new("R", "Organization");
        table.add_entry(
            ListValue {
                id: "O1".to_string(),
                label: "Dalhousie University".to_string(),
            },
            vec!["Canada".to_string()],
        );
        let field = FieldSchema::new("org", "Organization", FieldType::Reference(table));
        let codec = ValueCodec::default();
        let value = codec
            .decode_text(&field, " Dalhousie University ")
            .expect("decode")
            .expect("value");
        assert!(matches!(&value, TypedValue::Reference(choice) if choice.id == "O1"));
        assert_eq!(
            codec.encode(&field, &value),
            Ok(EncodedValue::Text("Dalhousie University".to_string()))
        );
        assert!(matches!(
            codec.decode_text(&field, "Acadia University"),
            Err(CodecError::InvalidChoice { .. })
        ));
    }

    #[test]
    fn folding_only_touches_quotes() {
        assert_eq!(fold_punctuation("Bachelor\u{2019}s"), "Bachelor's");
        assert_eq!(fold_punctuation("\u{201C}x\u{201D} \u{2013}"), "\"x\" \u{2013}");
    }
}
