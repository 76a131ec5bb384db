//! Cross-field validator rules over one decoded section instance.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use ccv_model::{Constraint, SectionSchema, TypedValue};

/// Decoded values of one instance, keyed by field identifier.
pub type FieldValues = BTreeMap<String, TypedValue>;

/// A rule that did not hold, reported against `field`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

/// Evaluate value rules (length, exclusivity, date order).
///
/// Requirement rules are left to [`missing_required`]. A rule is skipped
/// when any field it reads failed to decode, so one bad value is reported
/// once.
pub fn check_values(
    section: &SectionSchema,
    values: &FieldValues,
    failed: &dyn Fn(&str) -> bool,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    for constraint in &section.constraints {
        if constraint.referenced_fields().into_iter().any(failed) {
            continue;
        }
        let broken = match constraint {
            Constraint::MaxLength { field, max } => values
                .get(field)
                .is_some_and(|v| v.text_lengths().into_iter().any(|len| len > *max)),
            Constraint::MutuallyExclusive { field, other } => {
                values.contains_key(field) && values.contains_key(other)
            }
            Constraint::DateOrder { start, end } => {
                match (
                    values.get(start).and_then(TypedValue::as_date),
                    values.get(end).and_then(TypedValue::as_date),
                ) {
                    (Some(s), Some(e)) => s.chronological_cmp(e) == Some(Ordering::Greater),
                    _ => false,
                }
            }
            Constraint::NotBlank { .. }
            | Constraint::RequiredIf { .. }
            | Constraint::MaxEntries { .. }
            | Constraint::Unchecked { .. } => false,
        };
        if broken {
            if let Some(field) = constraint.owner() {
                violations.push(Violation {
                    field: field.to_string(),
                    message: constraint.describe(section),
                });
            }
        }
    }
    violations
}

/// Evaluate entry-count rules for `count` instances of `section` held side
/// by side, under one parent record or at the top of a document.
///
/// A section that is not repeatable holds a single entry.
pub fn check_entries(section: &SectionSchema, count: usize) -> Option<Violation> {
    if count > 1 && !section.repeatable {
        return Some(Violation {
            field: section.label.clone(),
            message: format!("{} allows a single entry, found {count}", section.label),
        });
    }
    let max = section.max_entries()?;
    (count > max).then(|| Violation {
        field: section.label.clone(),
        message: format!(
            "{} has {count} entries: {}",
            section.label,
            Constraint::MaxEntries { max }.describe(section)
        ),
    })
}

/// Fields that must be present but are not: not-blank rules, then
/// required-if rules whose condition holds.
pub fn missing_required(
    section: &SectionSchema,
    values: &FieldValues,
    failed: &dyn Fn(&str) -> bool,
) -> Vec<Violation> {
    let mut missing = Vec::new();
    for constraint in &section.constraints {
        let required = match constraint {
            Constraint::NotBlank { field } => Some(field),
            Constraint::RequiredIf {
                field,
                other,
                condition,
                value,
            } if !failed(other) => {
                let actual = values.get(other).and_then(TypedValue::comparable_text);
                condition.holds(actual.as_deref(), value).then_some(field)
            }
            _ => None,
        };
        let Some(field) = required else {
            continue;
        };
        if values.contains_key(field) || failed(field) {
            continue;
        }
        if missing.iter().any(|v: &Violation| &v.field == field) {
            continue;
        }
        missing.push(Violation {
            field: field.clone(),
            message: constraint.describe(section),
        });
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccv_model::{Condition, DateGranularity, DateValue, FieldSchema, FieldType};

    fn section() -> SectionSchema {
        let mut section = SectionSchema::new("S", "Degrees");
        section.fields = vec![
            FieldSchema::new("start", "Start", FieldType::Date(DateGranularity::YearMonth)),
            FieldSchema::new("end", "End", FieldType::Date(DateGranularity::YearMonth)),
            FieldSchema::new("status", "Status", FieldType::PlainText),
            FieldSchema::new("year", "Year", FieldType::Date(DateGranularity::Year)),
        ];
        section.constraints = vec![
            Constraint::DateOrder {
                start: "start".to_string(),
                end: "end".to_string(),
            },
            Constraint::RequiredIf {
                field: "year".to_string(),
                other: "status".to_string(),
                condition: Condition::Equals,
                value: "Published".to_string(),
            },
        ];
        section
    }

    fn ym(year: i32, month: u32) -> TypedValue {
        TypedValue::Date(DateValue::YearMonth { year, month })
    }

    #[test]
    fn end_before_start_is_reported_on_end() {
        let mut values = FieldValues::new();
        values.insert("start".to_string(), ym(2010, 9));
        values.insert("end".to_string(), ym(2010, 5));
        let violations = check_values(&section(), &values, &|_| false);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "end");
        assert_eq!(violations[0].message, "End must not be before Start.");
        assert!(check_values(&section(), &values, &|f| f == "start").is_empty());
    }

    #[test]
    fn entry_counts_follow_repeatability_and_limit() {
        let mut funding = SectionSchema::new("F", "Funding Sources");
        funding.repeatable = true;
        funding.constraints = vec![Constraint::MaxEntries { max: 2 }];
        assert!(check_entries(&funding, 2).is_none());
        let violation = check_entries(&funding, 3).expect("over the limit");
        assert_eq!(violation.message, "Funding Sources has 3 entries: Must have 2 entries or fewer.");

        let mut single = section();
        single.repeatable = false;
        assert!(check_entries(&single, 1).is_none());
        let violation = check_entries(&single, 2).expect("single entry");
        assert_eq!(violation.message, "Degrees allows a single entry, found 2");
    }

    #[test]
    fn required_if_follows_condition() {
        let mut values = FieldValues::new();
        values.insert("status".to_string(), TypedValue::Text("Submitted".to_string()));
        assert!(missing_required(&section(), &values, &|_| false).is_empty());
        values.insert("status".to_string(), TypedValue::Text("Published".to_string()));
        let missing = missing_required(&section(), &values, &|_| false);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].message, "Required if Status is Published.");
    }
}
