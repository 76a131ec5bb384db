//! Canonical typed values carried by normalized records.

use std::cmp::Ordering;
use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// English/French text pair. Either half may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilingualText {
    pub english: Option<String>,
    pub french: Option<String>,
}

impl BilingualText {
    pub fn new(english: Option<String>, french: Option<String>) -> Self {
        Self { english, french }
    }

    pub fn is_blank(&self) -> bool {
        self.english.is_none() && self.french.is_none()
    }

    /// Both halves that are present.
    pub fn halves(&self) -> impl Iterator<Item = &str> {
        self.english.iter().chain(self.french.iter()).map(String::as_str)
    }
}

/// Selected literal of a Choice field, or entry of a Reference field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceValue {
    /// Registry identifier of the literal.
    pub id: String,
    /// Literal exactly as published by the registry.
    pub label: String,
}

/// A calendar value at the granularity declared by the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateValue {
    Year(i32),
    YearMonth { year: i32, month: u32 },
    MonthDay { month: u32, day: u32 },
    Date(NaiveDate),
}

impl DateValue {
    pub fn year(&self) -> Option<i32> {
        match self {
            DateValue::Year(year) | DateValue::YearMonth { year, .. } => Some(*year),
            DateValue::MonthDay { .. } => None,
            DateValue::Date(date) => Some(date.year()),
        }
    }

    pub fn month(&self) -> Option<u32> {
        match self {
            DateValue::Year(_) => None,
            DateValue::YearMonth { month, .. } | DateValue::MonthDay { month, .. } => Some(*month),
            DateValue::Date(date) => Some(date.month()),
        }
    }

    /// Sort key padded with the earliest missing component. Month/day values
    /// carry no year and have no absolute position.
    fn key(&self) -> Option<(i32, u32, u32)> {
        match self {
            DateValue::Year(year) => Some((*year, 1, 1)),
            DateValue::YearMonth { year, month } => Some((*year, *month, 1)),
            DateValue::MonthDay { .. } => None,
            DateValue::Date(date) => Some((date.year(), date.month(), date.day())),
        }
    }

    /// Chronological comparison of two values. Values at different
    /// granularities compare on their common prefix.
    pub fn chronological_cmp(&self, other: &DateValue) -> Option<Ordering> {
        if let (DateValue::MonthDay { month: m1, day: d1 }, DateValue::MonthDay { month: m2, day: d2 }) =
            (self, other)
        {
            return Some((m1, d1).cmp(&(m2, d2)));
        }
        let (a, b) = (self.key()?, other.key()?);
        let depth = self.depth().min(other.depth());
        let ordering = match depth {
            1 => a.0.cmp(&b.0),
            2 => (a.0, a.1).cmp(&(b.0, b.1)),
            _ => a.cmp(&b),
        };
        Some(ordering)
    }

    fn depth(&self) -> u8 {
        match self {
            DateValue::Year(_) => 1,
            DateValue::YearMonth { .. } | DateValue::MonthDay { .. } => 2,
            DateValue::Date(_) => 3,
        }
    }
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateValue::Year(year) => write!(f, "{year:04}"),
            DateValue::YearMonth { year, month } => write!(f, "{year:04}/{month:02}"),
            DateValue::MonthDay { month, day } => write!(f, "{month:02}/{day:02}"),
            DateValue::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Years,
    Months,
    Weeks,
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl TimeUnit {
    pub const ALL: [TimeUnit; 7] = [
        TimeUnit::Years,
        TimeUnit::Months,
        TimeUnit::Weeks,
        TimeUnit::Days,
        TimeUnit::Hours,
        TimeUnit::Minutes,
        TimeUnit::Seconds,
    ];

    /// Plural name used when encoding.
    pub const fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Years => "years",
            TimeUnit::Months => "months",
            TimeUnit::Weeks => "weeks",
            TimeUnit::Days => "days",
            TimeUnit::Hours => "hours",
            TimeUnit::Minutes => "minutes",
            TimeUnit::Seconds => "seconds",
        }
    }

    /// Accepts singular or plural, case-insensitive.
    pub fn parse(raw: &str) -> Option<Self> {
        let lower = raw.trim().to_ascii_lowercase();
        let singular = lower.strip_suffix('s').unwrap_or(&lower);
        TimeUnit::ALL
            .into_iter()
            .find(|unit| unit.as_str().strip_suffix('s') == Some(singular))
    }
}

/// A signed duration with its unit, e.g. `-3 months`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElapsedTime {
    pub amount: i64,
    pub unit: TimeUnit,
}

impl fmt::Display for ElapsedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.unit.as_str())
    }
}

/// Canonical value of one field after decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypedValue {
    Text(String),
    Bilingual(BilingualText),
    Number(i64),
    Date(DateValue),
    DateTime(NaiveDateTime),
    Elapsed(ElapsedTime),
    Choice(ChoiceValue),
    Reference(ChoiceValue),
    Identifier(String),
}

impl TypedValue {
    pub fn as_date(&self) -> Option<&DateValue> {
        match self {
            TypedValue::Date(date) => Some(date),
            _ => None,
        }
    }

    /// Text used for comparisons in required-if rules: the literal for
    /// choices, the schema-language text otherwise.
    pub fn comparable_text(&self) -> Option<String> {
        match self {
            TypedValue::Text(text) | TypedValue::Identifier(text) => Some(text.clone()),
            TypedValue::Bilingual(pair) => pair.halves().next().map(str::to_string),
            TypedValue::Number(n) => Some(n.to_string()),
            TypedValue::Date(date) => Some(date.to_string()),
            TypedValue::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            TypedValue::Elapsed(elapsed) => Some(elapsed.to_string()),
            TypedValue::Choice(choice) | TypedValue::Reference(choice) => Some(choice.label.clone()),
        }
    }

    /// Character counts of every text part, for max-length rules.
    pub fn text_lengths(&self) -> Vec<usize> {
        match self {
            TypedValue::Text(text) | TypedValue::Identifier(text) => vec![text.chars().count()],
            TypedValue::Bilingual(pair) => pair.halves().map(|h| h.chars().count()).collect(),
            _ => Vec::new(),
        }
    }
}
