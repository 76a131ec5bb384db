//! Data model for the Canadian Common CV (CCV) mapping engine.
//!
//! The schema side ([`SchemaDefinition`], [`SectionSchema`], [`FieldSchema`])
//! is loaded once and never mutated. The record side ([`RawValue`],
//! [`NormalizedRecord`], [`ValidationError`]) is created per textual record.

pub mod constraint;
pub mod error;
pub mod field;
pub mod language;
pub mod lov;
pub mod raw;
pub mod record;
pub mod reference;
pub mod schema;
pub mod section;
pub mod validation;
pub mod value;

pub use constraint::{Condition, Constraint};
pub use error::{SchemaLookupError, StructuralInputError};
pub use field::{DateGranularity, FieldSchema, FieldType};
pub use language::Language;
pub use lov::{ListValue, ValueList};
pub use raw::{RawBilingual, RawRecord, RawValue};
pub use record::{FieldEntry, NormalizedRecord};
pub use reference::{LinkedValue, RefColumn, RefTable};
pub use schema::SchemaDefinition;
pub use section::SectionSchema;
pub use validation::{ValidationError, ValidationErrorKind};
pub use value::{BilingualText, ChoiceValue, DateValue, ElapsedTime, TimeUnit, TypedValue};
