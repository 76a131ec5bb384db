#![deny(unsafe_code)]

//! Loads the registry's published schema into a [`SchemaDefinition`](ccv_model::SchemaDefinition).
//!
//! ```text
//! standards/
//! ├── cv.xml              # sections, fields, types, validator rules
//! ├── cv-lov.xml          # lists of values backing LOV fields
//! └── cv-ref-table.xml    # reference tables backing Reference fields
//! ```

pub mod error;
pub mod paths;
pub mod ref_tables;
pub mod schema_loader;
pub mod value_lists;

pub use crate::error::{Result, StandardsError};
pub use crate::paths::{REF_TABLE_FILE, SCHEMA_FILE, STANDARDS_ENV_VAR, VALUE_LIST_FILE, standards_root};
pub use crate::ref_tables::{load_reference_tables, parse_reference_tables};
pub use crate::schema_loader::{load_default_schema, load_schema, load_schema_dir, parse_schema};
pub use crate::value_lists::{ValueListSet, load_value_lists, parse_value_lists};
