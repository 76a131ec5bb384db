//! CCV record file handling.
//!
//! This crate reads the YAML and TOML files people edit into loose
//! [`RawRecord`](ccv_model::RawRecord)s grouped by section, and writes
//! normalized records back out in the same shape.
//!
//! # Features
//!
//! - **Discovery**: recursive listing of record files with glob filtering
//! - **Records**: explicit, container and implicit section headings
//! - **Rendering**: records as a YAML file that reads back to the same records
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use ccv_ingest::{discover_record_files, read_records};
//!
//! let schema = ccv_standards::load_default_schema(Language::English)?;
//! for file in discover_record_files(Path::new("cv"), Some("*.yaml"))? {
//!     for section in read_records(&file, &schema)? {
//!         println!("{}: {} instance(s)", section.section_id, section.instances.len());
//!     }
//! }
//! ```

mod discovery;
mod error;
mod records;
mod render;

// === Error Types ===
pub use error::{IngestError, Result};

// === Discovery ===
pub use discovery::discover_record_files;

// === Record Files ===
pub use records::{RecordFormat, SectionRecords, parse_records, read_records, resolve_heading};

// === Rendering ===
pub use render::{heading, render_records};
