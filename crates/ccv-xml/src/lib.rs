//! generic-cv XML for CCV records.
//!
//! - **tree**: owned element tree, read with `roxmltree` and written with `quick-xml`
//! - **projector**: [`NormalizedRecord`](ccv_model::NormalizedRecord) to `<section>` elements and back
//! - **document**: loading, section assembly and serialization of whole documents

#![deny(unsafe_code)]

pub mod document;
pub mod error;
pub mod projector;
pub mod tree;

pub use document::{Document, ROOT_ELEMENT};
pub use error::{Result, XmlError};
pub use projector::{extract, project, section_element};
pub use tree::{XmlElement, XmlNode};
