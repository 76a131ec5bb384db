//! Schema-driven transformation of CCV records.
//!
//! - **codec**: per-type decode/encode between text and [`TypedValue`](ccv_model::TypedValue)
//! - **normalize**: validation of loose records against a section, with batched errors
//! - **constraints**: evaluation of cross-field validator rules
//! - **template**: empty record skeletons for a section

pub mod codec;
pub mod constraints;
pub mod error;
pub mod normalize;
pub mod template;

pub use codec::{CodecOptions, EncodedValue, ValueCodec};
pub use error::{CodecError, NormalizeError};
pub use normalize::{Normalizer, normalize};
pub use template::{RecordTemplate, TemplateField, TemplateOptions, template};
