//! Library side of the `ccv` command-line tool.

pub mod config;
pub mod logging;
pub mod session;

pub use config::{CONFIG_FILE, CcvConfig};
pub use session::{FileReport, IngestReport, RejectedRecord, SectionReport, Session};
