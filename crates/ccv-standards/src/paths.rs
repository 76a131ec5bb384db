//! Standards directory path resolution.

use std::path::PathBuf;

/// Environment variable for overriding the standards directory.
pub const STANDARDS_ENV_VAR: &str = "CCV_SCHEMA_DIR";

/// Section and field definitions.
pub const SCHEMA_FILE: &str = "cv.xml";

/// Lists of values referenced by LOV fields.
pub const VALUE_LIST_FILE: &str = "cv-lov.xml";

/// Reference tables backing Reference fields. Optional.
pub const REF_TABLE_FILE: &str = "cv-ref-table.xml";

/// Get the standards root directory.
///
/// Resolution order:
/// 1. `CCV_SCHEMA_DIR` environment variable
/// 2. `standards/` directory relative to workspace root
pub fn standards_root() -> PathBuf {
    if let Ok(root) = std::env::var(STANDARDS_ENV_VAR) {
        return PathBuf::from(root);
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../standards")
}
