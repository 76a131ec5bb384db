//! Record file discovery.

use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::records::RecordFormat;

/// Lists record files (`.yaml`, `.yml`, `.toml`) under `path`.
///
/// Directories are walked recursively. `pattern` is a shell-style glob
/// matched against the whole path or the file name; `*` also crosses
/// directory separators. A file path is returned as is when it matches.
/// Results are sorted by path.
pub fn discover_record_files(path: &Path, pattern: Option<&str>) -> Result<Vec<PathBuf>> {
    let pattern = pattern
        .map(|p| {
            Pattern::new(p).map_err(|e| IngestError::Pattern {
                pattern: p.to_string(),
                message: e.to_string(),
            })
        })
        .transpose()?;
    let matches = |file: &Path| match &pattern {
        Some(pattern) => {
            pattern.matches_path(file)
                || file
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| pattern.matches(name))
        }
        None => true,
    };

    if path.is_file() {
        if RecordFormat::from_path(path).is_none() {
            return Err(IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
        return Ok(if matches(path) { vec![path.to_path_buf()] } else { Vec::new() });
    }
    if !path.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    walk(path, &mut files)?;
    files.retain(|file| matches(file));
    files.sort();
    debug!(dir = %path.display(), files = files.len(), "discovered record files");
    Ok(files)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();

        if path.is_dir() {
            walk(&path, files)?;
        } else if path.is_file() && RecordFormat::from_path(&path).is_some() {
            files.push(path);
        } else {
            debug!(path = %path.display(), "skipping non-record file");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().expect("tempdir");
        std::fs::create_dir(dir.path().join("teaching")).expect("subdir");
        for name in ["identification.yaml", "degrees.toml", "notes.txt", "teaching/courses.yml"] {
            std::fs::write(dir.path().join(name), "").expect("write");
        }
        dir
    }

    fn names(dir: &TempDir, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| {
                f.strip_prefix(dir.path())
                    .expect("inside dir")
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn walks_subdirectories_and_skips_other_files() {
        let dir = create_test_dir();
        let files = discover_record_files(dir.path(), None).expect("discover");
        assert_eq!(
            names(&dir, &files),
            vec!["degrees.toml", "identification.yaml", "teaching/courses.yml"]
        );
    }

    #[test]
    fn pattern_filters_by_name_or_path() {
        let dir = create_test_dir();
        let files = discover_record_files(dir.path(), Some("*.y*ml")).expect("discover");
        assert_eq!(names(&dir, &files), vec!["identification.yaml", "teaching/courses.yml"]);

        let files = discover_record_files(dir.path(), Some("*teaching*")).expect("discover");
        assert_eq!(names(&dir, &files), vec!["teaching/courses.yml"]);
    }

    #[test]
    fn single_file_and_missing_paths() {
        let dir = create_test_dir();
        let file = dir.path().join("degrees.toml");
        assert_eq!(discover_record_files(&file, None).expect("file"), vec![file.clone()]);
        assert!(discover_record_files(&file, Some("*.yaml")).expect("file").is_empty());

        let err = discover_record_files(&dir.path().join("notes.txt"), None).expect_err("txt");
        assert!(matches!(err, IngestError::UnsupportedFormat { .. }));
        let err = discover_record_files(&dir.path().join("absent"), None).expect_err("missing");
        assert!(matches!(err, IngestError::DirectoryNotFound { .. }));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let dir = create_test_dir();
        let err = discover_record_files(dir.path(), Some("[a")).expect_err("pattern");
        assert!(matches!(err, IngestError::Pattern { ref pattern, .. } if pattern == "[a"));
    }
}
