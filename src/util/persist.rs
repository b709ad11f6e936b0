//! JSON file persistence shared by the config and history stores
//!
//! Reads are tolerant: a missing or unparsable file is reported as absent.
//! Writes surface their errors to the caller.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Reads a JSON document, or `None` if the file is missing or corrupt
pub fn read_json(path: &Path) -> Option<serde_json::Value> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "No readable file, using defaults");
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt JSON file");
            None
        }
    }
}

/// Writes `value` pretty-printed (two-space indent) with a trailing newline
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let mut content = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
    content.push('\n');
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), "Saved JSON file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_none() {
        let temp = TempDir::new().unwrap();
        assert!(read_json(&temp.path().join("missing.json")).is_none());
    }

    #[test]
    fn test_corrupt_file_is_none() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(read_json(&path).is_none());
    }

    #[test]
    fn test_write_format() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("out.json");
        write_json(&path, &json!({"a": 1})).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "{\n  \"a\": 1\n}\n");
        assert_eq!(read_json(&path), Some(json!({"a": 1})));
    }

    #[test]
    fn test_write_error_surfaces() {
        let temp = TempDir::new().unwrap();
        // a directory cannot be overwritten by a file
        let result = write_json(temp.path(), &json!([]));
        assert!(result.is_err());
    }
}
