//! Directory listing for the input-file picker
//!
//! Non-recursive: only regular files in the given directory whose extension
//! aria2c can take as input.

use std::fs;
use std::path::{Path, PathBuf};

/// Accepted extensions, compared case-insensitively
pub const SUPPORTED_EXTENSIONS: &[&str] = &["torrent", "metalink", "meta4", "txt"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    /// Absolute path
    pub path: PathBuf,
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Lists supported files in `dir`, sorted by name.
///
/// Unreadable directories and entries are skipped.
pub fn list_supported_files(dir: &Path) -> Vec<FileEntry> {
    let read_dir = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "Cannot list directory");
            return Vec::new();
        }
    };

    let mut entries: Vec<FileEntry> = read_dir
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter(|entry| is_supported(&entry.path()))
        .map(|entry| {
            let joined = dir.join(entry.file_name());
            FileEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: std::path::absolute(&joined).unwrap_or(joined),
            }
        })
        .collect();

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_lists_supported_sorted() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "b.torrent");
        touch(temp.path(), "a.META4");
        touch(temp.path(), "list.txt");
        touch(temp.path(), "c.metalink");
        touch(temp.path(), "movie.mkv");
        touch(temp.path(), "noext");
        fs::create_dir(temp.path().join("dir.torrent")).unwrap();

        let names: Vec<String> = list_supported_files(temp.path())
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["a.META4", "b.torrent", "c.metalink", "list.txt"]);
    }

    #[test]
    fn test_paths_are_absolute() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "x.torrent");

        let entries = list_supported_files(temp.path());
        assert_eq!(entries.len(), 1);
        assert!(entries[0].path.is_absolute());
        assert!(entries[0].path.ends_with("x.torrent"));
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let temp = TempDir::new().unwrap();
        assert!(list_supported_files(&temp.path().join("gone")).is_empty());
    }
}
