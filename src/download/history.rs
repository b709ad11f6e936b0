//! Run history
//!
//! Newest-first log of launched configurations, capped and deduplicated by
//! primary source. Every mutation is written straight back to disk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::app::config::Config;
use crate::util::persist;

/// Maximum number of entries kept
pub const MAX_HISTORY: usize = 20;

/// Outcome of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Launched, no exit observed yet
    Pending,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RunStatus::Pending => "pending",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }
}

/// One history record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    /// Full copy of the config at the time of the run
    pub config: Config,
    pub status: RunStatus,
    pub filename: String,
    /// First URI, else the input file, else empty
    #[serde(rename = "url")]
    pub source: String,
}

/// Persisted run history
#[derive(Debug)]
pub struct HistoryLedger {
    path: PathBuf,
    items: Vec<HistoryEntry>,
    persist_error: Option<String>,
}

impl HistoryLedger {
    /// Loads history from `path`.
    ///
    /// A missing or corrupt file gives an empty ledger. Entries that fail to
    /// parse are skipped and only the newest [`MAX_HISTORY`] are kept.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let items = match persist::read_json(&path) {
            Some(serde_json::Value::Array(values)) => values
                .into_iter()
                .take(MAX_HISTORY)
                .filter_map(|value| match serde_json::from_value::<HistoryEntry>(value) {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        tracing::warn!(error = %e, "Skipping unreadable history entry");
                        None
                    }
                })
                .collect(),
            Some(_) => {
                tracing::warn!(path = %path.display(), "History file is not a JSON array");
                Vec::new()
            }
            None => Vec::new(),
        };
        tracing::debug!(path = %path.display(), count = items.len(), "Loaded history");

        Self {
            path,
            items,
            persist_error: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records a run of `config` and returns the new entry's id.
    ///
    /// Any older entry with the same primary source is replaced.
    pub fn add(&mut self, config: &Config, status: RunStatus) -> u64 {
        let entry = HistoryEntry {
            id: self.next_id(),
            timestamp: Utc::now(),
            config: config.clone(),
            status,
            filename: if config.out.is_empty() {
                "unknown".to_string()
            } else {
                config.out.clone()
            },
            source: config.primary_source(),
        };
        let id = entry.id;

        self.items.retain(|h| h.source != entry.source);
        self.items.insert(0, entry);
        self.items.truncate(MAX_HISTORY);
        self.save();

        tracing::info!(id, status = status.label(), "Added history entry");
        id
    }

    /// Millisecond timestamp, bumped past every existing id
    fn next_id(&self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let max_existing = self.items.iter().map(|h| h.id).max().unwrap_or(0);
        now.max(max_existing + 1)
    }

    /// Sets the status of entry `id`; unknown ids are ignored
    pub fn update_status(&mut self, id: u64, status: RunStatus) {
        let Some(entry) = self.items.iter_mut().find(|h| h.id == id) else {
            tracing::debug!(id, "Status update for unknown history entry");
            return;
        };
        entry.status = status;
        self.save();
    }

    /// Removes the entry at `index`. Returns false when out of range.
    pub fn delete(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.items.remove(index);
        self.save();
        true
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.items.get(index)
    }

    pub fn find(&self, id: u64) -> Option<&HistoryEntry> {
        self.items.iter().find(|h| h.id == id)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the last write failure, if any, and clears it
    pub fn take_persist_error(&mut self) -> Option<String> {
        self.persist_error.take()
    }

    fn save(&mut self) {
        match persist::write_json(&self.path, &self.items) {
            Ok(()) => self.persist_error = None,
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Failed to save history");
                self.persist_error = Some(format!("{e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_for(uri: &str) -> Config {
        Config {
            uris: vec![uri.to_string()],
            ..Config::default()
        }
    }

    fn ledger(temp: &TempDir) -> HistoryLedger {
        HistoryLedger::load(temp.path().join("history.json"))
    }

    #[test]
    fn test_history_new() {
        let temp = TempDir::new().unwrap();
        let history = ledger(&temp);
        assert!(history.is_empty());
        assert_eq!(history.len(), 0);
        assert!(history.get(0).is_none());
    }

    #[test]
    fn test_history_add_and_get() {
        let temp = TempDir::new().unwrap();
        let mut history = ledger(&temp);

        let mut config = config_for("http://a/f.iso");
        config.out = "f.iso".to_string();
        let id = history.add(&config, RunStatus::Pending);

        let entry = history.get(0).unwrap();
        assert_eq!(entry.id, id);
        assert_eq!(entry.filename, "f.iso");
        assert_eq!(entry.source, "http://a/f.iso");
        assert_eq!(entry.status, RunStatus::Pending);
        assert_eq!(entry.config, config);
    }

    #[test]
    fn test_history_filename_and_source_fallbacks() {
        let temp = TempDir::new().unwrap();
        let mut history = ledger(&temp);

        let config = Config {
            input_file: "/t/a.torrent".to_string(),
            ..Config::default()
        };
        history.add(&config, RunStatus::Pending);

        let entry = history.get(0).unwrap();
        assert_eq!(entry.filename, "unknown");
        assert_eq!(entry.source, "/t/a.torrent");
    }

    #[test]
    fn test_history_dedup_by_source() {
        let temp = TempDir::new().unwrap();
        let mut history = ledger(&temp);

        history.add(&config_for("http://a/1"), RunStatus::Completed);
        history.add(&config_for("http://a/2"), RunStatus::Completed);
        let id = history.add(&config_for("http://a/1"), RunStatus::Pending);

        assert_eq!(history.len(), 2);
        assert_eq!(history.get(0).unwrap().id, id);
        assert_eq!(history.get(1).unwrap().source, "http://a/2");
    }

    #[test]
    fn test_history_cap() {
        let temp = TempDir::new().unwrap();
        let mut history = ledger(&temp);

        for i in 0..(MAX_HISTORY + 5) {
            history.add(&config_for(&format!("http://a/{i}")), RunStatus::Pending);
        }
        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history.get(0).unwrap().source, format!("http://a/{}", MAX_HISTORY + 4));
    }

    #[test]
    fn test_history_ids_increase() {
        let temp = TempDir::new().unwrap();
        let mut history = ledger(&temp);

        let first = history.add(&config_for("http://a/1"), RunStatus::Pending);
        let second = history.add(&config_for("http://a/2"), RunStatus::Pending);
        assert!(second > first);
    }

    #[test]
    fn test_history_update_status() {
        let temp = TempDir::new().unwrap();
        let mut history = ledger(&temp);

        let id = history.add(&config_for("http://a/1"), RunStatus::Pending);
        history.update_status(id, RunStatus::Completed);
        assert_eq!(history.find(id).unwrap().status, RunStatus::Completed);

        // unknown id is a no-op
        history.update_status(id + 1000, RunStatus::Failed);
        assert_eq!(history.find(id).unwrap().status, RunStatus::Completed);
    }

    #[test]
    fn test_history_delete_bounds() {
        let temp = TempDir::new().unwrap();
        let mut history = ledger(&temp);

        history.add(&config_for("http://a/1"), RunStatus::Pending);
        assert!(!history.delete(1));
        assert!(history.delete(0));
        assert!(history.is_empty());
        assert!(!history.delete(0));
    }

    #[test]
    fn test_history_persist_error_reported() {
        let temp = TempDir::new().unwrap();
        // the ledger path is a directory, so every write fails
        let mut history = HistoryLedger::load(temp.path());

        history.add(&config_for("http://a/1"), RunStatus::Pending);
        assert_eq!(history.len(), 1);
        assert!(history.take_persist_error().is_some());
        assert!(history.take_persist_error().is_none());
    }
}
