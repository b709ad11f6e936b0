use std::path::PathBuf;

use super::config::Config;
use crate::download::history::HistoryLedger;

/// Locations and the binary resolved from flags, environment and defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// aria2c executable
    pub bin: String,
    pub config: PathBuf,
    pub history: PathBuf,
    /// Directory the input-file browser lists
    pub browse_dir: PathBuf,
}

/// Everything the event loop mutates, owned in one place
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    pub history: HistoryLedger,
    pub paths: AppPaths,
}

impl AppState {
    pub fn new(config: Config, history: HistoryLedger, paths: AppPaths) -> Self {
        Self {
            config,
            history,
            paths,
        }
    }

    /// Loads config and history from the resolved paths
    pub fn load(paths: AppPaths) -> Self {
        let config = Config::load(&paths.config);
        let history = HistoryLedger::load(&paths.history);
        tracing::info!(
            config = %paths.config.display(),
            history = %paths.history.display(),
            entries = history.len(),
            "Loaded application state"
        );
        Self::new(config, history, paths)
    }

    /// Writes the config file
    pub fn save_config(&self) -> anyhow::Result<()> {
        self.config.save(&self.paths.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn paths_in(temp: &TempDir) -> AppPaths {
        AppPaths {
            bin: "aria2c".to_string(),
            config: temp.path().join("config.json"),
            history: temp.path().join("history.json"),
            browse_dir: temp.path().to_path_buf(),
        }
    }

    #[test]
    fn test_load_missing_files() {
        let temp = TempDir::new().unwrap();
        let state = AppState::load(paths_in(&temp));
        assert_eq!(state.config, Config::startup_defaults());
        assert!(state.history.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let mut state = AppState::load(paths_in(&temp));
        state.config.out = "file.iso".to_string();
        state.config.split = Some(4.0);
        state.save_config().unwrap();

        let reloaded = AppState::load(paths_in(&temp));
        assert_eq!(reloaded.config, state.config);
    }
}
