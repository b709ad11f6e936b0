use std::path::PathBuf;

/// Environment variable overriding the aria2c binary
pub const BIN_ENV: &str = "ARIA2_BIN";
/// Environment variable overriding the config file path
pub const CONFIG_ENV: &str = "ARIA2TUI_CONFIG";
/// Environment variable overriding the history file path
pub const HISTORY_ENV: &str = "ARIA2TUI_HISTORY";
/// Environment variable overriding the log directory
pub const LOG_DIR_ENV: &str = "ARIA2TUI_LOG_DIR";

pub const DEFAULT_BIN: &str = "aria2c";

/// Home directory, falling back to the current directory when unknown
pub fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// `~/.aria2tui.json`
pub fn default_config_path() -> PathBuf {
    home_dir().join(".aria2tui.json")
}

/// `~/.aria2tui_history.json`
pub fn default_history_path() -> PathBuf {
    home_dir().join(".aria2tui_history.json")
}

/// `~/Downloads`, the stock target directory
pub fn default_download_dir() -> PathBuf {
    home_dir().join("Downloads")
}

/// Directory for the rolling log file.
///
/// Resolution order:
/// 1. `ARIA2TUI_LOG_DIR`
/// 2. Platform data directory (`~/.local/share/aria2tui/logs` on Linux)
/// 3. `~/.aria2tui/logs`
pub fn get_logs_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(LOG_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    match dirs::data_dir() {
        Some(data_dir) => data_dir.join("aria2tui").join("logs"),
        None => home_dir().join(".aria2tui").join("logs"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_default_file_names() {
        assert!(default_config_path().ends_with(".aria2tui.json"));
        assert!(default_history_path().ends_with(".aria2tui_history.json"));
        assert!(default_download_dir().ends_with("Downloads"));
    }

    #[test]
    #[serial]
    fn test_logs_dir_from_env_variable() {
        let temp_dir = TempDir::new().unwrap();
        unsafe { std::env::set_var(LOG_DIR_ENV, temp_dir.path()) };

        assert_eq!(get_logs_dir(), temp_dir.path());

        unsafe { std::env::remove_var(LOG_DIR_ENV) };
    }

    #[test]
    #[serial]
    fn test_logs_dir_default() {
        unsafe { std::env::remove_var(LOG_DIR_ENV) };

        let dir = get_logs_dir();
        assert!(dir.ends_with("logs"));
        assert!(dir.to_string_lossy().contains("aria2tui"));
    }
}
