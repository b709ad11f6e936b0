#![allow(dead_code)]

use aria2tui::app::config::Config;
use aria2tui::app::state::{AppPaths, AppState};
use aria2tui::download::history::{HistoryLedger, RunStatus};
use aria2tui::tui::app::TuiApp;
use aria2tui::tui::events::TuiEvent;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;

pub const SAMPLE_URI: &str = "https://example.com/files/File%20Name.ISO";

// Initialize logging once for all tests
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Paths inside `temp`; the file browser lists `temp` itself
pub fn test_paths(temp: &TempDir) -> AppPaths {
    AppPaths {
        bin: "aria2c".to_string(),
        config: temp.path().join("config.json"),
        history: temp.path().join("history.json"),
        browse_dir: temp.path().to_path_buf(),
    }
}

/// Config with one URI and nothing else set
pub fn ready_config() -> Config {
    Config {
        uris: vec![SAMPLE_URI.to_string()],
        ..Config::default()
    }
}

/// Builds an app around `config`, with the history file in `temp`
pub fn create_test_app(temp: &TempDir, config: Config) -> (TuiApp, mpsc::Receiver<TuiEvent>) {
    let paths = test_paths(temp);
    let history = HistoryLedger::load(&paths.history);
    let (tx, rx) = mpsc::channel(100);
    (TuiApp::new(AppState::new(config, history, paths), tx), rx)
}

/// Writes history entries, newest last in `runs`
pub fn seed_history(path: &Path, runs: &[(&str, RunStatus)]) -> Vec<u64> {
    let mut ledger = HistoryLedger::load(path);
    runs.iter()
        .map(|(uri, status)| {
            let config = Config {
                uris: vec![uri.to_string()],
                out: format!("{}.bin", uri.rsplit('/').next().unwrap_or("file")),
                ..Config::default()
            };
            ledger.add(&config, *status)
        })
        .collect()
}

pub fn key(app: &mut TuiApp, code: KeyCode) {
    app.handle_event(TuiEvent::Input(Event::Key(KeyEvent::new(
        code,
        KeyModifiers::NONE,
    ))));
}

pub fn press(app: &mut TuiApp, c: char) {
    key(app, KeyCode::Char(c));
}

pub fn ctrl(app: &mut TuiApp, c: char) {
    app.handle_event(TuiEvent::Input(Event::Key(KeyEvent::new(
        KeyCode::Char(c),
        KeyModifiers::CONTROL,
    ))));
}

pub fn type_text(app: &mut TuiApp, text: &str) {
    for c in text.chars() {
        press(app, c);
    }
}

pub fn paste(app: &mut TuiApp, text: &str) {
    app.handle_event(TuiEvent::Input(Event::Paste(text.to_string())));
}

/// Next queued event, or None if nothing arrives within a second
pub async fn next_event(rx: &mut mpsc::Receiver<TuiEvent>) -> Option<TuiEvent> {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .ok()
        .flatten()
}
