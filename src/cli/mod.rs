use clap::Parser;
use std::path::PathBuf;

use crate::app::state::AppPaths;
use crate::util::paths::{self, BIN_ENV, CONFIG_ENV, DEFAULT_BIN, HISTORY_ENV};

pub mod error;

const CLI_AFTER_HELP: &str = "\
Keys:
  Up/Down, j/k   move              Enter   select / edit
  Esc            back              Space   toggle a switch
  u              edit URIs         t       pick a torrent/metalink/list file
  n              new download      d       delete history entry
  p              preview command   r       run aria2c
  s              save settings     q       quit

Environment:
  ARIA2_BIN          aria2c binary path or name (default: aria2c)
  ARIA2TUI_CONFIG    settings file (default: ~/.aria2tui.json)
  ARIA2TUI_HISTORY   history file (default: ~/.aria2tui_history.json)
  ARIA2TUI_LOG_DIR   log directory";

/// aria2tui - build an aria2c command line step by step and run it
#[derive(Parser, Debug)]
#[command(name = "aria2tui")]
#[command(version, about, long_about = None, after_help = CLI_AFTER_HELP)]
pub struct Cli {
    /// aria2c binary path or name
    #[arg(long, env = BIN_ENV, default_value = DEFAULT_BIN, value_name = "PATH")]
    pub bin: String,

    /// Settings file path
    #[arg(long, env = CONFIG_ENV, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// History file path
    #[arg(long, env = HISTORY_ENV, value_name = "PATH")]
    pub history: Option<PathBuf>,

    /// Enable verbose logging (TRACE level)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Resolves file locations; the file browser starts in the working directory
    pub fn paths(&self) -> AppPaths {
        AppPaths {
            bin: self.bin.clone(),
            config: self
                .config
                .clone()
                .unwrap_or_else(paths::default_config_path),
            history: self
                .history
                .clone()
                .unwrap_or_else(paths::default_history_path),
            browse_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }
}
