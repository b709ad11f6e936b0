pub mod app;
pub mod cli;
pub mod download;
pub mod file;
pub mod tui;
pub mod util;

pub use app::{config::Config, state::AppState};
