use anyhow::Result;
use aria2tui::{
    app::state::AppState,
    cli::{Cli, error},
    tui::run_tui,
};
use clap::Parser;
use crossterm::tty::IsTty;
use tracing_subscriber::prelude::*;

fn main() {
    // Parse CLI arguments first to get verbose flag
    let cli = Cli::parse();

    let code = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime.block_on(run(cli)).unwrap_or_else(|e| {
            eprintln!("aria2tui: {e:#}");
            error::ERROR
        }),
        Err(e) => {
            eprintln!("aria2tui: failed to start runtime: {e}");
            error::ERROR
        }
    };

    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<i32> {
    // Get logs directory (creates if needed)
    let logs_dir = aria2tui::util::paths::get_logs_dir();
    std::fs::create_dir_all(&logs_dir).ok();

    // Set up daily rotating file appender
    let file_appender = tracing_appender::rolling::daily(&logs_dir, "aria2tui.jsonl");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Set log level based on verbose flag
    let log_level = if cli.verbose {
        tracing::Level::TRACE
    } else {
        tracing::Level::INFO
    };

    // Initialize logging with JSON format for structured logs
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(tracing_subscriber::filter::LevelFilter::from_level(
                    log_level,
                )),
        )
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting aria2tui");
    tracing::trace!("CLI arguments: {:?}", cli);

    if !std::io::stdin().is_tty() || !std::io::stdout().is_tty() {
        tracing::error!("Not attached to a terminal");
        eprintln!("aria2tui needs an interactive terminal (TTY)");
        return Ok(error::ERROR);
    }

    let paths = cli.paths();
    tracing::info!(bin = %paths.bin, "Resolved aria2c binary");
    let state = AppState::load(paths);

    let code = run_tui(state).await?;
    tracing::info!(code, "Exiting");
    Ok(code)
}
