//! Runs aria2c in the foreground
//!
//! The child inherits the terminal. The TUI must already be torn down when
//! [`run`] is called.

use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;

use crate::cli::error;
use crate::download::history::RunStatus;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to start {bin}: {source}")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for {bin}: {source}")]
    Wait {
        bin: String,
        #[source]
        source: std::io::Error,
    },
}

/// Everything needed to start a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub bin: String,
    pub args: Vec<String>,
    /// History entry that receives the outcome
    pub history_id: u64,
}

/// How the child process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    Exited(i32),
    /// Killed by a signal, no exit code
    Signaled,
    /// Ctrl+C reached this process while waiting
    Interrupted,
}

impl LaunchOutcome {
    pub fn from_status(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => LaunchOutcome::Exited(code),
            None => LaunchOutcome::Signaled,
        }
    }

    /// History status to record, if the run actually finished
    pub fn run_status(&self) -> Option<RunStatus> {
        match self {
            LaunchOutcome::Exited(0) => Some(RunStatus::Completed),
            LaunchOutcome::Exited(_) | LaunchOutcome::Signaled => Some(RunStatus::Failed),
            LaunchOutcome::Interrupted => None,
        }
    }

    /// Exit code this program terminates with
    pub fn exit_code(&self) -> i32 {
        match self {
            LaunchOutcome::Exited(code) => *code,
            LaunchOutcome::Signaled => error::SIGNALED,
            LaunchOutcome::Interrupted => error::SUCCESS,
        }
    }
}

/// Spawns the binary with inherited stdio and waits for it
pub async fn run(request: &LaunchRequest) -> Result<LaunchOutcome, LaunchError> {
    tracing::info!(bin = %request.bin, args = ?request.args, "Launching");

    let mut child = Command::new(&request.bin)
        .args(&request.args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| LaunchError::Spawn {
            bin: request.bin.clone(),
            source,
        })?;

    let outcome = tokio::select! {
        status = child.wait() => {
            let status = status.map_err(|source| LaunchError::Wait {
                bin: request.bin.clone(),
                source,
            })?;
            LaunchOutcome::from_status(status)
        }
        _ = tokio::signal::ctrl_c() => LaunchOutcome::Interrupted,
    };

    tracing::info!(?outcome, "Process finished");
    Ok(outcome)
}
