// src/lib.rs

pub mod classify;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod gate;
pub mod launch;
pub mod logging;
pub mod supervisor;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, error, info};

use crate::cli::CliArgs;
use crate::config::loader::default_config_path;
use crate::config::{load_from_path, validate_options, RunOptions};
use crate::exec::TokioLauncher;
use crate::supervisor::{RunOutcome, Supervisor};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - options loading (file + CLI overrides)
/// - the supervisor with the real process launcher
/// - Ctrl-C handling (interrupts the run)
pub async fn run(args: CliArgs) -> Result<RunOutcome> {
    let options = resolve_options(&args)?;
    debug!(?options, "resolved run options");

    let supervisor = Arc::new(Supervisor::new(options, TokioLauncher::new()));

    // Ctrl-C → interrupt the worker.
    {
        let supervisor = Arc::clone(&supervisor);
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("Ctrl+C received; interrupting mocha");
            if let Err(e) = supervisor.interrupt().await {
                error!(error = %e, "interrupt failed");
            }
        });
    }

    let outcome = supervisor.start().await?;
    match &outcome {
        RunOutcome::Passed { result } => {
            if let Some(result) = result {
                debug!(%result, "final mocha result");
            }
        }
        RunOutcome::Skipped => info!("no specs to run"),
        RunOutcome::Interrupted => info!("mocha run interrupted"),
    }
    Ok(outcome)
}

/// Load options from `--config` (or the default file when present), apply
/// CLI overrides, and validate.
pub fn resolve_options(args: &CliArgs) -> errors::Result<RunOptions> {
    let base = match &args.config {
        Some(path) => load_from_path(PathBuf::from(path))?,
        None => {
            let default_path = default_config_path();
            if default_path.is_file() {
                debug!(path = %default_path.display(), "loading default options file");
                load_from_path(default_path)?
            } else {
                RunOptions::default()
            }
        }
    };

    let options = args.apply_to(base)?;
    validate_options(&options)?;
    Ok(options)
}
