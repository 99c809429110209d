// src/logging.rs

//! `tracing` setup for the binary.
//!
//! The filter comes from `--log-level` when given (scoped to this crate),
//! otherwise from `MOCHA_SUPERVISOR_LOG`, which takes full `EnvFilter`
//! directives such as `debug` or `mocha_supervisor::exec=trace,info`.
//! Without either, this crate logs at `info` and dependencies stay quiet.
//!
//! Logs go to stderr: stdout carries the worker's forwarded output.

use std::io::IsTerminal;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "MOCHA_SUPERVISOR_LOG";

const CRATE_TARGET: &str = "mocha_supervisor";
const DEFAULT_DIRECTIVE: &str = "mocha_supervisor=info";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let stderr = std::io::stderr();

    tracing_subscriber::fmt()
        .with_env_filter(build_filter(cli_level, env.as_deref()))
        .with_writer(std::io::stderr)
        .with_ansi(stderr.is_terminal())
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing log subscriber: {e}"))
}

fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> EnvFilter {
    let directive = filter_directive(cli_level, env);
    EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!("ignoring {LOG_ENV}={directive:?}: {e}");
        EnvFilter::new(DEFAULT_DIRECTIVE)
    })
}

/// Pick the directive string: CLI level, then env, then the default.
fn filter_directive(cli_level: Option<LogLevel>, env: Option<&str>) -> String {
    if let Some(level) = cli_level {
        return format!("{CRATE_TARGET}={}", level_name(level));
    }
    match env.map(str::trim) {
        Some(directives) if !directives.is_empty() => directives.to_string(),
        _ => DEFAULT_DIRECTIVE.to_string(),
    }
}

fn level_name(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
