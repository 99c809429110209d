// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::config::{OptionValue, RunOptions};
use crate::errors::Result;

/// Command-line arguments for `mocha-supervisor`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mocha-supervisor",
    version,
    about = "Run a mocha worker process and report whether its tests passed.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to a TOML options file.
    ///
    /// Default: `MochaSupervisor.toml` in the current working directory, if
    /// it exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Glob pattern (or directory) where specs live.
    #[arg(long, value_name = "PATTERN")]
    pub path: Option<String>,

    /// Treat "no specs found" and "0 passing" as failures.
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub fail_when_no_tests_run: Option<OptionValue>,

    /// Attach a debug listener to the worker, optionally on PORT.
    #[arg(long, value_name = "PORT", num_args = 0..=1, default_missing_value = "true")]
    pub debug_mocha: Option<OptionValue>,

    /// Attach a break-on-start debug listener, optionally on PORT.
    #[arg(long, value_name = "PORT", num_args = 0..=1, default_missing_value = "true")]
    pub debug_brk_mocha: Option<OptionValue>,

    /// JSON configuration handed to the worker.
    #[arg(long, value_name = "JSON")]
    pub mocha_config: Option<String>,

    /// Worker command, comma separated (e.g. `node,mocha-wrapper-instance.js`).
    #[arg(long, value_name = "CMD", value_delimiter = ',')]
    pub worker: Option<Vec<String>>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MOCHA_SUPERVISOR_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Explicit spec files to run instead of discovering them.
    #[arg(value_name = "SPEC")]
    pub specs: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl CliArgs {
    /// Layer the CLI flags over options loaded from a file.
    ///
    /// Explicit specs rebuild the raw argument list as
    /// `[argv0, worker program, specs...]`, keeping the two reserved
    /// leading entries.
    pub fn apply_to(&self, mut opts: RunOptions) -> Result<RunOptions> {
        if let Some(path) = &self.path {
            opts.path = path.clone();
        }
        if let Some(flag) = &self.fail_when_no_tests_run {
            opts.fail_when_no_tests_run = Some(flag.clone());
        }
        if let Some(flag) = &self.debug_mocha {
            opts.debug_mocha = Some(flag.clone());
        }
        if let Some(flag) = &self.debug_brk_mocha {
            opts.debug_brk_mocha = Some(flag.clone());
        }
        if let Some(raw) = &self.mocha_config {
            opts.mocha_config = Some(serde_json::from_str(raw)?);
        }
        if let Some(worker) = &self.worker {
            opts.worker = worker.clone();
        }
        if !self.specs.is_empty() {
            let argv0 = std::env::args()
                .next()
                .unwrap_or_else(|| "mocha-supervisor".to_string());
            let program = opts.worker.first().cloned().unwrap_or_default();
            opts.raw_args = [argv0, program]
                .into_iter()
                .chain(self.specs.iter().cloned())
                .collect();
        }
        Ok(opts)
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SupervisorError;

    fn parse_from(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("mocha-supervisor").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn bare_debug_flag_means_default_listener() {
        let args = parse_from(&["--debug-mocha"]);
        assert_eq!(args.debug_mocha, Some(OptionValue::Bool(true)));
    }

    #[test]
    fn debug_flag_with_port() {
        let args = parse_from(&["--debug-brk-mocha=9229"]);
        assert_eq!(args.debug_brk_mocha, Some(OptionValue::Int(9229)));
    }

    #[test]
    fn cli_overrides_file_options() {
        let args = parse_from(&[
            "--path",
            "./specs/**/*.js",
            "--fail-when-no-tests-run",
            "--mocha-config",
            r#"{"timeout":5}"#,
            "--worker",
            "node,wrapper.js",
            "a.js",
            "b.js",
        ]);
        let opts = args.apply_to(RunOptions::default()).unwrap();

        assert_eq!(opts.path, "./specs/**/*.js");
        assert!(opts.fail_when_no_tests_run());
        assert_eq!(opts.mocha_config, Some(serde_json::json!({ "timeout": 5 })));
        assert_eq!(opts.worker, vec!["node", "wrapper.js"]);
        assert_eq!(opts.raw_args.len(), 4);
        assert_eq!(opts.raw_args[1], "node");
        assert_eq!(opts.positional_specs(), ["a.js".to_string(), "b.js".to_string()]);
    }

    #[test]
    fn no_specs_keeps_file_raw_args() {
        let base = RunOptions {
            raw_args: vec!["x".into(), "y".into(), "z.js".into()],
            ..RunOptions::default()
        };
        let opts = parse_from(&[]).apply_to(base).unwrap();
        assert_eq!(opts.positional_specs(), ["z.js".to_string()]);
    }

    #[test]
    fn invalid_mocha_config_json_is_an_error() {
        let args = parse_from(&["--mocha-config", "{nope"]);
        assert!(matches!(
            args.apply_to(RunOptions::default()),
            Err(SupervisorError::JsonError(_))
        ));
    }
}
