// src/launch.rs

//! Launch configuration for the worker process.
//!
//! Turns [`RunOptions`] into a [`LaunchSpec`]:
//! - the worker program and its entry arguments,
//! - interpreter-level debug listener flags (`--debug[=port]`,
//!   `--debug-brk[=port]`), placed before the entry arguments,
//! - explicit spec paths taken from the raw argument list,
//! - extra environment (the serialized `mochaConfig`) layered over the
//!   inherited environment.

use std::fmt;

use crate::config::{OptionValue, RunOptions};
use crate::errors::{Result, SupervisorError};

/// Environment variable carrying the JSON-serialized `mochaConfig`.
pub const MOCHA_CONFIG_ENV: &str = "mochaConfig";

/// Environment variable carrying the address of the result channel.
pub const RESULT_ADDR_ENV: &str = "MOCHA_RESULT_ADDR";

/// Which debug listener flag to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugMode {
    /// `--debug`
    Listen,
    /// `--debug-brk`
    BreakOnStart,
}

/// A debug listener to attach to the worker's interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugListener {
    pub mode: DebugMode,
    /// `None` means the interpreter's default port.
    pub port: Option<u16>,
}

impl DebugListener {
    /// Derive a listener from a loose flag value.
    ///
    /// Absent flags and flags switched off (see [`OptionValue::is_enabled`])
    /// yield `None`. A value that parses to an integer greater than 1 becomes
    /// an explicit port; anything else (e.g. `true`, `"1"`, `"false"`)
    /// selects the default port.
    pub fn from_flag(mode: DebugMode, flag: Option<&OptionValue>) -> Result<Option<Self>> {
        let Some(flag) = flag.filter(|f| f.is_enabled()) else {
            return Ok(None);
        };

        let port = match flag.parse_int() {
            Some(n) if n > 1 => Some(u16::try_from(n).map_err(|_| {
                SupervisorError::ConfigError(format!("debug port {n} is out of range"))
            })?),
            _ => None,
        };

        Ok(Some(Self { mode, port }))
    }
}

impl fmt::Display for DebugListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = match self.mode {
            DebugMode::Listen => "--debug",
            DebugMode::BreakOnStart => "--debug-brk",
        };
        match self.port {
            Some(port) => write!(f, "{flag}={port}"),
            None => f.write_str(flag),
        }
    }
}

/// Everything needed to spawn the worker for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: String,
    /// Interpreter arguments (debug listeners), placed before `entry_args`.
    pub exec_args: Vec<String>,
    /// Worker entry point arguments (e.g. the wrapper script).
    pub entry_args: Vec<String>,
    /// Explicit spec paths passed after the entry arguments.
    pub specs: Vec<String>,
    /// Extra environment layered over the inherited environment.
    pub env: Vec<(String, String)>,
}

impl LaunchSpec {
    pub fn from_options(opts: &RunOptions) -> Result<Self> {
        let (program, entry_args) = match opts.worker.split_first() {
            Some((program, rest)) => (program.clone(), rest.to_vec()),
            None => {
                return Err(SupervisorError::ConfigError(
                    "`worker` must name a program to run".to_string(),
                ));
            }
        };

        // Both listeners are honoured when both flags are set.
        let exec_args = [
            DebugListener::from_flag(DebugMode::Listen, opts.debug_mocha.as_ref())?,
            DebugListener::from_flag(DebugMode::BreakOnStart, opts.debug_brk_mocha.as_ref())?,
        ]
        .into_iter()
        .flatten()
        .map(|l| l.to_string())
        .collect();

        let config_json = serde_json::to_string(
            opts.mocha_config.as_ref().unwrap_or(&serde_json::Value::Null),
        )?;

        Ok(Self {
            program,
            exec_args,
            entry_args,
            specs: opts.positional_specs().to_vec(),
            env: vec![(MOCHA_CONFIG_ENV.to_string(), config_json)],
        })
    }

    /// Full argument vector: exec args, entry args, then specs.
    pub fn args(&self) -> Vec<String> {
        self.exec_args
            .iter()
            .chain(&self.entry_args)
            .chain(&self.specs)
            .cloned()
            .collect()
    }

    /// Look up an extra environment variable by name.
    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
