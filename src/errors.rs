// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Every failure of a supervised run surfaces through [`SupervisorError`]:
//! - "no specs matched" under strict policy ([`SupervisorError::NoSpecsFound`]),
//! - run failures ([`SupervisorError::ExitedNonZero`], [`SupervisorError::NoTestsRun`]),
//! - termination failures while interrupting ([`SupervisorError::Termination`]).
//!
//! Run failures carry the last structured result the child reported, so the
//! caller still receives the payload alongside the error.

use thiserror::Error;

use crate::supervisor::RunResult;

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Directory {path} does not exist. Not running")]
    NoSpecsFound { path: String },

    #[error("Mocha failed: process exited with {}", describe_exit(.code))]
    ExitedNonZero {
        code: Option<i32>,
        result: Option<RunResult>,
    },

    #[error("Mocha failed: no tests were run (0 passing)")]
    NoTestsRun { result: Option<RunResult> },

    #[error("a mocha run is already active on this supervisor")]
    AlreadyRunning,

    #[error("failed to terminate {prefix} process: {source}")]
    Termination {
        prefix: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to launch worker: {0:#}")]
    Launch(anyhow::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SupervisorError {
    /// The structured result attached to a run failure, if any.
    pub fn run_result(&self) -> Option<&RunResult> {
        match self {
            SupervisorError::ExitedNonZero { result, .. }
            | SupervisorError::NoTestsRun { result } => result.as_ref(),
            _ => None,
        }
    }

    /// True for failures of the test run itself (as opposed to setup or
    /// supervision failures).
    pub fn is_run_failure(&self) -> bool {
        matches!(
            self,
            SupervisorError::ExitedNonZero { .. } | SupervisorError::NoTestsRun { .. }
        )
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SupervisorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_messages_are_distinguishable() {
        let missing = SupervisorError::NoSpecsFound {
            path: "./tests".to_string(),
        };
        let exited = SupervisorError::ExitedNonZero {
            code: Some(3),
            result: None,
        };
        let empty = SupervisorError::NoTestsRun { result: None };

        assert!(missing.to_string().contains("./tests"));
        assert!(exited.to_string().starts_with("Mocha failed"));
        assert!(exited.to_string().contains("code 3"));
        assert!(empty.to_string().starts_with("Mocha failed"));
        assert!(empty.to_string().contains("0 passing"));
        assert_ne!(exited.to_string(), empty.to_string());
    }

    #[test]
    fn run_result_is_exposed_for_run_failures_only() {
        let payload = serde_json::json!({ "failures": 2 });
        let err = SupervisorError::ExitedNonZero {
            code: Some(1),
            result: Some(payload.clone()),
        };
        assert_eq!(err.run_result(), Some(&payload));
        assert!(err.is_run_failure());

        let err = SupervisorError::AlreadyRunning;
        assert!(err.run_result().is_none());
        assert!(!err.is_run_failure());
    }

    #[test]
    fn signal_exit_is_described() {
        let err = SupervisorError::ExitedNonZero {
            code: None,
            result: None,
        };
        assert!(err.to_string().contains("signal"));
    }
}
