// src/config/validate.rs

use crate::config::model::RunOptions;
use crate::config::value::OptionValue;
use crate::errors::{Result, SupervisorError};

/// Check the invariants a run relies on before anything is spawned.
pub fn validate_options(opts: &RunOptions) -> Result<()> {
    ensure_spec_path(opts)?;
    ensure_worker(opts)?;
    validate_debug_port("debugMocha", opts.debug_mocha.as_ref())?;
    validate_debug_port("debugBrkMocha", opts.debug_brk_mocha.as_ref())?;
    Ok(())
}

fn ensure_spec_path(opts: &RunOptions) -> Result<()> {
    if opts.path.trim().is_empty() {
        return Err(SupervisorError::ConfigError(
            "`path` must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn ensure_worker(opts: &RunOptions) -> Result<()> {
    match opts.worker.first() {
        Some(program) if !program.trim().is_empty() => Ok(()),
        _ => Err(SupervisorError::ConfigError(
            "`worker` must name a program to run".to_string(),
        )),
    }
}

/// Values <= 1 select the default listener; anything above must be a
/// usable TCP port.
fn validate_debug_port(key: &str, value: Option<&OptionValue>) -> Result<()> {
    let Some(port) = value.and_then(OptionValue::parse_int) else {
        return Ok(());
    };
    if port > i64::from(u16::MAX) {
        return Err(SupervisorError::ConfigError(format!(
            "`{key}` port {port} is out of range (expected 2..=65535)"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_valid() {
        assert!(validate_options(&RunOptions::default()).is_ok());
    }

    #[test]
    fn empty_worker_is_rejected() {
        let opts = RunOptions {
            worker: vec![],
            ..RunOptions::default()
        };
        match validate_options(&opts) {
            Err(SupervisorError::ConfigError(msg)) => assert!(msg.contains("worker")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn empty_path_is_rejected() {
        let opts = RunOptions {
            path: "  ".to_string(),
            ..RunOptions::default()
        };
        assert!(matches!(
            validate_options(&opts),
            Err(SupervisorError::ConfigError(_))
        ));
    }

    #[test]
    fn out_of_range_debug_port_is_rejected() {
        let opts = RunOptions {
            debug_brk_mocha: Some(OptionValue::Int(70000)),
            ..RunOptions::default()
        };
        match validate_options(&opts) {
            Err(SupervisorError::ConfigError(msg)) => assert!(msg.contains("debugBrkMocha")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn boolean_debug_flag_is_accepted() {
        let opts = RunOptions {
            debug_mocha: Some(OptionValue::Bool(true)),
            ..RunOptions::default()
        };
        assert!(validate_options(&opts).is_ok());
    }
}
