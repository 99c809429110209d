// src/config/model.rs

use serde::Deserialize;

use super::value::OptionValue;

/// Spec path pattern used when none is configured.
pub const DEFAULT_SPEC_PATH: &str = "./tests";

/// Options for one supervised run.
///
/// Field names follow the keys the test-runner tooling has always used, so a
/// TOML file looks like:
///
/// ```toml
/// path = "./tests/**/*.js"
/// fail-when-no-tests-run = true
/// debugMocha = 5858
/// worker = ["node", "mocha-wrapper-instance.js"]
/// _ = ["node", "chimp", "tests/login.js"]
///
/// [mochaConfig]
/// timeout = 60000
/// reporter = "spec"
/// ```
///
/// All fields are optional. Options are immutable for the lifetime of a run;
/// the supervisor clones what it needs when a run starts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    /// Glob-style pattern (or plain directory) where specs live.
    pub path: String,

    /// Strict policy: count "no specs" and "0 passing" as failures.
    #[serde(rename = "fail-when-no-tests-run")]
    pub fail_when_no_tests_run: Option<OptionValue>,

    /// Attach a debug listener (`--debug[=port]`) to the worker.
    #[serde(rename = "debugMocha")]
    pub debug_mocha: Option<OptionValue>,

    /// Attach a break-on-start debug listener (`--debug-brk[=port]`).
    #[serde(rename = "debugBrkMocha")]
    pub debug_brk_mocha: Option<OptionValue>,

    /// Opaque configuration serialized into the worker's environment.
    #[serde(rename = "mochaConfig")]
    pub mocha_config: Option<serde_json::Value>,

    /// Raw positional argument list. The first two entries are reserved
    /// (interpreter and entry script); the rest are explicit spec paths.
    #[serde(rename = "_")]
    pub raw_args: Vec<String>,

    /// Worker entry command: program followed by its leading arguments.
    pub worker: Vec<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            path: DEFAULT_SPEC_PATH.to_string(),
            fail_when_no_tests_run: None,
            debug_mocha: None,
            debug_brk_mocha: None,
            mocha_config: None,
            raw_args: Vec::new(),
            worker: default_worker(),
        }
    }
}

fn default_worker() -> Vec<String> {
    vec!["node".to_string(), "mocha-wrapper-instance.js".to_string()]
}

impl RunOptions {
    /// Whether the strict "fail when no tests run" policy is active.
    pub fn fail_when_no_tests_run(&self) -> bool {
        self.fail_when_no_tests_run
            .as_ref()
            .is_some_and(OptionValue::is_truthy)
    }

    /// Explicit spec paths: everything after the two reserved entries of the
    /// raw argument list.
    pub fn positional_specs(&self) -> &[String] {
        if self.raw_args.len() > 2 {
            &self.raw_args[2..]
        } else {
            &[]
        }
    }
}
