use mocha_supervisor::config::{OptionValue, RunOptions};

/// Builder for `RunOptions` to simplify test setup.
pub struct RunOptionsBuilder {
    options: RunOptions,
}

impl RunOptionsBuilder {
    pub fn new() -> Self {
        Self {
            options: RunOptions::default(),
        }
    }

    pub fn path(mut self, pattern: &str) -> Self {
        self.options.path = pattern.to_string();
        self
    }

    pub fn strict(mut self, val: bool) -> Self {
        self.options.fail_when_no_tests_run = Some(OptionValue::Bool(val));
        self
    }

    pub fn debug_mocha(mut self, val: impl Into<OptionValue>) -> Self {
        self.options.debug_mocha = Some(val.into());
        self
    }

    pub fn debug_brk_mocha(mut self, val: impl Into<OptionValue>) -> Self {
        self.options.debug_brk_mocha = Some(val.into());
        self
    }

    pub fn mocha_config(mut self, val: serde_json::Value) -> Self {
        self.options.mocha_config = Some(val);
        self
    }

    pub fn raw_args(mut self, args: &[&str]) -> Self {
        self.options.raw_args = args.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn worker(mut self, cmd: &[&str]) -> Self {
        self.options.worker = cmd.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn build(self) -> RunOptions {
        self.options
    }
}

impl Default for RunOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
