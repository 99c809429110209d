// src/supervisor/resolve.rs

//! Completion resolver: exit code + classifier state + policy -> verdict.

/// Verdict for a run that closed without being interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    /// Exit code was not 0 (`None` when killed by a signal).
    ExitedNonZero(Option<i32>),
    /// Exit code 0, but `0 passing` was seen under strict policy.
    NoTestsRun,
}

impl Verdict {
    pub fn is_failure(&self) -> bool {
        !matches!(self, Verdict::Passed)
    }
}

/// Decide the verdict for a closed worker.
///
/// A nonzero (or missing) exit code always fails. Exit code 0 fails only when
/// no tests ran and `strict` (`fail-when-no-tests-run`) is set.
pub fn resolve(code: Option<i32>, no_tests_found: bool, strict: bool) -> Verdict {
    match code {
        Some(0) if no_tests_found && strict => Verdict::NoTestsRun,
        Some(0) => Verdict::Passed,
        other => Verdict::ExitedNonZero(other),
    }
}
