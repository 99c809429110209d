// src/supervisor/core.rs

//! Pure per-run state machine.
//!
//! `RunCore` consumes [`ChildEvent`]s for one run and holds:
//! - the stdout classifier (the `0 passing` latch),
//! - the most recent structured result,
//! - the strict policy flag.
//!
//! Message and stdout events only update state; `Closed` is the only event
//! that ends the run. Like the rest of the supervisor's pure pieces it has no
//! channels, no Tokio types, and performs no IO.

use crate::classify::OutputClassifier;
use crate::errors::{Result, SupervisorError};
use crate::exec::ChildEvent;

use super::resolve::{resolve, Verdict};
use super::{RunOutcome, RunResult};

/// Decision returned after handling a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreStep {
    /// Keep waiting for events.
    Continue,
    /// The worker closed with this exit code; resolve the run.
    Closed { code: Option<i32> },
}

#[derive(Debug)]
pub struct RunCore {
    classifier: OutputClassifier,
    last_result: Option<RunResult>,
    strict: bool,
    closed: bool,
}

impl RunCore {
    pub fn new(strict: bool) -> Self {
        Self {
            classifier: OutputClassifier::new(),
            last_result: None,
            strict,
            closed: false,
        }
    }

    pub fn step(&mut self, event: ChildEvent) -> CoreStep {
        if self.closed {
            return CoreStep::Continue;
        }

        match event {
            ChildEvent::Stdout(chunk) => {
                self.classifier.observe(&chunk);
                CoreStep::Continue
            }
            ChildEvent::Message(result) => {
                self.last_result = Some(result);
                CoreStep::Continue
            }
            ChildEvent::Closed { code } => {
                self.classifier.finish();
                self.closed = true;
                CoreStep::Closed { code }
            }
        }
    }

    /// Expose the classifier latch (for tests and logging).
    pub fn no_tests_found(&self) -> bool {
        self.classifier.no_tests_found()
    }

    pub fn last_result(&self) -> Option<&RunResult> {
        self.last_result.as_ref()
    }

    pub fn verdict(&self, code: Option<i32>) -> Verdict {
        resolve(code, self.no_tests_found(), self.strict)
    }

    /// Consume the core and turn the exit code into the caller-facing result.
    pub fn into_outcome(self, code: Option<i32>) -> Result<RunOutcome> {
        let verdict = self.verdict(code);
        let result = self.last_result;
        match verdict {
            Verdict::Passed => Ok(RunOutcome::Passed { result }),
            Verdict::ExitedNonZero(code) => Err(SupervisorError::ExitedNonZero { code, result }),
            Verdict::NoTestsRun => Err(SupervisorError::NoTestsRun { result }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stdout(s: &str) -> ChildEvent {
        ChildEvent::Stdout(s.as_bytes().to_vec())
    }

    #[test]
    fn last_message_wins() {
        let mut core = RunCore::new(false);
        assert_eq!(core.step(ChildEvent::Message(json!({ "n": 1 }))), CoreStep::Continue);
        assert_eq!(core.step(stdout("  2 passing\n")), CoreStep::Continue);
        assert_eq!(core.step(ChildEvent::Message(json!({ "n": 2 }))), CoreStep::Continue);
        assert_eq!(core.last_result(), Some(&json!({ "n": 2 })));
    }

    #[test]
    fn close_ends_the_run() {
        let mut core = RunCore::new(false);
        assert_eq!(
            core.step(ChildEvent::Closed { code: Some(0) }),
            CoreStep::Closed { code: Some(0) }
        );
        // Nothing after close counts.
        assert_eq!(core.step(stdout("0 passing\n")), CoreStep::Continue);
        assert_eq!(
            core.step(ChildEvent::Closed { code: Some(1) }),
            CoreStep::Continue
        );
        assert!(!core.no_tests_found());
    }

    #[test]
    fn strict_zero_passing_fails_with_result() {
        let mut core = RunCore::new(true);
        core.step(stdout("\x1B[90m  0 passing (1ms)\x1B[0m\n"));
        core.step(ChildEvent::Message(json!({ "stats": { "passes": 0 } })));
        let CoreStep::Closed { code } = core.step(ChildEvent::Closed { code: Some(0) }) else {
            panic!("expected close");
        };

        match core.into_outcome(code) {
            Err(SupervisorError::NoTestsRun { result }) => {
                assert_eq!(result, Some(json!({ "stats": { "passes": 0 } })));
            }
            other => panic!("expected NoTestsRun, got {other:?}"),
        }
    }

    #[test]
    fn relaxed_zero_passing_passes() {
        let mut core = RunCore::new(false);
        core.step(stdout("0 passing\n"));
        core.step(ChildEvent::Closed { code: Some(0) });
        assert_eq!(
            core.into_outcome(Some(0)).unwrap(),
            RunOutcome::Passed { result: None }
        );
    }

    #[test]
    fn unterminated_summary_counts_at_close() {
        let mut core = RunCore::new(true);
        core.step(stdout("0 passing"));
        core.step(ChildEvent::Closed { code: Some(0) });
        assert!(core.no_tests_found());
    }

    #[test]
    fn nonzero_exit_fails_and_keeps_result() {
        let mut core = RunCore::new(false);
        core.step(ChildEvent::Message(json!("partial")));
        match core.into_outcome(Some(2)) {
            Err(SupervisorError::ExitedNonZero { code, result }) => {
                assert_eq!(code, Some(2));
                assert_eq!(result, Some(json!("partial")));
            }
            other => panic!("expected ExitedNonZero, got {other:?}"),
        }
    }
}
