// src/supervisor/mod.rs

//! Supervision of a single worker run.
//!
//! This module ties together:
//! - the existence gate and launch configuration,
//! - the per-run phase (`Running | Stopping | Resolved`) shared between the
//!   completion path and interrupts,
//! - the pure run core that consumes worker events,
//! - the completion resolver that turns an exit into a verdict.
//!
//! The pure pieces live in [`core`], [`phase`] and [`resolve`]; the async
//! shell exposing `start` / `interrupt` is [`runner::Supervisor`].

/// Structured payload reported by the worker. Opaque to the supervisor.
pub type RunResult = serde_json::Value;

/// Tag used for the worker in termination requests and logs.
pub const PROCESS_PREFIX: &str = "mocha";

/// How a call to [`Supervisor::start`] finished, when it did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The worker ran and the verdict is success.
    Passed { result: Option<RunResult> },
    /// No spec path matched and the relaxed policy applies; nothing ran.
    Skipped,
    /// The run was interrupted; the interrupt caller owns the outcome.
    Interrupted,
}

pub mod core;
pub mod phase;
pub mod resolve;
pub mod runner;

pub use self::core::{CoreStep, RunCore};
pub use phase::{RunPhase, SharedPhase};
pub use resolve::{resolve, Verdict};
pub use runner::Supervisor;
