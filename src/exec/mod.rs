// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the worker, using
//! `tokio::process::Command`, and reporting back to the supervisor via
//! [`ChildEvent`]s.
//!
//! - [`backend`] provides the `ProcessLauncher` trait and the `ChildControl`
//!   handle a launch returns; tests replace the launcher with a scripted one.
//! - [`process`] is the real `TokioLauncher`: spawns the worker, tees its
//!   output to our stdout/stderr, and emits events.
//! - [`result_channel`] receives structured results from the worker.
//! - [`terminate`] is the kill helper used by interrupts.

pub mod backend;
pub mod process;
pub mod result_channel;
pub mod terminate;

use crate::supervisor::RunResult;

/// Events flowing from a launched worker to the supervisor.
///
/// `Closed` is always the last event of a launch.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildEvent {
    /// A raw chunk of the worker's stdout (already forwarded verbatim).
    Stdout(Vec<u8>),
    /// A structured payload sent over the result channel.
    Message(RunResult),
    /// The worker exited and all its output has been drained.
    Closed { code: Option<i32> },
}

pub use backend::{ChildControl, KillAck, KillReceiver, ProcessLauncher};
pub use process::TokioLauncher;
pub use terminate::kill;
