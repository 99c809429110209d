// src/exec/backend.rs

//! Pluggable launcher abstraction.
//!
//! The supervisor talks to a `ProcessLauncher` instead of spawning processes
//! itself. Production code uses [`super::TokioLauncher`]; tests provide a
//! launcher that scripts `ChildEvent`s without any OS process.

use std::future::Future;
use std::io;
use std::pin::Pin;

use tokio::sync::{mpsc, oneshot};

use super::ChildEvent;
use crate::errors::Result;
use crate::launch::LaunchSpec;

/// Acknowledgement channel for a kill request: the launcher reports whether
/// the process could be terminated.
pub type KillAck = oneshot::Sender<io::Result<()>>;

/// Launcher side of the kill channel.
pub type KillReceiver = oneshot::Receiver<KillAck>;

/// Trait abstracting how the worker is spawned.
pub trait ProcessLauncher: Send + Sync {
    /// Spawn the worker described by `spec`.
    ///
    /// The implementation must emit every [`ChildEvent`] for this launch on
    /// `events`, finishing with exactly one `ChildEvent::Closed`. It returns
    /// once the process is running.
    fn launch(
        &self,
        spec: LaunchSpec,
        events: mpsc::Sender<ChildEvent>,
    ) -> Pin<Box<dyn Future<Output = Result<ChildControl>> + Send + '_>>;
}

/// Handle to a launched worker, used to request termination.
#[derive(Debug)]
pub struct ChildControl {
    pid: Option<u32>,
    kill_tx: oneshot::Sender<KillAck>,
}

impl ChildControl {
    /// Create a control handle plus the receiver the launcher must watch for
    /// kill requests.
    pub fn channel(pid: Option<u32>) -> (Self, KillReceiver) {
        let (kill_tx, kill_rx) = oneshot::channel();
        (Self { pid, kill_tx }, kill_rx)
    }

    /// OS process id, when the launcher has one.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Hand a kill request to the launcher.
    ///
    /// Returns the acknowledgement channel back if the launcher is no longer
    /// listening (the process already exited).
    pub(crate) fn request_kill(self, ack: KillAck) -> std::result::Result<(), KillAck> {
        self.kill_tx.send(ack)
    }
}
