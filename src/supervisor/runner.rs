// src/supervisor/runner.rs

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::config::RunOptions;
use crate::errors::{Result, SupervisorError};
use crate::exec::{self, ChildControl, ChildEvent, ProcessLauncher};
use crate::fs::{FileSystem, RealFileSystem};
use crate::gate::{self, GateDecision};
use crate::launch::LaunchSpec;

use super::core::{CoreStep, RunCore};
use super::phase::{RunPhase, SharedPhase};
use super::{RunOutcome, PROCESS_PREFIX};

const EVENT_BUFFER: usize = 64;

/// Where a waiting interrupt receives the termination result.
type StopReply = oneshot::Sender<Result<()>>;

/// The run currently owned by a supervisor.
///
/// The run stays in the slot until `start` returns, which happens only after
/// the worker closed (or was never spawned).
struct ActiveRun {
    id: u64,
    phase: SharedPhase,
    /// `None` while the gate runs, while the worker is being spawned, and
    /// once an interrupt took it to terminate the worker.
    control: Option<ChildControl>,
    /// Interrupt waiting for the spawn to finish; `start` answers it with
    /// the termination result.
    stop_reply: Option<StopReply>,
    /// Resolves (with an error) once `start` released the slot.
    released: watch::Receiver<()>,
}

/// What `interrupt` has to do once the slot lock is released.
enum StopAction {
    Kill(ChildControl),
    AwaitSpawn(oneshot::Receiver<Result<()>>),
    AwaitRelease,
}

/// Supervises one worker run at a time.
///
/// `start` and `interrupt` take `&self` so a supervisor can be shared (e.g.
/// in an `Arc`) between the task awaiting the run and whoever may interrupt
/// it. At most one run, and so at most one worker, is active; a second
/// `start` fails with [`SupervisorError::AlreadyRunning`].
pub struct Supervisor<L: ProcessLauncher> {
    options: RunOptions,
    launcher: L,
    fs: Arc<dyn FileSystem>,
    active: Mutex<Option<ActiveRun>>,
    next_run_id: AtomicU64,
}

impl<L: ProcessLauncher> fmt::Debug for Supervisor<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("options", &self.options)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl<L: ProcessLauncher> Supervisor<L> {
    pub fn new(options: RunOptions, launcher: L) -> Self {
        Self {
            options,
            launcher,
            fs: Arc::new(RealFileSystem),
            active: Mutex::new(None),
            next_run_id: AtomicU64::new(1),
        }
    }

    /// Use a different filesystem for the existence gate.
    pub fn with_filesystem(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    /// Whether a run currently occupies this supervisor.
    pub fn is_running(&self) -> bool {
        self.slot().is_some()
    }

    /// Run the worker once and resolve its outcome.
    ///
    /// - No matching specs: `Ok(Skipped)` under relaxed policy,
    ///   `Err(NoSpecsFound)` under strict policy; nothing is spawned.
    /// - Worker closed: `Ok(Passed)` or a run failure carrying the last
    ///   structured result.
    /// - Interrupted before the close was resolved: `Ok(Interrupted)`; the
    ///   verdict is suppressed and the interrupt call reports termination.
    pub async fn start(&self) -> Result<RunOutcome> {
        let (slot, phase) = self.reserve()?;

        if gate::check(self.fs.as_ref(), &self.options)? == GateDecision::Skip {
            return Ok(RunOutcome::Skipped);
        }
        if phase.get() != RunPhase::Running {
            debug!("interrupted before launch; not spawning");
            return Ok(RunOutcome::Interrupted);
        }

        debug!(path = %self.options.path, "[mocha] Running...");
        let spec = LaunchSpec::from_options(&self.options)?;

        let (tx, mut rx) = mpsc::channel::<ChildEvent>(EVENT_BUFFER);
        let control = self.launcher.launch(spec, tx).await?;

        if let Some((control, reply)) = self.attach(&slot, control) {
            debug!("interrupt arrived during spawn; terminating worker");
            let killed = exec::kill(control, PROCESS_PREFIX).await;
            match reply {
                Some(reply) => {
                    let _ = reply.send(killed);
                }
                None => {
                    if let Err(e) = killed {
                        warn!(error = %e, "failed to terminate interrupted worker");
                    }
                }
            }
        }

        let mut core = RunCore::new(self.options.fail_when_no_tests_run());
        let code = loop {
            match rx.recv().await {
                Some(event) => {
                    if let CoreStep::Closed { code } = core.step(event) {
                        break code;
                    }
                }
                None => {
                    warn!("worker event stream ended without a close event");
                    break None;
                }
            }
        };

        debug!(?code, no_tests_found = core.no_tests_found(), "worker closed");

        if !phase.try_resolve() {
            debug!("run is stopping; leaving the outcome to the interrupt");
            return Ok(RunOutcome::Interrupted);
        }

        let outcome = core.into_outcome(code);
        match &outcome {
            Ok(_) => info!(?code, "mocha run passed"),
            Err(e) => info!(?code, error = %e, "mocha run failed"),
        }
        outcome
    }

    /// Terminate the active worker, if any.
    ///
    /// Returns once the termination is confirmed, with its error as-is if it
    /// failed. After a successful termination the supervisor is free for a
    /// new run. With no active run this returns `Ok(())` immediately; a call
    /// that finds a termination already under way waits for the run to end.
    pub async fn interrupt(&self) -> Result<()> {
        debug!("interrupting mocha");

        let (action, mut released) = {
            let mut guard = self.slot();
            let Some(run) = guard.as_mut() else {
                debug!("no child to interrupt");
                return Ok(());
            };
            let released = run.released.clone();

            let action = if !run.phase.try_stop() {
                debug!(run_id = run.id, phase = ?run.phase.get(), "run already finishing");
                StopAction::AwaitRelease
            } else if let Some(control) = run.control.take() {
                StopAction::Kill(control)
            } else {
                debug!(run_id = run.id, "worker not spawned yet; waiting for the launch");
                let (tx, rx) = oneshot::channel();
                run.stop_reply = Some(tx);
                StopAction::AwaitSpawn(rx)
            };
            (action, released)
        };

        match action {
            StopAction::Kill(control) => exec::kill(control, PROCESS_PREFIX).await?,
            // A dropped reply means `start` ended without spawning.
            StopAction::AwaitSpawn(reply) => reply.await.unwrap_or(Ok(()))?,
            StopAction::AwaitRelease => {}
        }

        // Err here only means the sender is gone, i.e. the slot is free.
        let _ = released.changed().await;
        Ok(())
    }

    /// Claim the active-run slot for a new run.
    fn reserve(&self) -> Result<(ActiveSlot<'_>, SharedPhase)> {
        let mut slot = self.slot();
        if slot.is_some() {
            return Err(SupervisorError::AlreadyRunning);
        }

        let id = self.next_run_id.fetch_add(1, Ordering::Relaxed);
        let phase = SharedPhase::running();
        let (release_tx, released) = watch::channel(());
        *slot = Some(ActiveRun {
            id,
            phase: phase.clone(),
            control: None,
            stop_reply: None,
            released,
        });

        Ok((
            ActiveSlot {
                active: &self.active,
                id,
                _release: release_tx,
            },
            phase,
        ))
    }

    /// Store the spawned worker's control handle in the active run.
    ///
    /// If the run was interrupted during the spawn, hands the handle back
    /// together with the waiting interrupt's reply channel.
    fn attach(
        &self,
        slot: &ActiveSlot<'_>,
        control: ChildControl,
    ) -> Option<(ChildControl, Option<StopReply>)> {
        let mut guard = self.slot();
        match guard.as_mut() {
            Some(run) if run.id == slot.id && run.phase.get() == RunPhase::Running => {
                run.control = Some(control);
                None
            }
            Some(run) if run.id == slot.id => Some((control, run.stop_reply.take())),
            _ => Some((control, None)),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<ActiveRun>> {
        lock_slot(&self.active)
    }
}

fn lock_slot(active: &Mutex<Option<ActiveRun>>) -> MutexGuard<'_, Option<ActiveRun>> {
    active.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Releases the active-run slot when `start` returns.
///
/// Dropping `_release` wakes every interrupt waiting for the run to end. An
/// interrupt still waiting on the spawn is answered with `Ok(())`: nothing
/// was left running.
struct ActiveSlot<'a> {
    active: &'a Mutex<Option<ActiveRun>>,
    id: u64,
    _release: watch::Sender<()>,
}

impl Drop for ActiveSlot<'_> {
    fn drop(&mut self) {
        let mut guard = lock_slot(self.active);
        if guard.as_ref().is_some_and(|run| run.id == self.id) {
            if let Some(reply) = guard.take().and_then(|run| run.stop_reply) {
                let _ = reply.send(Ok(()));
            }
        }
    }
}
