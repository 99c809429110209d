use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use mocha_supervisor::errors::{Result, SupervisorError};
use mocha_supervisor::exec::{ChildControl, ChildEvent, ProcessLauncher};
use mocha_supervisor::launch::LaunchSpec;

/// A fake launcher that:
/// - records every `LaunchSpec` it was asked to spawn
/// - replays a fixed list of `ChildEvent`s instead of running a process
/// - optionally "hangs" after the script until a kill request arrives, then
///   acknowledges it and emits `Closed { code: None }`. When the kill is
///   scripted to fail, the fake worker keeps running for
///   [`ScriptedLauncher::SURVIVES_FAILED_KILL`] before it closes.
/// - counts fake workers that are alive (launched and not yet closed).
#[derive(Clone, Default)]
pub struct ScriptedLauncher {
    script: Vec<ChildEvent>,
    hang_until_killed: bool,
    kill_error: Option<io::ErrorKind>,
    fail_spawn: bool,
    spawn_delay: Option<Duration>,
    launches: Arc<Mutex<Vec<LaunchSpec>>>,
    workers: Arc<WorkerCount>,
}

#[derive(Default)]
struct WorkerCount {
    live: AtomicUsize,
    peak: AtomicUsize,
}

impl WorkerCount {
    fn started(&self) {
        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(live, Ordering::SeqCst);
    }

    fn closed(&self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ScriptedLauncher {
    pub const SURVIVES_FAILED_KILL: Duration = Duration::from_millis(50);

    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a worker that prints nothing and exits with `code`.
    pub fn exiting(code: i32) -> Self {
        Self::new().exit(Some(code))
    }

    pub fn stdout(mut self, text: &str) -> Self {
        self.script.push(ChildEvent::Stdout(text.as_bytes().to_vec()));
        self
    }

    pub fn message(mut self, value: serde_json::Value) -> Self {
        self.script.push(ChildEvent::Message(value));
        self
    }

    pub fn exit(mut self, code: Option<i32>) -> Self {
        self.script.push(ChildEvent::Closed { code });
        self
    }

    /// Keep the fake process alive after the script until it is killed.
    pub fn hang(mut self) -> Self {
        self.hang_until_killed = true;
        self
    }

    /// Make kill requests fail with this error kind.
    pub fn kill_error(mut self, kind: io::ErrorKind) -> Self {
        self.kill_error = Some(kind);
        self
    }

    /// Make every launch fail before anything runs.
    pub fn fail_spawn(mut self) -> Self {
        self.fail_spawn = true;
        self
    }

    /// Take this long to spawn each fake worker.
    pub fn spawn_delay(mut self, delay: Duration) -> Self {
        self.spawn_delay = Some(delay);
        self
    }

    /// Fake workers currently alive.
    pub fn live_workers(&self) -> usize {
        self.workers.live.load(Ordering::SeqCst)
    }

    /// Highest number of fake workers alive at the same time.
    pub fn peak_live_workers(&self) -> usize {
        self.workers.peak.load(Ordering::SeqCst)
    }

    /// Specs passed to `launch`, in order.
    pub fn launches(&self) -> Vec<LaunchSpec> {
        self.launches.lock().unwrap().clone()
    }
}

impl ProcessLauncher for ScriptedLauncher {
    fn launch(
        &self,
        spec: LaunchSpec,
        events: mpsc::Sender<ChildEvent>,
    ) -> Pin<Box<dyn Future<Output = Result<ChildControl>> + Send + '_>> {
        let script = self.script.clone();
        let hang = self.hang_until_killed;
        let kill_error = self.kill_error;
        let fail_spawn = self.fail_spawn;
        let spawn_delay = self.spawn_delay;
        let launches = Arc::clone(&self.launches);
        let workers = Arc::clone(&self.workers);

        Box::pin(async move {
            launches.lock().unwrap().push(spec);
            if fail_spawn {
                return Err(SupervisorError::Launch(anyhow::anyhow!(
                    "scripted spawn failure"
                )));
            }

            if let Some(delay) = spawn_delay {
                tokio::time::sleep(delay).await;
            }

            let (control, kill_rx) = ChildControl::channel(Some(4242));
            workers.started();
            tokio::spawn(async move {
                for event in script {
                    let closing = matches!(event, ChildEvent::Closed { .. });
                    if closing {
                        workers.closed();
                    }
                    let sent = events.send(event).await.is_ok();
                    if closing {
                        return;
                    }
                    if !sent {
                        workers.closed();
                        return;
                    }
                }
                if !hang {
                    return;
                }
                if let Ok(ack) = kill_rx.await {
                    match kill_error {
                        Some(kind) => {
                            let _ = ack.send(Err(io::Error::new(kind, "scripted kill failure")));
                            tokio::time::sleep(Self::SURVIVES_FAILED_KILL).await;
                        }
                        None => {
                            let _ = ack.send(Ok(()));
                        }
                    }
                }
                workers.closed();
                let _ = events.send(ChildEvent::Closed { code: None }).await;
            });

            Ok(control)
        })
    }
}
