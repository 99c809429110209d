// src/exec/process.rs

//! Real worker launcher built on `tokio::process`.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::Context;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::backend::{ChildControl, KillReceiver, ProcessLauncher};
use super::result_channel::ResultChannel;
use super::ChildEvent;
use crate::errors::{Result, SupervisorError};
use crate::launch::{LaunchSpec, RESULT_ADDR_ENV};

const CHUNK_SIZE: usize = 8 * 1024;

/// Launcher used in production.
///
/// - stdout and stderr are piped and copied verbatim to our own stdout and
///   stderr; stdout chunks are also emitted as `ChildEvent::Stdout`.
/// - stdin is inherited, so the worker reads our standard input directly.
/// - the environment is inherited, extended with `spec.env` and the result
///   channel address.
/// - the process is killed if its handle is dropped.
#[derive(Debug, Clone, Default)]
pub struct TokioLauncher;

impl TokioLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessLauncher for TokioLauncher {
    fn launch(
        &self,
        spec: LaunchSpec,
        events: mpsc::Sender<ChildEvent>,
    ) -> Pin<Box<dyn Future<Output = Result<ChildControl>> + Send + '_>> {
        Box::pin(async move {
            let results = ResultChannel::bind(events.clone())
                .await
                .context("binding result channel")
                .map_err(SupervisorError::Launch)?;

            let mut cmd = Command::new(&spec.program);
            cmd.args(spec.args())
                .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                .env(RESULT_ADDR_ENV, results.addr().to_string())
                .stdin(Stdio::inherit())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true);

            info!(program = %spec.program, args = ?spec.args(), "starting worker process");

            let mut child = match cmd.spawn() {
                Ok(child) => child,
                Err(e) => {
                    results.close().await;
                    return Err(SupervisorError::Launch(anyhow::Error::new(e).context(
                        format!("spawning worker '{}'", spec.program),
                    )));
                }
            };

            let pid = child.id();
            let stdout_pump = child
                .stdout
                .take()
                .map(|out| tokio::spawn(tee(out, tokio::io::stdout(), Some(events.clone()))));
            let stderr_pump = child
                .stderr
                .take()
                .map(|err| tokio::spawn(tee(err, tokio::io::stderr(), None)));

            let (control, kill_rx) = ChildControl::channel(pid);
            tokio::spawn(watch_child(
                child,
                kill_rx,
                [stdout_pump, stderr_pump],
                results,
                events,
            ));

            debug!(?pid, "worker process spawned");
            Ok(control)
        })
    }
}

/// Copy `reader` to `writer` chunk by chunk, optionally reporting each chunk
/// as a stdout event.
async fn tee<R, W>(mut reader: R, mut writer: W, events: Option<mpsc::Sender<ChildEvent>>)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "reading worker output failed");
                break;
            }
        };
        let chunk = &buf[..n];

        if let Err(e) = writer.write_all(chunk).await {
            debug!(error = %e, "forwarding worker output failed");
        }
        let _ = writer.flush().await;

        if let Some(tx) = &events {
            let _ = tx.send(ChildEvent::Stdout(chunk.to_vec())).await;
        }
    }
}

/// Wait for the worker to exit (or to be killed), drain its output and
/// results, then emit `Closed`.
async fn watch_child(
    mut child: Child,
    mut kill_rx: KillReceiver,
    pumps: [Option<JoinHandle<()>>; 2],
    results: ResultChannel,
    events: mpsc::Sender<ChildEvent>,
) {
    let status = tokio::select! {
        status = child.wait() => status,
        Ok(ack) = &mut kill_rx => {
            let killed = child.kill().await;
            if let Err(e) = &killed {
                warn!(error = %e, "failed to kill worker process");
            }
            let _ = ack.send(killed);
            child.wait().await
        }
    };

    let code = match status {
        Ok(status) => {
            info!(exit_code = ?status.code(), success = status.success(), "worker process exited");
            status.code()
        }
        Err(e) => {
            warn!(error = %e, "waiting for worker process failed");
            None
        }
    };

    for pump in pumps.into_iter().flatten() {
        if let Err(e) = pump.await {
            warn!(error = %e, "output pump task failed");
        }
    }
    results.close().await;

    let _ = events.send(ChildEvent::Closed { code }).await;
}
