// src/exec/terminate.rs

use tokio::sync::oneshot;
use tracing::debug;

use super::ChildControl;
use crate::errors::{Result, SupervisorError};

/// Terminate a launched worker and wait for the launcher to confirm.
///
/// `prefix` tags the process in logs and errors (e.g. `"mocha"`). A worker
/// that has already exited counts as terminated.
pub async fn kill(control: ChildControl, prefix: &str) -> Result<()> {
    debug!(prefix, pid = ?control.pid(), "requesting process termination");

    let (ack_tx, ack_rx) = oneshot::channel();
    if control.request_kill(ack_tx).is_err() {
        debug!(prefix, "process already exited; nothing to kill");
        return Ok(());
    }

    match ack_rx.await {
        Ok(Ok(())) => {
            debug!(prefix, "process terminated");
            Ok(())
        }
        Ok(Err(source)) => Err(SupervisorError::Termination {
            prefix: prefix.to_string(),
            source,
        }),
        Err(_) => {
            debug!(prefix, "launcher dropped kill acknowledgement; process gone");
            Ok(())
        }
    }
}
