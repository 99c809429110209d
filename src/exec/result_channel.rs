// src/exec/result_channel.rs

//! Structured result channel from the worker.
//!
//! Each launch binds a loopback TCP listener and exports its address to the
//! worker (see [`crate::launch::RESULT_ADDR_ENV`]). The worker connects and
//! writes newline-delimited JSON; every line becomes one
//! [`ChildEvent::Message`]. Lines that are not valid JSON are logged and
//! dropped.

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, warn};

use super::ChildEvent;

/// How long to keep accepting after the worker exited, for connections
/// that were already queued on the listener.
const ACCEPT_GRACE: Duration = Duration::from_millis(50);

/// A running result listener for one launch.
#[derive(Debug)]
pub struct ResultChannel {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl ResultChannel {
    /// Bind on an ephemeral loopback port and start accepting connections.
    pub async fn bind(events: mpsc::Sender<ChildEvent>) -> io::Result<Self> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
        let addr = listener.local_addr()?;
        let (shutdown, shutdown_rx) = oneshot::channel();

        debug!(%addr, "result channel listening");
        let task = tokio::spawn(serve(listener, events, shutdown_rx));

        Ok(Self {
            addr,
            shutdown,
            task,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting and wait until every message already sent by the
    /// worker has been forwarded.
    ///
    /// Call this only after the worker exited; open connections are read
    /// until EOF.
    pub async fn close(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            warn!(error = %e, "result channel task failed");
        }
    }
}

async fn serve(
    listener: TcpListener,
    events: mpsc::Sender<ChildEvent>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut readers = JoinSet::new();

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    debug!(%peer, "worker connected to result channel");
                    readers.spawn(read_messages(stream, events.clone()));
                }
                Err(e) => warn!(error = %e, "failed to accept result connection"),
            },
            _ = &mut shutdown_rx => break,
        }
    }

    while let Ok(Ok((stream, _))) = tokio::time::timeout(ACCEPT_GRACE, listener.accept()).await {
        readers.spawn(read_messages(stream, events.clone()));
    }

    while readers.join_next().await.is_some() {}
}

async fn read_messages(stream: TcpStream, events: mpsc::Sender<ChildEvent>) {
    let mut lines = BufReader::new(stream).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str(line) {
                    Ok(value) => {
                        debug!(result = %line, "received message from worker");
                        if events.send(ChildEvent::Message(value)).await.is_err() {
                            return;
                        }
                    }
                    Err(e) => warn!(error = %e, "ignoring malformed result message"),
                }
            }
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "result connection failed");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn forwards_json_lines_and_skips_garbage() {
        let (tx, mut rx) = mpsc::channel(16);
        let channel = ResultChannel::bind(tx).await.unwrap();

        let mut client = TcpStream::connect(channel.addr()).await.unwrap();
        client
            .write_all(b"{\"passes\":1}\nnot json\n\n{\"passes\":2}\n")
            .await
            .unwrap();
        drop(client);

        channel.close().await;

        let mut got = Vec::new();
        while let Ok(event) = rx.try_recv() {
            got.push(event);
        }
        assert_eq!(
            got,
            vec![
                ChildEvent::Message(serde_json::json!({ "passes": 1 })),
                ChildEvent::Message(serde_json::json!({ "passes": 2 })),
            ]
        );
    }

    #[tokio::test]
    async fn close_without_connections_returns() {
        let (tx, _rx) = mpsc::channel(1);
        let channel = ResultChannel::bind(tx).await.unwrap();
        channel.close().await;
    }
}
