use anyhow::{Context, Result};
use rendezvous_core::{ConnectionId, ServerMessage};
use std::time::Duration;
use tokio::sync::mpsc;

use super::signal_helpers::{QUIET_PERIOD_MS, SIGNAL_TIMEOUT_MS};

/// One simulated browser tab: its connection id plus everything the server
/// delivered to it.
pub struct TestClient {
    pub id: ConnectionId,
    rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl TestClient {
    pub fn new(id: ConnectionId, rx: mpsc::UnboundedReceiver<ServerMessage>) -> Self {
        Self { id, rx }
    }

    pub async fn recv(&mut self) -> Result<ServerMessage> {
        tokio::time::timeout(Duration::from_millis(SIGNAL_TIMEOUT_MS), self.rx.recv())
            .await
            .with_context(|| format!("Timed out waiting for a message on {}", self.id))?
            .context("Signal channel closed")
    }

    /// Next message that matches `pred`, skipping anything else.
    pub async fn recv_matching(
        &mut self,
        mut pred: impl FnMut(&ServerMessage) -> bool,
    ) -> Result<ServerMessage> {
        loop {
            let msg = self.recv().await?;
            if pred(&msg) {
                return Ok(msg);
            }
            tracing::debug!("[TestClient] {} skipping {:?}", self.id, msg);
        }
    }

    /// Everything already queued for this client.
    pub fn drain(&mut self) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            out.push(msg);
        }
        out
    }

    /// Waits briefly and fails if anything arrives.
    pub async fn assert_silent(&mut self) {
        let got =
            tokio::time::timeout(Duration::from_millis(QUIET_PERIOD_MS), self.rx.recv()).await;
        if let Ok(Some(msg)) = got {
            panic!("{} expected no message, got {:?}", self.id, msg);
        }
    }
}
