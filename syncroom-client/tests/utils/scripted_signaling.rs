use anyhow::{Result, bail};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use syncroom_client::{SignalEmitter, SignalingError, SignalingHandle, SignalingTransport};
use syncroom_core::{ClientSignal, ServerSignal};
use tokio::sync::{mpsc, oneshot};

/// Signaling transport driven by the test: it plays the relay by hand.
pub struct ScriptedSignaling {
    ends: Mutex<Option<SignalingHandle>>,
}

/// The relay side of a [`ScriptedSignaling`].
pub struct ScriptedRelay {
    to_client: mpsc::UnboundedSender<ServerSignal>,
    from_client: mpsc::UnboundedReceiver<ClientSignal>,
    shutdown: oneshot::Receiver<()>,
}

impl ScriptedSignaling {
    pub fn new() -> (Self, ScriptedRelay) {
        let (to_client, inbound) = mpsc::unbounded_channel();
        let (client_tx, from_client) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown) = oneshot::channel();

        let handle = SignalingHandle::new(SignalEmitter::new(client_tx), inbound, shutdown_tx);
        let signaling = Self {
            ends: Mutex::new(Some(handle)),
        };
        let relay = ScriptedRelay {
            to_client,
            from_client,
            shutdown,
        };
        (signaling, relay)
    }
}

#[async_trait]
impl SignalingTransport for ScriptedSignaling {
    async fn connect(&self) -> Result<SignalingHandle, SignalingError> {
        self.ends
            .lock()
            .map_err(|_| SignalingError::Closed)?
            .take()
            .ok_or(SignalingError::Closed)
    }
}

impl ScriptedRelay {
    pub fn send(&self, signal: ServerSignal) {
        let _ = self.to_client.send(signal);
    }

    /// Next signal from the client, or an error after `timeout_ms`.
    pub async fn recv(&mut self, timeout_ms: u64) -> Result<ClientSignal> {
        match tokio::time::timeout(Duration::from_millis(timeout_ms), self.from_client.recv()).await
        {
            Ok(Some(signal)) => Ok(signal),
            Ok(None) => bail!("Client dropped its signaling emitter"),
            Err(_) => bail!("Timeout waiting for a client signal"),
        }
    }

    /// Skips signals until one matches `pred`.
    pub async fn recv_matching(
        &mut self,
        timeout_ms: u64,
        pred: impl Fn(&ClientSignal) -> bool,
    ) -> Result<ClientSignal> {
        let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            let left = deadline.saturating_duration_since(tokio::time::Instant::now());
            let signal = self.recv(left.as_millis() as u64).await?;
            if pred(&signal) {
                return Ok(signal);
            }
        }
    }

    /// Everything the client emits within `window_ms`.
    pub async fn drain(&mut self, window_ms: u64) -> Vec<ClientSignal> {
        let mut signals = Vec::new();
        let deadline = tokio::time::Instant::now() + Duration::from_millis(window_ms);
        while let Ok(Some(signal)) =
            tokio::time::timeout_at(deadline, self.from_client.recv()).await
        {
            signals.push(signal);
        }
        signals
    }

    pub fn is_shut_down(&mut self) -> bool {
        !matches!(
            self.shutdown.try_recv(),
            Err(oneshot::error::TryRecvError::Empty)
        )
    }
}
