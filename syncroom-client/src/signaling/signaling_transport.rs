use async_trait::async_trait;
use syncroom_core::{ClientSignal, ServerSignal};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

#[derive(Debug, Error)]
pub enum SignalingError {
    #[error("failed to connect to signaling relay at {url}: {reason}")]
    Connect { url: String, reason: String },
    #[error("signaling relay closed the connection")]
    Closed,
}

/// Connection to a signaling relay.
///
/// `connect` is called once per orchestrator. A relay that never opens keeps the future
/// pending; callers race it against their own timeout.
#[async_trait]
pub trait SignalingTransport: Send + Sync {
    async fn connect(&self) -> Result<SignalingHandle, SignalingError>;
}

/// Sending half of a signaling connection. Cheap to clone.
#[derive(Clone, Debug)]
pub struct SignalEmitter {
    tx: mpsc::UnboundedSender<ClientSignal>,
}

impl SignalEmitter {
    pub fn new(tx: mpsc::UnboundedSender<ClientSignal>) -> Self {
        Self { tx }
    }

    /// Queues one event for the relay. Dropped with a debug line once the connection is gone.
    pub fn emit(&self, signal: ClientSignal) {
        if let Err(e) = self.tx.send(signal) {
            debug!("Signaling connection closed, dropping {:?}", e.0);
        }
    }
}

/// Both halves of an open signaling connection plus its teardown switch.
pub struct SignalingHandle {
    pub emitter: SignalEmitter,
    pub inbound: mpsc::UnboundedReceiver<ServerSignal>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl SignalingHandle {
    pub fn new(
        emitter: SignalEmitter,
        inbound: mpsc::UnboundedReceiver<ServerSignal>,
        shutdown: oneshot::Sender<()>,
    ) -> Self {
        Self {
            emitter,
            inbound,
            shutdown: Some(shutdown),
        }
    }

    /// Tears the connection down. Later calls do nothing.
    pub fn close(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        self.inbound.close();
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_none()
    }
}
