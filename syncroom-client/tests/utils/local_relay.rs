use async_trait::async_trait;
use syncroom_client::{SignalEmitter, SignalingError, SignalingHandle, SignalingTransport};
use syncroom_core::ClientSignal;
use syncroom_relay::SignalingService;
use tokio::sync::{mpsc, oneshot};

/// Signaling transport wired straight into an in-process relay service, no sockets.
#[derive(Clone, Default)]
pub struct LocalRelay {
    pub service: SignalingService,
}

impl LocalRelay {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SignalingTransport for LocalRelay {
    async fn connect(&self) -> Result<SignalingHandle, SignalingError> {
        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (client_tx, mut client_rx) = mpsc::unbounded_channel::<ClientSignal>();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let service = self.service.clone();
        let peer_id = service.register(server_tx);
        tracing::debug!("[LocalRelay] registered {:?}", peer_id);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    signal = client_rx.recv() => match signal {
                        Some(signal) => service.handle(&peer_id, signal),
                        None => break,
                    },
                    _ = &mut shutdown_rx => {
                        while let Ok(signal) = client_rx.try_recv() {
                            service.handle(&peer_id, signal);
                        }
                        break;
                    }
                }
            }
            service.unregister(&peer_id);
            tracing::debug!("[LocalRelay] unregistered {:?}", peer_id);
        });

        Ok(SignalingHandle::new(
            SignalEmitter::new(client_tx),
            server_rx,
            shutdown_tx,
        ))
    }
}
