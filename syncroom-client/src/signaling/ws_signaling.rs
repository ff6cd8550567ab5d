use crate::signaling::{SignalEmitter, SignalingError, SignalingHandle, SignalingTransport};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use syncroom_core::{ClientSignal, ServerSignal};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{error, info, warn};

/// WebSocket connection to a syncroom relay, JSON text frames both ways.
#[derive(Debug, Clone)]
pub struct WsSignaling {
    url: String,
}

impl WsSignaling {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl SignalingTransport for WsSignaling {
    async fn connect(&self) -> Result<SignalingHandle, SignalingError> {
        let (ws, _response) =
            connect_async(self.url.as_str())
                .await
                .map_err(|e| SignalingError::Connect {
                    url: self.url.clone(),
                    reason: e.to_string(),
                })?;
        info!("Connected to signaling relay {}", self.url);

        let (mut sink, mut stream) = ws.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ClientSignal>();
        let (in_tx, in_rx) = mpsc::unbounded_channel::<ServerSignal>();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let url = self.url.clone();

        tokio::spawn(async move {
            let mut send_task = tokio::spawn(async move {
                loop {
                    tokio::select! {
                        signal = out_rx.recv() => {
                            let Some(signal) = signal else { break };
                            let json = match serde_json::to_string(&signal) {
                                Ok(json) => json,
                                Err(e) => {
                                    error!("Failed to serialize signal message: {}", e);
                                    continue;
                                }
                            };
                            if sink.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                        _ = &mut shutdown_rx => {
                            // flush whatever was queued before the close request (EXIT)
                            while let Ok(signal) = out_rx.try_recv() {
                                if let Ok(json) = serde_json::to_string(&signal) {
                                    let _ = sink.send(Message::Text(json.into())).await;
                                }
                            }
                            let _ = sink.close().await;
                            break;
                        }
                    }
                }
            });

            let mut recv_task = tokio::spawn(async move {
                while let Some(Ok(msg)) = stream.next().await {
                    match msg {
                        Message::Text(text) => {
                            match serde_json::from_str::<ServerSignal>(text.as_str()) {
                                Ok(signal) => {
                                    if in_tx.send(signal).is_err() {
                                        break;
                                    }
                                }
                                Err(e) => warn!("Invalid ServerSignal from relay: {:?}", e),
                            }
                        }
                        Message::Close(_) => break,
                        _ => {}
                    }
                }
            });

            tokio::select! {
                _ = (&mut send_task) => recv_task.abort(),
                _ = (&mut recv_task) => send_task.abort(),
            };
            info!("Signaling connection to {} finished", url);
        });

        Ok(SignalingHandle::new(
            SignalEmitter::new(out_tx),
            in_rx,
            shutdown_tx,
        ))
    }
}
