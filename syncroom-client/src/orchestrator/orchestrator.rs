use crate::link::PeerEvent;
use crate::orchestrator::orchestrator_task::{Command, OrchestratorTask};
use crate::orchestrator::session_state::SessionState;
use crate::orchestrator::{Connections, OrchestratorConfig};
use crate::registry::PeerLinkRegistry;
use crate::signaling::{SignalingError, SignalingTransport, WsSignaling};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use syncroom_core::{ConnectionState, PeerId};
use tokio::sync::{broadcast, mpsc, oneshot, watch};

/// Joins a room through a signaling relay and keeps a data channel to every
/// other participant.
///
/// The session runs on its own task; this handle reads its state and sends
/// through its links. Dropping the handle closes the session.
pub struct ConnectionOrchestrator {
    session: Arc<SessionState>,
    registry: Arc<PeerLinkRegistry>,
    commands: mpsc::UnboundedSender<Command>,
}

impl ConnectionOrchestrator {
    pub async fn start(
        transport: &dyn SignalingTransport,
        config: OrchestratorConfig,
    ) -> Result<Self, SignalingError> {
        let signaling = transport.connect().await?;

        let session = Arc::new(SessionState::new());
        let registry = Arc::new(PeerLinkRegistry::new(config.link.clone()));
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();

        let task = OrchestratorTask::new(
            config,
            session.clone(),
            registry.clone(),
            signaling,
            commands_tx.clone(),
            commands_rx,
        );
        tokio::spawn(task.run());

        Ok(Self {
            session,
            registry,
            commands: commands_tx,
        })
    }

    /// Connects to a WebSocket relay at `url`.
    pub async fn connect(url: &str, config: OrchestratorConfig) -> Result<Self, SignalingError> {
        Self::start(&WsSignaling::new(url), config).await
    }

    pub fn me(&self) -> Option<PeerId> {
        self.session.me()
    }

    pub fn host(&self) -> Option<PeerId> {
        self.session.host()
    }

    pub fn is_host(&self) -> bool {
        self.session.is_host()
    }

    pub fn state(&self) -> ConnectionState {
        self.session.state()
    }

    /// Waits until the session leaves `Pending` and returns the state it reached.
    ///
    /// Never times out on its own.
    pub async fn connected(&self) -> ConnectionState {
        let mut rx = self.session.subscribe_state();
        match rx.wait_for(|state| *state != ConnectionState::Pending).await {
            Ok(state) => *state,
            Err(_) => ConnectionState::Closed,
        }
    }

    pub fn host_changes(&self) -> watch::Receiver<Option<PeerId>> {
        self.session.subscribe_host()
    }

    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.session.subscribe_state()
    }

    pub async fn broadcast(&self, data: Bytes) -> usize {
        self.registry.broadcast(data).await
    }

    pub async fn send_to(&self, id: &PeerId, data: Bytes) -> bool {
        self.registry.send_to(id, data).await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PeerEvent> {
        self.registry.subscribe()
    }

    pub fn peers(&self) -> Vec<PeerId> {
        self.registry.ids()
    }

    /// Leaves the room and closes every link. Always ends `Closed`.
    pub async fn close(&self) -> ConnectionState {
        let (done, wait) = oneshot::channel();
        if self.commands.send(Command::Close { done }).is_ok() {
            let _ = wait.await;
        }
        self.registry.remove_all().await;
        self.session.transition(ConnectionState::Closed);
        ConnectionState::Closed
    }
}

impl Drop for ConnectionOrchestrator {
    fn drop(&mut self) {
        let (done, _) = oneshot::channel();
        let _ = self.commands.send(Command::Close { done });
    }
}

#[async_trait]
impl Connections for ConnectionOrchestrator {
    fn me(&self) -> Option<PeerId> {
        ConnectionOrchestrator::me(self)
    }

    fn host(&self) -> Option<PeerId> {
        ConnectionOrchestrator::host(self)
    }

    fn is_host(&self) -> bool {
        ConnectionOrchestrator::is_host(self)
    }

    async fn broadcast(&self, data: Bytes) -> usize {
        ConnectionOrchestrator::broadcast(self, data).await
    }

    async fn send_to(&self, id: &PeerId, data: Bytes) -> bool {
        ConnectionOrchestrator::send_to(self, id, data).await
    }

    fn subscribe(&self) -> broadcast::Receiver<PeerEvent> {
        ConnectionOrchestrator::subscribe(self)
    }
}
