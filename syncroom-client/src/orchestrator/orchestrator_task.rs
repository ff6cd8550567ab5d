use crate::link::{OnIceCandidate, PeerLink};
use crate::orchestrator::session_state::SessionState;
use crate::orchestrator::{HostDeparturePolicy, OrchestratorConfig};
use crate::registry::PeerLinkRegistry;
use crate::signaling::SignalingHandle;
use anyhow::Result;
use std::ops::ControlFlow;
use std::sync::Arc;
use syncroom_core::{
    ClientSignal, ConnectionState, IceCandidate, PeerId, SdpType, ServerSignal,
    SessionDescription,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

pub(crate) enum Command {
    LocalCandidate { target: PeerId, ice: IceCandidate },
    Close { done: oneshot::Sender<()> },
}

/// Event loop of one session. Handles one signal or command at a time.
pub(crate) struct OrchestratorTask {
    config: OrchestratorConfig,
    session: Arc<SessionState>,
    registry: Arc<PeerLinkRegistry>,
    signaling: SignalingHandle,
    commands_tx: mpsc::UnboundedSender<Command>,
    commands_rx: mpsc::UnboundedReceiver<Command>,
}

impl OrchestratorTask {
    pub fn new(
        config: OrchestratorConfig,
        session: Arc<SessionState>,
        registry: Arc<PeerLinkRegistry>,
        signaling: SignalingHandle,
        commands_tx: mpsc::UnboundedSender<Command>,
        commands_rx: mpsc::UnboundedReceiver<Command>,
    ) -> Self {
        Self {
            config,
            session,
            registry,
            signaling,
            commands_tx,
            commands_rx,
        }
    }

    pub async fn run(mut self) {
        let mut signaling_open = true;

        loop {
            tokio::select! {
                command = self.commands_rx.recv() => match command {
                    Some(Command::LocalCandidate { target, ice }) => {
                        self.signaling.emitter.emit(ClientSignal::Candidate { target, ice });
                    }
                    Some(Command::Close { done }) => {
                        self.shutdown().await;
                        let _ = done.send(());
                        break;
                    }
                    None => {
                        self.shutdown().await;
                        break;
                    }
                },
                signal = self.signaling.inbound.recv(), if signaling_open => match signal {
                    Some(signal) => {
                        if self.handle_signal(signal).await.is_break() {
                            self.shutdown().await;
                            break;
                        }
                    }
                    None => {
                        warn!("Signaling connection lost, links stay up");
                        signaling_open = false;
                    }
                },
            }
        }
        debug!("Orchestrator loop for {:?} finished", self.session.me());
    }

    async fn handle_signal(&mut self, signal: ServerSignal) -> ControlFlow<()> {
        match signal {
            ServerSignal::Connected { id } => {
                if !self.session.set_me(id.clone()) {
                    warn!("Repeated CONNECTED ({:?}), keeping {:?}", id, self.session.me());
                    return ControlFlow::Continue(());
                }
                info!("Signaling assigned id {:?}, entering room '{}'", id, self.config.room_name);
                self.signaling.emitter.emit(ClientSignal::Enter {
                    room_name: self.config.room_name.clone(),
                });
            }
            ServerSignal::Disconnected { id } => {
                let removed = self.registry.remove(&id).await;
                debug!("Peer {:?} left (link removed: {})", id, removed);
                if self.session.host().as_ref() == Some(&id) {
                    warn!("Host {:?} left the room", id);
                    if self.config.host_departure == HostDeparturePolicy::Close {
                        return ControlFlow::Break(());
                    }
                }
            }
            ServerSignal::YouHost => match self.session.me() {
                Some(me) => {
                    info!("Room '{}' was empty, {:?} is the host", self.config.room_name, me);
                    self.session.set_host(me);
                }
                None => warn!("YOU_HOST arrived before CONNECTED, ignoring"),
            },
            ServerSignal::Joined { id } => {
                let Some(link) = self.link_for(&id).await else {
                    return ControlFlow::Continue(());
                };
                if let Some(offer) = link.make_offer_to_peer().await {
                    self.signaling.emitter.emit(ClientSignal::Sdp {
                        target: id,
                        sdp: offer,
                        is_host: Some(self.session.is_host()),
                    });
                }
            }
            ServerSignal::Sdp { sdp } => self.handle_sdp(sdp).await,
            ServerSignal::Candidate { ice } => {
                let Some(from) = ice.id.clone() else {
                    warn!("Candidate without sender id, dropping");
                    return ControlFlow::Continue(());
                };
                match self.registry.get(&from) {
                    Some(link) => {
                        link.receive_candidate_from_peer(ice).await;
                    }
                    None => debug!("No link to {:?}, dropping candidate", from),
                }
            }
            ServerSignal::Completed { host_id } => {
                if let Some(host_id) = host_id {
                    self.session.set_host(host_id);
                }
                if self.session.host().is_some() {
                    if self.session.transition(ConnectionState::Connected) {
                        info!(
                            "Connected to room '{}' (host {:?})",
                            self.config.room_name,
                            self.session.host()
                        );
                    }
                } else {
                    debug!("Handshake completed but host is still unknown");
                }
            }
        }
        ControlFlow::Continue(())
    }

    async fn handle_sdp(&mut self, sdp: SessionDescription) {
        let Some(from) = sdp.id.clone() else {
            warn!("SDP without sender id, dropping");
            return;
        };
        match sdp.sdp_type {
            SdpType::Offer => {
                let Some(link) = self.link_for(&from).await else {
                    return;
                };
                if let Some(answer) = link.receive_offer_from_peer(sdp).await {
                    self.signaling.emitter.emit(ClientSignal::Sdp {
                        target: from,
                        sdp: answer,
                        is_host: None,
                    });
                }
            }
            SdpType::Answer => {
                let Some(link) = self.registry.get(&from) else {
                    debug!("Answer from {:?} without a link, dropping", from);
                    return;
                };
                if link.receive_answer_from_peer(sdp).await {
                    self.signaling
                        .emitter
                        .emit(ClientSignal::Complete { target: Some(from) });
                }
            }
            other => warn!("Unsupported SDP type {:?} from {:?}, ignoring", other, from),
        }
    }

    async fn link_for(&self, id: &PeerId) -> Option<Arc<PeerLink>> {
        match self.create_link(id).await {
            Ok(link) => Some(link),
            Err(e) => {
                error!("Failed to create link to {:?}: {:#}", id, e);
                None
            }
        }
    }

    async fn create_link(&self, id: &PeerId) -> Result<Arc<PeerLink>> {
        let commands = self.commands_tx.clone();
        let target = id.clone();
        let forward: OnIceCandidate = Arc::new(move |ice| {
            let _ = commands.send(Command::LocalCandidate {
                target: target.clone(),
                ice,
            });
        });
        self.registry.get_or_create(id, forward).await
    }

    async fn shutdown(&mut self) {
        if !self.signaling.is_closed() {
            self.signaling.emitter.emit(ClientSignal::Exit);
            self.signaling.close();
        }
        self.registry.remove_all().await;
        self.session.transition(ConnectionState::Closed);
        info!("Left room '{}'", self.config.room_name);
    }
}
