use crate::room::RoomManager;
use dashmap::DashMap;
use std::sync::Arc;
use syncroom_core::{ClientSignal, PeerId, ServerSignal};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

struct SignalingInner {
    peers: DashMap<PeerId, mpsc::UnboundedSender<ServerSignal>>,
    rooms: RoomManager,
}

/// Relay state shared by every WebSocket connection.
///
/// Assigns ids, tracks room membership and forwards signaling events to their target.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl Default for SignalingService {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalingService {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                peers: DashMap::new(),
                rooms: RoomManager::new(),
            }),
        }
    }

    /// Registers a new participant and acknowledges it with its id.
    pub fn register(&self, tx: mpsc::UnboundedSender<ServerSignal>) -> PeerId {
        let peer_id = PeerId::new();
        self.inner.peers.insert(peer_id.clone(), tx);
        self.send_signal(
            &peer_id,
            ServerSignal::Connected {
                id: peer_id.clone(),
            },
        );
        peer_id
    }

    pub fn unregister(&self, peer_id: &PeerId) {
        self.leave_room(peer_id);
        self.inner.peers.remove(peer_id);
    }

    pub fn handle(&self, from: &PeerId, signal: ClientSignal) {
        match signal {
            ClientSignal::Enter { room_name } => {
                let outcome = self.inner.rooms.enter(&room_name, from.clone());
                info!(
                    "Peer {:?} entered room '{}' (host: {})",
                    from, room_name, outcome.is_host
                );

                if outcome.is_host {
                    self.send_signal(from, ServerSignal::YouHost);
                    return;
                }
                for member in outcome.existing {
                    self.send_signal(&member, ServerSignal::Joined { id: from.clone() });
                }
            }

            ClientSignal::Exit => {
                info!("Peer {:?} exits its room", from);
                self.leave_room(from);
            }

            ClientSignal::Sdp { target, sdp, .. } => {
                debug!("Relaying {:?} SDP {:?} -> {:?}", sdp.sdp_type, from, target);
                let sdp = sdp.from_peer(from.clone());
                self.send_signal(&target, ServerSignal::Sdp { sdp });
            }

            ClientSignal::Candidate { target, ice } => {
                let ice = ice.from_peer(from.clone());
                self.send_signal(&target, ServerSignal::Candidate { ice });
            }

            ClientSignal::Complete { target } => {
                let host_id = self.inner.rooms.is_host(from).then(|| from.clone());
                self.send_signal(
                    from,
                    ServerSignal::Completed {
                        host_id: host_id.clone(),
                    },
                );
                if let Some(target) = target {
                    self.send_signal(&target, ServerSignal::Completed { host_id });
                }
            }
        }
    }

    pub fn peer_count(&self) -> usize {
        self.inner.peers.len()
    }

    pub fn room_members(&self, room_name: &str) -> Vec<PeerId> {
        self.inner.rooms.members(room_name)
    }

    fn leave_room(&self, peer_id: &PeerId) {
        let Some(outcome) = self.inner.rooms.leave(peer_id) else {
            return;
        };
        for member in outcome.remaining {
            self.send_signal(
                &member,
                ServerSignal::Disconnected {
                    id: peer_id.clone(),
                },
            );
        }
    }

    fn send_signal(&self, peer_id: &PeerId, msg: ServerSignal) {
        if let Some(peer) = self.inner.peers.get(peer_id) {
            if let Err(e) = peer.send(msg) {
                error!("Failed to queue signal for {:?}: {:?}", peer_id, e);
            }
        } else {
            warn!(
                "Attempted to send signal to disconnected user {:?}",
                peer_id
            );
        }
    }
}
