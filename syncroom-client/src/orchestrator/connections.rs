use crate::link::PeerEvent;
use async_trait::async_trait;
use bytes::Bytes;
use syncroom_core::PeerId;
use tokio::sync::broadcast;

/// Role and data channel surface of a session, as seen by the state synchronizer.
#[async_trait]
pub trait Connections: Send + Sync {
    fn me(&self) -> Option<PeerId>;

    fn host(&self) -> Option<PeerId>;

    fn is_host(&self) -> bool {
        match (self.me(), self.host()) {
            (Some(me), Some(host)) => me == host,
            _ => false,
        }
    }

    /// Sends to every open channel, returns how many took it.
    async fn broadcast(&self, data: Bytes) -> usize;

    async fn send_to(&self, id: &PeerId, data: Bytes) -> bool;

    fn subscribe(&self) -> broadcast::Receiver<PeerEvent>;
}
