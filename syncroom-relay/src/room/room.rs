use syncroom_core::PeerId;

/// Membership of one named room.
///
/// The participant who created the room stays its host until it leaves; there is no failover.
#[derive(Debug, Clone)]
pub struct Room {
    host: Option<PeerId>,
    members: Vec<PeerId>,
}

impl Room {
    pub fn new(host: PeerId) -> Self {
        Self {
            host: Some(host.clone()),
            members: vec![host],
        }
    }

    pub fn add(&mut self, peer_id: PeerId) {
        if !self.members.contains(&peer_id) {
            self.members.push(peer_id);
        }
    }

    pub fn remove(&mut self, peer_id: &PeerId) {
        self.members.retain(|id| id != peer_id);
        if self.host.as_ref() == Some(peer_id) {
            self.host = None;
        }
    }

    pub fn host(&self) -> Option<&PeerId> {
        self.host.as_ref()
    }

    pub fn is_host(&self, peer_id: &PeerId) -> bool {
        self.host.as_ref() == Some(peer_id)
    }

    pub fn members(&self) -> &[PeerId] {
        &self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
