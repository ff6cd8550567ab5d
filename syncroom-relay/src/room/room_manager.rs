use crate::room::Room;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use syncroom_core::PeerId;
use tracing::info;

/// Result of entering a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnterOutcome {
    /// The room was empty, the caller becomes its host.
    pub is_host: bool,
    /// Members present before the caller entered.
    pub existing: Vec<PeerId>,
}

/// Result of leaving a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveOutcome {
    pub room: String,
    pub remaining: Vec<PeerId>,
}

#[derive(Default)]
pub struct RoomManager {
    rooms: DashMap<String, Room>,
    memberships: DashMap<PeerId, String>,
}

impl RoomManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts `peer_id` into `room_name`, leaving any room it was in before.
    pub fn enter(&self, room_name: &str, peer_id: PeerId) -> EnterOutcome {
        self.leave(&peer_id);

        let outcome = match self.rooms.entry(room_name.to_string()) {
            Entry::Occupied(mut entry) => {
                let existing = entry.get().members().to_vec();
                entry.get_mut().add(peer_id.clone());
                EnterOutcome {
                    is_host: false,
                    existing,
                }
            }
            Entry::Vacant(entry) => {
                info!("Creating new room: {}", room_name);
                entry.insert(Room::new(peer_id.clone()));
                EnterOutcome {
                    is_host: true,
                    existing: Vec::new(),
                }
            }
        };

        self.memberships.insert(peer_id, room_name.to_string());
        outcome
    }

    pub fn leave(&self, peer_id: &PeerId) -> Option<LeaveOutcome> {
        let (_, room_name) = self.memberships.remove(peer_id)?;

        let remaining = match self.rooms.get_mut(&room_name) {
            Some(mut room) => {
                room.remove(peer_id);
                room.members().to_vec()
            }
            None => Vec::new(),
        };

        if self.rooms.remove_if(&room_name, |_, room| room.is_empty()).is_some() {
            info!("Room '{}' is empty, dropping it", room_name);
        }

        Some(LeaveOutcome {
            room: room_name,
            remaining,
        })
    }

    pub fn is_host(&self, peer_id: &PeerId) -> bool {
        let Some(room_name) = self.room_of(peer_id) else {
            return false;
        };
        self.rooms
            .get(&room_name)
            .is_some_and(|room| room.is_host(peer_id))
    }

    pub fn room_of(&self, peer_id: &PeerId) -> Option<String> {
        self.memberships.get(peer_id).map(|entry| entry.value().clone())
    }

    pub fn members(&self, room_name: &str) -> Vec<PeerId> {
        self.rooms
            .get(room_name)
            .map(|room| room.members().to_vec())
            .unwrap_or_default()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
