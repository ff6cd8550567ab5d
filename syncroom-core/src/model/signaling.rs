use crate::model::peer::PeerId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpType {
    Offer,
    Answer,
    Pranswer,
    Rollback,
    #[serde(other)]
    Unknown,
}

/// Session description as it travels through the relay.
///
/// `id` is empty on the way out and stamped with the sender by the relay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub sdp_type: SdpType,
    pub sdp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PeerId>,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            sdp_type: SdpType::Offer,
            sdp: sdp.into(),
            id: None,
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            sdp_type: SdpType::Answer,
            sdp: sdp.into(),
            id: None,
        }
    }

    pub fn from_peer(mut self, id: PeerId) -> Self {
        self.id = Some(id);
        self
    }
}

/// Trickled ICE candidate, same field names as the browser `RTCIceCandidateInit`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default)]
    pub sdp_mid: Option<String>,
    #[serde(default, rename = "sdpMLineIndex")]
    pub sdp_m_line_index: Option<u16>,
    #[serde(default)]
    pub username_fragment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PeerId>,
}

impl IceCandidate {
    pub fn from_peer(mut self, id: PeerId) -> Self {
        self.id = Some(id);
        self
    }
}

/// Events the relay delivers to a participant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", content = "d", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerSignal {
    /// Connection acknowledged, carries the caller's own id.
    Connected { id: PeerId },
    /// A participant of the room went away.
    Disconnected { id: PeerId },
    /// The room was empty when the caller entered.
    YouHost,
    /// Another participant entered after the caller.
    Joined { id: PeerId },
    Sdp { sdp: SessionDescription },
    Candidate { ice: IceCandidate },
    /// Handshake acknowledgment, with the host id when the completing side is the host.
    Completed {
        #[serde(rename = "hostId", default, skip_serializing_if = "Option::is_none")]
        host_id: Option<PeerId>,
    },
}

/// Events a participant sends to the relay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", content = "d", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientSignal {
    Enter {
        #[serde(rename = "roomName")]
        room_name: String,
    },
    Exit,
    Sdp {
        target: PeerId,
        sdp: SessionDescription,
        #[serde(rename = "isHost", default, skip_serializing_if = "Option::is_none")]
        is_host: Option<bool>,
    },
    Candidate {
        target: PeerId,
        ice: IceCandidate,
    },
    Complete {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<PeerId>,
    },
}
