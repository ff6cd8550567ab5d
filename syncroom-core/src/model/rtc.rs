use crate::model::signaling::{IceCandidate, IceServerConfig, SdpType, SessionDescription};
use thiserror::Error;
use webrtc::ice_transport::ice_candidate::RTCIceCandidateInit;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

#[derive(Debug, Error)]
pub enum RtcConversionError {
    #[error("session description of type {0:?} cannot be applied")]
    UnsupportedSdpType(SdpType),
    #[error(transparent)]
    Rtc(#[from] webrtc::Error),
}

impl From<RTCSdpType> for SdpType {
    fn from(t: RTCSdpType) -> Self {
        match t {
            RTCSdpType::Offer => SdpType::Offer,
            RTCSdpType::Answer => SdpType::Answer,
            RTCSdpType::Pranswer => SdpType::Pranswer,
            RTCSdpType::Rollback => SdpType::Rollback,
            _ => SdpType::Unknown,
        }
    }
}

impl From<RTCSessionDescription> for SessionDescription {
    fn from(desc: RTCSessionDescription) -> Self {
        Self {
            sdp_type: desc.sdp_type.into(),
            sdp: desc.sdp,
            id: None,
        }
    }
}

impl TryFrom<SessionDescription> for RTCSessionDescription {
    type Error = RtcConversionError;

    fn try_from(desc: SessionDescription) -> Result<Self, Self::Error> {
        let converted = match desc.sdp_type {
            SdpType::Offer => RTCSessionDescription::offer(desc.sdp)?,
            SdpType::Answer => RTCSessionDescription::answer(desc.sdp)?,
            SdpType::Pranswer => RTCSessionDescription::pranswer(desc.sdp)?,
            other => return Err(RtcConversionError::UnsupportedSdpType(other)),
        };
        Ok(converted)
    }
}

impl From<RTCIceCandidateInit> for IceCandidate {
    fn from(init: RTCIceCandidateInit) -> Self {
        Self {
            candidate: init.candidate,
            sdp_mid: init.sdp_mid,
            sdp_m_line_index: init.sdp_mline_index,
            username_fragment: init.username_fragment,
            id: None,
        }
    }
}

impl From<IceCandidate> for RTCIceCandidateInit {
    fn from(ice: IceCandidate) -> Self {
        Self {
            candidate: ice.candidate,
            sdp_mid: ice.sdp_mid,
            sdp_mline_index: ice.sdp_m_line_index,
            username_fragment: ice.username_fragment,
        }
    }
}

impl From<&IceServerConfig> for RTCIceServer {
    fn from(config: &IceServerConfig) -> Self {
        Self {
            urls: config.urls.clone(),
            username: config.username.clone().unwrap_or_default(),
            credential: config.credential.clone().unwrap_or_default(),
        }
    }
}
