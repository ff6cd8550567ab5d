use crate::link::{ChannelConfig, LinkConfig, LinkError, PeerEvent};
use anyhow::{Context, Result};
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use syncroom_core::{IceCandidate, PeerId, SessionDescription};
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, error, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_init::RTCDataChannelInit;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::data_channel::data_channel_state::RTCDataChannelState;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// Receives every local ICE candidate gathered by a link.
pub type OnIceCandidate = Arc<dyn Fn(IceCandidate) + Send + Sync>;

type ChannelSlot = Arc<Mutex<Option<Arc<RTCDataChannel>>>>;

/// WebRTC connection and data channel to one remote peer.
///
/// Knows nothing about signaling: descriptions and candidates go in and out
/// through method calls and the `on_ice_candidate` callback.
pub struct PeerLink {
    remote_id: PeerId,
    peer_connection: Arc<RTCPeerConnection>,
    data_channel: ChannelSlot,
    channel: ChannelConfig,
    events: broadcast::Sender<PeerEvent>,
    pending_candidates: Mutex<Vec<RTCIceCandidateInit>>,
    closed: AtomicBool,
}

impl PeerLink {
    pub async fn new(
        remote_id: PeerId,
        config: &LinkConfig,
        events: broadcast::Sender<PeerEvent>,
        on_ice_candidate: OnIceCandidate,
    ) -> Result<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config.ice_servers.iter().map(RTCIceServer::from).collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .with_context(|| format!("Failed to create peer connection for {remote_id}"))?,
        );
        let data_channel: ChannelSlot = Arc::new(Mutex::new(None));

        let uid_state = remote_id.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let uid = uid_state.clone();
                Box::pin(async move {
                    info!("Peer Connection State changed for peer {:?}: {:?}", uid, s);
                })
            },
        ));

        let uid_ice = remote_id.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let uid = uid_ice.clone();
            let on_ice_candidate = on_ice_candidate.clone();
            Box::pin(async move {
                let Some(candidate) = c else {
                    debug!("ICE gathering complete for peer {:?}", uid);
                    return;
                };
                match candidate.to_json() {
                    Ok(init) => on_ice_candidate(IceCandidate::from(init)),
                    Err(e) => warn!("Failed to encode local candidate for {:?}: {}", uid, e),
                }
            })
        }));

        let uid_dc = remote_id.clone();
        let slot = data_channel.clone();
        let dc_events = events.clone();
        peer_connection.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
            let uid = uid_dc.clone();
            let slot = slot.clone();
            let events = dc_events.clone();
            Box::pin(async move {
                debug!("Remote DataChannel '{}' arrived from peer {:?}", dc.label(), uid);
                wire_channel(&uid, &dc, &events);
                *slot.lock().await = Some(dc);
            })
        }));

        Ok(Self {
            remote_id,
            peer_connection,
            data_channel,
            channel: config.channel.clone(),
            events,
            pending_candidates: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        })
    }

    pub fn remote_id(&self) -> &PeerId {
        &self.remote_id
    }

    /// Creates the local data channel. A link that already has a channel keeps it.
    pub async fn create_data_channel(&self) -> Result<Arc<RTCDataChannel>> {
        let mut slot = self.data_channel.lock().await;
        if let Some(dc) = slot.as_ref() {
            return Ok(dc.clone());
        }

        let init = RTCDataChannelInit {
            ordered: Some(self.channel.ordered),
            max_retransmits: self.channel.max_retransmits,
            ..Default::default()
        };
        let dc = self
            .peer_connection
            .create_data_channel(&self.channel.label, Some(init))
            .await
            .context("Failed to create data channel")?;
        wire_channel(&self.remote_id, &dc, &self.events);
        *slot = Some(dc.clone());
        Ok(dc)
    }

    pub async fn make_offer_to_peer(&self) -> Option<SessionDescription> {
        match self.make_offer().await {
            Ok(offer) => Some(offer),
            Err(e) => {
                error!("Failed to make offer to {:?}: {:#}", self.remote_id, e);
                None
            }
        }
    }

    pub async fn receive_offer_from_peer(
        &self,
        offer: SessionDescription,
    ) -> Option<SessionDescription> {
        match self.answer_offer(offer).await {
            Ok(answer) => Some(answer),
            Err(e) => {
                error!("Failed to answer offer from {:?}: {:#}", self.remote_id, e);
                None
            }
        }
    }

    pub async fn receive_answer_from_peer(&self, answer: SessionDescription) -> bool {
        match self.apply_remote(answer).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to apply answer from {:?}: {:#}", self.remote_id, e);
                false
            }
        }
    }

    /// Adds a trickled candidate. Candidates that beat the remote description
    /// are held back and applied right after it.
    pub async fn receive_candidate_from_peer(&self, ice: IceCandidate) -> bool {
        let init = RTCIceCandidateInit::from(ice);
        if self.peer_connection.remote_description().await.is_none() {
            debug!("Queueing early candidate from {:?}", self.remote_id);
            self.pending_candidates.lock().await.push(init);
            return true;
        }
        match self.peer_connection.add_ice_candidate(init).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to add candidate from {:?}: {}", self.remote_id, e);
                false
            }
        }
    }

    /// Sends one message. Does nothing unless the channel is open.
    pub async fn send(&self, data: &Bytes) -> bool {
        let Some(dc) = self.data_channel.lock().await.clone() else {
            return false;
        };
        if dc.ready_state() != RTCDataChannelState::Open {
            return false;
        }
        match dc.send(data).await {
            Ok(_) => true,
            Err(e) => {
                debug!("Send to {:?} failed: {}", self.remote_id, e);
                false
            }
        }
    }

    pub async fn data_channel(&self) -> Result<Arc<RTCDataChannel>, LinkError> {
        self.data_channel
            .lock()
            .await
            .clone()
            .ok_or_else(|| LinkError::ChannelNotEstablished(self.remote_id.clone()))
    }

    /// Closes the channel, then the connection. Later calls do nothing.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(dc) = self.data_channel.lock().await.take() {
            if let Err(e) = dc.close().await {
                debug!("Closing data channel to {:?}: {}", self.remote_id, e);
            }
        }
        if let Err(e) = self.peer_connection.close().await {
            warn!("Closing peer connection to {:?}: {}", self.remote_id, e);
        }
        info!("Link to {:?} closed", self.remote_id);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn make_offer(&self) -> Result<SessionDescription> {
        self.create_data_channel().await?;
        let offer = self.peer_connection.create_offer(None).await?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await
            .context("Failed to set local offer")?;
        Ok(SessionDescription::from(offer))
    }

    async fn answer_offer(&self, offer: SessionDescription) -> Result<SessionDescription> {
        self.apply_remote(offer).await?;
        let answer = self.peer_connection.create_answer(None).await?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await
            .context("Failed to set local answer")?;
        Ok(SessionDescription::from(answer))
    }

    async fn apply_remote(&self, desc: SessionDescription) -> Result<()> {
        let desc = RTCSessionDescription::try_from(desc)?;
        self.peer_connection
            .set_remote_description(desc)
            .await
            .context("Failed to set remote description")?;

        let pending: Vec<_> = self.pending_candidates.lock().await.drain(..).collect();
        for init in pending {
            if let Err(e) = self.peer_connection.add_ice_candidate(init).await {
                warn!("Failed to add queued candidate from {:?}: {}", self.remote_id, e);
            }
        }
        Ok(())
    }
}

fn wire_channel(remote_id: &PeerId, dc: &Arc<RTCDataChannel>, events: &broadcast::Sender<PeerEvent>) {
    let tx_open = events.clone();
    let uid_open = remote_id.clone();
    dc.on_open(Box::new(move || {
        Box::pin(async move {
            info!("DataChannel open and ready for peer {:?}", uid_open);
            let _ = tx_open.send(PeerEvent::ChannelOpened(uid_open));
        })
    }));

    let tx_msg = events.clone();
    let uid_msg = remote_id.clone();
    dc.on_message(Box::new(move |msg: DataChannelMessage| {
        let tx = tx_msg.clone();
        let uid = uid_msg.clone();
        Box::pin(async move {
            let _ = tx.send(PeerEvent::Message(uid, msg.data));
        })
    }));

    let tx_close = events.clone();
    let uid_close = remote_id.clone();
    dc.on_close(Box::new(move || {
        let tx = tx_close.clone();
        let uid = uid_close.clone();
        Box::pin(async move {
            info!("DataChannel closed for peer {:?}", uid);
            let _ = tx.send(PeerEvent::ChannelClosed(uid));
        })
    }));

    let uid_err = remote_id.clone();
    dc.on_error(Box::new(move |e: webrtc::Error| {
        let uid = uid_err.clone();
        Box::pin(async move {
            warn!("DataChannel error for peer {:?}: {}", uid, e);
        })
    }));
}
