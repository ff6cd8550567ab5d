use bytes::Bytes;
use syncroom_core::PeerId;

/// Data channel activity of one remote peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerEvent {
    ChannelOpened(PeerId),
    Message(PeerId, Bytes),
    ChannelClosed(PeerId),
}
