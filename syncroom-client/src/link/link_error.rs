use syncroom_core::PeerId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    #[error("data channel to {0} is not established yet")]
    ChannelNotEstablished(PeerId),
}
