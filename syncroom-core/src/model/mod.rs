mod connection;
mod peer;
mod signaling;
mod sync;

#[cfg(not(target_arch = "wasm32"))]
mod rtc;

pub use connection::ConnectionState;
pub use peer::PeerId;
pub use signaling::{
    ClientSignal, IceCandidate, IceServerConfig, SdpType, ServerSignal, SessionDescription,
};
pub use sync::{REVISION_FIELD, ReservedFieldError, SyncMessage, Versioned, check_reserved_field};

#[cfg(not(target_arch = "wasm32"))]
pub use rtc::RtcConversionError;
