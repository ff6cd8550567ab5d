mod signaling_transport;
mod ws_signaling;

pub use signaling_transport::*;
pub use ws_signaling::*;
