pub use syncroom_core::{ConnectionState, PeerId, Versioned};

pub mod model {
    pub use syncroom_core::model::*;
}

#[cfg(feature = "relay")]
pub mod relay {
    pub use syncroom_relay::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use syncroom_client::*;
}

#[cfg(feature = "client")]
pub use syncroom_client::{ConnectionOrchestrator, StateSynchronizer};
