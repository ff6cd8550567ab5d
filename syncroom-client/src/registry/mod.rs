mod peer_link_registry;

pub use peer_link_registry::*;
