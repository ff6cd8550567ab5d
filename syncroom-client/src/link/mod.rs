mod link_config;
mod link_error;
mod peer_event;
mod peer_link;

pub use link_config::*;
pub use link_error::*;
pub use peer_event::*;
pub use peer_link::*;
