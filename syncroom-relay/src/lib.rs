mod config;
mod room;
mod router;
mod signaling;

pub use config::*;
pub use room::*;
pub use router::*;
pub use signaling::*;
