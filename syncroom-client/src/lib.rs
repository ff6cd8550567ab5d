mod config;
mod link;
mod orchestrator;
mod registry;
mod signaling;
mod sync;

pub use config::*;
pub use link::*;
pub use orchestrator::*;
pub use registry::*;
pub use signaling::*;
pub use sync::*;
