mod connections;
mod orchestrator;
mod orchestrator_config;
mod orchestrator_task;
mod session_state;

pub use connections::*;
pub use orchestrator::*;
pub use orchestrator_config::*;
