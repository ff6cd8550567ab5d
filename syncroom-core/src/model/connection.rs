use serde::{Deserialize, Serialize};

/// Lifecycle of a connection orchestrator.
///
/// `Pending -> Connected -> Closed`, never back. A closed orchestrator is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionState {
    Pending,
    Connected,
    Closed,
}

impl ConnectionState {
    pub fn is_closed(self) -> bool {
        self == ConnectionState::Closed
    }
}
