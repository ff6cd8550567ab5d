use crate::link::LinkConfig;

pub const DEFAULT_ROOM: &str = "default";

/// What a client does when the host leaves the room.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HostDeparturePolicy {
    /// Drop the host's link and keep the session open on the last delivered state.
    #[default]
    Retain,
    /// Close the whole session.
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub room_name: String,
    pub link: LinkConfig,
    pub host_departure: HostDeparturePolicy,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            room_name: DEFAULT_ROOM.to_owned(),
            link: LinkConfig::default(),
            host_departure: HostDeparturePolicy::default(),
        }
    }
}

impl OrchestratorConfig {
    pub fn for_room(room_name: impl Into<String>) -> Self {
        Self {
            room_name: room_name.into(),
            ..Default::default()
        }
    }

    pub fn with_link(mut self, link: LinkConfig) -> Self {
        self.link = link;
        self
    }

    pub fn with_host_departure(mut self, policy: HostDeparturePolicy) -> Self {
        self.host_departure = policy;
        self
    }
}
