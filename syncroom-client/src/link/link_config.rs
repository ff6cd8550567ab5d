use syncroom_core::IceServerConfig;

pub const DEFAULT_STUN_URL: &str = "stun:stun.l.google.com:19302";
pub const DEFAULT_CHANNEL_LABEL: &str = "syncroom";

/// Data channel label and reliability
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    pub label: String,
    pub ordered: bool,
    pub max_retransmits: Option<u16>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            label: DEFAULT_CHANNEL_LABEL.to_owned(),
            ordered: false,
            max_retransmits: None,
        }
    }
}

/// Configuration for every WebRTC link of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    pub ice_servers: Vec<IceServerConfig>,
    pub channel: ChannelConfig,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig::stun(DEFAULT_STUN_URL)],
            channel: ChannelConfig::default(),
        }
    }
}

impl LinkConfig {
    /// Host candidates only. Enough for peers on the same machine or LAN.
    pub fn local() -> Self {
        Self {
            ice_servers: Vec::new(),
            channel: ChannelConfig::default(),
        }
    }
}
