use crate::link::LinkConfig;
use crate::orchestrator::OrchestratorConfig;
use anyhow::{Result, bail};
use std::env;
use syncroom_core::IceServerConfig;

pub const DEFAULT_SIGNALING_URL: &str = "ws://127.0.0.1:9030/ws";

pub const SIGNALING_URL_ENV: &str = "SYNCROOM_SIGNALING_URL";
pub const ROOM_ENV: &str = "SYNCROOM_ROOM";
pub const ICE_URLS_ENV: &str = "SYNCROOM_ICE_URLS";
pub const ICE_USERNAME_ENV: &str = "SYNCROOM_ICE_USERNAME";
pub const ICE_CREDENTIAL_ENV: &str = "SYNCROOM_ICE_CREDENTIAL";

/// Everything a participant needs to join a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub signaling_url: String,
    pub orchestrator: OrchestratorConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            signaling_url: DEFAULT_SIGNALING_URL.to_owned(),
            orchestrator: OrchestratorConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, `from_env` uses the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup(SIGNALING_URL_ENV) {
            if !url.starts_with("ws://") && !url.starts_with("wss://") {
                bail!("{SIGNALING_URL_ENV} must be a ws:// or wss:// URL, got {url}");
            }
            config.signaling_url = url;
        }
        if let Some(room) = lookup(ROOM_ENV) {
            if room.is_empty() {
                bail!("{ROOM_ENV} must not be empty");
            }
            config.orchestrator.room_name = room;
        }
        if let Some(urls) = lookup(ICE_URLS_ENV) {
            let urls: Vec<String> = urls
                .split(',')
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_owned)
                .collect();
            config.orchestrator.link = LinkConfig {
                ice_servers: if urls.is_empty() {
                    Vec::new()
                } else {
                    vec![IceServerConfig {
                        urls,
                        username: lookup(ICE_USERNAME_ENV),
                        credential: lookup(ICE_CREDENTIAL_ENV),
                    }]
                },
                ..config.orchestrator.link
            };
        }
        Ok(config)
    }
}
