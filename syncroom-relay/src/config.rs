use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;

pub const RELAY_ADDR_ENV: &str = "SYNCROOM_RELAY_ADDR";

/// Relay settings
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub addr: SocketAddr,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 9030)),
        }
    }
}

impl RelayConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(addr) = env::var(RELAY_ADDR_ENV) {
            config.addr = addr
                .parse()
                .with_context(|| format!("{RELAY_ADDR_ENV} is not a socket address: {addr}"))?;
        }
        Ok(config)
    }
}
