use crate::{RelayConfig, SignalingService, ws_handler};
use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tracing::info;

pub const WS_PATH: &str = "/ws";

pub fn router(service: SignalingService) -> Router {
    Router::new()
        .route(WS_PATH, get(ws_handler))
        .with_state(service)
}

/// Binds `config.addr` and serves the relay until the process stops.
pub async fn serve(config: RelayConfig) -> Result<()> {
    let listener = TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("Failed to bind relay on {}", config.addr))?;
    serve_with_listener(listener, SignalingService::new()).await
}

pub async fn serve_with_listener(listener: TcpListener, service: SignalingService) -> Result<()> {
    let addr = listener.local_addr()?;
    info!("Signaling relay listening on ws://{}{}", addr, WS_PATH);

    axum::serve(listener, router(service))
        .await
        .context("Relay server stopped")?;
    Ok(())
}
