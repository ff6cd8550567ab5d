use crate::integration::{init_tracing, local_config};
use crate::utils::{SIGNAL_TIMEOUT_MS, ScriptedSignaling, wait_until};
use syncroom_client::{ConnectionOrchestrator, HostDeparturePolicy};
use syncroom_core::{ClientSignal, ConnectionState, PeerId, ServerSignal};

async fn connected_client(
    policy: HostDeparturePolicy,
) -> (ConnectionOrchestrator, crate::utils::ScriptedRelay) {
    let (signaling, mut relay) = ScriptedSignaling::new();
    let orchestrator = ConnectionOrchestrator::start(
        &signaling,
        local_config("r").with_host_departure(policy),
    )
    .await
    .unwrap();
    relay.send(ServerSignal::Connected {
        id: PeerId::from("me"),
    });
    relay.recv(SIGNAL_TIMEOUT_MS).await.unwrap();
    relay.send(ServerSignal::Completed {
        host_id: Some(PeerId::from("h")),
    });
    assert_eq!(orchestrator.connected().await, ConnectionState::Connected);
    (orchestrator, relay)
}

#[tokio::test]
async fn test_host_departure_keeps_session_by_default() {
    init_tracing();
    let (orchestrator, relay) = connected_client(HostDeparturePolicy::default()).await;

    relay.send(ServerSignal::Disconnected {
        id: PeerId::from("h"),
    });
    relay.send(ServerSignal::YouHost);
    // YOU_HOST is only a marker that the departure was processed
    wait_until(SIGNAL_TIMEOUT_MS, || orchestrator.is_host())
        .await
        .unwrap();

    assert_eq!(orchestrator.state(), ConnectionState::Connected);
}

#[tokio::test]
async fn test_host_departure_closes_when_asked() {
    init_tracing();
    let (orchestrator, mut relay) = connected_client(HostDeparturePolicy::Close).await;

    relay.send(ServerSignal::Disconnected {
        id: PeerId::from("h"),
    });

    let mut states = orchestrator.state_changes();
    tokio::time::timeout(
        std::time::Duration::from_millis(SIGNAL_TIMEOUT_MS),
        states.wait_for(|s| s.is_closed()),
    )
    .await
    .expect("session should close")
    .unwrap();
    assert_eq!(relay.recv(SIGNAL_TIMEOUT_MS).await.unwrap(), ClientSignal::Exit);
    assert_eq!(orchestrator.close().await, ConnectionState::Closed);
}
