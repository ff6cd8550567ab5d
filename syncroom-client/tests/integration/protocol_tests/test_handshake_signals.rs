use crate::integration::{init_tracing, local_config};
use crate::utils::{SIGNAL_TIMEOUT_MS, ScriptedSignaling, wait_until};
use syncroom_client::ConnectionOrchestrator;
use syncroom_core::{
    ClientSignal, ConnectionState, PeerId, SdpType, ServerSignal, SessionDescription,
};

#[tokio::test]
async fn test_connected_triggers_enter() {
    init_tracing();
    let (signaling, mut relay) = ScriptedSignaling::new();
    let orchestrator = ConnectionOrchestrator::start(&signaling, local_config("lobby"))
        .await
        .unwrap();

    relay.send(ServerSignal::Connected {
        id: PeerId::from("me"),
    });

    let signal = relay.recv(SIGNAL_TIMEOUT_MS).await.unwrap();
    assert_eq!(
        signal,
        ClientSignal::Enter {
            room_name: "lobby".into()
        }
    );
    assert_eq!(orchestrator.me(), Some(PeerId::from("me")));
    assert_eq!(orchestrator.state(), ConnectionState::Pending);

    relay.send(ServerSignal::YouHost);
    wait_until(SIGNAL_TIMEOUT_MS, || orchestrator.is_host())
        .await
        .unwrap();
    assert_eq!(orchestrator.host(), Some(PeerId::from("me")));
}

#[tokio::test]
async fn test_repeated_connected_is_ignored() {
    init_tracing();
    let (signaling, mut relay) = ScriptedSignaling::new();
    let orchestrator = ConnectionOrchestrator::start(&signaling, local_config("lobby"))
        .await
        .unwrap();

    relay.send(ServerSignal::Connected {
        id: PeerId::from("me"),
    });
    relay.recv(SIGNAL_TIMEOUT_MS).await.unwrap();

    relay.send(ServerSignal::Connected {
        id: PeerId::from("other"),
    });

    assert!(relay.drain(500).await.is_empty());
    assert_eq!(orchestrator.me(), Some(PeerId::from("me")));

    orchestrator.close().await;
}

#[tokio::test]
async fn test_joined_sends_offer_before_candidates() {
    init_tracing();
    let (signaling, mut relay) = ScriptedSignaling::new();
    let orchestrator = ConnectionOrchestrator::start(&signaling, local_config("r"))
        .await
        .unwrap();
    relay.send(ServerSignal::Connected {
        id: PeerId::from("me"),
    });
    relay.send(ServerSignal::YouHost);
    relay.recv(SIGNAL_TIMEOUT_MS).await.unwrap();

    relay.send(ServerSignal::Joined {
        id: PeerId::from("x"),
    });

    let signals = relay.drain(2000).await;
    match signals.first() {
        Some(ClientSignal::Sdp {
            target,
            sdp,
            is_host,
        }) => {
            assert_eq!(target, &PeerId::from("x"));
            assert_eq!(sdp.sdp_type, SdpType::Offer);
            assert_eq!(*is_host, Some(true));
        }
        other => panic!("expected the offer first, got {:?}", other),
    }
    for signal in &signals[1..] {
        match signal {
            ClientSignal::Candidate { target, .. } => assert_eq!(target, &PeerId::from("x")),
            other => panic!("unexpected signal {:?}", other),
        }
    }
    assert_eq!(orchestrator.peers(), vec![PeerId::from("x")]);

    orchestrator.close().await;
}

#[tokio::test]
async fn test_completed_adopts_host() {
    init_tracing();
    let (signaling, relay) = ScriptedSignaling::new();
    let orchestrator = ConnectionOrchestrator::start(&signaling, local_config("r"))
        .await
        .unwrap();
    relay.send(ServerSignal::Connected {
        id: PeerId::from("me"),
    });

    // a completion from a non-host peer carries no host id
    relay.send(ServerSignal::Completed { host_id: None });
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    assert_eq!(orchestrator.state(), ConnectionState::Pending);
    assert_eq!(orchestrator.host(), None);

    relay.send(ServerSignal::Completed {
        host_id: Some(PeerId::from("h")),
    });
    assert_eq!(orchestrator.connected().await, ConnectionState::Connected);
    assert_eq!(orchestrator.host(), Some(PeerId::from("h")));
    assert!(!orchestrator.is_host());
}

#[tokio::test]
async fn test_unusable_descriptions_are_ignored() {
    init_tracing();
    let (signaling, mut relay) = ScriptedSignaling::new();
    let orchestrator = ConnectionOrchestrator::start(&signaling, local_config("r"))
        .await
        .unwrap();
    relay.send(ServerSignal::Connected {
        id: PeerId::from("me"),
    });
    relay.recv(SIGNAL_TIMEOUT_MS).await.unwrap();

    let mut rollback = SessionDescription::offer("").from_peer(PeerId::from("x"));
    rollback.sdp_type = SdpType::Rollback;
    relay.send(ServerSignal::Sdp { sdp: rollback });
    // answer from a peer we never offered to
    relay.send(ServerSignal::Sdp {
        sdp: SessionDescription::answer("v=0").from_peer(PeerId::from("y")),
    });
    // no sender id at all
    relay.send(ServerSignal::Sdp {
        sdp: SessionDescription::offer("v=0"),
    });

    // still processing events afterwards
    relay.send(ServerSignal::YouHost);
    wait_until(SIGNAL_TIMEOUT_MS, || orchestrator.is_host())
        .await
        .unwrap();
    assert!(orchestrator.peers().is_empty());
    assert!(relay.drain(200).await.is_empty());
}

#[tokio::test]
async fn test_close_emits_exit() {
    init_tracing();
    let (signaling, mut relay) = ScriptedSignaling::new();
    let orchestrator = ConnectionOrchestrator::start(&signaling, local_config("r"))
        .await
        .unwrap();
    relay.send(ServerSignal::Connected {
        id: PeerId::from("me"),
    });
    relay.recv(SIGNAL_TIMEOUT_MS).await.unwrap();

    assert_eq!(orchestrator.close().await, ConnectionState::Closed);

    assert_eq!(relay.recv(SIGNAL_TIMEOUT_MS).await.unwrap(), ClientSignal::Exit);
    assert!(relay.is_shut_down());
}
