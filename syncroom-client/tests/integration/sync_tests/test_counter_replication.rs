use super::{Counter, CounterAction, counter_reducer};
use crate::integration::{init_tracing, join};
use crate::utils::{LocalRelay, MESSAGE_TIMEOUT_MS, SIGNAL_TIMEOUT_MS, wait_channel_open, wait_until};
use std::time::Duration;
use syncroom_client::StateSynchronizer;
use syncroom_core::Versioned;
use tokio::sync::watch;

async fn wait_revision(rx: &mut watch::Receiver<Versioned<Counter>>, revision: u64) -> Counter {
    tokio::time::timeout(
        Duration::from_millis(MESSAGE_TIMEOUT_MS),
        rx.wait_for(|v| v.revision >= revision),
    )
    .await
    .expect("revision did not arrive in time")
    .expect("synchronizer dropped")
    .state
    .clone()
}

#[tokio::test]
async fn test_counter_replicates_between_host_and_client() {
    init_tracing();
    let relay = LocalRelay::new();

    let a = join(&relay, "counter").await;
    let mut a_events = a.subscribe();
    let host = StateSynchronizer::new(a.clone(), counter_reducer, Counter { counter: 0 }).unwrap();
    wait_until(SIGNAL_TIMEOUT_MS, || a.is_host())
        .await
        .unwrap();

    let b = join(&relay, "counter").await;
    let mut b_events = b.subscribe();
    let client =
        StateSynchronizer::new(b.clone(), counter_reducer, Counter { counter: 0 }).unwrap();
    wait_until(SIGNAL_TIMEOUT_MS, || b.me().is_some())
        .await
        .unwrap();
    wait_channel_open(&mut a_events, &b.me().unwrap()).await.unwrap();
    wait_channel_open(&mut b_events, &a.me().unwrap()).await.unwrap();
    wait_until(SIGNAL_TIMEOUT_MS, || b.host().is_some())
        .await
        .unwrap();

    let mut client_rx = client.subscribe();
    let mut host_rx = host.subscribe();

    host.dispatch(CounterAction::Inc).await.unwrap();
    assert_eq!(host.state(), Counter { counter: 1 });
    assert_eq!(host.revision(), 1);
    assert_eq!(wait_revision(&mut client_rx, 1).await, Counter { counter: 1 });

    client.dispatch(CounterAction::Add(5)).await.unwrap();
    // a client never applies its own action locally
    assert_eq!(client.revision(), 1);
    assert_eq!(wait_revision(&mut host_rx, 2).await, Counter { counter: 6 });
    assert_eq!(wait_revision(&mut client_rx, 2).await, Counter { counter: 6 });
    assert_eq!(client.last_applied(), 2);

    drop(client);
    drop(host);
    a.close().await;
    b.close().await;
}

#[tokio::test]
async fn test_client_requests_raise_revision_one_by_one() {
    init_tracing();
    let relay = LocalRelay::new();

    let a = join(&relay, "burst").await;
    let mut a_events = a.subscribe();
    let host = StateSynchronizer::new(a.clone(), counter_reducer, Counter { counter: 0 }).unwrap();
    wait_until(SIGNAL_TIMEOUT_MS, || a.is_host())
        .await
        .unwrap();

    let b = join(&relay, "burst").await;
    let mut b_events = b.subscribe();
    let client =
        StateSynchronizer::new(b.clone(), counter_reducer, Counter { counter: 0 }).unwrap();
    wait_until(SIGNAL_TIMEOUT_MS, || b.me().is_some() && b.host().is_some())
        .await
        .unwrap();
    wait_channel_open(&mut a_events, &b.me().unwrap()).await.unwrap();
    wait_channel_open(&mut b_events, &a.me().unwrap()).await.unwrap();

    for _ in 0..10 {
        client.dispatch(CounterAction::Inc).await.unwrap();
    }

    let mut host_rx = host.subscribe();
    assert_eq!(wait_revision(&mut host_rx, 10).await, Counter { counter: 10 });
    assert_eq!(host.revision(), 10);

    let mut client_rx = client.subscribe();
    assert_eq!(wait_revision(&mut client_rx, 10).await, Counter { counter: 10 });

    a.close().await;
    b.close().await;
}
