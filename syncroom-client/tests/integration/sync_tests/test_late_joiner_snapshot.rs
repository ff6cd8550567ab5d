use super::{Counter, CounterAction, counter_reducer};
use crate::integration::{init_tracing, join};
use crate::utils::{LocalRelay, MESSAGE_TIMEOUT_MS, SIGNAL_TIMEOUT_MS, wait_until};
use std::time::Duration;
use syncroom_client::StateSynchronizer;

#[tokio::test]
async fn test_late_joiner_receives_snapshot() {
    init_tracing();
    let relay = LocalRelay::new();

    let a = join(&relay, "late").await;
    let host = StateSynchronizer::new(a.clone(), counter_reducer, Counter { counter: 0 }).unwrap();
    wait_until(SIGNAL_TIMEOUT_MS, || a.is_host())
        .await
        .unwrap();
    for _ in 0..3 {
        host.dispatch(CounterAction::Inc).await.unwrap();
    }
    assert_eq!(host.revision(), 3);

    let b = join(&relay, "late").await;
    let client =
        StateSynchronizer::new(b.clone(), counter_reducer, Counter { counter: 0 }).unwrap();

    let mut rx = client.subscribe();
    let delivered = tokio::time::timeout(
        Duration::from_millis(MESSAGE_TIMEOUT_MS * 3),
        rx.wait_for(|v| v.revision == 3),
    )
    .await
    .expect("snapshot did not arrive")
    .unwrap()
    .clone();

    assert_eq!(delivered.state, Counter { counter: 3 });
    assert_eq!(client.last_applied(), 3);

    a.close().await;
    b.close().await;
}
