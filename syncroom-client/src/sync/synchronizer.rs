use crate::link::PeerEvent;
use crate::orchestrator::Connections;
use crate::sync::{Reducer, SyncAction, SyncError, apply_action};
use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use syncroom_core::{PeerId, SyncMessage, Versioned, check_reserved_field};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Replicates a reducer-driven state over a session's data channels.
///
/// The host applies every action and pushes the full state to all peers.
/// Clients forward their actions to the host and only ever adopt newer snapshots.
pub struct StateSynchronizer<S, A> {
    inner: Arc<SyncInner<S, A>>,
    listener: JoinHandle<()>,
}

struct SyncInner<S, A> {
    connections: Arc<dyn Connections>,
    reducer: Reducer<S, A>,
    state: watch::Sender<Versioned<S>>,
    last_applied: AtomicU64,
    apply_lock: Mutex<()>,
}

impl<S, A> StateSynchronizer<S, A>
where
    S: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    A: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Build this before the session's channels open: the host sends its
    /// snapshot once, when a channel opens, and earlier peer events are not replayed.
    pub fn new(
        connections: Arc<dyn Connections>,
        reducer: impl Fn(&S, &A) -> S + Send + Sync + 'static,
        initial: S,
    ) -> Result<Self, SyncError> {
        check_reserved_field(&initial)?;

        let events = connections.subscribe();
        let inner = Arc::new(SyncInner {
            connections,
            reducer: Arc::new(reducer),
            state: watch::Sender::new(Versioned::initial(initial)),
            last_applied: AtomicU64::new(0),
            apply_lock: Mutex::new(()),
        });
        let listener = tokio::spawn(listen(inner.clone(), events));

        Ok(Self { inner, listener })
    }

    /// Host: applies `action` and broadcasts the new state.
    /// Client: forwards `action` to the host, local state stays as is.
    pub async fn dispatch(&self, action: A) -> Result<(), SyncError> {
        if self.inner.connections.is_host() {
            self.inner.apply_and_deliver(action).await
        } else {
            self.inner.request(action).await
        }
    }

    pub fn state(&self) -> S {
        self.inner.state.borrow().state.clone()
    }

    pub fn versioned(&self) -> Versioned<S> {
        self.inner.state.borrow().clone()
    }

    pub fn revision(&self) -> u64 {
        self.inner.state.borrow().revision
    }

    /// Highest delivered revision adopted so far.
    pub fn last_applied(&self) -> u64 {
        self.inner.last_applied.load(Ordering::SeqCst)
    }

    pub fn is_host(&self) -> bool {
        self.inner.connections.is_host()
    }

    pub fn subscribe(&self) -> watch::Receiver<Versioned<S>> {
        self.inner.state.subscribe()
    }
}

impl<S, A> Drop for StateSynchronizer<S, A> {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

impl<S, A> SyncInner<S, A>
where
    S: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    A: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn apply_and_deliver(&self, action: A) -> Result<(), SyncError> {
        let _guard = self.apply_lock.lock().await;

        let current = self.state.borrow().clone();
        let next = apply_action(&current, SyncAction::User(action), self.reducer.as_ref())?;
        let data = encode(&SyncMessage::<S, A>::Deliver(next.clone()))?;

        self.last_applied.store(next.revision, Ordering::SeqCst);
        self.state.send_replace(next);

        let sent = self.connections.broadcast(data).await;
        debug!("Delivered revision {} to {} peers", self.revision(), sent);
        Ok(())
    }

    async fn request(&self, action: A) -> Result<(), SyncError> {
        let Some(host) = self.connections.host() else {
            debug!("Host unknown, dropping action");
            return Ok(());
        };
        let data = encode(&SyncMessage::<S, A>::Request(action))?;
        if !self.connections.send_to(&host, data).await {
            debug!("Request to host {:?} was not sent", host);
        }
        Ok(())
    }

    async fn adopt(&self, delivered: Versioned<S>) -> Result<bool, SyncError> {
        let _guard = self.apply_lock.lock().await;

        let last_applied = self.last_applied.load(Ordering::SeqCst);
        if delivered.revision <= last_applied {
            return Ok(false);
        }
        let current = self.state.borrow().clone();
        let next = apply_action::<S, A>(
            &current,
            SyncAction::Deliver(delivered),
            self.reducer.as_ref(),
        )?;

        self.last_applied.store(next.revision, Ordering::SeqCst);
        self.state.send_replace(next);
        Ok(true)
    }

    async fn send_snapshot(&self, to: &PeerId) {
        let snapshot = self.state.borrow().clone();
        match encode(&SyncMessage::<S, A>::Deliver(snapshot)) {
            Ok(data) => {
                self.connections.send_to(to, data).await;
            }
            Err(e) => error!("Failed to encode snapshot for {:?}: {}", to, e),
        }
    }

    async fn on_message(&self, from: PeerId, data: Bytes) {
        let message = match serde_json::from_slice::<SyncMessage<S, A>>(&data) {
            Ok(message) => message,
            Err(e) => {
                warn!("Invalid sync message from {:?}: {}", from, e);
                return;
            }
        };

        let result = if self.connections.is_host() {
            match message {
                SyncMessage::Request(action) => self.apply_and_deliver(action).await,
                SyncMessage::Deliver(_) => {
                    debug!("Host ignores DELIVER from {:?}", from);
                    Ok(())
                }
            }
        } else {
            match message {
                SyncMessage::Deliver(delivered) => {
                    let revision = delivered.revision;
                    self.adopt(delivered).await.map(|adopted| {
                        if !adopted {
                            debug!("Discarding stale revision {} from {:?}", revision, from);
                        }
                    })
                }
                SyncMessage::Request(_) => {
                    debug!("Client ignores REQUEST from {:?}", from);
                    Ok(())
                }
            }
        };
        if let Err(e) = result {
            warn!("Rejected sync message from {:?}: {}", from, e);
        }
    }

    fn revision(&self) -> u64 {
        self.state.borrow().revision
    }
}

async fn listen<S, A>(inner: Arc<SyncInner<S, A>>, mut events: broadcast::Receiver<PeerEvent>)
where
    S: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    A: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    loop {
        match events.recv().await {
            Ok(PeerEvent::Message(from, data)) => inner.on_message(from, data).await,
            Ok(PeerEvent::ChannelOpened(id)) => {
                if inner.connections.is_host() {
                    inner.send_snapshot(&id).await;
                }
            }
            Ok(PeerEvent::ChannelClosed(id)) => debug!("Channel to {:?} closed", id),
            Err(RecvError::Lagged(skipped)) => {
                warn!("Sync listener lagged, {} peer events skipped", skipped)
            }
            Err(RecvError::Closed) => break,
        }
    }
}

fn encode<T: Serialize>(message: &T) -> Result<Bytes, SyncError> {
    serde_json::to_vec(message)
        .map(Bytes::from)
        .map_err(|e| SyncError::Encode(e.to_string()))
}
