use syncroom_core::{ConnectionState, PeerId};
use tokio::sync::watch;

/// Identity, host and lifecycle of one session, shared by the actor and its handle.
pub(crate) struct SessionState {
    me: watch::Sender<Option<PeerId>>,
    host: watch::Sender<Option<PeerId>>,
    state: watch::Sender<ConnectionState>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            me: watch::Sender::new(None),
            host: watch::Sender::new(None),
            state: watch::Sender::new(ConnectionState::Pending),
        }
    }

    pub fn me(&self) -> Option<PeerId> {
        self.me.borrow().clone()
    }

    pub fn host(&self) -> Option<PeerId> {
        self.host.borrow().clone()
    }

    pub fn is_host(&self) -> bool {
        match (&*self.me.borrow(), &*self.host.borrow()) {
            (Some(me), Some(host)) => me == host,
            _ => false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Records the relay-assigned id. Only the first call takes effect.
    pub fn set_me(&self, id: PeerId) -> bool {
        self.me.send_if_modified(|me| {
            if me.is_some() {
                return false;
            }
            *me = Some(id);
            true
        })
    }

    pub fn set_host(&self, id: PeerId) {
        self.host.send_if_modified(|host| {
            if host.as_ref() == Some(&id) {
                return false;
            }
            *host = Some(id);
            true
        });
    }

    /// Moves to `next`. Only forward moves apply, Closed is terminal.
    /// Returns whether the state changed.
    pub fn transition(&self, next: ConnectionState) -> bool {
        self.state.send_if_modified(|state| {
            if state.is_closed() || next == ConnectionState::Pending || *state == next {
                return false;
            }
            *state = next;
            true
        })
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    pub fn subscribe_host(&self) -> watch::Receiver<Option<PeerId>> {
        self.host.subscribe()
    }
}
