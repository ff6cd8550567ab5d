use crate::link::{LinkConfig, OnIceCandidate, PeerEvent, PeerLink};
use anyhow::Result;
use bytes::Bytes;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future::join_all;
use std::sync::Arc;
use syncroom_core::PeerId;
use tokio::sync::broadcast;
use tracing::{debug, info};

const EVENT_CAPACITY: usize = 1024;

/// Links of one session, keyed by remote peer id.
///
/// Owns the broadcast channel every link publishes its data channel events on.
pub struct PeerLinkRegistry {
    links: DashMap<PeerId, Arc<PeerLink>>,
    config: LinkConfig,
    events: broadcast::Sender<PeerEvent>,
}

impl PeerLinkRegistry {
    pub fn new(config: LinkConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            links: DashMap::new(),
            config,
            events,
        }
    }

    /// Returns the link to `remote_id`, creating it with `on_ice_candidate` if absent.
    /// On a hit the callback is dropped.
    pub async fn get_or_create(
        &self,
        remote_id: &PeerId,
        on_ice_candidate: OnIceCandidate,
    ) -> Result<Arc<PeerLink>> {
        if let Some(link) = self.get(remote_id) {
            return Ok(link);
        }

        let link = Arc::new(
            PeerLink::new(
                remote_id.clone(),
                &self.config,
                self.events.clone(),
                on_ice_candidate,
            )
            .await?,
        );

        let winner = match self.links.entry(remote_id.clone()) {
            Entry::Occupied(entry) => Some(entry.get().clone()),
            Entry::Vacant(entry) => {
                entry.insert(link.clone());
                None
            }
        };
        match winner {
            Some(existing) => {
                debug!("Link to {:?} created concurrently, keeping the first", remote_id);
                link.close().await;
                Ok(existing)
            }
            None => {
                info!("Link to {:?} created", remote_id);
                Ok(link)
            }
        }
    }

    pub fn get(&self, remote_id: &PeerId) -> Option<Arc<PeerLink>> {
        self.links.get(remote_id).map(|link| link.clone())
    }

    /// Closes and forgets one link. `false` if there was none.
    pub async fn remove(&self, remote_id: &PeerId) -> bool {
        let Some((_, link)) = self.links.remove(remote_id) else {
            return false;
        };
        link.close().await;
        true
    }

    pub async fn remove_all(&self) {
        let ids = self.ids();
        let links: Vec<_> = ids
            .iter()
            .filter_map(|id| self.links.remove(id).map(|(_, link)| link))
            .collect();
        join_all(links.iter().map(|link| link.close())).await;
    }

    pub fn ids(&self) -> Vec<PeerId> {
        self.links.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PeerEvent> {
        self.events.subscribe()
    }

    /// Sends `data` on every open channel, returns how many took it.
    pub async fn broadcast(&self, data: Bytes) -> usize {
        let links: Vec<_> = self.links.iter().map(|entry| entry.value().clone()).collect();
        let results = join_all(links.iter().map(|link| link.send(&data))).await;
        results.into_iter().filter(|sent| *sent).count()
    }

    pub async fn send_to(&self, remote_id: &PeerId, data: Bytes) -> bool {
        match self.get(remote_id) {
            Some(link) => link.send(&data).await,
            None => {
                debug!("No link to {:?}, dropping message", remote_id);
                false
            }
        }
    }
}
