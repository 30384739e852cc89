//! # Commit Publisher & In-Memory Event Hub
//!
//! Defines the publishing side of commit notifications and an in-process
//! hub implementing both sides.

use crate::events::{CommitNotification, TxEvent};
use crate::subscriber::{
    EventHub, EventHubConnection, EventHubError, TxEventSender, TxEventStream,
};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared_types::{Endpoint, TransactionId};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Trait for publishing commit verdicts to registered watchers.
#[async_trait]
pub trait CommitPublisher: Send + Sync {
    /// Publish a verdict on the event service at `endpoint`.
    ///
    /// # Returns
    ///
    /// The number of registrations that received the notification.
    async fn publish(&self, endpoint: &Endpoint, notification: CommitNotification) -> usize;

    /// Get the total number of notifications published.
    fn notifications_published(&self) -> u64;
}

/// Counters for hub activity.
#[derive(Debug, Default)]
pub struct HubStats {
    connects: AtomicU64,
    registrations: AtomicU64,
    unregistrations: AtomicU64,
    disconnects: AtomicU64,
    published: AtomicU64,
    delivered: AtomicU64,
}

/// Point-in-time copy of [`HubStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HubCounters {
    pub connects: u64,
    pub registrations: u64,
    pub unregistrations: u64,
    pub disconnects: u64,
    pub published: u64,
    pub delivered: u64,
}

impl HubStats {
    #[must_use]
    pub fn snapshot(&self) -> HubCounters {
        HubCounters {
            connects: self.connects.load(Ordering::SeqCst),
            registrations: self.registrations.load(Ordering::SeqCst),
            unregistrations: self.unregistrations.load(Ordering::SeqCst),
            disconnects: self.disconnects.load(Ordering::SeqCst),
            published: self.published.load(Ordering::SeqCst),
            delivered: self.delivered.load(Ordering::SeqCst),
        }
    }
}

type Registrations = HashMap<String, HashMap<TransactionId, Vec<(u64, TxEventSender)>>>;

struct HubInner {
    /// authority -> tx id -> (connection id, sender)
    registrations: Mutex<Registrations>,
    /// authority -> refusal reason
    refused: RwLock<HashMap<String, String>>,
    next_connection_id: AtomicU64,
    stats: HubStats,
}

impl HubInner {
    fn remove_registration(&self, authority: &str, tx_id: &TransactionId, connection_id: u64) {
        let mut registrations = self.registrations.lock();
        let Some(by_tx) = registrations.get_mut(authority) else {
            return;
        };
        if let Some(senders) = by_tx.get_mut(tx_id) {
            senders.retain(|(id, _)| *id != connection_id);
            if senders.is_empty() {
                by_tx.remove(tx_id);
            }
        }
        if by_tx.is_empty() {
            registrations.remove(authority);
        }
    }
}

/// In-process event hub.
///
/// Models the event services of every peer in one process. Used by the
/// gateway devnet and by tests, which read [`HubStats`] to check that each
/// watcher cleans up exactly once.
#[derive(Clone)]
pub struct InMemoryEventHub {
    inner: Arc<HubInner>,
}

impl InMemoryEventHub {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(HubInner {
                registrations: Mutex::new(HashMap::new()),
                refused: RwLock::new(HashMap::new()),
                next_connection_id: AtomicU64::new(1),
                stats: HubStats::default(),
            }),
        }
    }

    /// Make future `connect` calls to `endpoint` fail.
    pub fn refuse_connections(&self, endpoint: &Endpoint, reason: impl Into<String>) {
        self.inner
            .refused
            .write()
            .insert(endpoint.authority().to_string(), reason.into());
    }

    /// Accept connections to `endpoint` again.
    pub fn accept_connections(&self, endpoint: &Endpoint) {
        self.inner.refused.write().remove(endpoint.authority());
    }

    /// Report a transport failure to every registration on `endpoint`.
    ///
    /// Returns the number of registrations notified.
    pub fn sever(&self, endpoint: &Endpoint, reason: &str) -> usize {
        let registrations = self.inner.registrations.lock();
        let Some(by_tx) = registrations.get(endpoint.authority()) else {
            return 0;
        };
        let mut notified = 0;
        for (_, sender) in by_tx.values().flatten() {
            if sender.send(TxEvent::Disconnected {
                reason: reason.to_string(),
            }) {
                notified += 1;
            }
        }
        warn!(endpoint = %endpoint, notified, reason, "Event service connection severed");
        notified
    }

    /// Number of live transaction registrations across all endpoints.
    #[must_use]
    pub fn active_registrations(&self) -> usize {
        self.inner
            .registrations
            .lock()
            .values()
            .flat_map(|by_tx| by_tx.values())
            .map(Vec::len)
            .sum()
    }

    #[must_use]
    pub fn stats(&self) -> HubCounters {
        self.inner.stats.snapshot()
    }
}

impl Default for InMemoryEventHub {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventHub for InMemoryEventHub {
    async fn connect(
        &self,
        endpoint: &Endpoint,
    ) -> Result<Box<dyn EventHubConnection>, EventHubError> {
        if let Some(reason) = self.inner.refused.read().get(endpoint.authority()) {
            return Err(EventHubError::ConnectionRefused {
                endpoint: endpoint.url(),
                reason: reason.clone(),
            });
        }

        let id = self.inner.next_connection_id.fetch_add(1, Ordering::Relaxed);
        self.inner.stats.connects.fetch_add(1, Ordering::SeqCst);
        debug!(endpoint = %endpoint, connection = id, "Event hub connected");

        Ok(Box::new(InMemoryConnection {
            id,
            endpoint: endpoint.clone(),
            hub: self.inner.clone(),
            registered: HashSet::new(),
            closed: false,
        }))
    }
}

#[async_trait]
impl CommitPublisher for InMemoryEventHub {
    async fn publish(&self, endpoint: &Endpoint, notification: CommitNotification) -> usize {
        self.inner.stats.published.fetch_add(1, Ordering::SeqCst);

        let senders: Vec<TxEventSender> = {
            let registrations = self.inner.registrations.lock();
            registrations
                .get(endpoint.authority())
                .and_then(|by_tx| by_tx.get(&notification.tx_id))
                .map(|senders| senders.iter().map(|(_, s)| s.clone()).collect())
                .unwrap_or_default()
        };

        let tx_id = notification.tx_id.clone();
        let delivered = senders
            .iter()
            .filter(|sender| sender.send(TxEvent::Committed(notification.clone())))
            .count();
        self.inner
            .stats
            .delivered
            .fetch_add(delivered as u64, Ordering::SeqCst);

        if delivered == 0 {
            debug!(
                endpoint = %endpoint,
                tx_id = %tx_id.short(),
                "Commit notification dropped (no registrations)"
            );
        }
        delivered
    }

    fn notifications_published(&self) -> u64 {
        self.inner.stats.published.load(Ordering::SeqCst)
    }
}

/// Connection handed out by [`InMemoryEventHub`].
struct InMemoryConnection {
    id: u64,
    endpoint: Endpoint,
    hub: Arc<HubInner>,
    registered: HashSet<TransactionId>,
    closed: bool,
}

impl InMemoryConnection {
    fn release_all(&mut self) {
        for tx_id in self.registered.drain() {
            self.hub
                .remove_registration(self.endpoint.authority(), &tx_id, self.id);
        }
    }
}

impl EventHubConnection for InMemoryConnection {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn register_tx_event(
        &mut self,
        tx_id: &TransactionId,
    ) -> Result<TxEventStream, EventHubError> {
        if self.closed {
            return Err(EventHubError::Closed);
        }
        if !self.registered.insert(tx_id.clone()) {
            return Err(EventHubError::AlreadyRegistered {
                tx_id: tx_id.clone(),
            });
        }

        let (sender, stream) = TxEventStream::channel(tx_id.clone());
        self.hub
            .registrations
            .lock()
            .entry(self.endpoint.authority().to_string())
            .or_default()
            .entry(tx_id.clone())
            .or_default()
            .push((self.id, sender));
        self.hub.stats.registrations.fetch_add(1, Ordering::SeqCst);
        Ok(stream)
    }

    fn unregister_tx_event(&mut self, tx_id: &TransactionId) {
        if self.registered.remove(tx_id) {
            self.hub
                .remove_registration(self.endpoint.authority(), tx_id, self.id);
            self.hub.stats.unregistrations.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn disconnect(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.release_all();
        self.hub.stats.disconnects.fetch_add(1, Ordering::SeqCst);
        debug!(endpoint = %self.endpoint, connection = self.id, "Event hub disconnected");
    }
}

impl Drop for InMemoryConnection {
    fn drop(&mut self) {
        // Leaked connections still must not keep registrations alive.
        if !self.closed {
            self.release_all();
        }
    }
}
