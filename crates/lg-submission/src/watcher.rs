//! # Commit Watcher
//!
//! Waits for the commit verdict of one transaction on one event endpoint.
//!
//! ```text
//! subscribe() ──→ [SUBSCRIBED] ──wait(timeout)──→ [RESOLVED]
//!      │                                            ↑
//!      └── connect/register failed ──→ UNREACHABLE ─┘
//!
//! In SUBSCRIBED exactly one trigger wins:
//!   notification "VALID"      → Valid
//!   notification <other code> → Invalid(code)
//!   timer elapsed             → Timeout
//!   connection error          → Unreachable (timeout class)
//! ```
//!
//! ## Cleanup
//!
//! The connection and registration are owned by a guard that unregisters
//! and disconnects exactly once: explicitly after resolution, or from
//! `Drop` when the waiting task is cancelled. The timer is a scoped sleep
//! inside `select!` and goes away with it.

use crate::domain::CommitOutcome;
use shared_bus::{EventHub, EventHubConnection, TxEvent, TxEventStream};
use shared_types::{Endpoint, TransactionId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lifecycle of one watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchState {
    Subscribed,
    Resolved(CommitOutcome),
}

/// Opens commit watches through an [`EventHub`].
pub struct CommitWatcher<H: EventHub + ?Sized> {
    hub: Arc<H>,
}

impl<H: EventHub + ?Sized> CommitWatcher<H> {
    pub fn new(hub: Arc<H>) -> Self {
        Self { hub }
    }

    /// Connect to `endpoint` and register interest in `tx_id`.
    ///
    /// Call this before the envelope is ordered so an early notification
    /// is not missed. Connection or registration failures produce a watch
    /// that resolves immediately as `Unreachable`.
    pub async fn subscribe(&self, tx_id: TransactionId, endpoint: &Endpoint) -> ArmedWatch {
        let mut connection = match self.hub.connect(endpoint).await {
            Ok(connection) => connection,
            Err(error) => {
                warn!(tx_id = %tx_id.short(), %endpoint, %error, "Event hub connection failed");
                return ArmedWatch::failed(tx_id, error.to_string());
            }
        };

        let stream = match connection.register_tx_event(&tx_id) {
            Ok(stream) => stream,
            Err(error) => {
                warn!(tx_id = %tx_id.short(), %endpoint, %error, "Transaction registration failed");
                connection.disconnect();
                return ArmedWatch::failed(tx_id, error.to_string());
            }
        };

        debug!(tx_id = %tx_id.short(), %endpoint, "Registered for commit event");
        ArmedWatch {
            tx_id: tx_id.clone(),
            state: WatchState::Subscribed,
            registration: Some((
                RegistrationGuard {
                    connection,
                    tx_id,
                    released: false,
                },
                stream,
            )),
        }
    }

    /// `subscribe` followed by `wait`.
    pub async fn watch(
        &self,
        tx_id: TransactionId,
        endpoint: &Endpoint,
        timeout: Duration,
    ) -> CommitOutcome {
        self.subscribe(tx_id, endpoint).await.wait(timeout).await
    }
}

/// Registration plus connection, released exactly once.
struct RegistrationGuard {
    connection: Box<dyn EventHubConnection>,
    tx_id: TransactionId,
    released: bool,
}

impl RegistrationGuard {
    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.connection.unregister_tx_event(&self.tx_id);
        self.connection.disconnect();
        debug!(tx_id = %self.tx_id.short(), "Commit watch released");
    }
}

impl Drop for RegistrationGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// A subscribed watch waiting to be resolved.
pub struct ArmedWatch {
    tx_id: TransactionId,
    state: WatchState,
    registration: Option<(RegistrationGuard, TxEventStream)>,
}

impl ArmedWatch {
    fn failed(tx_id: TransactionId, reason: String) -> Self {
        Self {
            tx_id,
            state: WatchState::Resolved(CommitOutcome::Unreachable(reason)),
            registration: None,
        }
    }

    pub fn tx_id(&self) -> &TransactionId {
        &self.tx_id
    }

    pub fn state(&self) -> &WatchState {
        &self.state
    }

    /// Wait up to `timeout` for the verdict.
    pub async fn wait(mut self, timeout: Duration) -> CommitOutcome {
        let Some((mut guard, mut stream)) = self.registration.take() else {
            return match self.state {
                WatchState::Resolved(outcome) => outcome,
                WatchState::Subscribed => {
                    CommitOutcome::Unreachable("watch was never subscribed".to_string())
                }
            };
        };

        let outcome = tokio::select! {
            event = stream.recv() => match event {
                Some(TxEvent::Committed(notification)) => {
                    debug!(
                        tx_id = %self.tx_id.short(),
                        block = notification.block_number,
                        code = %notification.code,
                        "Commit notification"
                    );
                    CommitOutcome::from(notification.code)
                }
                Some(TxEvent::Disconnected { reason }) => CommitOutcome::Unreachable(reason),
                None => CommitOutcome::Unreachable("event stream closed".to_string()),
            },
            _ = tokio::time::sleep(timeout) => CommitOutcome::Timeout,
        };

        guard.release();
        drop(stream);

        match &outcome {
            CommitOutcome::Valid => {
                info!(tx_id = %self.tx_id.short(), "Transaction committed")
            }
            CommitOutcome::Invalid(code) => {
                warn!(tx_id = %self.tx_id.short(), %code, "Transaction committed as invalid")
            }
            CommitOutcome::Timeout => warn!(
                tx_id = %self.tx_id.short(),
                timeout_ms = timeout.as_millis() as u64,
                "Commit notification timed out"
            ),
            CommitOutcome::Unreachable(reason) => {
                warn!(tx_id = %self.tx_id.short(), %reason, "Event connection failed")
            }
        }
        outcome
    }
}
