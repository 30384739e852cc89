//! # Event Hub Subscriber Side
//!
//! Defines how a client connects to a peer's event service and registers
//! interest in individual transactions.

use crate::events::{TxEvent, TxFilter};
use async_trait::async_trait;
use shared_types::{Endpoint, TransactionId};
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::Stream;
use tracing::debug;

/// Errors from event hub operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventHubError {
    /// The peer refused or dropped the connection attempt.
    #[error("Connection to {endpoint} refused: {reason}")]
    ConnectionRefused { endpoint: String, reason: String },

    /// The connection was already closed.
    #[error("Event hub connection closed")]
    Closed,

    /// The transaction is already registered on this connection.
    #[error("Transaction {tx_id} already registered")]
    AlreadyRegistered { tx_id: TransactionId },
}

/// Connects to peer event services.
#[async_trait]
pub trait EventHub: Send + Sync {
    /// Open a connection to the event service at `endpoint`.
    async fn connect(
        &self,
        endpoint: &Endpoint,
    ) -> Result<Box<dyn EventHubConnection>, EventHubError>;
}

/// One open connection to a peer event service.
///
/// Cleanup operations are synchronous so they can run from `Drop`.
pub trait EventHubConnection: Send {
    /// Endpoint this connection is attached to.
    fn endpoint(&self) -> &Endpoint;

    /// Register interest in the commit verdict of `tx_id`.
    fn register_tx_event(&mut self, tx_id: &TransactionId)
        -> Result<TxEventStream, EventHubError>;

    /// Drop interest in `tx_id`. Unknown ids are ignored.
    fn unregister_tx_event(&mut self, tx_id: &TransactionId);

    /// Close the connection. Idempotent.
    fn disconnect(&mut self);
}

/// Sending half handed to the transport for one registration.
#[derive(Debug, Clone)]
pub struct TxEventSender {
    sender: mpsc::UnboundedSender<TxEvent>,
}

impl TxEventSender {
    /// Deliver an event. Returns `false` once the stream was dropped.
    pub fn send(&self, event: TxEvent) -> bool {
        self.sender.send(event).is_ok()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Stream of events for one transaction registration.
///
/// Events for other transactions are skipped. `None` means the transport
/// dropped its sending half without reporting a verdict.
pub struct TxEventStream {
    receiver: mpsc::UnboundedReceiver<TxEvent>,
    filter: TxFilter,
}

impl TxEventStream {
    /// Create a registration channel for `tx_id`.
    #[must_use]
    pub fn channel(tx_id: TransactionId) -> (TxEventSender, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            TxEventSender { sender },
            Self {
                receiver,
                filter: TxFilter::new(tx_id),
            },
        )
    }

    /// Receive the next event that matches the filter.
    pub async fn recv(&mut self) -> Option<TxEvent> {
        loop {
            let event = self.receiver.recv().await?;
            if self.filter.matches(&event) {
                return Some(event);
            }
            debug!(
                expected = %self.filter.tx_id.short(),
                "Ignoring event for another transaction"
            );
        }
    }

    #[must_use]
    pub fn filter(&self) -> &TxFilter {
        &self.filter
    }
}

impl Stream for TxEventStream {
    type Item = TxEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match this.receiver.poll_recv(cx) {
                Poll::Ready(Some(event)) if this.filter.matches(&event) => {
                    return Poll::Ready(Some(event))
                }
                Poll::Ready(Some(_)) => continue,
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
