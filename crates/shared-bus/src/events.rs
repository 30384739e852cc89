//! # Commit Events
//!
//! Defines the notifications that flow from a peer's event service to the
//! watchers registered on it.

use serde::{Deserialize, Serialize};
use shared_types::{TransactionId, ValidationCode};

/// A peer reporting the final validation verdict for one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitNotification {
    /// Transaction the verdict applies to.
    pub tx_id: TransactionId,
    /// Validation code assigned at commit time.
    pub code: ValidationCode,
    /// Block the transaction was committed in.
    pub block_number: u64,
}

/// Event delivered to a single transaction registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxEvent {
    /// The transaction reached a final verdict.
    Committed(CommitNotification),

    /// The underlying connection failed; no verdict will follow.
    Disconnected {
        /// Transport error text.
        reason: String,
    },
}

impl TxEvent {
    /// Transaction this event refers to. Connection failures refer to all
    /// registrations on the connection.
    #[must_use]
    pub fn tx_id(&self) -> Option<&TransactionId> {
        match self {
            Self::Committed(notification) => Some(&notification.tx_id),
            Self::Disconnected { .. } => None,
        }
    }
}

/// Filter restricting a registration to one transaction id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxFilter {
    /// Transaction id of interest.
    pub tx_id: TransactionId,
}

impl TxFilter {
    #[must_use]
    pub fn new(tx_id: TransactionId) -> Self {
        Self { tx_id }
    }

    /// Connection failures always match; commits match on transaction id.
    #[must_use]
    pub fn matches(&self, event: &TxEvent) -> bool {
        match event.tx_id() {
            Some(tx_id) => tx_id == &self.tx_id,
            None => true,
        }
    }
}
