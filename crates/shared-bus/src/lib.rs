//! # Shared Bus - Commit Event Hub
//!
//! Transport abstraction for commit notifications between peers' event
//! services and the clients watching individual transactions.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐   connect()            ┌──────────────┐
//! │ Commit       │ ─────────────────────→ │ Peer event   │
//! │ Watcher      │   register_tx_event()  │ service      │
//! │              │ ←───── TxEvent ─────── │              │
//! └──────────────┘                        └──────────────┘
//!                                                ↑
//!                                       publish(CommitNotification)
//!                                                │
//!                                          Ordering service
//! ```
//!
//! ## Cleanup Contract
//!
//! - `unregister_tx_event` and `disconnect` are synchronous and idempotent,
//!   so callers can run them from a drop guard.
//! - A registration never outlives its connection.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{CommitNotification, TxEvent, TxFilter};
pub use publisher::{CommitPublisher, HubCounters, HubStats, InMemoryEventHub};
pub use subscriber::{
    EventHub, EventHubConnection, EventHubError, TxEventSender, TxEventStream,
};
