//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits: the static network directory, the
//! static identity store and a scripted ledger double.

mod identity_store;
mod network_directory;
mod scripted_ledger;

pub use identity_store::StaticIdentityProvider;
pub use network_directory::{NetworkDirectory, NodeSpec, OrgSpec, PeerSpec};
pub use scripted_ledger::{PeerScript, ScriptedLedger};
