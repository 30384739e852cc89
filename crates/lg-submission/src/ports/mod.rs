//! Ports module for the submission pipeline

pub mod inbound;
pub mod outbound;

pub use inbound::SubmissionApi;
pub use outbound::{IdentityProvider, LedgerChannel, NetworkConfig};
