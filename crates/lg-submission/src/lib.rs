//! # lg-submission
//!
//! Client-side transaction submission for a permissioned, channel-based
//! ledger: endorsement, ordering and commit confirmation.
//!
//! ## Overview
//!
//! This crate provides:
//! - **Target Resolver**: logical peer names to proposal/event endpoints
//! - **Transaction Identity Issuer**: unique ids bound to the caller
//! - **Proposal Coordinator**: parallel endorsement with a verdict policy
//! - **Commit Watcher**: single-shot commit verdict with timeout
//! - **Submission Service**: the orchestrator, plus query and batch paths
//!
//! ## Architecture
//!
//! ```text
//!                 ┌────────────────────── SubmissionService ──────────────────────┐
//! request ──→ TargetResolver ──→ TransactionIdIssuer ──→ ProposalCoordinator     │
//!                 │                                          │ good verdict      │
//!                 │                         ┌────────────────┴──────────────┐    │
//!                 │                  LedgerChannel::submit_to_order   CommitWatcher (EventHub)
//!                 │                         └────────────── join ───────────┘    │
//!                 └──────────────────────→ SubmissionResult ─────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use lg_submission::{SubmissionConfig, SubmissionService, TransactionRequest};
//! use lg_submission::ports::inbound::SubmissionApi;
//!
//! let service = SubmissionService::new(
//!     SubmissionConfig::interactive(),
//!     ledger,
//!     event_hub,
//!     network_directory,
//! );
//!
//! let request = TransactionRequest::builder("mychannel", "tuna-app", "changeTunaHolder")
//!     .targets(["peer0", "peer1"])
//!     .args(["1", "Barry"])
//!     .identity(identity)
//!     .build()?;
//!
//! let result = service.submit_transaction(request).await?;
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod identity;
pub mod metrics;
pub mod ports;
pub mod proposal;
pub mod resolver;
pub mod service;
pub mod watcher;

pub use adapters::{NetworkDirectory, PeerScript, ScriptedLedger, StaticIdentityProvider};
pub use config::SubmissionConfig;
pub use domain::{
    CommitOutcome, Endorsement, EndorsementPolicy, OrderOutcome, PeerRecord, Proposal,
    ProposalEnvelope, ProposalResponse, ResolvedTarget, SubmissionResult, TargetPurpose,
    TransactionRequest, Verdict,
};
pub use error::{ConfigError, GatewayResult, LedgerError, SubmissionError};
pub use identity::TransactionIdIssuer;
pub use ports::inbound::SubmissionApi;
pub use ports::outbound::{IdentityProvider, LedgerChannel, NetworkConfig};
pub use proposal::ProposalCoordinator;
pub use resolver::TargetResolver;
pub use service::SubmissionService;
pub use watcher::{ArmedWatch, CommitWatcher, WatchState};
