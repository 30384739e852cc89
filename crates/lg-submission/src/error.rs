//! Error types for the submission pipeline

use crate::domain::Endorsement;
use shared_types::{IdentityError, OrgId, TransactionId};
use std::path::PathBuf;
use thiserror::Error;

/// Errors a caller receives instead of a [`crate::SubmissionResult`].
///
/// Ordering and commit failures are not errors: they are recorded in the
/// result. Only misconfiguration, identity failures and rejected proposals
/// abort a submission.
#[derive(Debug, Clone, Error)]
pub enum SubmissionError {
    /// A target name has no mapping in the network directory
    #[error("Unknown target {name} (caller organization {org})")]
    UnknownTarget { name: String, org: OrgId },

    /// Event subscription outside the caller's organization, or no
    /// event-capable peer inside it
    #[error("Scope violation for organization {org}: {reason}")]
    ScopeViolation { org: OrgId, reason: String },

    /// Signing identity unusable
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Endorsement verdict was bad; nothing was ordered
    #[error("Proposal {tx_id} rejected: {reason}")]
    ProposalRejected {
        tx_id: TransactionId,
        reason: String,
        responses: Vec<Endorsement>,
    },

    /// No target answered a query successfully
    #[error("Query {tx_id} failed on every target")]
    QueryFailed {
        tx_id: TransactionId,
        responses: Vec<Endorsement>,
    },

    /// Request is malformed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl SubmissionError {
    /// Metric label for this error kind.
    pub fn label(&self) -> &'static str {
        match self {
            Self::UnknownTarget { .. } => "unknown_target",
            Self::ScopeViolation { .. } => "scope_violation",
            Self::Identity(_) => "identity",
            Self::ProposalRejected { .. } => "proposal_rejected",
            Self::QueryFailed { .. } => "query_failed",
            Self::InvalidRequest(_) => "invalid_request",
        }
    }

    /// Per-target responses, for rejection errors.
    pub fn responses(&self) -> &[Endorsement] {
        match self {
            Self::ProposalRejected { responses, .. } | Self::QueryFailed { responses, .. } => {
                responses
            }
            _ => &[],
        }
    }
}

/// Result type for submission operations
pub type GatewayResult<T> = Result<T, SubmissionError>;

/// Transport errors raised by a [`crate::ports::outbound::LedgerChannel`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The endpoint could not be reached
    #[error("Endpoint {endpoint} unavailable: {reason}")]
    Unavailable { endpoint: String, reason: String },

    /// The call did not complete in time
    #[error("Call to {endpoint} timed out")]
    Timeout { endpoint: String },

    /// The remote answered with something unintelligible
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document is not valid JSON for the expected shape
    #[error("Malformed network directory: {0}")]
    Parse(#[from] serde_json::Error),

    /// Environment variable holds an unusable value
    #[error("Invalid value {value:?} for {var}")]
    Env { var: &'static str, value: String },

    /// Document parsed but is inconsistent
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
