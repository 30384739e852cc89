//! Terminal outcomes of the ordering and commit phases

use serde::{Deserialize, Serialize};
use shared_types::{TransactionId, ValidationCode};
use std::fmt;

/// What the ordering service said about an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderOutcome {
    Success,
    /// Orderer status text or transport error text
    Failure { reason: String },
}

impl OrderOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for OrderOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("SUCCESS"),
            Self::Failure { reason } => write!(f, "FAILURE ({reason})"),
        }
    }
}

/// Commit verdict observed by the commit watcher. Exactly one per watch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitOutcome {
    Valid,
    /// Committed but invalidated, e.g. `MVCC_READ_CONFLICT`
    Invalid(String),
    /// No verdict before the deadline
    Timeout,
    /// Event connection failed before any verdict arrived
    Unreachable(String),
}

impl CommitOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// `Timeout` and `Unreachable` both mean the verdict is unknown.
    pub fn is_timeout_class(&self) -> bool {
        matches!(self, Self::Timeout | Self::Unreachable(_))
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid(_) => "invalid",
            Self::Timeout => "timeout",
            Self::Unreachable(_) => "unreachable",
        }
    }
}

impl From<ValidationCode> for CommitOutcome {
    fn from(code: ValidationCode) -> Self {
        match code {
            ValidationCode::Valid => Self::Valid,
            ValidationCode::Invalid(code) => Self::Invalid(code),
        }
    }
}

impl fmt::Display for CommitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => f.write_str("VALID"),
            Self::Invalid(code) => write!(f, "INVALID({code})"),
            Self::Timeout => f.write_str("TIMEOUT"),
            Self::Unreachable(reason) => write!(f, "UNREACHABLE({reason})"),
        }
    }
}

/// Final value of a submission that got past the proposal phase.
///
/// Both outcomes are always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub tx_id: TransactionId,
    pub order_outcome: OrderOutcome,
    pub commit_outcome: CommitOutcome,
}

impl SubmissionResult {
    /// Ordered and committed as valid.
    pub fn is_committed(&self) -> bool {
        self.order_outcome.is_success() && self.commit_outcome.is_valid()
    }

    /// Metric label summarizing both outcomes.
    pub fn label(&self) -> &'static str {
        if !self.order_outcome.is_success() {
            return "order_failed";
        }
        match self.commit_outcome {
            CommitOutcome::Valid => "committed",
            CommitOutcome::Invalid(_) => "invalid",
            CommitOutcome::Timeout => "timeout",
            CommitOutcome::Unreachable(_) => "unreachable",
        }
    }
}
