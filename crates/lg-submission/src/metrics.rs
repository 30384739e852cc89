//! # Submission Metrics
//!
//! Records pipeline events into the Prometheus registry of
//! `ledger-telemetry`.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! lg-submission = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `ledger_submissions_total{result}` - finished submissions
//! - `ledger_submission_duration_seconds` - proposal to final outcome
//! - `ledger_proposal_rejections_total` - bad endorsement verdicts
//! - `ledger_order_failures_total` - envelopes the orderer did not accept
//! - `ledger_commit_outcomes_total{outcome}` - commit watch outcomes

/// Record a finished submission
#[cfg(feature = "metrics")]
pub fn record_submission(result: &str, duration_secs: f64) {
    ledger_telemetry::metrics::record_submission(result, duration_secs);
}

/// Record a proposal rejected by the endorsement policy
#[cfg(feature = "metrics")]
pub fn record_proposal_rejected() {
    ledger_telemetry::metrics::record_proposal_rejected();
}

/// Record an ordering failure
#[cfg(feature = "metrics")]
pub fn record_order_failure() {
    ledger_telemetry::metrics::record_order_failure();
}

/// Record a commit watch outcome
#[cfg(feature = "metrics")]
pub fn record_commit_outcome(outcome: &str) {
    ledger_telemetry::metrics::record_commit_outcome(outcome);
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_submission(_result: &str, _duration_secs: f64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_proposal_rejected() {}

#[cfg(not(feature = "metrics"))]
pub fn record_order_failure() {}

#[cfg(not(feature = "metrics"))]
pub fn record_commit_outcome(_outcome: &str) {}
