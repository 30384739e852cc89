//! Prometheus metrics for the ledger gateway.
//!
//! All metrics follow the naming convention: `ledger_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: submissions, proposal rejections, ordering failures
//! - **CounterVec**: submissions by result, commit outcomes by kind
//! - **Histogram**: end-to-end submission duration

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // SUBMISSION METRICS
    // =========================================================================

    /// Submissions by result (committed/invalid/timeout/unreachable/order_failed/error)
    pub static ref SUBMISSIONS: CounterVec = CounterVec::new(
        Opts::new("ledger_submissions_total", "Total transaction submissions by result"),
        &["result"]
    ).expect("metric creation failed");

    /// End-to-end submission duration
    pub static ref SUBMISSION_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "ledger_submission_duration_seconds",
            "Time from proposal to commit outcome"
        ).buckets(exponential_buckets(0.005, 2.0, 15).expect("valid buckets"))
    ).expect("metric creation failed");

    // =========================================================================
    // ENDORSEMENT METRICS
    // =========================================================================

    /// Proposals rejected by the endorsement policy
    pub static ref PROPOSAL_REJECTIONS: Counter = Counter::new(
        "ledger_proposal_rejections_total",
        "Total proposals rejected before ordering"
    ).expect("metric creation failed");

    // =========================================================================
    // ORDERING / COMMIT METRICS
    // =========================================================================

    /// Ordering service refusals and send failures
    pub static ref ORDER_FAILURES: Counter = Counter::new(
        "ledger_order_failures_total",
        "Total envelopes the ordering service did not accept"
    ).expect("metric creation failed");

    /// Commit watcher outcomes (valid/invalid/timeout/unreachable)
    pub static ref COMMIT_OUTCOMES: CounterVec = CounterVec::new(
        Opts::new("ledger_commit_outcomes_total", "Commit watch outcomes by kind"),
        &["outcome"]
    ).expect("metric creation failed");
}

/// Handle for the registered metrics
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Submission
        Box::new(SUBMISSIONS.clone()),
        Box::new(SUBMISSION_DURATION.clone()),
        // Endorsement
        Box::new(PROPOSAL_REJECTIONS.clone()),
        // Ordering / commit
        Box::new(ORDER_FAILURES.clone()),
        Box::new(COMMIT_OUTCOMES.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a finished submission with its result label and duration.
pub fn record_submission(result: &str, duration_secs: f64) {
    SUBMISSIONS.with_label_values(&[result]).inc();
    SUBMISSION_DURATION.observe(duration_secs);
}

/// Record a proposal rejected by the endorsement policy.
pub fn record_proposal_rejected() {
    PROPOSAL_REJECTIONS.inc();
}

/// Record an ordering refusal or send failure.
pub fn record_order_failure() {
    ORDER_FAILURES.inc();
}

/// Record a commit watch outcome.
pub fn record_commit_outcome(outcome: &str) {
    COMMIT_OUTCOMES.with_label_values(&[outcome]).inc();
}
