//! # Ledger Telemetry
//!
//! Logging and metrics for the ledger gateway.
//!
//! ## Components
//!
//! - **Logs**: `tracing-subscriber` with env filter, JSON or pretty output
//! - **Metrics**: Prometheus counters and histograms in a private registry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ledger_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LG_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `LG_JSON_LOGS` | `false` | JSON log lines |
//! | `LG_SERVICE_NAME` | `ledger-gateway` | Service name in logs |
//! | `LG_ORG` | `org1` | Organization the gateway acts for |
//! | `LG_METRICS` | `true` | Register Prometheus metrics |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::{init_logging, StructuredLogger};
pub use metrics::{
    gather_metrics, register_metrics, MetricsHandle, COMMIT_OUTCOMES, ORDER_FAILURES,
    PROPOSAL_REJECTIONS, SUBMISSIONS, SUBMISSION_DURATION,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and, when enabled, metrics.
///
/// Returns a guard that must be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = if config.metrics_enabled {
        Some(register_metrics()?)
    } else {
        None
    };

    let logger = init_logging(&config)?;

    Ok(TelemetryGuard {
        _logger: logger,
        _metrics: metrics,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _logger: StructuredLogger,
    _metrics: Option<MetricsHandle>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry");
    }
}

/// Create a span for one submission.
///
/// ```rust,ignore
/// let span = ledger_telemetry::submission_span!("submit", tx_id = %id, channel = %ch);
/// ```
#[macro_export]
macro_rules! submission_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}
