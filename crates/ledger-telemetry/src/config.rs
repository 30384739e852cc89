//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Organization the gateway acts for (e.g. org1)
    pub org: String,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to enable console output (for development)
    pub console_output: bool,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,

    /// Whether to register Prometheus metrics
    pub metrics_enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "ledger-gateway".to_string(),
            org: "org1".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            metrics_enabled: true,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `LG_SERVICE_NAME`: Service name (default: ledger-gateway)
    /// - `LG_ORG`: Organization (default: org1)
    /// - `LG_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `LG_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `LG_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    /// - `LG_METRICS`: Register Prometheus metrics (default: true)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("LG_SERVICE_NAME")
                .unwrap_or_else(|_| "ledger-gateway".to_string()),

            org: env::var("LG_ORG").unwrap_or_else(|_| "org1".to_string()),

            log_level: env::var("LG_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("LG_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),

            json_logs: env::var("LG_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),

            metrics_enabled: env::var("LG_METRICS")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),
        }
    }

    /// Create configuration for the gateway of one organization.
    pub fn for_org(org: &str) -> Self {
        let mut config = Self::from_env();
        config.org = org.to_string();
        config
    }

    /// Service name including the organization.
    pub fn full_service_name(&self) -> String {
        format!("{}-{}", self.service_name, self.org)
    }
}
