//! # Ledger Gateway
//!
//! Entry point of the gateway binary. See the `gateway_runtime` library for
//! the wiring.

use anyhow::{Context, Result};
use gateway_runtime::{GatewayRuntime, RuntimeConfig};
use ledger_telemetry::{gather_metrics, init_telemetry, TelemetryConfig};
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    let metrics_enabled = telemetry.metrics_enabled;
    let _telemetry = init_telemetry(telemetry).context("Failed to initialize telemetry")?;

    let config = RuntimeConfig::from_env().context("Invalid gateway configuration")?;
    let runtime = GatewayRuntime::new(config)?;

    // The signal arm never completes: the flow returns through its own
    // shutdown branch.
    let shutdown_on_signal = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => runtime.shutdown(),
            Err(error) => warn!(%error, "Failed to listen for Ctrl+C"),
        }
        std::future::pending::<()>().await
    };
    tokio::select! {
        result = runtime.run() => result?,
        _ = shutdown_on_signal => {}
    }

    if metrics_enabled {
        match gather_metrics() {
            Ok(text) => debug!("Metrics:\n{}", text),
            Err(error) => warn!(%error, "Failed to encode metrics"),
        }
    }

    info!("Gateway stopped");
    Ok(())
}
