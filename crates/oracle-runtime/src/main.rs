//! # Oracle Runtime
//!
//! Entry point for the flight-status oracle network.
//!
//! ## Exit Codes
//!
//! - `0`: stopped with Ctrl+C
//! - non-zero: startup failed or the request subscription closed

use anyhow::{bail, Context, Result};
use oracle_runtime::{load_config, OracleRuntime};
use oracle_telemetry::{init_logging, register_metrics, TelemetryConfig};
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize telemetry
    let telemetry = TelemetryConfig::from_env();
    init_logging(&telemetry).context("Failed to initialize logging")?;
    register_metrics().context("Failed to register metrics")?;

    // Load configuration
    let config = load_config();
    if let Ok(dump) = serde_json::to_string(&config) {
        debug!(config = %dump, "Effective configuration");
    }

    let mut runtime = OracleRuntime::start(config).await?;

    info!("Oracle network is running. Press Ctrl+C to stop.");
    let subscription_lost = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl+C")?;
            false
        }
        _ = runtime.listener_closed() => true,
    };

    if let Ok(text) = oracle_telemetry::gather_text() {
        debug!(metrics = %text, "Final metrics");
    }
    runtime.shutdown().await;

    if subscription_lost {
        error!("Request subscription closed unexpectedly");
        bail!("ledger event subscription closed");
    }
    Ok(())
}
