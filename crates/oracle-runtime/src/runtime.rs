//! # Oracle Runtime
//!
//! Owns the ledger connection, the oracle network and the auxiliary tasks
//! (request driver, metrics feed).
//!
//! ## Startup Sequence
//!
//! 1. Bootstrap the airline and flights
//! 2. Register the oracle pool and subscribe to requests
//! 3. Record registration metrics
//! 4. Start the metrics feed and the request driver
//!
//! ## Shutdown Sequence
//!
//! 1. Signal auxiliary tasks
//! 2. Stop the oracle network (in-flight submissions are abandoned)
//! 3. Join auxiliary tasks

use anyhow::{Context, Result};
use fs_oracle_network::{
    LedgerBootstrap, LedgerGateway, OracleContext, OracleNetwork, OracleNetworkHandle,
    SimulatedLedger,
};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::bootstrap::bootstrap_ledger;
use crate::config::RuntimeConfig;
use crate::driver::RequestDriver;
use crate::metrics_feed::{record_registration, run_metrics_feed};

/// A running oracle node.
pub struct OracleRuntime {
    ledger: Arc<SimulatedLedger>,
    network: OracleNetworkHandle,
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl OracleRuntime {
    /// Start against an in-process simulated ledger.
    pub async fn start(config: RuntimeConfig) -> Result<Self> {
        info!("===========================================");
        info!("  Flight-Status Oracle Runtime v{}", crate::VERSION);
        info!("===========================================");
        info!(
            endpoint = %config.network.ledger_endpoint,
            contract = %config.network.contract_address,
            "Using in-process simulated ledger"
        );

        Self::start_with_ledger(config, Arc::new(SimulatedLedger::new())).await
    }

    /// Start against the given ledger.
    pub async fn start_with_ledger(
        config: RuntimeConfig,
        ledger: Arc<SimulatedLedger>,
    ) -> Result<Self> {
        let flights = bootstrap_ledger(ledger.as_ref(), &config)
            .await
            .context("Failed to bootstrap airline and flights")?;

        let gateway: Arc<dyn LedgerGateway> = ledger.clone();
        let ctx = OracleContext::new(gateway, config.network.clone())
            .context("Invalid oracle network configuration")?;
        let network = OracleNetwork::start(ctx, config.oracle_accounts())
            .await
            .context("Failed to start oracle network")?;

        let summary = network.summary();
        record_registration(summary);
        for (oracle, reason) in &summary.failed {
            warn!(oracle = %oracle, error = %reason, "Oracle not registered");
        }
        info!(
            registered = summary.registered_count(),
            failed = summary.failed_count(),
            "Oracle pool ready"
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut tasks = Vec::with_capacity(2);

        tasks.push(tokio::spawn(run_metrics_feed(
            network.reports(),
            network.listener_counters(),
            shutdown_rx.clone(),
        )));

        let bootstrap: Arc<dyn LedgerBootstrap> = ledger.clone();
        let driver = RequestDriver::new(bootstrap, flights, config.request_interval);
        tasks.push(tokio::spawn(async move {
            driver.run(shutdown_rx).await;
        }));

        Ok(Self {
            ledger,
            network,
            shutdown_tx,
            tasks,
        })
    }

    /// The ledger this runtime talks to.
    #[must_use]
    pub fn ledger(&self) -> &Arc<SimulatedLedger> {
        &self.ledger
    }

    /// The running oracle network.
    #[must_use]
    pub fn network(&self) -> &OracleNetworkHandle {
        &self.network
    }

    /// Resolves when the request subscription ends on its own.
    pub async fn listener_closed(&mut self) {
        self.network.listener_closed().await;
    }

    /// Stop everything.
    pub async fn shutdown(self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
        self.network.shutdown().await;
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "Runtime task failed");
            }
        }

        info!("Shutdown complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_config() -> RuntimeConfig {
        RuntimeConfig {
            network: fs_oracle_network::OracleConfig::for_testing(),
            oracle_count: 6,
            request_interval: Duration::from_millis(20),
            ..RuntimeConfig::default()
        }
    }

    #[tokio::test]
    async fn test_runtime_answers_driver_requests() {
        let ledger = Arc::new(SimulatedLedger::with_seed(11));
        let runtime = OracleRuntime::start_with_ledger(test_config(), ledger.clone())
            .await
            .unwrap();
        assert_eq!(runtime.network().summary().registered_count(), 6);
        assert_eq!(ledger.oracle_count(), 6);

        let mut reports = runtime.network().reports();
        let report = tokio::time::timeout(Duration::from_secs(2), reports.recv())
            .await
            .expect("no dispatch report")
            .unwrap();
        assert!(!report.duplicate);
        for response in &report.submitted {
            assert!(ledger
                .indexes_of(&response.oracle)
                .unwrap()
                .contains(report.request.index));
        }

        tokio::time::timeout(Duration::from_secs(2), runtime.shutdown())
            .await
            .expect("shutdown hung");
    }

    #[tokio::test]
    async fn test_runtime_fails_when_airline_underfunded() {
        let config = RuntimeConfig {
            airline_stake: shared_types::ether(2),
            ..test_config()
        };
        let ledger = Arc::new(SimulatedLedger::with_seed(1));
        let result = OracleRuntime::start_with_ledger(config, ledger).await;
        let err = result.err().expect("bootstrap should fail");
        assert!(err.to_string().contains("bootstrap"));
    }
}
