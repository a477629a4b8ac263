//! # Status Request Driver
//!
//! Stands in for the dApp front end: every `interval` it asks the ledger
//! for the status of the next flight, round-robin over the bootstrapped
//! flights. Each call makes the ledger emit one `OracleRequest`.

use fs_oracle_network::LedgerBootstrap;
use shared_types::FlightKey;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Periodically raises flight status requests.
pub struct RequestDriver {
    ledger: Arc<dyn LedgerBootstrap>,
    flights: Vec<FlightKey>,
    interval: Duration,
}

impl RequestDriver {
    /// Create a driver over `flights`.
    pub fn new(
        ledger: Arc<dyn LedgerBootstrap>,
        flights: Vec<FlightKey>,
        interval: Duration,
    ) -> Self {
        Self {
            ledger,
            flights,
            interval,
        }
    }

    /// Run until `shutdown` flips to `true` or its sender is dropped.
    ///
    /// Returns the number of requests raised.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> u64 {
        if self.flights.is_empty() || self.interval.is_zero() {
            debug!("Request driver disabled");
            return 0;
        }

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut raised = 0u64;

        for flight in self.flights.iter().cycle() {
            if !next_tick(&mut ticker, &mut shutdown).await {
                break;
            }

            match self
                .ledger
                .fetch_flight_status(flight.airline, &flight.flight, flight.timestamp)
                .await
            {
                Ok(index) => {
                    raised += 1;
                    info!(
                        flight = %flight.flight,
                        timestamp = flight.timestamp,
                        index = %index,
                        "Requested flight status"
                    );
                }
                Err(e) => warn!(
                    flight = %flight.flight,
                    error = %e,
                    "Flight status request failed"
                ),
            }
        }

        info!(raised, "Request driver stopped");
        raised
    }
}

/// Wait for the next tick. `false` once shutdown is requested.
async fn next_tick(ticker: &mut Interval, shutdown: &mut watch::Receiver<bool>) -> bool {
    loop {
        tokio::select! {
            _ = ticker.tick() => return true,
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return false;
                }
            }
        }
    }
}
