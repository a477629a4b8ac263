//! Ledger bootstrap: register the airline and its flights before the
//! oracle pool starts.

use fs_oracle_network::{GatewayError, LedgerBootstrap};
use shared_types::FlightKey;
use tracing::info;

use crate::config::RuntimeConfig;

/// Register the configured airline and every configured flight.
///
/// Returns the keys of the registered flights, in configuration order.
pub async fn bootstrap_ledger(
    ledger: &dyn LedgerBootstrap,
    config: &RuntimeConfig,
) -> Result<Vec<FlightKey>, GatewayError> {
    let airline = config.airline();
    ledger
        .register_airline(&config.airline_name, airline, config.airline_stake)
        .await?;
    info!(
        airline = %airline,
        name = %config.airline_name,
        "Airline registered"
    );

    let mut flights = Vec::with_capacity(config.flights.len());
    for spec in &config.flights {
        ledger
            .register_flight(airline, &spec.flight, spec.timestamp)
            .await?;
        flights.push(FlightKey::new(airline, spec.flight.clone(), spec.timestamp));
    }
    info!(count = flights.len(), "Flights registered");

    Ok(flights)
}
