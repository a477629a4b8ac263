//! # Runtime Scenario
//!
//! The whole node: bootstrap, pool registration, the request driver and
//! the metrics feed, over one simulated ledger.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use fs_oracle_network::{OracleConfig, RequestKey, SimulatedLedger};
    use oracle_runtime::{OracleRuntime, RuntimeConfig};
    use shared_types::FlightKey;

    use crate::integration::fixtures::next_report;

    #[tokio::test]
    async fn test_driver_requests_are_answered_by_index_holders() {
        let ledger = Arc::new(SimulatedLedger::with_seed(21));
        let config = RuntimeConfig {
            network: OracleConfig::for_testing(),
            oracle_count: 20,
            request_interval: Duration::from_millis(10),
            ..RuntimeConfig::default()
        };
        let flights: Vec<FlightKey> = config
            .flights
            .iter()
            .map(|spec| FlightKey::new(config.airline(), spec.flight.clone(), spec.timestamp))
            .collect();

        let runtime = OracleRuntime::start_with_ledger(config, ledger.clone())
            .await
            .expect("runtime start");
        for flight in &flights {
            assert!(ledger.is_flight_registered(flight));
        }
        let mut reports = runtime.network().reports();

        let mut seen: Vec<RequestKey> = Vec::new();
        for _ in 0..3 {
            let report = next_report(&mut reports).await.expect("no dispatch report");
            assert!(flights.contains(&report.request.flight_key()));
            let responders = ledger.responses_for(&report.request);
            for (oracle, _) in &responders {
                let set = ledger.indexes_of(oracle).expect("registered oracle");
                assert!(set.contains(report.request.index));
            }
            seen.push(report.request);
        }
        // Round-robin: the first three requests name three different flights.
        seen.sort_by(|a, b| a.flight.cmp(&b.flight));
        seen.dedup_by(|a, b| a.flight == b.flight);
        assert_eq!(seen.len(), 3);

        tokio::time::timeout(Duration::from_secs(2), runtime.shutdown())
            .await
            .expect("shutdown hung");
    }
}
