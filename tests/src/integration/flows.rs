//! # Oracle Flows
//!
//! Registration, request decoding, dispatch fan-out and re-delivery
//! handling, exercised together over the simulated ledger.
//!
//! ## Flows Tested
//!
//! 1. **Registration -> Buckets**: every registered identity is findable by
//!    each of its three indexes
//! 2. **OracleRequest -> Dispatch**: only holders of the request index answer
//! 3. **Malformed event**: dropped without stopping the listener
//! 4. **Re-delivery**: at most one submission per oracle per request

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use fs_oracle_network::{
        GatewayError, OracleConfig, OracleContext, OracleError, OracleIndex, OracleRegistryApi,
        RandomStatusCodes, RegistrationError, RegistrationState, SimulatedLedger,
        StatusCodeSource, SubmissionError,
    };
    use serde_json::json;
    use shared_bus::event_names;
    use shared_types::{Address, StatusCode};
    use tokio_test::assert_ok;

    use crate::integration::fixtures::{
        flight, next_report, oracle_accounts, preassign, start_network, SCENARIO_INDEX_SETS,
    };

    fn holders_of(index: u8, accounts: &[Address]) -> BTreeSet<Address> {
        accounts
            .iter()
            .zip(SCENARIO_INDEX_SETS)
            .filter(|(_, set)| set.contains(&index))
            .map(|(account, _)| *account)
            .collect()
    }

    // =============================================================================
    // REGISTRATION
    // =============================================================================

    #[tokio::test]
    async fn test_registered_sets_are_valid_and_bucketed() {
        let ledger = Arc::new(SimulatedLedger::with_seed(99));
        let accounts = oracle_accounts(40);
        let handle = assert_ok!(start_network(&ledger, accounts.clone()).await);

        assert_eq!(handle.summary().registered_count(), 40);
        let registry = handle.registry();
        for (oracle, set) in &handle.summary().registered {
            let raw: BTreeSet<u8> = set.iter().map(|index| index.value()).collect();
            assert_eq!(raw.len(), 3);
            assert!(raw.iter().all(|index| *index < 10));
            assert_eq!(ledger.indexes_of(oracle), Some(*set));
            for index in set.iter() {
                assert!(registry.get_matching(index).contains(oracle));
            }
        }
        assert!(registry.buckets_consistent());
        assert_eq!(registry.bucket_sizes().iter().sum::<usize>(), 120);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_failed_registration_does_not_block_batch() {
        let ledger = Arc::new(SimulatedLedger::with_seed(7));
        let accounts = oracle_accounts(5);
        preassign(&ledger, &accounts, &SCENARIO_INDEX_SETS[..5]);
        ledger.fail_registration_for(accounts[2], GatewayError::Connection("reset by peer".into()));

        let handle = assert_ok!(start_network(&ledger, accounts.clone()).await);
        let summary = handle.summary();
        assert_eq!(summary.registered_count(), 4);
        assert_eq!(summary.failed_count(), 1);
        assert_eq!(summary.failed[0].0, accounts[2]);
        assert!(matches!(
            summary.failed[0].1,
            RegistrationError::Gateway(GatewayError::Connection(_))
        ));

        let registry = handle.registry();
        let failed = registry.identity(&accounts[2]).expect("identity tracked");
        assert!(matches!(failed.state, RegistrationState::Failed { .. }));
        assert!(failed.indexes.is_none());
        // [1, 4, 5] was never committed
        let index_four = OracleIndex::new(4).unwrap();
        assert!(!registry.get_matching(index_four).contains(&accounts[2]));
        assert!(registry.identity(&accounts[0]).unwrap().is_registered());
        assert!(registry.buckets_consistent());

        handle.shutdown().await;
    }

    // =============================================================================
    // DISPATCH
    // =============================================================================

    #[tokio::test]
    async fn test_index_five_request_reaches_only_index_five_holders() {
        let ledger = Arc::new(SimulatedLedger::with_seed(3));
        let accounts = oracle_accounts(10);
        preassign(&ledger, &accounts, &SCENARIO_INDEX_SETS);
        let handle = assert_ok!(start_network(&ledger, accounts.clone()).await);
        let mut reports = handle.reports();

        let key = ledger.open_request(OracleIndex::new(5).unwrap(), &flight());
        let report = next_report(&mut reports).await.expect("no dispatch report");

        let expected = holders_of(5, &accounts);
        assert_eq!(expected.len(), 4);
        assert_eq!(report.request, key);
        assert_eq!(report.matched.iter().copied().collect::<BTreeSet<_>>(), expected);
        assert!(report.failed.is_empty());

        let responses = ledger.responses_for(&key);
        let responders: BTreeSet<Address> = responses.iter().map(|(oracle, _)| *oracle).collect();
        assert_eq!(responders, expected);
        for (_, status) in &responses {
            assert!(StatusCode::ALL.contains(status));
        }

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_rejected_submission_does_not_affect_other_oracles() {
        let ledger = Arc::new(SimulatedLedger::with_seed(3));
        let accounts = oracle_accounts(10);
        preassign(&ledger, &accounts, &SCENARIO_INDEX_SETS);
        ledger.reject_submissions_from(accounts[0], GatewayError::NonceConflict);
        let handle = assert_ok!(start_network(&ledger, accounts.clone()).await);
        let mut reports = handle.reports();

        let key = ledger.open_request(OracleIndex::new(7).unwrap(), &flight());
        let report = next_report(&mut reports).await.expect("no dispatch report");

        // Index 7: accounts[0], accounts[6], accounts[9]
        assert_eq!(report.matched.len(), 3);
        assert_eq!(report.submitted.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, accounts[0]);
        assert!(matches!(
            report.failed[0].1,
            SubmissionError::Gateway(GatewayError::NonceConflict)
        ));
        assert_eq!(ledger.responses_for(&key).len(), 2);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_request_for_unheld_index_submits_nothing() {
        let ledger = Arc::new(SimulatedLedger::with_seed(3));
        let accounts = oracle_accounts(2);
        // Neither [2, 5, 7] nor [0, 3, 9] holds 4.
        preassign(&ledger, &accounts, &SCENARIO_INDEX_SETS[..2]);
        let handle = assert_ok!(start_network(&ledger, accounts).await);
        let mut reports = handle.reports();

        let key = ledger.open_request(OracleIndex::new(4).unwrap(), &flight());
        let report = next_report(&mut reports).await.expect("no dispatch report");
        assert!(report.matched.is_empty());
        assert!(report.submitted.is_empty());
        assert!(ledger.responses_for(&key).is_empty());

        handle.shutdown().await;
    }

    // =============================================================================
    // DECODING
    // =============================================================================

    #[tokio::test]
    async fn test_event_missing_index_is_dropped_and_listener_continues() {
        let ledger = Arc::new(SimulatedLedger::with_seed(3));
        let accounts = oracle_accounts(10);
        preassign(&ledger, &accounts, &SCENARIO_INDEX_SETS);
        let handle = assert_ok!(start_network(&ledger, accounts.clone()).await);
        let mut reports = handle.reports();

        let flight = flight();
        ledger.publish_raw(
            event_names::ORACLE_REQUEST,
            json!({
                "airline": flight.airline.to_string(),
                "flight": flight.flight,
                "timestamp": flight.timestamp.to_string(),
            }),
        );
        let key = ledger.open_request(OracleIndex::new(0).unwrap(), &flight);

        let report = next_report(&mut reports).await.expect("no dispatch report");
        assert_eq!(report.request, key);
        assert_eq!(report.submitted.len(), holders_of(0, &accounts).len());

        let stats = handle.listener_stats();
        assert_eq!(stats.received, 2);
        assert_eq!(stats.decode_failures, 1);
        assert_eq!(stats.decoded, 1);

        handle.shutdown().await;
    }

    // =============================================================================
    // RE-DELIVERY
    // =============================================================================

    #[tokio::test]
    async fn test_redelivery_within_window_submits_once_per_oracle() {
        let ledger = Arc::new(SimulatedLedger::with_seed(3));
        let accounts = oracle_accounts(10);
        preassign(&ledger, &accounts, &SCENARIO_INDEX_SETS);
        let handle = assert_ok!(start_network(&ledger, accounts.clone()).await);
        let mut reports = handle.reports();

        let key = ledger.open_request(OracleIndex::new(9).unwrap(), &flight());
        ledger.redeliver(&key);
        ledger.redeliver(&key);

        let mut submissions = 0;
        let mut duplicates = 0;
        for _ in 0..3 {
            let report = next_report(&mut reports).await.expect("missing report");
            assert_eq!(report.request, key);
            if report.duplicate {
                duplicates += 1;
                assert!(report.submitted.is_empty());
            }
            submissions += report.submitted.len();
        }

        assert_eq!(duplicates, 2);
        assert_eq!(submissions, holders_of(9, &accounts).len());
        assert_eq!(ledger.responses_for(&key).len(), submissions);

        handle.shutdown().await;
    }

    // =============================================================================
    // STATUS CODES / STARTUP
    // =============================================================================

    #[test]
    fn test_status_codes_cover_every_value() {
        let source: Arc<dyn StatusCodeSource> = Arc::new(RandomStatusCodes::with_seed(2024));
        let mut counts = [0u32; 6];
        for _ in 0..10_000 {
            let code = source.next();
            let slot = StatusCode::ALL
                .iter()
                .position(|candidate| *candidate == code)
                .expect("code outside canonical set");
            counts[slot] += 1;
        }
        // 10_000 / 6 = 1667; five sigma is about 186.
        for (code, count) in StatusCode::ALL.iter().zip(counts) {
            assert!(
                (1467..=1867).contains(&count),
                "{code} drawn {count} times"
            );
        }
    }

    #[tokio::test]
    async fn test_subscription_failure_is_fatal() {
        let ledger = Arc::new(SimulatedLedger::with_seed(3));
        ledger.fail_subscriptions(Some(GatewayError::Connection("connection refused".into())));
        let ctx = OracleContext::new(ledger.clone(), OracleConfig::for_testing()).unwrap();

        let result = fs_oracle_network::OracleNetwork::start(ctx, oracle_accounts(3)).await;
        assert!(matches!(result, Err(OracleError::SubscriptionFailed(_))));
    }
}
