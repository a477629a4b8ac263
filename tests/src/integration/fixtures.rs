//! Shared setup for the scenarios.

use fs_oracle_network::{
    DispatchReport, IndexSet, OracleConfig, OracleContext, OracleError, OracleNetwork,
    OracleNetworkHandle, RandomStatusCodes, SimulatedLedger,
};
use shared_types::{Address, FlightKey};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// How long a scenario waits for a dispatch report.
pub const REPORT_WAIT: Duration = Duration::from_secs(2);

/// Ten deterministic index sets; index 5 is held by the first, third,
/// fifth and eighth oracle.
pub const SCENARIO_INDEX_SETS: [[u8; 3]; 10] = [
    [2, 5, 7],
    [0, 3, 9],
    [1, 4, 5],
    [6, 8, 9],
    [0, 5, 8],
    [1, 2, 3],
    [4, 6, 7],
    [3, 5, 9],
    [0, 1, 2],
    [6, 7, 8],
];

/// Oracle accounts `1..=count`. Account 0 is the airline.
pub fn oracle_accounts(count: u32) -> Vec<Address> {
    (1..=count).map(Address::dev_account).collect()
}

/// The bootstrap airline.
pub fn airline() -> Address {
    Address::dev_account(0)
}

/// A seeded flight.
pub fn flight() -> FlightKey {
    FlightKey::new(airline(), "C3333", 1_633_993_343)
}

/// Make `accounts[i]` receive `sets[i]` on registration.
///
/// Panics if a set is invalid.
pub fn preassign(ledger: &SimulatedLedger, accounts: &[Address], sets: &[[u8; 3]]) {
    for (account, raw) in accounts.iter().zip(sets) {
        let set = IndexSet::from_slice(raw).unwrap_or_else(|e| panic!("bad fixture set: {e}"));
        ledger.preassign_indexes(*account, set);
    }
}

/// Start a network over `ledger` with test timeouts and seeded codes.
pub async fn start_network(
    ledger: &Arc<SimulatedLedger>,
    accounts: Vec<Address>,
) -> Result<OracleNetworkHandle, OracleError> {
    let ctx = OracleContext::new(ledger.clone(), OracleConfig::for_testing())?;
    let codes = Arc::new(RandomStatusCodes::with_seed(42));
    OracleNetwork::start_with_codes(ctx, accounts, codes).await
}

/// Wait for the next report, or `None` after [`REPORT_WAIT`].
pub async fn next_report(
    reports: &mut broadcast::Receiver<DispatchReport>,
) -> Option<DispatchReport> {
    match tokio::time::timeout(REPORT_WAIT, reports.recv()).await {
        Ok(Ok(report)) => Some(report),
        _ => None,
    }
}
