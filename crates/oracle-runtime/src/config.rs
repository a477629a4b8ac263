//! # Runtime Configuration
//!
//! Defaults mirror the development deployment: one airline ("InterCon")
//! with five scheduled flights and a pool of twenty oracles.
//!
//! ## Environment Variables
//!
//! | Variable | Field |
//! |----------|-------|
//! | `FS_LEDGER_URL` | `network.ledger_endpoint` |
//! | `FS_CONTRACT_ADDRESS` | `network.contract_address` |
//! | `FS_GAS_LIMIT` | `network.gas_limit` |
//! | `FS_ORACLE_COUNT` | `oracle_count` |
//! | `FS_LEDGER_TIMEOUT_MS` | `network.ledger_call_timeout_ms` |
//! | `FS_DEDUP_TTL_SECS` | `network.dedup_ttl_secs` |
//! | `FS_REQUEST_INTERVAL_SECS` | `request_interval` (0 disables the driver) |
//! | `FS_FROM_BLOCK` | `network.from_block` |

use fs_oracle_network::domain::airline_registration_fee;
use fs_oracle_network::OracleConfig;
use serde::Serialize;
use shared_types::{Address, Wei};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Account index of the bootstrap airline.
pub const AIRLINE_ACCOUNT: u32 = 0;

/// First account index used for oracles.
pub const FIRST_ORACLE_ACCOUNT: u32 = 1;

/// Largest accepted `oracle_count`.
pub const MAX_ORACLE_COUNT: u32 = 10_000;

/// A flight registered at startup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FlightSpec {
    /// Flight code, e.g. `A1111`.
    pub flight: String,
    /// Scheduled departure (unix seconds).
    pub timestamp: u64,
}

impl FlightSpec {
    /// Create a flight.
    pub fn new(flight: impl Into<String>, timestamp: u64) -> Self {
        Self {
            flight: flight.into(),
            timestamp,
        }
    }
}

/// The seeded development flights.
pub fn default_flights() -> Vec<FlightSpec> {
    vec![
        FlightSpec::new("A1111", 1_633_963_343),
        FlightSpec::new("B2222", 1_633_943_343),
        FlightSpec::new("C3333", 1_633_993_343),
        FlightSpec::new("D4444", 1_634_193_343),
        FlightSpec::new("E5555", 1_634_293_343),
    ]
}

/// Everything the runtime needs to start.
#[derive(Clone, Debug, Serialize)]
pub struct RuntimeConfig {
    /// Oracle pool settings.
    pub network: OracleConfig,
    /// Number of oracle identities to register.
    pub oracle_count: u32,
    /// Name the airline registers under.
    pub airline_name: String,
    /// Value sent with `registerAirline`.
    pub airline_stake: Wei,
    /// Flights registered at startup.
    pub flights: Vec<FlightSpec>,
    /// Period of the status request driver. Zero disables it.
    pub request_interval: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            network: OracleConfig::default(),
            oracle_count: 20,
            airline_name: "InterCon".to_string(),
            airline_stake: airline_registration_fee(),
            flights: default_flights(),
            request_interval: Duration::from_secs(15),
        }
    }
}

impl RuntimeConfig {
    /// Bootstrap airline account.
    #[must_use]
    pub fn airline(&self) -> Address {
        Address::dev_account(AIRLINE_ACCOUNT)
    }

    /// Oracle accounts, in registration order.
    #[must_use]
    pub fn oracle_accounts(&self) -> Vec<Address> {
        (FIRST_ORACLE_ACCOUNT..FIRST_ORACLE_ACCOUNT.saturating_add(self.oracle_count))
            .map(Address::dev_account)
            .collect()
    }

    /// Overlay values from `lookup` onto `self`.
    ///
    /// Values that fail to parse are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("FS_LEDGER_URL") {
            self.network.ledger_endpoint = url;
        }
        override_parsed(
            &lookup,
            "FS_CONTRACT_ADDRESS",
            &mut self.network.contract_address,
        );
        override_parsed(&lookup, "FS_GAS_LIMIT", &mut self.network.gas_limit);
        let mut oracle_count = self.oracle_count;
        override_parsed(&lookup, "FS_ORACLE_COUNT", &mut oracle_count);
        if oracle_count > MAX_ORACLE_COUNT {
            warn!(
                oracle_count,
                max = MAX_ORACLE_COUNT,
                "Ignoring FS_ORACLE_COUNT above the limit"
            );
        } else {
            self.oracle_count = oracle_count;
        }
        override_parsed(
            &lookup,
            "FS_LEDGER_TIMEOUT_MS",
            &mut self.network.ledger_call_timeout_ms,
        );
        override_parsed(&lookup, "FS_DEDUP_TTL_SECS", &mut self.network.dedup_ttl_secs);
        override_parsed(&lookup, "FS_FROM_BLOCK", &mut self.network.from_block);

        let mut interval_secs = self.request_interval.as_secs();
        override_parsed(&lookup, "FS_REQUEST_INTERVAL_SECS", &mut interval_secs);
        self.request_interval = Duration::from_secs(interval_secs);
    }
}

fn override_parsed<T, F>(lookup: &F, key: &str, target: &mut T)
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => {
            *target = value;
            info!(key, "Loaded setting from environment");
        }
        Err(e) => warn!(key, value = %raw, error = %e, "Ignoring malformed setting"),
    }
}

/// Load configuration from defaults and the process environment.
pub fn load_config() -> RuntimeConfig {
    let mut config = RuntimeConfig::default();
    config.apply_overrides(|key| std::env::var(key).ok());
    config
}
