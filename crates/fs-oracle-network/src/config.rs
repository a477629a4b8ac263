//! # Oracle Network Configuration

use serde::{Deserialize, Serialize};
use shared_types::{Address, Wei};
use std::time::Duration;

use crate::domain::{oracle_registration_fee, OracleError};

/// Default gas limit attached to ledger transactions.
pub const DEFAULT_GAS_LIMIT: u64 = 6_721_975;

/// Configuration for the oracle network.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Ledger RPC endpoint.
    pub ledger_endpoint: String,

    /// Address of the flight-surety contract.
    pub contract_address: Address,

    /// Gas limit for registration and submission transactions.
    pub gas_limit: u64,

    /// Value sent with `registerOracle`.
    pub registration_stake: Wei,

    /// Deadline for any single ledger call, in milliseconds.
    pub ledger_call_timeout_ms: u64,

    /// Registrations in flight at once.
    pub max_concurrent_registrations: usize,

    /// How long a request key is remembered for dedup, in seconds.
    pub dedup_ttl_secs: u64,

    /// Maximum remembered request keys.
    pub dedup_capacity: usize,

    /// Buffer between listener and dispatcher.
    pub request_channel_capacity: usize,

    /// Block to start the event subscription from.
    pub from_block: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            ledger_endpoint: "ws://localhost:8545".to_string(),
            contract_address: Address::derive(b"fs-flight-surety-app"),
            gas_limit: DEFAULT_GAS_LIMIT,
            registration_stake: oracle_registration_fee(),
            ledger_call_timeout_ms: 10_000,
            max_concurrent_registrations: 8,
            dedup_ttl_secs: 120,
            dedup_capacity: 4096,
            request_channel_capacity: 256,
            from_block: 0,
        }
    }
}

impl OracleConfig {
    /// Create a config for testing (short timeouts, small buffers).
    pub fn for_testing() -> Self {
        Self {
            ledger_call_timeout_ms: 200,
            max_concurrent_registrations: 4,
            dedup_ttl_secs: 5,
            dedup_capacity: 64,
            request_channel_capacity: 16,
            ..Self::default()
        }
    }

    /// Deadline for a single ledger call.
    #[must_use]
    pub fn ledger_call_timeout(&self) -> Duration {
        Duration::from_millis(self.ledger_call_timeout_ms)
    }

    /// Dedup window.
    #[must_use]
    pub fn dedup_ttl(&self) -> Duration {
        Duration::from_secs(self.dedup_ttl_secs)
    }

    /// Reject values that would stall or disable the network.
    pub fn validate(&self) -> Result<(), OracleError> {
        if self.ledger_call_timeout_ms == 0 {
            return Err(OracleError::Config("ledger_call_timeout_ms must be > 0".into()));
        }
        if self.max_concurrent_registrations == 0 {
            return Err(OracleError::Config(
                "max_concurrent_registrations must be > 0".into(),
            ));
        }
        if self.dedup_capacity == 0 {
            return Err(OracleError::Config("dedup_capacity must be > 0".into()));
        }
        if self.request_channel_capacity == 0 {
            return Err(OracleError::Config(
                "request_channel_capacity must be > 0".into(),
            ));
        }
        if self.registration_stake.is_zero() {
            return Err(OracleError::Config("registration_stake must be > 0".into()));
        }
        if self.gas_limit == 0 {
            return Err(OracleError::Config("gas_limit must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::ether;

    #[test]
    fn test_default_config() {
        let config = OracleConfig::default();
        assert_eq!(config.gas_limit, 6_721_975);
        assert_eq!(config.registration_stake, ether(1));
        assert_eq!(config.ledger_call_timeout(), Duration::from_secs(10));
        assert_eq!(config.dedup_ttl(), Duration::from_secs(120));
        assert_eq!(config.from_block, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_testing_config() {
        let config = OracleConfig::for_testing();
        assert_eq!(config.ledger_call_timeout(), Duration::from_millis(200));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zeroes() {
        let mut config = OracleConfig::for_testing();
        config.request_channel_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = OracleConfig::for_testing();
        config.registration_stake = Wei::zero();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("registration_stake"));
    }

    #[test]
    fn test_config_serde() {
        let config = OracleConfig::for_testing();
        let json = serde_json::to_string(&config).unwrap();
        let back: OracleConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.contract_address, config.contract_address);
        assert_eq!(back.registration_stake, config.registration_stake);
    }
}
