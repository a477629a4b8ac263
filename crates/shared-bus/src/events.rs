//! # Ledger Events
//!
//! Events are carried in the loose shape ledger clients deliver them:
//! an event name plus a JSON object of return values. Typed decoding is the
//! consumer's job.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Well-known event names emitted by the flight-status contract.
pub mod event_names {
    /// A flight status request addressed to oracles holding `index`.
    pub const ORACLE_REQUEST: &str = "OracleRequest";
    /// An oracle response was accepted by the ledger.
    pub const ORACLE_REPORT: &str = "OracleReport";
    /// An oracle identity finished registration.
    pub const ORACLE_REGISTERED: &str = "OracleRegistered";
    /// An airline was registered.
    pub const AIRLINE_REGISTERED: &str = "AirlineRegistered";
    /// A flight was registered.
    pub const FLIGHT_REGISTERED: &str = "FlightRegistered";
}

/// A single event emitted by the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEvent {
    /// Block in which the event was emitted.
    pub block_number: u64,
    /// Position of the event within its block.
    pub log_index: u32,
    /// Event name, e.g. `OracleRequest`.
    pub event: String,
    /// Event arguments, keyed by parameter name.
    pub return_values: Value,
    /// Hash of the emitting transaction, if known.
    pub transaction_hash: Option<String>,
}

impl LedgerEvent {
    /// Create an event with no transaction hash.
    pub fn new(block_number: u64, event: impl Into<String>, return_values: Value) -> Self {
        Self {
            block_number,
            log_index: 0,
            event: event.into(),
            return_values,
            transaction_hash: None,
        }
    }

    /// Set the transaction hash.
    #[must_use]
    pub fn with_transaction_hash(mut self, hash: impl Into<String>) -> Self {
        self.transaction_hash = Some(hash.into());
        self
    }

    /// Set the log index.
    #[must_use]
    pub fn with_log_index(mut self, log_index: u32) -> Self {
        self.log_index = log_index;
        self
    }
}

/// Selects which events a subscription receives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Event names to accept. Empty means every event.
    pub events: Vec<String>,
    /// Lowest block number to accept.
    pub from_block: u64,
}

impl EventFilter {
    /// Accept every event from block zero.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Accept only the named events.
    #[must_use]
    pub fn events<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            events: names.into_iter().map(Into::into).collect(),
            from_block: 0,
        }
    }

    /// Start at `block` instead of block zero.
    #[must_use]
    pub fn from_block(mut self, block: u64) -> Self {
        self.from_block = block;
        self
    }

    /// Check if an event passes this filter.
    #[must_use]
    pub fn matches(&self, event: &LedgerEvent) -> bool {
        if event.block_number < self.from_block {
            return false;
        }
        self.events.is_empty() || self.events.iter().any(|name| *name == event.event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_all_matches_everything() {
        let filter = EventFilter::all();
        assert!(filter.matches(&LedgerEvent::new(0, "Anything", json!({}))));
    }

    #[test]
    fn test_filter_by_name() {
        let filter = EventFilter::events([event_names::ORACLE_REQUEST]);
        assert!(filter.matches(&LedgerEvent::new(1, "OracleRequest", json!({}))));
        assert!(!filter.matches(&LedgerEvent::new(1, "OracleReport", json!({}))));
    }

    #[test]
    fn test_filter_by_block() {
        let filter = EventFilter::all().from_block(5);
        assert!(!filter.matches(&LedgerEvent::new(4, "OracleRequest", json!({}))));
        assert!(filter.matches(&LedgerEvent::new(5, "OracleRequest", json!({}))));
    }

    #[test]
    fn test_event_serializes_web3_style() {
        let event = LedgerEvent::new(3, "OracleRequest", json!({ "index": "4" }))
            .with_transaction_hash("0xabc");
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["blockNumber"], 3);
        assert_eq!(value["returnValues"]["index"], "4");
        assert_eq!(value["transactionHash"], "0xabc");
    }
}
