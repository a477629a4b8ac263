//! # Core Ledger Entities
//!
//! ## Clusters
//!
//! - **Accounts**: `Address`, `Wei`
//! - **Flights**: `FlightKey`, `StatusCode`

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

use crate::errors::{AddressError, StatusCodeError};

// Re-export U256 from primitive-types for use across all crates
pub use primitive_types::U256;

/// Amounts are denominated in wei.
pub type Wei = U256;

/// Number of wei in one ether.
pub const WEI_PER_ETHER: u64 = 1_000_000_000_000_000_000;

/// Convert whole ether into wei.
#[must_use]
pub fn ether(amount: u64) -> Wei {
    U256::from(amount) * U256::from(WEI_PER_ETHER)
}

// =============================================================================
// ACCOUNTS
// =============================================================================

/// A 20-byte Ethereum-style account address.
///
/// Serialized as a `0x`-prefixed lowercase hex string, the way ledger clients
/// report addresses in event payloads.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Derive an address from arbitrary seed bytes (last 20 bytes of Keccak-256).
    #[must_use]
    pub fn derive(seed: &[u8]) -> Self {
        let digest = Keccak256::digest(seed);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[12..]);
        Address(bytes)
    }

    /// Deterministic development account `n`, stable across runs.
    #[must_use]
    pub fn dev_account(n: u32) -> Self {
        Self::derive(format!("fs-dev-account-{n}").as_bytes())
    }

    /// Raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Abbreviated form for log lines (`0x1234…abcd`).
    #[must_use]
    pub fn short(&self) -> String {
        let full = hex::encode(self.0);
        format!("0x{}…{}", &full[..4], &full[36..])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bytes = hex::decode(digits).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        let array: [u8; 20] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AddressError::InvalidLength { got: bytes.len() })?;
        Ok(Address(array))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// FLIGHTS
// =============================================================================

/// Identifies a single scheduled flight on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlightKey {
    /// Operating airline.
    pub airline: Address,
    /// Flight designator, e.g. `A1111`.
    pub flight: String,
    /// Scheduled departure (unix seconds).
    pub timestamp: u64,
}

impl FlightKey {
    /// Create a flight key.
    pub fn new(airline: Address, flight: impl Into<String>, timestamp: u64) -> Self {
        Self {
            airline,
            flight: flight.into(),
            timestamp,
        }
    }
}

/// Canonical flight status codes reported by oracles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum StatusCode {
    /// Status could not be determined.
    Unknown = 0,
    /// Flight is on time.
    OnTime = 10,
    /// Delayed by the airline.
    LateAirline = 20,
    /// Delayed by weather.
    LateWeather = 30,
    /// Delayed by a technical problem.
    LateTechnical = 40,
    /// Delayed for any other reason.
    LateOther = 50,
}

impl StatusCode {
    /// Every status code, in ascending order.
    pub const ALL: [StatusCode; 6] = [
        StatusCode::Unknown,
        StatusCode::OnTime,
        StatusCode::LateAirline,
        StatusCode::LateWeather,
        StatusCode::LateTechnical,
        StatusCode::LateOther,
    ];

    /// Numeric value as submitted to the ledger.
    #[must_use]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Whether the flight counts as delayed by the airline (the only payable case).
    #[must_use]
    pub fn is_airline_fault(self) -> bool {
        self == StatusCode::LateAirline
    }
}

impl TryFrom<u64> for StatusCode {
    type Error = StatusCodeError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        StatusCode::ALL
            .into_iter()
            .find(|code| u64::from(code.as_u8()) == value)
            .ok_or(StatusCodeError::Unknown(value))
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusCode::Unknown => "UNKNOWN",
            StatusCode::OnTime => "ON_TIME",
            StatusCode::LateAirline => "LATE_AIRLINE",
            StatusCode::LateWeather => "LATE_WEATHER",
            StatusCode::LateTechnical => "LATE_TECHNICAL",
            StatusCode::LateOther => "LATE_OTHER",
        };
        write!(f, "{}({})", name, self.as_u8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ether_conversion() {
        assert_eq!(ether(1), U256::from(WEI_PER_ETHER));
        assert_eq!(ether(10), U256::from(WEI_PER_ETHER) * 10);
        assert_eq!(ether(0), U256::zero());
    }

    #[test]
    fn test_address_roundtrip_display_parse() {
        let addr = Address::dev_account(7);
        let parsed: Address = addr.to_string().parse().unwrap();
        assert_eq!(parsed, addr);
    }

    #[test]
    fn test_address_parse_without_prefix() {
        let parsed: Address = "00000000000000000000000000000000000000ff".parse().unwrap();
        assert_eq!(parsed.0[19], 0xff);
    }

    #[test]
    fn test_address_parse_rejects_short_input() {
        let result = "0x1234".parse::<Address>();
        assert_eq!(result, Err(AddressError::InvalidLength { got: 2 }));
    }

    #[test]
    fn test_address_parse_rejects_non_hex() {
        assert!(matches!(
            "0xzz".parse::<Address>(),
            Err(AddressError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_dev_accounts_are_distinct() {
        let accounts: std::collections::HashSet<_> = (0..50).map(Address::dev_account).collect();
        assert_eq!(accounts.len(), 50);
    }

    #[test]
    fn test_address_serde_as_hex_string() {
        let addr = Address::dev_account(1);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{addr}\""));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn test_status_code_values() {
        let values: Vec<u8> = StatusCode::ALL.iter().map(|c| c.as_u8()).collect();
        assert_eq!(values, vec![0, 10, 20, 30, 40, 50]);
    }

    #[test]
    fn test_status_code_try_from() {
        assert_eq!(StatusCode::try_from(0).unwrap(), StatusCode::Unknown);
        assert_eq!(StatusCode::try_from(20).unwrap(), StatusCode::LateAirline);
        assert_eq!(StatusCode::try_from(15), Err(StatusCodeError::Unknown(15)));
        assert_eq!(StatusCode::try_from(60), Err(StatusCodeError::Unknown(60)));
    }

    #[test]
    fn test_status_code_display() {
        assert_eq!(StatusCode::LateWeather.to_string(), "LATE_WEATHER(30)");
        assert!(StatusCode::LateAirline.is_airline_fault());
        assert!(!StatusCode::OnTime.is_airline_fault());
    }
}
