//! # Outbound Ports
//!
//! Ledger surfaces consumed by the oracle network, and the status code
//! source used when answering requests.

use async_trait::async_trait;
use shared_bus::Subscription;
use shared_types::{Address, StatusCode, Wei};

use crate::domain::{GatewayError, IndexSet, OracleIndex, StatusResponse};

/// Ledger gateway - outbound port.
///
/// Signing and transport belong to the implementation.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// `registerOracle()`, paying `stake`.
    async fn register_oracle(&self, oracle: Address, stake: Wei) -> Result<(), GatewayError>;

    /// `getMyIndexes()` as called by `oracle`.
    async fn get_my_indexes(&self, oracle: Address) -> Result<IndexSet, GatewayError>;

    /// `submitOracleResponse(index, airline, flight, timestamp, statusCode)`.
    async fn submit_oracle_response(
        &self,
        oracle: Address,
        response: &StatusResponse,
    ) -> Result<(), GatewayError>;

    /// Stream of ledger events starting at `from_block`.
    async fn subscribe_events(&self, from_block: u64) -> Result<Subscription, GatewayError>;
}

/// Bootstrap-only ledger calls used to set up airlines and flights, and
/// to raise status requests.
#[async_trait]
pub trait LedgerBootstrap: Send + Sync {
    /// `registerAirline(name, address)`, paying `stake`.
    async fn register_airline(
        &self,
        name: &str,
        airline: Address,
        stake: Wei,
    ) -> Result<(), GatewayError>;

    /// `registerFlight(flight, timestamp)` as `airline`.
    async fn register_flight(
        &self,
        airline: Address,
        flight: &str,
        timestamp: u64,
    ) -> Result<(), GatewayError>;

    /// `fetchFlightStatus(airline, flight, timestamp)`.
    ///
    /// Returns the index the emitted request was addressed to.
    async fn fetch_flight_status(
        &self,
        airline: Address,
        flight: &str,
        timestamp: u64,
    ) -> Result<OracleIndex, GatewayError>;
}

/// Source of status codes for responses.
pub trait StatusCodeSource: Send + Sync {
    /// Next code to report.
    fn next(&self) -> StatusCode;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Always reports the same code.
#[derive(Debug, Clone, Copy)]
pub struct FixedStatusCode(pub StatusCode);

impl StatusCodeSource for FixedStatusCode {
    fn next(&self) -> StatusCode {
        self.0
    }
}
