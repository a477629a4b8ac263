//! # Simulated Ledger
//!
//! In-memory stand-in for the flight-surety contract. It charges
//! registration fees, assigns oracle indexes, opens status requests and
//! accepts responses, emitting the same events a real ledger would.
//! Responses are recorded but never tallied.
//!
//! Fault-injection hooks let tests reproduce rejected registrations,
//! rejected submissions, slow calls and a failing subscription.

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use shared_bus::{event_names, EventFilter, InMemoryEventBus, LedgerEvent, Subscription};
use shared_types::{Address, FlightKey, StatusCode, Wei};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::algorithms::generate_index_set;
use crate::domain::{
    airline_registration_fee, oracle_registration_fee, GatewayError, IndexSet, OracleIndex,
    RequestKey, StatusResponse, INDEX_COUNT,
};
use crate::ports::outbound::{LedgerBootstrap, LedgerGateway};

/// One opened status request.
#[derive(Debug, Default)]
struct RequestRecord {
    open: bool,
    responses: BTreeMap<Address, StatusCode>,
}

#[derive(Debug)]
struct LedgerState {
    oracles: HashMap<Address, IndexSet>,
    airlines: HashMap<Address, String>,
    flights: HashSet<FlightKey>,
    requests: HashMap<RequestKey, RequestRecord>,
    preassigned: HashMap<Address, IndexSet>,
    next_block: u64,
}

impl Default for LedgerState {
    fn default() -> Self {
        Self {
            oracles: HashMap::new(),
            airlines: HashMap::new(),
            flights: HashSet::new(),
            requests: HashMap::new(),
            preassigned: HashMap::new(),
            next_block: 1,
        }
    }
}

#[derive(Debug, Default)]
struct Faults {
    registrations: HashMap<Address, GatewayError>,
    submissions: HashMap<Address, GatewayError>,
    subscription: Option<GatewayError>,
    latency: Duration,
}

/// In-memory ledger implementing both gateway ports.
pub struct SimulatedLedger {
    bus: Arc<InMemoryEventBus>,
    state: Mutex<LedgerState>,
    faults: Mutex<Faults>,
    rng: Mutex<StdRng>,
}

impl SimulatedLedger {
    /// Ledger with an entropy-seeded RNG.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Ledger whose index assignment and request routing are reproducible.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            bus: Arc::new(InMemoryEventBus::new()),
            state: Mutex::new(LedgerState::default()),
            faults: Mutex::new(Faults::default()),
            rng: Mutex::new(rng),
        }
    }

    /// The event bus this ledger emits on.
    #[must_use]
    pub fn bus(&self) -> Arc<InMemoryEventBus> {
        Arc::clone(&self.bus)
    }

    /// Block number of the latest emitted event (0 before any).
    #[must_use]
    pub fn block_height(&self) -> u64 {
        self.state.lock().next_block - 1
    }

    /// Index set the ledger holds for `oracle`.
    #[must_use]
    pub fn indexes_of(&self, oracle: &Address) -> Option<IndexSet> {
        self.state.lock().oracles.get(oracle).copied()
    }

    /// Number of registered oracles.
    #[must_use]
    pub fn oracle_count(&self) -> usize {
        self.state.lock().oracles.len()
    }

    /// Whether `flight` has been registered.
    #[must_use]
    pub fn is_flight_registered(&self, flight: &FlightKey) -> bool {
        self.state.lock().flights.contains(flight)
    }

    /// Open a request for a chosen index and emit `OracleRequest`.
    pub fn open_request(&self, index: OracleIndex, flight: &FlightKey) -> RequestKey {
        let key = RequestKey::new(index, flight);
        let mut state = self.state.lock();
        state.requests.entry(key.clone()).or_default().open = true;
        let values = json!({
            "index": index.value().to_string(),
            "airline": flight.airline.to_string(),
            "flight": flight.flight,
            "timestamp": flight.timestamp.to_string(),
        });
        let block = self.emit(&mut state, event_names::ORACLE_REQUEST, values);
        drop(state);

        info!(request = %key, block, "[fs-ledger] OracleRequest emitted");
        key
    }

    /// Re-emit an `OracleRequest` for an already opened request.
    pub fn redeliver(&self, key: &RequestKey) -> u64 {
        let values = json!({
            "index": key.index.value().to_string(),
            "airline": key.airline.to_string(),
            "flight": key.flight,
            "timestamp": key.timestamp.to_string(),
        });
        self.publish_raw(event_names::ORACLE_REQUEST, values)
    }

    /// Stop accepting responses for `key`.
    pub fn close_request(&self, key: &RequestKey) -> bool {
        match self.state.lock().requests.get_mut(key) {
            Some(record) => {
                record.open = false;
                true
            }
            None => false,
        }
    }

    /// Whether responses for `key` are still accepted.
    #[must_use]
    pub fn is_open(&self, key: &RequestKey) -> bool {
        self.state
            .lock()
            .requests
            .get(key)
            .is_some_and(|record| record.open)
    }

    /// Accepted responses for `key`, by oracle.
    #[must_use]
    pub fn responses_for(&self, key: &RequestKey) -> Vec<(Address, StatusCode)> {
        self.state
            .lock()
            .requests
            .get(key)
            .map(|record| record.responses.iter().map(|(a, s)| (*a, *s)).collect())
            .unwrap_or_default()
    }

    /// Emit an arbitrary event at the next block.
    pub fn publish_raw(&self, name: &str, values: Value) -> u64 {
        let mut state = self.state.lock();
        self.emit(&mut state, name, values)
    }

    /// Assign `indexes` to `oracle` when it registers, instead of random ones.
    pub fn preassign_indexes(&self, oracle: Address, indexes: IndexSet) {
        self.state.lock().preassigned.insert(oracle, indexes);
    }

    /// Make `registerOracle` from `oracle` fail with `error`.
    pub fn fail_registration_for(&self, oracle: Address, error: GatewayError) {
        self.faults.lock().registrations.insert(oracle, error);
    }

    /// Make every response from `oracle` fail with `error`.
    pub fn reject_submissions_from(&self, oracle: Address, error: GatewayError) {
        self.faults.lock().submissions.insert(oracle, error);
    }

    /// Make `subscribe_events` fail.
    pub fn fail_subscriptions(&self, error: Option<GatewayError>) {
        self.faults.lock().subscription = error;
    }

    /// Delay every gateway call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.faults.lock().latency = latency;
    }

    async fn simulate_latency(&self) {
        let latency = self.faults.lock().latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    fn emit(&self, state: &mut LedgerState, name: &str, values: Value) -> u64 {
        let block = state.next_block;
        state.next_block += 1;
        let event = LedgerEvent::new(block, name, values)
            .with_transaction_hash(format!("0x{block:064x}"));
        self.bus.send(event);
        block
    }
}

impl Default for SimulatedLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerGateway for SimulatedLedger {
    async fn register_oracle(&self, oracle: Address, stake: Wei) -> Result<(), GatewayError> {
        self.simulate_latency().await;

        if let Some(error) = self.faults.lock().registrations.get(&oracle).cloned() {
            return Err(error);
        }

        let required = oracle_registration_fee();
        if stake < required {
            return Err(GatewayError::InsufficientStake {
                required,
                provided: stake,
            });
        }

        let mut state = self.state.lock();
        if state.oracles.contains_key(&oracle) {
            return Err(GatewayError::AlreadyRegistered);
        }

        let indexes = match state.preassigned.remove(&oracle) {
            Some(indexes) => indexes,
            None => generate_index_set(&mut *self.rng.lock()),
        };
        state.oracles.insert(oracle, indexes);
        self.emit(
            &mut state,
            event_names::ORACLE_REGISTERED,
            json!({ "oracle": oracle.to_string() }),
        );
        drop(state);

        debug!(oracle = %oracle, indexes = %indexes, "[fs-ledger] Oracle registered");
        Ok(())
    }

    async fn get_my_indexes(&self, oracle: Address) -> Result<IndexSet, GatewayError> {
        self.simulate_latency().await;
        self.indexes_of(&oracle).ok_or(GatewayError::UnknownOracle)
    }

    async fn submit_oracle_response(
        &self,
        oracle: Address,
        response: &StatusResponse,
    ) -> Result<(), GatewayError> {
        self.simulate_latency().await;

        if let Some(error) = self.faults.lock().submissions.get(&oracle).cloned() {
            return Err(error);
        }

        let key = &response.request;
        let mut state = self.state.lock();

        let indexes = state
            .oracles
            .get(&oracle)
            .copied()
            .ok_or(GatewayError::UnknownOracle)?;
        if !indexes.contains(key.index) {
            return Err(GatewayError::IndexMismatch {
                index: key.index.value(),
            });
        }

        let record = state
            .requests
            .get_mut(key)
            .ok_or(GatewayError::UnknownRequest)?;
        if !record.open {
            return Err(GatewayError::RequestClosed);
        }
        if record.responses.contains_key(&oracle) {
            debug!(oracle = %oracle, request = %key, "[fs-ledger] Duplicate response ignored");
            return Ok(());
        }
        record.responses.insert(oracle, response.status);

        let values = json!({
            "airline": key.airline.to_string(),
            "flight": key.flight,
            "timestamp": key.timestamp.to_string(),
            "status": response.status.as_u8().to_string(),
        });
        self.emit(&mut state, event_names::ORACLE_REPORT, values);
        Ok(())
    }

    async fn subscribe_events(&self, from_block: u64) -> Result<Subscription, GatewayError> {
        if let Some(error) = self.faults.lock().subscription.clone() {
            return Err(error);
        }
        Ok(self
            .bus
            .subscribe(EventFilter::events([event_names::ORACLE_REQUEST]).from_block(from_block)))
    }
}

#[async_trait]
impl LedgerBootstrap for SimulatedLedger {
    async fn register_airline(
        &self,
        name: &str,
        airline: Address,
        stake: Wei,
    ) -> Result<(), GatewayError> {
        self.simulate_latency().await;

        let required = airline_registration_fee();
        if stake < required {
            return Err(GatewayError::InsufficientStake {
                required,
                provided: stake,
            });
        }

        let mut state = self.state.lock();
        if state.airlines.contains_key(&airline) {
            return Err(GatewayError::Reverted("airline already registered".into()));
        }
        state.airlines.insert(airline, name.to_string());
        self.emit(
            &mut state,
            event_names::AIRLINE_REGISTERED,
            json!({ "airline": airline.to_string(), "name": name }),
        );
        drop(state);

        info!(airline = %airline, name, "[fs-ledger] Airline registered");
        Ok(())
    }

    async fn register_flight(
        &self,
        airline: Address,
        flight: &str,
        timestamp: u64,
    ) -> Result<(), GatewayError> {
        self.simulate_latency().await;

        let mut state = self.state.lock();
        if !state.airlines.contains_key(&airline) {
            return Err(GatewayError::Reverted("airline not registered".into()));
        }
        if !state.flights.insert(FlightKey::new(airline, flight, timestamp)) {
            return Err(GatewayError::Reverted("flight already registered".into()));
        }
        self.emit(
            &mut state,
            event_names::FLIGHT_REGISTERED,
            json!({
                "airline": airline.to_string(),
                "flight": flight,
                "timestamp": timestamp.to_string(),
            }),
        );
        drop(state);

        debug!(airline = %airline, flight, timestamp, "[fs-ledger] Flight registered");
        Ok(())
    }

    async fn fetch_flight_status(
        &self,
        airline: Address,
        flight: &str,
        timestamp: u64,
    ) -> Result<OracleIndex, GatewayError> {
        self.simulate_latency().await;

        let raw = self.rng.lock().gen_range(0..INDEX_COUNT);
        let index = OracleIndex::new(raw).map_err(|e| GatewayError::Reverted(e.to_string()))?;
        let key = self.open_request(index, &FlightKey::new(airline, flight, timestamp));
        if !self.is_flight_registered(&key.flight_key()) {
            warn!(request = %key, "[fs-ledger] Status requested for unregistered flight");
        }
        Ok(index)
    }
}
