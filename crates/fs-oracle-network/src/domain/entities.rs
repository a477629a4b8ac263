//! # Domain Entities
//!
//! Oracle identities, the index-partitioned lookup table, and the request
//! and response values that flow between listener, dispatcher and ledger.

use serde::{Deserialize, Serialize};
use shared_types::{Address, FlightKey, StatusCode};
use std::collections::BTreeSet;
use std::fmt;

use super::errors::{RegistrationError, SubmissionError, TransitionError};
use super::invariants::INDEX_COUNT;
use super::value_objects::{IndexSet, OracleIndex};

// =============================================================================
// REGISTRATION
// =============================================================================

/// Registration lifecycle.
///
/// `Unregistered -> Pending -> {Registered | Failed}`. Both outcomes are
/// terminal.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RegistrationState {
    /// Known locally, nothing sent yet.
    #[default]
    Unregistered,
    /// Registration call in flight.
    Pending,
    /// Confirmed by the ledger with an index set.
    Registered,
    /// Registration gave up.
    Failed {
        /// Why
        reason: String,
    },
}

impl RegistrationState {
    /// Check whether a transition is allowed.
    #[must_use]
    pub fn can_transition_to(&self, next: &RegistrationState) -> bool {
        matches!(
            (self, next),
            (Self::Unregistered, Self::Pending)
                | (Self::Pending, Self::Registered)
                | (Self::Pending, Self::Failed { .. })
        )
    }

    /// Registered or Failed.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Registered | Self::Failed { .. })
    }
}

impl fmt::Display for RegistrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unregistered => write!(f, "Unregistered"),
            Self::Pending => write!(f, "Pending"),
            Self::Registered => write!(f, "Registered"),
            Self::Failed { .. } => write!(f, "Failed"),
        }
    }
}

/// One oracle account in the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleIdentity {
    /// Ledger account.
    pub address: Address,
    /// Assigned indexes, set on confirmation.
    pub indexes: Option<IndexSet>,
    /// Lifecycle state.
    pub state: RegistrationState,
}

impl OracleIdentity {
    /// A fresh, unregistered identity.
    #[must_use]
    pub fn new(address: Address) -> Self {
        Self {
            address,
            indexes: None,
            state: RegistrationState::Unregistered,
        }
    }

    fn transition_to(&mut self, next: RegistrationState) -> Result<(), TransitionError> {
        if !self.state.can_transition_to(&next) {
            return Err(TransitionError {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.state = next;
        Ok(())
    }

    /// Mark the registration call as sent.
    pub fn begin(&mut self) -> Result<(), TransitionError> {
        self.transition_to(RegistrationState::Pending)
    }

    /// Record ledger confirmation together with the assigned indexes.
    pub fn confirm(&mut self, indexes: IndexSet) -> Result<(), TransitionError> {
        self.transition_to(RegistrationState::Registered)?;
        self.indexes = Some(indexes);
        Ok(())
    }

    /// Record a failed registration.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), TransitionError> {
        self.transition_to(RegistrationState::Failed {
            reason: reason.into(),
        })
    }

    /// Registered with an index set.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.state == RegistrationState::Registered && self.indexes.is_some()
    }
}

/// Index-partitioned lookup: bucket `i` holds every registered oracle
/// whose set contains `i`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexBuckets {
    buckets: [BTreeSet<Address>; INDEX_COUNT as usize],
}

impl IndexBuckets {
    /// Add an oracle to each of its three buckets.
    pub fn insert(&mut self, oracle: Address, indexes: &IndexSet) {
        for index in indexes.iter() {
            self.buckets[index.as_usize()].insert(oracle);
        }
    }

    /// Oracles holding `index`.
    #[must_use]
    pub fn matching(&self, index: OracleIndex) -> &BTreeSet<Address> {
        &self.buckets[index.as_usize()]
    }

    /// Size of every bucket, by index.
    #[must_use]
    pub fn sizes(&self) -> [usize; INDEX_COUNT as usize] {
        let mut sizes = [0; INDEX_COUNT as usize];
        for (size, bucket) in sizes.iter_mut().zip(&self.buckets) {
            *size = bucket.len();
        }
        sizes
    }

    /// Total memberships (three per registered oracle).
    #[must_use]
    pub fn total_entries(&self) -> usize {
        self.buckets.iter().map(BTreeSet::len).sum()
    }
}

/// Outcome of registering a batch of identities.
#[derive(Debug, Clone, Default)]
pub struct RegistrationSummary {
    /// Confirmed identities and their sets.
    pub registered: Vec<(Address, IndexSet)>,
    /// Identities that failed, with the cause.
    pub failed: Vec<(Address, RegistrationError)>,
}

impl RegistrationSummary {
    /// Number confirmed.
    #[must_use]
    pub fn registered_count(&self) -> usize {
        self.registered.len()
    }

    /// Number failed.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Whether a specific address was confirmed.
    #[must_use]
    pub fn is_registered(&self, address: &Address) -> bool {
        self.registered.iter().any(|(a, _)| a == address)
    }
}

// =============================================================================
// REQUESTS & RESPONSES
// =============================================================================

/// Identity of a request: `(index, airline, flight, timestamp)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestKey {
    /// Requested index.
    pub index: OracleIndex,
    /// Airline account.
    pub airline: Address,
    /// Flight code.
    pub flight: String,
    /// Departure timestamp.
    pub timestamp: u64,
}

impl RequestKey {
    /// Build from an index and a flight.
    #[must_use]
    pub fn new(index: OracleIndex, flight: &FlightKey) -> Self {
        Self {
            index,
            airline: flight.airline,
            flight: flight.flight.clone(),
            timestamp: flight.timestamp,
        }
    }

    /// The flight this request is about.
    #[must_use]
    pub fn flight_key(&self) -> FlightKey {
        FlightKey::new(self.airline, self.flight.clone(), self.timestamp)
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}@{}#{}",
            self.airline.short(),
            self.flight,
            self.timestamp,
            self.index
        )
    }
}

/// A decoded `OracleRequest` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRequest {
    /// Requested index.
    pub index: OracleIndex,
    /// Airline account.
    pub airline: Address,
    /// Flight code.
    pub flight: String,
    /// Departure timestamp.
    pub timestamp: u64,
    /// Block the event was emitted in.
    pub block_number: u64,
}

impl StatusRequest {
    /// Dedup key; ignores the block number.
    #[must_use]
    pub fn key(&self) -> RequestKey {
        RequestKey {
            index: self.index,
            airline: self.airline,
            flight: self.flight.clone(),
            timestamp: self.timestamp,
        }
    }
}

/// One oracle's answer to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Request answered.
    pub request: RequestKey,
    /// Submitting oracle.
    pub oracle: Address,
    /// Generated status.
    pub status: StatusCode,
}

/// Outcome of dispatching one request.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    /// Request handled.
    pub request: RequestKey,
    /// Oracles holding the index.
    pub matched: Vec<Address>,
    /// Responses the ledger accepted.
    pub submitted: Vec<StatusResponse>,
    /// Per-oracle failures.
    pub failed: Vec<(Address, SubmissionError)>,
    /// Skipped because the key was seen recently.
    pub duplicate: bool,
}

impl DispatchReport {
    /// Report for a request that was recognised as a re-delivery.
    #[must_use]
    pub fn duplicate(request: RequestKey) -> Self {
        Self {
            request,
            matched: Vec::new(),
            submitted: Vec::new(),
            failed: Vec::new(),
            duplicate: true,
        }
    }
}
