//! # Inbound Ports
//!
//! What the oracle network can be asked to do.

use async_trait::async_trait;
use shared_types::Address;
use std::collections::BTreeSet;

use crate::domain::{
    DispatchReport, IndexSet, OracleIdentity, OracleIndex, RegistrationError, StatusRequest,
};

/// Identity registry - inbound port.
#[async_trait]
pub trait OracleRegistryApi: Send + Sync {
    /// Register one identity with the ledger and record its index set.
    ///
    /// On failure the identity is kept as `Failed`; callers continue with
    /// the rest of the pool.
    async fn register(&self, oracle: Address) -> Result<IndexSet, RegistrationError>;

    /// Registered identities whose index set contains `index`.
    ///
    /// Never returns an identity before its ledger confirmation.
    fn get_matching(&self, index: OracleIndex) -> BTreeSet<Address>;

    /// Current view of one identity.
    fn identity(&self, oracle: &Address) -> Option<OracleIdentity>;
}

/// Response dispatcher - inbound port.
#[async_trait]
pub trait ResponseDispatchApi: Send + Sync {
    /// Answer a request once per matching identity.
    ///
    /// Per-identity failures are reported, never returned as an error.
    async fn dispatch(&self, request: StatusRequest) -> DispatchReport;
}
