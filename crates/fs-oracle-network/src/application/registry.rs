//! # Identity Registry
//!
//! Registers oracle identities with the ledger and maintains the
//! index-partitioned lookup table.
//!
//! An identity enters the buckets in the same write-lock section that
//! marks it `Registered`, and only after the ledger has confirmed the
//! registration and returned its indexes. Readers therefore never see a
//! matching identity whose registration is unconfirmed.

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Address, Wei};
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::config::OracleConfig;
use crate::domain::{
    invariant_buckets_consistent, GatewayError, IndexBuckets, IndexSet, OracleIdentity,
    OracleIndex, RegistrationError, RegistrationState, RegistrationSummary, INDEX_COUNT,
};
use crate::ports::inbound::OracleRegistryApi;
use crate::ports::outbound::LedgerGateway;

#[derive(Debug, Default)]
struct RegistryState {
    identities: HashMap<Address, OracleIdentity>,
    buckets: IndexBuckets,
}

/// Counts by registration state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryCounts {
    /// Confirmed.
    pub registered: usize,
    /// Gave up.
    pub failed: usize,
    /// Not yet terminal.
    pub pending: usize,
}

/// Oracle identity registry.
pub struct IdentityRegistry {
    gateway: Arc<dyn LedgerGateway>,
    stake: Wei,
    call_timeout: Duration,
    max_concurrent: usize,
    state: RwLock<RegistryState>,
}

impl IdentityRegistry {
    /// Create an empty registry.
    pub fn new(gateway: Arc<dyn LedgerGateway>, config: &OracleConfig) -> Self {
        Self {
            gateway,
            stake: config.registration_stake,
            call_timeout: config.ledger_call_timeout(),
            max_concurrent: config.max_concurrent_registrations.max(1),
            state: RwLock::new(RegistryState::default()),
        }
    }

    /// Register a batch of identities concurrently.
    ///
    /// At most `max_concurrent_registrations` are in flight at once. Every
    /// identity is attempted regardless of the others' outcome. The
    /// summary lists identities in input order.
    pub async fn register_all(
        self: &Arc<Self>,
        accounts: impl IntoIterator<Item = Address>,
    ) -> RegistrationSummary {
        let permits = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = JoinSet::new();

        for (position, oracle) in accounts.into_iter().enumerate() {
            let registry = Arc::clone(self);
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await;
                let result = registry.register(oracle).await;
                (position, oracle, result)
            });
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => error!(error = %e, "[fs-oracle] Registration task aborted"),
            }
        }
        outcomes.sort_by_key(|(position, _, _)| *position);

        let mut summary = RegistrationSummary::default();
        for (_, oracle, result) in outcomes {
            match result {
                Ok(indexes) => summary.registered.push((oracle, indexes)),
                Err(e) => summary.failed.push((oracle, e)),
            }
        }

        info!(
            registered = summary.registered_count(),
            failed = summary.failed_count(),
            "[fs-oracle] Oracle pool registration finished"
        );
        summary
    }

    /// Current state of every tracked identity.
    #[must_use]
    pub fn snapshot(&self) -> Vec<OracleIdentity> {
        let mut identities: Vec<_> = self.state.read().identities.values().cloned().collect();
        identities.sort_by_key(|identity| identity.address);
        identities
    }

    /// Counts by state.
    #[must_use]
    pub fn counts(&self) -> RegistryCounts {
        let state = self.state.read();
        let mut counts = RegistryCounts::default();
        for identity in state.identities.values() {
            match identity.state {
                RegistrationState::Registered => counts.registered += 1,
                RegistrationState::Failed { .. } => counts.failed += 1,
                _ => counts.pending += 1,
            }
        }
        counts
    }

    /// Bucket sizes by index.
    #[must_use]
    pub fn bucket_sizes(&self) -> [usize; INDEX_COUNT as usize] {
        self.state.read().buckets.sizes()
    }

    /// Check that the buckets match the registered identities.
    #[must_use]
    pub fn buckets_consistent(&self) -> bool {
        let state = self.state.read();
        invariant_buckets_consistent(&state.buckets, state.identities.values())
    }

    async fn call<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = Result<T, GatewayError>>,
    ) -> Result<T, RegistrationError> {
        match tokio::time::timeout(self.call_timeout, fut).await {
            Ok(result) => result.map_err(RegistrationError::from),
            Err(_) => Err(RegistrationError::Timeout { op }),
        }
    }

    fn mark_failed(&self, oracle: Address, error: &RegistrationError) {
        let mut state = self.state.write();
        if let Some(identity) = state.identities.get_mut(&oracle) {
            if let Err(e) = identity.fail(error.reason()) {
                warn!(oracle = %oracle, error = %e, "[fs-oracle] Could not mark identity failed");
            }
        }
        drop(state);

        warn!(
            oracle = %oracle,
            reason = error.reason(),
            error = %error,
            "[fs-oracle] Oracle registration failed"
        );
    }

    fn commit(&self, oracle: Address, indexes: IndexSet) -> Result<(), RegistrationError> {
        let mut state = self.state.write();
        let RegistryState {
            identities,
            buckets,
        } = &mut *state;

        let identity = identities
            .get_mut(&oracle)
            .ok_or_else(|| RegistrationError::InvalidAssignment("identity vanished".into()))?;
        identity
            .confirm(indexes)
            .map_err(|e| RegistrationError::InvalidAssignment(e.to_string()))?;
        buckets.insert(oracle, &indexes);
        Ok(())
    }
}

#[async_trait]
impl OracleRegistryApi for IdentityRegistry {
    async fn register(&self, oracle: Address) -> Result<IndexSet, RegistrationError> {
        {
            let mut state = self.state.write();
            if state.identities.contains_key(&oracle) {
                debug!(oracle = %oracle, "[fs-oracle] Identity already tracked");
                return Err(RegistrationError::DuplicateIdentity);
            }
            let mut identity = OracleIdentity::new(oracle);
            if let Err(e) = identity.begin() {
                return Err(RegistrationError::InvalidAssignment(e.to_string()));
            }
            state.identities.insert(oracle, identity);
        }

        let result = async {
            self.call("registerOracle", self.gateway.register_oracle(oracle, self.stake))
                .await?;
            let indexes = self
                .call("getMyIndexes", self.gateway.get_my_indexes(oracle))
                .await?;
            self.commit(oracle, indexes)?;
            Ok::<_, RegistrationError>(indexes)
        }
        .await;

        match result {
            Ok(indexes) => {
                info!(oracle = %oracle, indexes = %indexes, "[fs-oracle] Oracle registered");
                Ok(indexes)
            }
            Err(e) => {
                self.mark_failed(oracle, &e);
                Err(e)
            }
        }
    }

    fn get_matching(&self, index: OracleIndex) -> BTreeSet<Address> {
        self.state.read().buckets.matching(index).clone()
    }

    fn identity(&self, oracle: &Address) -> Option<OracleIdentity> {
        self.state.read().identities.get(oracle).cloned()
    }
}
