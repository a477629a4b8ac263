//! # Oracle Context
//!
//! Shared handles passed to every component in place of global state.

use std::sync::Arc;

use crate::application::registry::IdentityRegistry;
use crate::config::OracleConfig;
use crate::domain::OracleError;
use crate::ports::outbound::LedgerGateway;

/// Gateway, registry and configuration for one oracle network.
#[derive(Clone)]
pub struct OracleContext {
    /// Ledger gateway used for every call.
    pub gateway: Arc<dyn LedgerGateway>,
    /// Identity registry backed by `gateway`.
    pub registry: Arc<IdentityRegistry>,
    /// Validated configuration.
    pub config: Arc<OracleConfig>,
}

impl OracleContext {
    /// Validate `config` and build an empty registry over `gateway`.
    pub fn new(gateway: Arc<dyn LedgerGateway>, config: OracleConfig) -> Result<Self, OracleError> {
        config.validate()?;
        let registry = Arc::new(IdentityRegistry::new(Arc::clone(&gateway), &config));
        Ok(Self {
            gateway,
            registry,
            config: Arc::new(config),
        })
    }
}
