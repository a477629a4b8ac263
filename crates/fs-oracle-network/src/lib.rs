//! # Flight-Status Oracle Network
//!
//! A pool of oracle identities answering flight-status requests raised as
//! ledger events.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Register each oracle with the ledger and learn its three indexes
//! - Listen for `OracleRequest` events and decode them
//! - For a request with index `i`, have every oracle holding `i` submit
//!   its own status code
//!
//! Consensus over the submitted codes is the ledger's job.
//!
//! ## Failure Handling
//!
//! | Failure | Effect |
//! |---------|--------|
//! | Registration rejected or timed out | Identity marked `Failed`, pool continues |
//! | Malformed event | Logged and dropped |
//! | Submission rejected or timed out | Logged, not retried |
//! | Initial subscription fails | `OracleError::SubscriptionFailed` |
//!
//! ## Module Structure
//!
//! ```text
//! fs-oracle-network/
//! ├── domain/          # OracleIdentity, IndexSet, IndexBuckets, errors
//! ├── algorithms/      # Status codes, index assignment, decoding, dedup
//! ├── ports/           # LedgerGateway, LedgerBootstrap, StatusCodeSource
//! ├── adapters/        # SimulatedLedger
//! ├── application/     # Registry, listener, dispatcher, network
//! └── config.rs        # OracleConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::SimulatedLedger;
pub use algorithms::{
    decode_oracle_request, generate_index_set, pick_status_code, RandomStatusCodes,
    RequestDedupCache,
};
pub use application::{
    IdentityRegistry, ListenerCounters, ListenerHandle, ListenerStats, OracleContext, OracleNetwork,
    OracleNetworkHandle, RegistryCounts, RequestListener, ResponseDispatcher,
};
pub use config::{OracleConfig, DEFAULT_GAS_LIMIT};
pub use domain::{
    DecodeError, DispatchReport, GatewayError, IndexBuckets, IndexError, IndexSet,
    OracleError, OracleIdentity, OracleIndex, RegistrationError, RegistrationState,
    RegistrationSummary, RequestKey, StatusRequest, StatusResponse, SubmissionError,
    INDEXES_PER_ORACLE, INDEX_COUNT,
};
pub use ports::{
    FixedStatusCode, LedgerBootstrap, LedgerGateway, OracleRegistryApi, ResponseDispatchApi,
    StatusCodeSource,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
