//! # Application Module
//!
//! Services wiring the domain to the ledger ports.

pub mod context;
pub mod dispatcher;
pub mod listener;
pub mod network;
pub mod registry;

pub use context::OracleContext;
pub use dispatcher::ResponseDispatcher;
pub use listener::{ListenerCounters, ListenerHandle, ListenerStats, RequestListener};
pub use network::{OracleNetwork, OracleNetworkHandle};
pub use registry::{IdentityRegistry, RegistryCounts};
