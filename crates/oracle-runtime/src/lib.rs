//! # Oracle Runtime Library
//!
//! This library exposes the internal modules of the oracle runtime for
//! testing. The main entry point is the `main.rs` binary.
//!
//! ## Modules
//!
//! - `config`: `RuntimeConfig` and environment overrides
//! - `bootstrap`: airline and flight registration
//! - `driver`: periodic flight status requests
//! - `metrics_feed`: network outcomes into Prometheus counters
//! - `runtime`: startup and shutdown of the whole node

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bootstrap;
pub mod config;
pub mod driver;
pub mod metrics_feed;
pub mod runtime;

pub use bootstrap::bootstrap_ledger;
pub use config::{default_flights, load_config, FlightSpec, RuntimeConfig};
pub use driver::RequestDriver;
pub use runtime::OracleRuntime;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
