//! # Shared Types Crate
//!
//! Ledger primitives used across the oracle network.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: addresses, amounts and status codes are
//!   defined once here and reused by the bus, the core and the runtime.
//! - **No Signing**: `Address` is an opaque 20-byte handle. Key management
//!   belongs to the ledger client, not to this workspace.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
