//! # Domain Module
//!
//! Core domain types for the oracle network: identities, index sets,
//! requests, responses and their errors.

pub mod entities;
pub mod errors;
pub mod invariants;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use value_objects::*;
