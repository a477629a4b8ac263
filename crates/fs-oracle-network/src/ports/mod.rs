//! # Ports Module
//!
//! Inbound APIs the oracle network offers and the outbound ledger
//! surfaces it depends on.

pub mod inbound;
pub mod outbound;

pub use inbound::{OracleRegistryApi, ResponseDispatchApi};
pub use outbound::{FixedStatusCode, LedgerBootstrap, LedgerGateway, StatusCodeSource};
