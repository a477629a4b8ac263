//! End-to-end scenarios over the simulated ledger.

pub mod fixtures;
mod flows;
mod runtime;
