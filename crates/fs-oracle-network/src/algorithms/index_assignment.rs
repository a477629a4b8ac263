//! # Index Assignment
//!
//! Ledger-side assignment of three distinct indexes to a new oracle.

use rand::Rng;

use crate::domain::{IndexSet, INDEXES_PER_ORACLE, INDEX_COUNT};

/// Draw three distinct indexes in `0..INDEX_COUNT`.
pub fn generate_index_set<R: Rng + ?Sized>(rng: &mut R) -> IndexSet {
    let mut raw = [0u8; INDEXES_PER_ORACLE];
    let picks = rand::seq::index::sample(rng, usize::from(INDEX_COUNT), INDEXES_PER_ORACLE);
    for (slot, pick) in raw.iter_mut().zip(picks.iter()) {
        // sample() yields values below INDEX_COUNT, which fits in u8
        *slot = pick as u8;
    }
    IndexSet::from_distinct(raw)
}
