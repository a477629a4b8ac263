//! # Value Objects
//!
//! Validated index types. An `IndexSet` can only be built from exactly
//! three distinct indexes in `[0, INDEX_COUNT)`.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::IndexError;
use super::invariants::{INDEXES_PER_ORACLE, INDEX_COUNT};

/// One of the partition buckets `0..=9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct OracleIndex(u8);

impl OracleIndex {
    /// Create an index, rejecting values outside `0..INDEX_COUNT`.
    pub fn new(value: u8) -> Result<Self, IndexError> {
        if value >= INDEX_COUNT {
            return Err(IndexError::OutOfRange(u64::from(value)));
        }
        Ok(Self(value))
    }

    /// Raw value.
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Position in a bucket array.
    #[must_use]
    pub fn as_usize(self) -> usize {
        usize::from(self.0)
    }

    /// Every valid index, ascending.
    pub fn all() -> impl Iterator<Item = OracleIndex> {
        (0..INDEX_COUNT).map(OracleIndex)
    }
}

impl TryFrom<u8> for OracleIndex {
    type Error = IndexError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<u64> for OracleIndex {
    type Error = IndexError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| IndexError::OutOfRange(value))
            .and_then(Self::new)
    }
}

impl From<OracleIndex> for u8 {
    fn from(index: OracleIndex) -> Self {
        index.0
    }
}

impl fmt::Display for OracleIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The three distinct indexes assigned to one oracle at registration.
///
/// Order is preserved as returned by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct IndexSet([OracleIndex; INDEXES_PER_ORACLE]);

impl IndexSet {
    /// Validate a raw assignment.
    pub fn from_slice(raw: &[u8]) -> Result<Self, IndexError> {
        if raw.len() != INDEXES_PER_ORACLE {
            return Err(IndexError::WrongCount(raw.len()));
        }

        let mut indexes = [OracleIndex(0); INDEXES_PER_ORACLE];
        for (slot, value) in indexes.iter_mut().zip(raw) {
            *slot = OracleIndex::new(*value)?;
        }

        for i in 0..INDEXES_PER_ORACLE {
            for j in (i + 1)..INDEXES_PER_ORACLE {
                if indexes[i] == indexes[j] {
                    return Err(IndexError::Duplicate(indexes[i].value()));
                }
            }
        }

        Ok(Self(indexes))
    }

    /// Build from values already known to be distinct and in range.
    pub(crate) fn from_distinct(raw: [u8; INDEXES_PER_ORACLE]) -> Self {
        debug_assert!(Self::from_slice(&raw).is_ok());
        Self(raw.map(|v| OracleIndex(v % INDEX_COUNT)))
    }

    /// Check whether `index` is one of the three.
    #[must_use]
    pub fn contains(&self, index: OracleIndex) -> bool {
        self.0.contains(&index)
    }

    /// Iterate in ledger order.
    pub fn iter(&self) -> impl Iterator<Item = OracleIndex> + '_ {
        self.0.iter().copied()
    }

    /// Raw values in ledger order.
    #[must_use]
    pub fn to_raw(&self) -> [u8; INDEXES_PER_ORACLE] {
        [self.0[0].0, self.0[1].0, self.0[2].0]
    }
}

impl TryFrom<Vec<u8>> for IndexSet {
    type Error = IndexError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_slice(&value)
    }
}

impl From<IndexSet> for Vec<u8> {
    fn from(set: IndexSet) -> Self {
        set.to_raw().to_vec()
    }
}

impl fmt::Display for IndexSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.0[0], self.0[1], self.0[2])
    }
}
