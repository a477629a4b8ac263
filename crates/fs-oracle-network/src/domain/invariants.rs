//! # Domain Invariants
//!
//! Business rules for oracle registration and response routing.

use super::entities::{IndexBuckets, OracleIdentity, RegistrationState};
use super::value_objects::{IndexSet, OracleIndex};
use shared_types::{ether, Wei};

/// Number of partition indexes.
pub const INDEX_COUNT: u8 = 10;

/// Indexes assigned to each oracle.
pub const INDEXES_PER_ORACLE: usize = 3;

/// Fee an oracle pays to register, in ether.
pub const ORACLE_REGISTRATION_FEE_ETHER: u64 = 1;

/// Fee an airline pays to register, in ether.
pub const AIRLINE_REGISTRATION_FEE_ETHER: u64 = 10;

/// Oracle registration fee in wei.
#[must_use]
pub fn oracle_registration_fee() -> Wei {
    ether(ORACLE_REGISTRATION_FEE_ETHER)
}

/// Airline registration fee in wei.
#[must_use]
pub fn airline_registration_fee() -> Wei {
    ether(AIRLINE_REGISTRATION_FEE_ETHER)
}

/// Invariant: only an oracle holding the request index may answer it.
pub fn invariant_may_respond(indexes: &IndexSet, request_index: OracleIndex) -> bool {
    indexes.contains(request_index)
}

/// Invariant: buckets equal the union of registered identities' sets.
///
/// Every registered identity appears in exactly its three buckets and
/// nothing else appears anywhere.
pub fn invariant_buckets_consistent<'a>(
    buckets: &IndexBuckets,
    identities: impl IntoIterator<Item = &'a OracleIdentity>,
) -> bool {
    let mut expected = IndexBuckets::default();
    for identity in identities {
        if let (RegistrationState::Registered, Some(indexes)) = (&identity.state, identity.indexes)
        {
            expected.insert(identity.address, &indexes);
        }
    }
    expected == *buckets
}
