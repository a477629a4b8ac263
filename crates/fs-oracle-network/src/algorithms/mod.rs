//! # Algorithms Module
//!
//! Status code generation, index assignment, event decoding and request
//! deduplication.

pub mod decode;
pub mod index_assignment;
pub mod request_cache;
pub mod status_codes;

pub use decode::decode_oracle_request;
pub use index_assignment::generate_index_set;
pub use request_cache::RequestDedupCache;
pub use status_codes::{pick_status_code, RandomStatusCodes};
