//! # Error Types
//!
//! Parsing errors for the shared ledger primitives.

use thiserror::Error;

/// Errors raised while parsing an [`Address`](crate::Address).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// The input was not valid hexadecimal.
    #[error("Invalid address hex: {0}")]
    InvalidHex(String),

    /// The decoded address had the wrong number of bytes.
    #[error("Invalid address length: expected 20 bytes, got {got}")]
    InvalidLength { got: usize },
}

/// Errors raised while converting a raw number into a [`StatusCode`](crate::StatusCode).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusCodeError {
    /// The value is not one of the six canonical flight status codes.
    #[error("Unknown status code: {0}")]
    Unknown(u64),
}
