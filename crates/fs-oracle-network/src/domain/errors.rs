//! # Domain Errors
//!
//! Error types for the oracle network. Each carries a short static
//! `reason()` label suitable for metric labels.

use shared_types::Wei;
use thiserror::Error;

/// Invalid index or index set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// Index outside `0..=9`.
    #[error("Index out of range: {0}")]
    OutOfRange(u64),

    /// Same index appears twice in a set.
    #[error("Duplicate index in set: {0}")]
    Duplicate(u8),

    /// Set does not have exactly three members.
    #[error("Expected 3 indexes, got {0}")]
    WrongCount(usize),
}

/// Illegal registration state change.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid registration transition: {from} -> {to}")]
pub struct TransitionError {
    /// Current state
    pub from: String,
    /// Attempted state
    pub to: String,
}

/// Errors reported by the ledger gateway.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Stake below the registration fee.
    #[error("Insufficient stake: required {required} wei, provided {provided} wei")]
    InsufficientStake {
        /// Required fee
        required: Wei,
        /// Value sent
        provided: Wei,
    },

    /// Identity already registered on the ledger.
    #[error("Oracle already registered")]
    AlreadyRegistered,

    /// Caller is not a registered oracle.
    #[error("Unknown oracle")]
    UnknownOracle,

    /// Request index is not in the caller's index set.
    #[error("Index {index} does not match oracle assignment")]
    IndexMismatch {
        /// Request index
        index: u8,
    },

    /// Request no longer accepts responses.
    #[error("Request is closed")]
    RequestClosed,

    /// No such request was ever opened.
    #[error("Unknown request")]
    UnknownRequest,

    /// Transaction reverted with a message.
    #[error("Transaction reverted: {0}")]
    Reverted(String),

    /// Account nonce collided with a pending transaction.
    #[error("Nonce conflict")]
    NonceConflict,

    /// Transport failure talking to the ledger.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Event subscription ended.
    #[error("Subscription closed")]
    SubscriptionClosed,
}

impl GatewayError {
    /// Static label for metrics.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InsufficientStake { .. } => "insufficient_stake",
            Self::AlreadyRegistered => "already_registered",
            Self::UnknownOracle => "unknown_oracle",
            Self::IndexMismatch { .. } => "index_mismatch",
            Self::RequestClosed => "request_closed",
            Self::UnknownRequest => "unknown_request",
            Self::Reverted(_) => "reverted",
            Self::NonceConflict => "nonce_conflict",
            Self::Connection(_) => "connection",
            Self::SubscriptionClosed => "subscription_closed",
        }
    }
}

/// Failure registering one identity. Never fatal for the pool.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// The ledger rejected a call.
    #[error("Ledger rejected registration: {0}")]
    Gateway(#[from] GatewayError),

    /// A ledger call exceeded its deadline.
    #[error("Ledger call timed out: {op}")]
    Timeout {
        /// Which call
        op: &'static str,
    },

    /// The ledger returned an index set that fails validation.
    #[error("Invalid index assignment: {0}")]
    InvalidAssignment(String),

    /// Identity is already tracked by this registry.
    #[error("Identity already tracked")]
    DuplicateIdentity,
}

impl RegistrationError {
    /// Static label for metrics.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Gateway(e) => e.reason(),
            Self::Timeout { .. } => "timeout",
            Self::InvalidAssignment(_) => "invalid_assignment",
            Self::DuplicateIdentity => "duplicate_identity",
        }
    }
}

impl From<IndexError> for RegistrationError {
    fn from(e: IndexError) -> Self {
        Self::InvalidAssignment(e.to_string())
    }
}

/// A raw event could not be turned into a `StatusRequest`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Event name is not `OracleRequest`.
    #[error("Unexpected event: {0}")]
    UnexpectedEvent(String),

    /// Required field absent.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Field present but unusable.
    #[error("Invalid field {field}: {reason}")]
    InvalidField {
        /// Field name
        field: &'static str,
        /// What was wrong
        reason: String,
    },
}

impl DecodeError {
    /// Static label for metrics.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::UnexpectedEvent(_) => "unexpected_event",
            Self::MissingField(_) => "missing_field",
            Self::InvalidField { .. } => "invalid_field",
        }
    }
}

/// Failure submitting one response. Logged, never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// The ledger rejected the response.
    #[error("Ledger rejected response: {0}")]
    Gateway(#[from] GatewayError),

    /// Submission exceeded its deadline.
    #[error("Submission timed out")]
    Timeout,
}

impl SubmissionError {
    /// Static label for metrics.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Gateway(e) => e.reason(),
            Self::Timeout => "timeout",
        }
    }
}

/// Errors that stop the oracle network.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The initial event subscription could not be opened.
    #[error("Failed to subscribe to ledger events: {0}")]
    SubscriptionFailed(GatewayError),

    /// Configuration rejected by validation.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl OracleError {
    /// Static label for metrics.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::SubscriptionFailed(_) => "subscription_failed",
            Self::Config(_) => "config",
        }
    }
}
