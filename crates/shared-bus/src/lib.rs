//! # Shared Bus - Ledger Event Bus
//!
//! Carries the events a ledger emits (`OracleRequest`, `OracleReport`, ...)
//! to everything that subscribed to them.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │    Ledger    │                    │   Listener   │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │  + history   │ ─────────┘
//!                  └──────────────┘  subscribe(from_block)
//! ```
//!
//! ## Delivery
//!
//! - **Replay**: a subscription starting at block `n` first receives every
//!   retained event with `block_number >= n`, then live events.
//! - **At-least-once**: consumers must tolerate duplicates. The bus never
//!   de-duplicates.
//! - **Lag**: a slow subscriber that falls behind the channel capacity skips
//!   the overwritten events and logs how many were lost.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{event_names, EventFilter, LedgerEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Maximum events retained for replay.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10_000;
