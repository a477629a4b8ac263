//! # Event Publisher
//!
//! Defines the publishing side of the event bus.

use crate::events::{EventFilter, LedgerEvent};
use crate::subscriber::Subscription;
use crate::{DEFAULT_CHANNEL_CAPACITY, DEFAULT_HISTORY_CAPACITY};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Trait for publishing events to the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event to the bus.
    ///
    /// # Returns
    ///
    /// The number of live subscribers that received the event.
    async fn publish(&self, event: LedgerEvent) -> usize;

    /// Get the total number of events published.
    fn events_published(&self) -> u64;
}

/// In-memory implementation of the event bus.
///
/// Uses `tokio::sync::broadcast` for live delivery and a bounded history
/// buffer for replay from an earlier block.
pub struct InMemoryEventBus {
    /// Broadcast sender for live events.
    sender: broadcast::Sender<LedgerEvent>,

    /// Retained events, oldest first.
    ///
    /// Publishing and subscribing both take this lock so a new subscriber
    /// sees every event exactly once: either in its backlog or live.
    history: Mutex<VecDeque<LedgerEvent>>,

    /// Maximum retained events.
    history_capacity: usize,

    /// Total events published.
    events_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryEventBus {
    /// Create a new in-memory event bus with default capacities.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY, DEFAULT_HISTORY_CAPACITY)
    }

    /// Create a new in-memory event bus with the given live-channel and
    /// history capacities.
    #[must_use]
    pub fn with_capacity(capacity: usize, history_capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            history: Mutex::new(VecDeque::new()),
            history_capacity,
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to events matching a filter.
    ///
    /// Retained events at or after `filter.from_block` are replayed first.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let history = self.history.lock();
        let receiver = self.sender.subscribe();
        let backlog: VecDeque<LedgerEvent> = history
            .iter()
            .filter(|event| filter.matches(event))
            .cloned()
            .collect();
        drop(history);

        debug!(
            events = ?filter.events,
            from_block = filter.from_block,
            replayed = backlog.len(),
            "New subscription created"
        );

        Subscription::new(receiver, backlog, filter)
    }

    /// Get the number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of events currently retained for replay.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.lock().len()
    }

    /// Record and broadcast an event without awaiting.
    ///
    /// Callers that assign block numbers under their own lock use this to
    /// keep history in block order.
    pub fn send(&self, event: LedgerEvent) -> usize {
        self.events_published.fetch_add(1, Ordering::Relaxed);

        let mut history = self.history.lock();
        if self.history_capacity > 0 {
            if history.len() == self.history_capacity {
                history.pop_front();
            }
            history.push_back(event.clone());
        }

        let name = event.event.clone();
        let block = event.block_number;
        let receivers = self.sender.send(event).unwrap_or(0);
        drop(history);

        trace!(event = %name, block, receivers, "Event published");
        receivers
    }

    /// Block number of the most recent retained event.
    #[must_use]
    pub fn latest_block(&self) -> Option<u64> {
        self.history.lock().back().map(|event| event.block_number)
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: LedgerEvent) -> usize {
        self.send(event)
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
