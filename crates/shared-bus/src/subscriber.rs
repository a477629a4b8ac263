//! # Event Subscriber
//!
//! Defines the subscription side of the event bus.

use crate::events::{EventFilter, LedgerEvent};
use std::collections::VecDeque;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::warn;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The event bus was closed.
    #[error("Event bus closed")]
    Closed,
}

/// A subscription handle for receiving events.
///
/// Replayed events are delivered before live ones.
pub struct Subscription {
    /// The broadcast receiver.
    receiver: broadcast::Receiver<LedgerEvent>,

    /// Events replayed from history, delivered first.
    backlog: VecDeque<LedgerEvent>,

    /// Filter for this subscription.
    filter: EventFilter,

    /// Events lost because this subscriber lagged.
    lagged: u64,
}

impl Subscription {
    /// Create a new subscription.
    pub(crate) fn new(
        receiver: broadcast::Receiver<LedgerEvent>,
        backlog: VecDeque<LedgerEvent>,
        filter: EventFilter,
    ) -> Self {
        Self {
            receiver,
            backlog,
            filter,
            lagged: 0,
        }
    }

    /// Receive the next event that matches the filter.
    ///
    /// # Returns
    ///
    /// - `Some(event)` - The next matching event
    /// - `None` - The channel was closed (bus dropped)
    pub async fn recv(&mut self) -> Option<LedgerEvent> {
        if let Some(event) = self.backlog.pop_front() {
            return Some(event);
        }

        loop {
            let event = match self.receiver.recv().await {
                Ok(e) => e,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    self.lagged += count;
                    warn!(lagged = count, "Subscriber lagged, some events dropped");
                    continue;
                }
            };

            if self.filter.matches(&event) {
                return Some(event);
            }
        }
    }

    /// Try to receive the next event without blocking.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(event))` - An event was available and matched
    /// - `Ok(None)` - No event available (would block)
    /// - `Err(SubscriptionError::Closed)` - The channel was closed
    pub fn try_recv(&mut self) -> Result<Option<LedgerEvent>, SubscriptionError> {
        if let Some(event) = self.backlog.pop_front() {
            return Ok(Some(event));
        }

        loop {
            let event = match self.receiver.try_recv() {
                Ok(e) => e,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(count)) => {
                    self.lagged += count;
                    continue;
                }
            };

            if self.filter.matches(&event) {
                return Ok(Some(event));
            }
        }
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    /// Replayed events not yet consumed.
    #[must_use]
    pub fn pending_replay(&self) -> usize {
        self.backlog.len()
    }

    /// Total events skipped because this subscriber fell behind.
    #[must_use]
    pub fn lagged(&self) -> u64 {
        self.lagged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::event_names;
    use crate::publisher::{EventPublisher, InMemoryEventBus};
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::timeout;

    fn event(block: u64, name: &str) -> LedgerEvent {
        LedgerEvent::new(block, name, json!({}))
    }

    #[tokio::test]
    async fn test_subscription_recv() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::all());

        bus.publish(event(1, event_names::ORACLE_REQUEST)).await;

        let received = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("should receive event");
        assert_eq!(received.block_number, 1);
    }

    #[tokio::test]
    async fn test_subscription_filters_by_name() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::events([event_names::ORACLE_REQUEST]));

        bus.publish(event(1, event_names::ORACLE_REPORT)).await;
        bus.publish(event(2, event_names::ORACLE_REQUEST)).await;

        let received = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("should receive event");
        assert_eq!(received.block_number, 2);
        assert_eq!(received.event, event_names::ORACLE_REQUEST);
    }

    #[tokio::test]
    async fn test_replay_from_block() {
        let bus = InMemoryEventBus::new();
        for block in 1..=4 {
            bus.publish(event(block, event_names::ORACLE_REQUEST)).await;
        }

        let mut sub = bus.subscribe(EventFilter::all().from_block(3));
        assert_eq!(sub.pending_replay(), 2);

        bus.publish(event(5, event_names::ORACLE_REQUEST)).await;

        let mut blocks = Vec::new();
        for _ in 0..3 {
            let e = timeout(Duration::from_millis(100), sub.recv())
                .await
                .expect("timeout")
                .expect("event");
            blocks.push(e.block_number);
        }
        assert_eq!(blocks, vec![3, 4, 5]);
    }

    #[tokio::test]
    async fn test_try_recv_empty() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::all());
        assert_eq!(sub.try_recv(), Ok(None));
    }

    #[tokio::test]
    async fn test_recv_returns_none_when_bus_dropped() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::all());
        drop(bus);

        assert!(sub.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_lagged_subscriber_skips_and_counts() {
        let bus = InMemoryEventBus::with_capacity(2, 0);
        let mut sub = bus.subscribe(EventFilter::all());

        for block in 1..=5 {
            bus.publish(event(block, event_names::ORACLE_REQUEST)).await;
        }

        let first = sub.recv().await.expect("event");
        assert!(first.block_number >= 4);
        assert_eq!(sub.lagged(), 3);
    }
}
