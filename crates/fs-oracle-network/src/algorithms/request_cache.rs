//! # Request Dedup Cache
//!
//! Remembers recently dispatched request keys so a re-delivered
//! `OracleRequest` does not fan out again.
//!
//! - Keys expire after the TTL and are then treated as new
//! - Expired keys are garbage-collected at most once per GC interval
//! - At capacity the oldest key is evicted

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use crate::domain::RequestKey;

/// Bounded, time-limited set of seen request keys.
///
/// Time is passed in by the caller so tests can drive it.
#[derive(Debug)]
pub struct RequestDedupCache {
    /// Key -> when it was first seen.
    seen: HashMap<RequestKey, Instant>,

    /// Insertion order, oldest first.
    order: VecDeque<(RequestKey, Instant)>,

    ttl: Duration,
    capacity: usize,
    gc_interval: Duration,
    last_gc: Option<Instant>,
}

impl RequestDedupCache {
    /// Default garbage collection interval.
    pub const DEFAULT_GC_INTERVAL: Duration = Duration::from_secs(10);

    /// Create a cache holding at most `capacity` keys for `ttl` each.
    #[must_use]
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            seen: HashMap::new(),
            order: VecDeque::new(),
            ttl,
            capacity: capacity.max(1),
            gc_interval: Self::DEFAULT_GC_INTERVAL.min(ttl),
            last_gc: None,
        }
    }

    /// Record `key` as seen at `now`.
    ///
    /// Returns `true` if the key is new (or its previous sighting expired),
    /// `false` if it was seen within the TTL.
    pub fn check_and_insert(&mut self, key: RequestKey, now: Instant) -> bool {
        let due = self
            .last_gc
            .map_or(true, |last| now.saturating_duration_since(last) >= self.gc_interval);
        if due {
            self.garbage_collect(now);
        }

        if let Some(first_seen) = self.seen.get(&key) {
            if now.saturating_duration_since(*first_seen) < self.ttl {
                return false;
            }
        }

        if self.seen.len() >= self.capacity && !self.seen.contains_key(&key) {
            self.garbage_collect(now);
            while self.seen.len() >= self.capacity {
                if !self.evict_oldest() {
                    break;
                }
            }
        }

        self.seen.insert(key.clone(), now);
        self.order.push_back((key, now));
        true
    }

    /// Whether `key` is currently remembered.
    #[must_use]
    pub fn contains(&self, key: &RequestKey, now: Instant) -> bool {
        self.seen
            .get(key)
            .is_some_and(|first_seen| now.saturating_duration_since(*first_seen) < self.ttl)
    }

    /// Number of remembered keys, including any not yet collected.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Drop every expired key.
    pub fn garbage_collect(&mut self, now: Instant) {
        while let Some((_, inserted)) = self.order.front() {
            if now.saturating_duration_since(*inserted) < self.ttl {
                break;
            }
            self.evict_oldest();
        }
        self.last_gc = Some(now);
    }

    fn evict_oldest(&mut self) -> bool {
        let Some((key, inserted)) = self.order.pop_front() else {
            return false;
        };
        // A key re-inserted after expiry has a newer entry further back.
        if self.seen.get(&key) == Some(&inserted) {
            self.seen.remove(&key);
        }
        true
    }
}
