//! # Status Code Generation
//!
//! Uniform selection over the six canonical flight status codes.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared_types::StatusCode;

use crate::ports::outbound::StatusCodeSource;

/// Pick one status code uniformly from all six.
pub fn pick_status_code<R: Rng + ?Sized>(rng: &mut R) -> StatusCode {
    StatusCode::ALL[rng.gen_range(0..StatusCode::ALL.len())]
}

/// Thread-safe random status codes for the dispatcher.
///
/// Uses the thread-local RNG unless built with a seed.
#[derive(Debug, Default)]
pub struct RandomStatusCodes {
    seeded: Option<Mutex<StdRng>>,
}

impl RandomStatusCodes {
    /// Codes drawn from the thread-local RNG.
    #[must_use]
    pub fn new() -> Self {
        Self { seeded: None }
    }

    /// Reproducible sequence.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seeded: Some(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }
}

impl StatusCodeSource for RandomStatusCodes {
    fn next(&self) -> StatusCode {
        match &self.seeded {
            Some(rng) => pick_status_code(&mut *rng.lock()),
            None => pick_status_code(&mut rand::thread_rng()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_codes_are_canonical() {
        let source = RandomStatusCodes::new();
        for _ in 0..1_000 {
            let code = source.next();
            assert!(StatusCode::ALL.contains(&code));
            assert_eq!(code.as_u8() % 10, 0);
            assert!(code.as_u8() <= 50);
        }
    }

    #[test]
    fn test_distribution_is_uniform() {
        let source = RandomStatusCodes::with_seed(7);
        let mut counts: HashMap<StatusCode, u32> = HashMap::new();
        for _ in 0..10_000 {
            *counts.entry(source.next()).or_default() += 1;
        }

        // Expected 1667 each; 200 is over 5 standard deviations.
        for code in StatusCode::ALL {
            let seen = counts.get(&code).copied().unwrap_or(0);
            assert!(
                (1_467..=1_867).contains(&seen),
                "{code} seen {seen} times"
            );
        }
    }

    #[test]
    fn test_unknown_and_late_other_both_reachable() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut saw_first = false;
        let mut saw_last = false;
        for _ in 0..500 {
            match pick_status_code(&mut rng) {
                StatusCode::Unknown => saw_first = true,
                StatusCode::LateOther => saw_last = true,
                _ => {}
            }
        }
        assert!(saw_first && saw_last);
    }

    #[test]
    fn test_seeded_sources_repeat() {
        let a = RandomStatusCodes::with_seed(42);
        let b = RandomStatusCodes::with_seed(42);
        let left: Vec<_> = (0..20).map(|_| a.next()).collect();
        let right: Vec<_> = (0..20).map(|_| b.next()).collect();
        assert_eq!(left, right);
    }
}
