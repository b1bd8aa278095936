//! Tie-break policies.
//!
//! Clustering picks among equally good candidates in several places: seed
//! sampling, tied assignments, and donor selection when an empty cluster has
//! to be filled. The policy is injected so tests can be deterministic.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Chooses among `len` equally ranked candidates.
///
/// Callers guarantee `len > 0` and `amount <= len`.
pub trait TieBreaker: Send + Sync {
    /// Returns an index in `0..len`.
    fn choose(&self, len: usize) -> usize;

    /// Returns `amount` distinct indices from `0..len`.
    fn sample(&self, len: usize, amount: usize) -> Vec<usize>;
}

/// Uniformly random choices from a seedable generator.
#[derive(Debug)]
pub struct RandomTieBreaker {
    rng: Mutex<StdRng>,
}

impl RandomTieBreaker {
    /// Reproducible choices for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

impl Default for RandomTieBreaker {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl TieBreaker for RandomTieBreaker {
    fn choose(&self, len: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(0..len.max(1))
    }

    fn sample(&self, len: usize, amount: usize) -> Vec<usize> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rand::seq::index::sample(&mut *rng, len, amount.min(len)).into_vec()
    }
}

/// Deterministic rotation through the candidates.
#[derive(Debug, Default)]
pub struct RoundRobinTieBreaker {
    next: AtomicUsize,
}

impl RoundRobinTieBreaker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TieBreaker for RoundRobinTieBreaker {
    fn choose(&self, len: usize) -> usize {
        self.next.fetch_add(1, Ordering::Relaxed) % len.max(1)
    }

    fn sample(&self, len: usize, amount: usize) -> Vec<usize> {
        let len = len.max(1);
        let start = self.next.fetch_add(1, Ordering::Relaxed) % len;
        (0..amount.min(len)).map(|i| (start + i) % len).collect()
    }
}
