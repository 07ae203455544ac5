//! Deterministic key-to-shard mapping.
//!
//! Used by [`ShardedLruCache`](crate::policy::sharded_lru::ShardedLruCache)
//! to route every key to one of its fixed set of independently locked
//! ledgers.
//!
//! ## Architecture
//!
//! ```text
//!   Input Key
//!       │
//!       ▼
//!   ┌───────────────────────────────────────────────┐
//!   │  ShardSelector { shards: 4, seed: 42 }        │
//!   │                                               │
//!   │  1. DefaultHasher::new()                      │
//!   │  2. seed.hash(&mut hasher)                    │
//!   │  3. key.hash(&mut hasher)                     │
//!   │  4. hasher.finish() % 4                       │
//!   └───────────────────────────────────────────────┘
//!       │
//!       ▼
//!   ┌─────────┬─────────┬─────────┬─────────┐
//!   │ Shard 0 │ Shard 1 │ Shard 2 │ Shard 3 │
//!   └─────────┴─────────┴─────────┴─────────┘
//! ```
//!
//! The same `(key, seed, shards)` always yields the same shard. The mapping
//! is fixed for the life of the selector; there is no rebalancing.
//!
//! ## Example Usage
//!
//! ```
//! use ledgercache::ds::ShardSelector;
//!
//! let selector = ShardSelector::new(4, 0);
//! let shard = selector.shard_for_key(&"user:123");
//! assert!(shard < 4);
//! assert_eq!(selector.shard_for_key(&"user:123"), shard);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Deterministic shard selector using a seeded hash.
///
/// Maps any `Hash`able key to a shard index in `[0, shards)`.
///
/// ```
/// use ledgercache::ds::ShardSelector;
///
/// let sel1 = ShardSelector::new(8, 100);
/// let sel2 = ShardSelector::new(8, 200);
///
/// // Different seeds give independent distributions over the same shards.
/// assert!(sel1.shard_for_key(&"test") < 8);
/// assert!(sel2.shard_for_key(&"test") < 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSelector {
    shards: usize,
    seed: u64,
}

impl ShardSelector {
    /// Creates a selector for `shards` shards with the given `seed`.
    ///
    /// The shard count is clamped to at least 1; callers that must reject a
    /// zero count validate before constructing.
    ///
    /// ```
    /// use ledgercache::ds::ShardSelector;
    ///
    /// assert_eq!(ShardSelector::new(16, 0).shard_count(), 16);
    /// assert_eq!(ShardSelector::new(0, 0).shard_count(), 1);
    /// ```
    pub fn new(shards: usize, seed: u64) -> Self {
        Self {
            shards: shards.max(1),
            seed,
        }
    }

    /// Returns the number of shards.
    pub fn shard_count(&self) -> usize {
        self.shards
    }

    /// Maps a key to a shard index in `[0, shards)`.
    pub fn shard_for_key<K: Hash + ?Sized>(&self, key: &K) -> usize {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        key.hash(&mut hasher);
        (hasher.finish() % self.shards as u64) as usize
    }
}

impl Default for ShardSelector {
    /// Creates a single-shard selector with seed 0.
    fn default() -> Self {
        Self::new(1, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shard_selector_is_deterministic() {
        let selector = ShardSelector::new(8, 123);
        let a = selector.shard_for_key(&"key");
        let b = selector.shard_for_key(&"key");
        assert_eq!(a, b);
        assert!(a < selector.shard_count());
    }

    #[test]
    fn single_shard_maps_everything_to_zero() {
        let selector = ShardSelector::default();
        for key in 0..100u64 {
            assert_eq!(selector.shard_for_key(&key), 0);
        }
    }

    #[test]
    fn keys_spread_over_all_shards() {
        let selector = ShardSelector::new(4, 7);
        let mut hits = [0usize; 4];
        for key in 0..1_000u64 {
            hits[selector.shard_for_key(&key)] += 1;
        }
        assert!(hits.iter().all(|&n| n > 0), "distribution: {:?}", hits);
    }
}
