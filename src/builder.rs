//! Unified cache builder for all eviction policies.
//!
//! Collects the tuning parameters of every variant in one place and hands
//! back a [`Cache`] that dispatches to the selected policy.
//!
//! ## Defaults
//!
//! | Parameter               | Default           | Used by        |
//! |-------------------------|-------------------|----------------|
//! | `history_capacity`      | same as capacity  | `LruK`         |
//! | `k`                     | 2                 | `LruK`         |
//! | `shards`                | 16                | `ShardedLru`   |
//! | `shard_capacity`        | ⌈capacity/shards⌉ | `ShardedLru`   |
//! | `max_average_frequency` | 10                | `Lfu`          |
//!
//! Parameters that do not apply to the selected policy are ignored.
//!
//! ## Example
//!
//! ```rust
//! use ledgercache::builder::{CacheBuilder, PolicyKind};
//! use ledgercache::traits::CachePolicy;
//!
//! let cache = CacheBuilder::new(100).build::<u64, String>(PolicyKind::Lru);
//! cache.put(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some("hello".to_string()));
//!
//! let gated = CacheBuilder::new(100)
//!     .k(3)
//!     .history_capacity(1_000)
//!     .try_build::<u64, String>(PolicyKind::LruK)
//!     .unwrap();
//! assert_eq!(gated.kind(), PolicyKind::LruK);
//! ```

use std::hash::Hash;

use crate::error::ConfigError;
use crate::policy::lfu::{DEFAULT_MAX_AVERAGE, LfuCache};
use crate::policy::lru::LruCache;
use crate::policy::lru_k::{DEFAULT_K, LrukCache};
use crate::policy::sharded_lru::{DEFAULT_SHARDS, ShardedLruCache};
use crate::traits::{CachePolicy, ConcurrentCache};

/// Available eviction policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    /// Least Recently Used eviction.
    Lru,
    /// Recency eviction behind a K-observation admission gate.
    LruK,
    /// Least Recently Used eviction over independently locked shards.
    ShardedLru,
    /// Least Frequently Used eviction with average-frequency decay.
    Lfu,
}

/// Cache of any policy behind one type.
pub struct Cache<K, V> {
    inner: CacheInner<K, V>,
}

enum CacheInner<K, V> {
    Lru(LruCache<K, V>),
    LruK(LrukCache<K, V>),
    ShardedLru(ShardedLruCache<K, V>),
    Lfu(LfuCache<K, V>),
}

impl<K, V> Cache<K, V> {
    /// The policy this cache was built with.
    pub fn kind(&self) -> PolicyKind {
        match &self.inner {
            CacheInner::Lru(_) => PolicyKind::Lru,
            CacheInner::LruK(_) => PolicyKind::LruK,
            CacheInner::ShardedLru(_) => PolicyKind::ShardedLru,
            CacheInner::Lfu(_) => PolicyKind::Lfu,
        }
    }
}

impl<K, V> CachePolicy<K, V> for Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&self, key: K, value: V) {
        match &self.inner {
            CacheInner::Lru(lru) => lru.put(key, value),
            CacheInner::LruK(lruk) => lruk.put(key, value),
            CacheInner::ShardedLru(sharded) => sharded.put(key, value),
            CacheInner::Lfu(lfu) => lfu.put(key, value),
        }
    }

    fn get(&self, key: &K) -> Option<V> {
        match &self.inner {
            CacheInner::Lru(lru) => lru.get(key),
            CacheInner::LruK(lruk) => lruk.get(key),
            CacheInner::ShardedLru(sharded) => sharded.get(key),
            CacheInner::Lfu(lfu) => lfu.get(key),
        }
    }

    fn remove(&self, key: &K) {
        match &self.inner {
            CacheInner::Lru(lru) => lru.remove(key),
            CacheInner::LruK(lruk) => lruk.remove(key),
            CacheInner::ShardedLru(sharded) => sharded.remove(key),
            CacheInner::Lfu(lfu) => lfu.remove(key),
        }
    }

    fn contains(&self, key: &K) -> bool {
        match &self.inner {
            CacheInner::Lru(lru) => lru.contains(key),
            CacheInner::LruK(lruk) => lruk.contains(key),
            CacheInner::ShardedLru(sharded) => sharded.contains(key),
            CacheInner::Lfu(lfu) => lfu.contains(key),
        }
    }

    fn len(&self) -> usize {
        match &self.inner {
            CacheInner::Lru(lru) => lru.len(),
            CacheInner::LruK(lruk) => lruk.len(),
            CacheInner::ShardedLru(sharded) => sharded.len(),
            CacheInner::Lfu(lfu) => lfu.len(),
        }
    }

    fn capacity(&self) -> usize {
        match &self.inner {
            CacheInner::Lru(lru) => lru.capacity(),
            CacheInner::LruK(lruk) => lruk.capacity(),
            CacheInner::ShardedLru(sharded) => sharded.capacity(),
            CacheInner::Lfu(lfu) => lfu.capacity(),
        }
    }

    fn clear(&self) {
        match &self.inner {
            CacheInner::Lru(lru) => lru.clear(),
            CacheInner::LruK(lruk) => lruk.clear(),
            CacheInner::ShardedLru(sharded) => sharded.clear(),
            CacheInner::Lfu(lfu) => lfu.clear(),
        }
    }
}

impl<K: Send, V: Send> ConcurrentCache for Cache<K, V> {}

impl<K, V> std::fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("kind", &self.kind())
            .finish_non_exhaustive()
    }
}

/// Builder for creating cache instances.
#[derive(Debug, Clone)]
pub struct CacheBuilder {
    capacity: usize,
    history_capacity: Option<usize>,
    k: usize,
    shards: usize,
    shard_capacity: Option<usize>,
    max_average_frequency: u64,
}

impl CacheBuilder {
    /// Create a new cache builder with the specified capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            history_capacity: None,
            k: DEFAULT_K,
            shards: DEFAULT_SHARDS,
            shard_capacity: None,
            max_average_frequency: DEFAULT_MAX_AVERAGE,
        }
    }

    /// Number of keys whose observation counts `LruK` remembers.
    pub fn history_capacity(mut self, history_capacity: usize) -> Self {
        self.history_capacity = Some(history_capacity);
        self
    }

    /// Observations `LruK` requires before admission.
    pub fn k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }

    /// Overrides the per-shard capacity derived from the total.
    pub fn shard_capacity(mut self, shard_capacity: usize) -> Self {
        self.shard_capacity = Some(shard_capacity);
        self
    }

    pub fn max_average_frequency(mut self, max_average_frequency: u64) -> Self {
        self.max_average_frequency = max_average_frequency;
        self
    }

    /// Build a cache with the specified policy.
    ///
    /// # Panics
    ///
    /// Panics if a parameter of the selected policy is out of range. See
    /// [`try_build`](Self::try_build).
    ///
    /// # Example
    ///
    /// ```rust
    /// use ledgercache::builder::{CacheBuilder, PolicyKind};
    ///
    /// let lru = CacheBuilder::new(100).build::<u64, String>(PolicyKind::Lru);
    /// let lfu = CacheBuilder::new(100)
    ///     .max_average_frequency(4)
    ///     .build::<u64, String>(PolicyKind::Lfu);
    /// let sharded = CacheBuilder::new(100)
    ///     .shards(4)
    ///     .build::<u64, String>(PolicyKind::ShardedLru);
    /// ```
    pub fn build<K, V>(self, policy: PolicyKind) -> Cache<K, V>
    where
        K: Eq + Hash + Clone,
    {
        match self.try_build(policy) {
            Ok(cache) => cache,
            Err(err) => panic!("{}", err),
        }
    }

    /// Fallible version of [`build`](Self::build).
    ///
    /// ```rust
    /// use ledgercache::builder::{CacheBuilder, PolicyKind};
    ///
    /// let err = CacheBuilder::new(10)
    ///     .shards(0)
    ///     .try_build::<u64, u64>(PolicyKind::ShardedLru)
    ///     .unwrap_err();
    /// assert!(err.to_string().contains("shard"));
    ///
    /// // Parameters of other policies are not validated.
    /// assert!(CacheBuilder::new(10).shards(0).try_build::<u64, u64>(PolicyKind::Lru).is_ok());
    /// ```
    pub fn try_build<K, V>(self, policy: PolicyKind) -> Result<Cache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        let inner = match policy {
            PolicyKind::Lru => CacheInner::Lru(LruCache::new(self.capacity)),
            PolicyKind::LruK => CacheInner::LruK(LrukCache::try_new(
                self.capacity,
                self.history_capacity.unwrap_or(self.capacity),
                self.k,
            )?),
            PolicyKind::ShardedLru => CacheInner::ShardedLru(match self.shard_capacity {
                Some(per_shard) => ShardedLruCache::try_with_shard_capacity(self.shards, per_shard)?,
                None => ShardedLruCache::try_new(self.capacity, self.shards)?,
            }),
            PolicyKind::Lfu => CacheInner::Lfu(LfuCache::try_with_max_average(
                self.capacity,
                self.max_average_frequency,
            )?),
        };

        Ok(Cache { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [PolicyKind; 4] = [
        PolicyKind::Lru,
        PolicyKind::LruK,
        PolicyKind::ShardedLru,
        PolicyKind::Lfu,
    ];

    #[test]
    fn all_policies_basic_ops() {
        for policy in ALL {
            let cache = CacheBuilder::new(10).k(1).shards(2).build::<u64, String>(policy);
            assert_eq!(cache.kind(), policy);

            cache.put(1, "one".to_string());
            cache.put(2, "two".to_string());

            assert_eq!(cache.get(&1), Some("one".to_string()), "{:?}", policy);
            assert_eq!(cache.get(&2), Some("two".to_string()), "{:?}", policy);
            assert_eq!(cache.get(&3), None);

            assert!(cache.contains(&1));
            assert!(!cache.contains(&99));

            assert_eq!(cache.len(), 2);
            assert!(!cache.is_empty());

            cache.put(1, "ONE".to_string());
            assert_eq!(cache.get(&1), Some("ONE".to_string()));

            cache.remove(&2);
            assert!(!cache.contains(&2));

            cache.clear();
            assert!(cache.is_empty());
        }
    }

    #[test]
    fn capacity_enforcement() {
        let cache = CacheBuilder::new(2).build::<u64, String>(PolicyKind::Lru);

        cache.put(1, "one".to_string());
        cache.put(2, "two".to_string());
        cache.put(3, "three".to_string());

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&1));
        assert!(cache.contains(&2));
        assert!(cache.contains(&3));
    }

    #[test]
    fn default_k_gates_lru_k() {
        let cache = CacheBuilder::new(4).build::<u64, u64>(PolicyKind::LruK);
        cache.put(1, 1);
        assert!(!cache.contains(&1));
        cache.put(1, 1);
        assert!(cache.contains(&1));
    }

    #[test]
    fn sharded_capacity_options() {
        let derived = CacheBuilder::new(10).shards(4).build::<u64, u64>(PolicyKind::ShardedLru);
        assert_eq!(derived.capacity(), 12);

        let explicit = CacheBuilder::new(10)
            .shards(2)
            .shard_capacity(7)
            .build::<u64, u64>(PolicyKind::ShardedLru);
        assert_eq!(explicit.capacity(), 14);
    }

    #[test]
    fn invalid_parameters_are_reported() {
        assert!(CacheBuilder::new(4).k(0).try_build::<u8, u8>(PolicyKind::LruK).is_err());
        assert!(CacheBuilder::new(4).shards(0).try_build::<u8, u8>(PolicyKind::ShardedLru).is_err());
        assert!(
            CacheBuilder::new(4)
                .max_average_frequency(0)
                .try_build::<u8, u8>(PolicyKind::Lfu)
                .is_err()
        );
    }

    #[test]
    #[should_panic(expected = "k must be at least 1")]
    fn build_panics_on_invalid_parameters() {
        let _ = CacheBuilder::new(4).k(0).build::<u8, u8>(PolicyKind::LruK);
    }

    #[test]
    fn zero_capacity_builds_inert_caches() {
        for policy in ALL {
            let cache = CacheBuilder::new(0).k(1).build::<u64, u64>(policy);
            cache.put(1, 1);
            assert_eq!(cache.get(&1), None, "{:?}", policy);
            assert!(cache.is_empty());
        }
    }
}
