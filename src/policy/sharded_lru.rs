//! # Sharded LRU Cache
//!
//! Partitions the key space over a fixed set of independently locked
//! recency ledgers so that threads touching different keys rarely contend.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                    ShardedLruCache<K, V>                             │
//!   │                                                                      │
//!   │   key ──► ShardSelector::shard_for_key(key) ──► i ∈ [0, N)           │
//!   │                                                                      │
//!   │   ┌───────────────┐ ┌───────────────┐       ┌───────────────┐        │
//!   │   │ Mutex<        │ │ Mutex<        │  ...  │ Mutex<        │        │
//!   │   │  LruCore>  #0 │ │  LruCore>  #1 │       │  LruCore> #N-1│        │
//!   │   │ cap = ⌈C/N⌉   │ │ cap = ⌈C/N⌉   │       │ cap = ⌈C/N⌉   │        │
//!   │   └───────────────┘ └───────────────┘       └───────────────┘        │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Semantics
//!
//! - Every shard is built in the constructor; the set never grows, shrinks
//!   or rebalances.
//! - `put`/`get`/`remove` lock only the owning shard. No operation holds two
//!   shard locks at once.
//! - The capacity bound holds per shard. Eviction inside one shard ignores
//!   the others, so a hot shard evicts while cold shards still have room.
//! - Aggregates such as `len` visit shards one after another and are not a
//!   consistent snapshot under concurrent mutation.
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//!
//! use ledgercache::policy::sharded_lru::ShardedLruCache;
//! use ledgercache::traits::CachePolicy;
//!
//! let cache = Arc::new(ShardedLruCache::new(1024, 8));
//!
//! let handles: Vec<_> = (0..4u64)
//!     .map(|t| {
//!         let cache = Arc::clone(&cache);
//!         thread::spawn(move || {
//!             for i in 0..100 {
//!                 cache.put(t * 1_000 + i, i);
//!             }
//!         })
//!     })
//!     .collect();
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//!
//! assert_eq!(cache.len(), 400);
//! ```

use std::fmt;
use std::hash::Hash;

use parking_lot::Mutex;

use crate::ds::shard::ShardSelector;
use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LruMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::MetricsSnapshotProvider;
use crate::policy::lru::LruCore;
use crate::traits::{CachePolicy, ConcurrentCache};

/// Shard count used when none is configured.
pub const DEFAULT_SHARDS: usize = 16;

const SHARD_SEED: u64 = 0;

/// Recency cache split over `N` independently locked shards.
pub struct ShardedLruCache<K, V> {
    shards: Box<[Mutex<LruCore<K, V>>]>,
    selector: ShardSelector,
    shard_capacity: usize,
}

impl<K, V> ShardedLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Splits `total_capacity` over `shards` shards of `⌈total / shards⌉`
    /// entries each.
    ///
    /// # Panics
    ///
    /// Panics if `shards` is 0.
    pub fn new(total_capacity: usize, shards: usize) -> Self {
        match Self::try_new(total_capacity, shards) {
            Ok(cache) => cache,
            Err(err) => panic!("{}", err),
        }
    }

    /// Fallible version of [`new`](Self::new).
    ///
    /// ```
    /// use ledgercache::policy::sharded_lru::ShardedLruCache;
    ///
    /// let cache = ShardedLruCache::<u64, u64>::try_new(10, 4).unwrap();
    /// assert_eq!(cache.shard_capacity(), 3);
    /// assert!(ShardedLruCache::<u64, u64>::try_new(10, 0).is_err());
    /// ```
    pub fn try_new(total_capacity: usize, shards: usize) -> Result<Self, ConfigError> {
        if shards == 0 {
            return Err(ConfigError::new("shard count must be at least 1, got 0"));
        }
        Self::try_with_shard_capacity(shards, total_capacity.div_ceil(shards))
    }

    /// Builds `shards` shards of exactly `shard_capacity` entries each.
    ///
    /// # Panics
    ///
    /// Panics if `shards` is 0.
    pub fn with_shard_capacity(shards: usize, shard_capacity: usize) -> Self {
        match Self::try_with_shard_capacity(shards, shard_capacity) {
            Ok(cache) => cache,
            Err(err) => panic!("{}", err),
        }
    }

    pub fn try_with_shard_capacity(shards: usize, shard_capacity: usize) -> Result<Self, ConfigError> {
        if shards == 0 {
            return Err(ConfigError::new("shard count must be at least 1, got 0"));
        }
        let shards: Box<[_]> = (0..shards)
            .map(|_| Mutex::new(LruCore::new(shard_capacity)))
            .collect();
        Ok(Self {
            selector: ShardSelector::new(shards.len(), SHARD_SEED),
            shards,
            shard_capacity,
        })
    }

    #[inline]
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    #[inline]
    pub fn shard_capacity(&self) -> usize {
        self.shard_capacity
    }

    /// Index of the shard that owns `key`.
    #[inline]
    pub fn shard_for_key(&self, key: &K) -> usize {
        self.selector.shard_for_key(key)
    }

    /// Number of entries in shard `index`, or `None` if out of range.
    pub fn shard_len(&self, index: usize) -> Option<usize> {
        self.shards.get(index).map(|shard| shard.lock().len())
    }

    /// Reads `key` without promoting it.
    pub fn peek(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.shard(key).lock().peek(key).cloned()
    }

    /// Checks every shard, and that every resident key sits in the shard it
    /// routes to.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        for (index, shard) in self.shards.iter().enumerate() {
            let core = shard.lock();
            core.check_invariants()?;
            if core.keys_lru_to_mru().any(|key| self.selector.shard_for_key(key) != index) {
                return Err(InvariantError::new(format!(
                    "shard {} holds a key routed elsewhere",
                    index
                )));
            }
        }
        Ok(())
    }

    #[inline]
    fn shard(&self, key: &K) -> &Mutex<LruCore<K, V>> {
        &self.shards[self.selector.shard_for_key(key)]
    }
}

#[cfg(feature = "metrics")]
impl<K, V> ShardedLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Counters of all shards summed field by field.
    pub fn metrics_snapshot(&self) -> LruMetricsSnapshot {
        self.shards
            .iter()
            .map(|shard| shard.lock().metrics_snapshot())
            .fold(LruMetricsSnapshot::default(), |acc, snap| acc + snap)
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LruMetricsSnapshot> for ShardedLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> LruMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> CachePolicy<K, V> for ShardedLruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&self, key: K, value: V) {
        self.shard(&key).lock().insert(key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        self.shard(key).lock().get(key).cloned()
    }

    fn remove(&self, key: &K) {
        self.shard(key).lock().remove(key);
    }

    fn contains(&self, key: &K) -> bool {
        self.shard(key).lock().contains(key)
    }

    fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }

    /// Sum of shard capacities. May exceed the requested total by up to
    /// `N - 1` because per-shard capacity rounds up.
    fn capacity(&self) -> usize {
        self.shard_capacity * self.shards.len()
    }

    fn clear(&self) {
        for shard in self.shards.iter() {
            shard.lock().clear();
        }
    }
}

impl<K: Send, V: Send> ConcurrentCache for ShardedLruCache<K, V> {}

impl<K, V> fmt::Debug for ShardedLruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedLruCache")
            .field("shards", &self.shards.len())
            .field("shard_capacity", &self.shard_capacity)
            .finish_non_exhaustive()
    }
}
