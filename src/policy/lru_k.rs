//! # LRU-K Cache Implementation
//!
//! History-gated admission on top of the recency ledger: a key has to be
//! observed K times before its value is stored at all. One-off keys, such as
//! those touched by a sequential scan, only ever reach the bounded history
//! ledger and never displace resident entries.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────────┐
//!   │                          LrukCache<K, V>                                 │
//!   │                                                                          │
//!   │   Mutex<LrukState> (one lock around both ledgers)                        │
//!   │   ┌────────────────────────────────────────────────────────────────────┐ │
//!   │   │  history: LruCore<K, usize>       primary: LruCore<K, V>           │ │
//!   │   │  ┌─────────┬────────┐             ┌─────────┬──────────────┐       │ │
//!   │   │  │   Key   │ Count  │             │   Key   │ Value        │       │ │
//!   │   │  ├─────────┼────────┤  count ≥ K  ├─────────┼──────────────┤       │ │
//!   │   │  │ page_7  │ 1      │ ──────────► │ page_1  │ ...          │       │ │
//!   │   │  │ page_9  │ 1      │   admit     │ page_3  │ ...          │       │ │
//!   │   │  └─────────┴────────┘             └─────────┴──────────────┘       │ │
//!   │   │  bounded, evicts by recency        bounded, evicts by recency      │ │
//!   │   └────────────────────────────────────────────────────────────────────┘ │
//!   │                                                                          │
//!   │   Configuration:                                                         │
//!   │   • capacity: primary ledger size                                        │
//!   │   • history_capacity: number of keys whose counts are remembered         │
//!   │   • k: observations required before admission (default: 2)              │
//!   └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Admission Flow
//!
//! ```text
//!   put(key, value)
//!   ═══════════════
//!   primary capacity == 0? ──yes──► no-op
//!        │
//!        no
//!        ▼
//!   key in primary? ──yes──► update in place (gate bypassed)
//!        │
//!        no
//!        ▼
//!   count = history[key] + 1
//!        │
//!        ├── count <  K ──► remember count, drop value
//!        │
//!        └── count >= K ──► forget history, insert into primary
//!
//!   get(key)
//!   ════════
//!   history[key] += 1   (also for keys already resident)
//!   return primary.get(key)
//! ```
//!
//! Counts are forgotten when the history ledger evicts a key, after which
//! the key starts from zero again.
//!
//! ## Scan Resistance
//!
//! ```text
//!   K = 2, capacity = 3, primary = [A, B, C]
//!
//!   scan X₁ X₂ X₃ X₄ (one put each)
//!     history: X₁:1 X₂:1 X₃:1 X₄:1
//!     primary: [A, B, C]        ← untouched
//! ```
//!
//! ## Thread Safety
//!
//! Both ledgers sit behind one `parking_lot::Mutex`, so the history count
//! and the primary lookup of a single `get` or `put` happen atomically.

use std::fmt;
use std::hash::Hash;

use parking_lot::Mutex;

use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::LrukMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LrukMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{LrukMetricsRecorder, MetricsSnapshotProvider};
use crate::policy::lru::LruCore;
use crate::traits::{CachePolicy, ConcurrentCache};

/// Default number of observations required before admission.
pub const DEFAULT_K: usize = 2;

struct LrukState<K, V> {
    primary: LruCore<K, V>,
    history: LruCore<K, usize>,
    #[cfg(feature = "metrics")]
    metrics: LrukMetrics,
}

impl<K, V> LrukState<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Counts one more observation of `key` and returns the new count.
    fn observe(&mut self, key: &K) -> usize {
        #[cfg(feature = "metrics")]
        self.metrics.record_history_observation();

        if let Some(count) = self.history.get_mut(key) {
            *count += 1;
            return *count;
        }
        // A zero-capacity history drops this; the key stays at one.
        self.history.insert(key.clone(), 1);
        1
    }
}

/// Cache that admits a key only after `k` observations.
///
/// # Example
///
/// ```
/// use ledgercache::policy::lru_k::LrukCache;
/// use ledgercache::traits::CachePolicy;
///
/// let cache = LrukCache::new(2, 8, 2);
///
/// cache.put("hot", 1);
/// cache.put("hot", 1);
/// assert!(cache.contains(&"hot"));
///
/// // A scan of one-off keys only reaches the history.
/// for key in ["s1", "s2", "s3"] {
///     cache.put(key, 0);
/// }
/// assert!(cache.contains(&"hot"));
/// assert_eq!(cache.len(), 1);
/// assert_eq!(cache.history_len(), 3);
/// ```
pub struct LrukCache<K, V> {
    state: Mutex<LrukState<K, V>>,
    k: usize,
}

impl<K, V> LrukCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache storing up to `capacity` entries, remembering counts
    /// for up to `history_capacity` keys and admitting on the `k`-th
    /// observation.
    ///
    /// # Panics
    ///
    /// Panics if `k` is 0. Use [`try_new`](Self::try_new) to get an error
    /// instead.
    pub fn new(capacity: usize, history_capacity: usize, k: usize) -> Self {
        match Self::try_new(capacity, history_capacity, k) {
            Ok(cache) => cache,
            Err(err) => panic!("{}", err),
        }
    }

    /// Creates a cache with the default `k` of 2 and a history as large as
    /// the primary ledger.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(capacity, capacity, DEFAULT_K)
    }

    /// Fallible constructor.
    ///
    /// ```
    /// use ledgercache::policy::lru_k::LrukCache;
    ///
    /// assert!(LrukCache::<u64, u64>::try_new(10, 10, 3).is_ok());
    /// assert!(LrukCache::<u64, u64>::try_new(10, 10, 0).is_err());
    /// ```
    pub fn try_new(capacity: usize, history_capacity: usize, k: usize) -> Result<Self, ConfigError> {
        if k == 0 {
            return Err(ConfigError::new("k must be at least 1, got 0"));
        }
        Ok(Self {
            state: Mutex::new(LrukState {
                primary: LruCore::new(capacity),
                history: LruCore::new(history_capacity),
                #[cfg(feature = "metrics")]
                metrics: LrukMetrics::default(),
            }),
            k,
        })
    }

    /// Observations required before a key is admitted.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of keys currently holding an observation count.
    pub fn history_len(&self) -> usize {
        self.state.lock().history.len()
    }

    pub fn history_capacity(&self) -> usize {
        self.state.lock().history.capacity()
    }

    /// Current observation count of `key`, 0 if it has none.
    ///
    /// Reading the count does not change its recency in the history ledger.
    pub fn history_count(&self, key: &K) -> usize {
        self.state.lock().history.peek(key).copied().unwrap_or(0)
    }

    /// Reads `key` from the primary ledger without observing or promoting it.
    pub fn peek(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.state.lock().primary.peek(key).cloned()
    }

    /// Verifies both ledgers.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let state = self.state.lock();
        state.primary.check_invariants()?;
        state.history.check_invariants()?;
        Ok(())
    }
}

#[cfg(feature = "metrics")]
impl<K, V> LrukCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn metrics_snapshot(&self) -> LrukMetricsSnapshot {
        let state = self.state.lock();
        LrukMetricsSnapshot {
            history_observations: state.metrics.history_observations,
            admissions: state.metrics.admissions,
            gated_puts: state.metrics.gated_puts,
            history_len: state.history.len(),
            history_capacity: state.history.capacity(),
            primary: state.primary.metrics_snapshot(),
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LrukMetricsSnapshot> for LrukCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> LrukMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> CachePolicy<K, V> for LrukCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&self, key: K, value: V) {
        let mut state = self.state.lock();
        if state.primary.capacity() == 0 {
            return;
        }
        if state.primary.contains(&key) {
            state.primary.insert(key, value);
            return;
        }

        let count = state.observe(&key);
        if count < self.k {
            #[cfg(feature = "metrics")]
            state.metrics.record_gated_put();
            return;
        }

        state.history.remove(&key);
        state.primary.insert(key, value);

        #[cfg(feature = "metrics")]
        state.metrics.record_admission();

        tracing::debug!(count, k = self.k, "admitted key into primary ledger");
    }

    fn get(&self, key: &K) -> Option<V> {
        let mut state = self.state.lock();
        if state.primary.capacity() == 0 {
            return None;
        }
        state.observe(key);
        state.primary.get(key).cloned()
    }

    /// Removes `key` from the primary ledger and forgets its history.
    fn remove(&self, key: &K) {
        let mut state = self.state.lock();
        state.primary.remove(key);
        state.history.remove(key);
    }

    fn contains(&self, key: &K) -> bool {
        self.state.lock().primary.contains(key)
    }

    fn len(&self) -> usize {
        self.state.lock().primary.len()
    }

    fn capacity(&self) -> usize {
        self.state.lock().primary.capacity()
    }

    fn clear(&self) {
        let mut state = self.state.lock();
        state.primary.clear();
        state.history.clear();
    }
}

impl<K: Send, V: Send> ConcurrentCache for LrukCache<K, V> {}

impl<K, V> fmt::Debug for LrukCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("LrukCache")
            .field("k", &self.k)
            .field("primary", &state.primary)
            .field("history", &state.history)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    mod admission {
        use super::super::*;

        #[test]
        fn first_put_is_only_an_observation() {
            let cache = LrukCache::new(10, 10, 2);
            cache.put("x", 1);
            assert!(!cache.contains(&"x"));
            assert_eq!(cache.history_count(&"x"), 1);

            cache.put("x", 2);
            assert_eq!(cache.get(&"x"), Some(2));
            assert_eq!(cache.history_count(&"x"), 1);
        }

        #[test]
        fn get_counts_towards_admission() {
            let cache = LrukCache::new(10, 10, 2);
            assert_eq!(cache.get(&"x"), None);
            cache.put("x", 7);
            assert!(cache.contains(&"x"));
        }

        #[test]
        fn get_on_resident_key_restarts_its_count() {
            let cache = LrukCache::new(4, 4, 2);
            cache.put("x", 1);
            cache.put("x", 1);
            assert_eq!(cache.history_count(&"x"), 0);

            assert_eq!(cache.get(&"x"), Some(1));
            assert_eq!(cache.history_count(&"x"), 1);
            assert!(cache.contains(&"x"));

            cache.get(&"x");
            assert_eq!(cache.history_count(&"x"), 2);
            assert_eq!(cache.history_len(), 1);
            assert_eq!(cache.peek(&"x"), Some(1));
        }

        #[test]
        fn k_of_one_admits_immediately() {
            let cache = LrukCache::new(4, 4, 1);
            cache.put(1, "a");
            assert_eq!(cache.get(&1), Some("a"));
            assert_eq!(cache.history_len(), 1);
        }

        #[test]
        fn k_of_three_needs_three_observations() {
            let cache = LrukCache::new(4, 4, 3);
            cache.put(1, 'a');
            cache.put(1, 'b');
            assert!(!cache.contains(&1));
            cache.put(1, 'c');
            assert_eq!(cache.peek(&1), Some('c'));
        }

        #[test]
        fn resident_update_bypasses_gate() {
            let cache = LrukCache::new(4, 4, 2);
            cache.put(1, 10);
            cache.put(1, 11);
            cache.put(1, 12);
            assert_eq!(cache.peek(&1), Some(12));
            assert_eq!(cache.history_count(&1), 0);
        }

        #[test]
        fn admission_clears_history_entry() {
            let cache = LrukCache::new(4, 4, 2);
            cache.put(1, ());
            assert_eq!(cache.history_len(), 1);
            cache.put(1, ());
            assert_eq!(cache.history_len(), 0);
        }
    }

    mod history_bounds {
        use super::super::*;

        #[test]
        fn evicted_history_restarts_at_zero() {
            let cache = LrukCache::new(4, 2, 2);
            cache.put("a", 1);
            cache.put("b", 1);
            cache.put("c", 1); // pushes "a" out of history
            assert_eq!(cache.history_count(&"a"), 0);

            cache.put("a", 2);
            assert!(!cache.contains(&"a"));
            cache.put("a", 3);
            assert_eq!(cache.get(&"a"), Some(3));
        }

        #[test]
        fn scan_does_not_displace_resident_entries() {
            let cache = LrukCache::new(3, 16, 2);
            for key in 0..3 {
                cache.put(key, key);
                cache.put(key, key);
            }
            for key in 100..110 {
                cache.put(key, key);
            }
            assert_eq!(cache.len(), 3);
            for key in 0..3 {
                assert!(cache.contains(&key));
            }
            cache.check_invariants().unwrap();
        }

        #[test]
        fn primary_evicts_by_recency_after_admission() {
            let cache = LrukCache::new(2, 8, 1);
            cache.put('a', 1);
            cache.put('b', 2);
            cache.get(&'a');
            cache.put('c', 3);
            assert!(cache.contains(&'a'));
            assert!(!cache.contains(&'b'));
            assert!(cache.contains(&'c'));
        }

        #[test]
        fn zero_history_capacity_admits_only_with_k_one() {
            let gated = LrukCache::new(4, 0, 2);
            gated.put(1, 1);
            gated.put(1, 1);
            assert!(gated.is_empty());

            let open = LrukCache::new(4, 0, 1);
            open.put(1, 1);
            assert!(open.contains(&1));
        }
    }

    mod edge_cases {
        use super::super::*;

        #[test]
        fn zero_capacity_is_inert() {
            let cache = LrukCache::new(0, 8, 1);
            cache.put(1, 1);
            assert_eq!(cache.get(&1), None);
            assert_eq!(cache.history_len(), 0);
            assert!(cache.is_empty());
        }

        #[test]
        fn zero_k_is_rejected() {
            let err = LrukCache::<u8, u8>::try_new(1, 1, 0).unwrap_err();
            assert!(err.to_string().contains('k'));
        }

        #[test]
        #[should_panic(expected = "k must be at least 1")]
        fn zero_k_panics_in_new() {
            let _ = LrukCache::<u8, u8>::new(1, 1, 0);
        }

        #[test]
        fn remove_forgets_history() {
            let cache = LrukCache::new(4, 4, 2);
            cache.put(1, 1);
            cache.remove(&1);
            assert_eq!(cache.history_count(&1), 0);
            cache.put(1, 1);
            assert!(!cache.contains(&1));

            cache.put(1, 1);
            cache.remove(&1);
            assert!(!cache.contains(&1));
        }

        #[test]
        fn clear_drops_both_ledgers() {
            let cache = LrukCache::with_capacity(4);
            assert_eq!(cache.k(), DEFAULT_K);
            cache.put(1, 1);
            cache.put(1, 1);
            cache.put(2, 2);
            cache.clear();
            assert!(cache.is_empty());
            assert_eq!(cache.history_len(), 0);
            assert_eq!(cache.history_capacity(), 4);
        }
    }

    #[cfg(feature = "metrics")]
    mod metrics {
        use super::super::*;

        #[test]
        fn snapshot_counts_gate_decisions() {
            let cache = LrukCache::new(4, 4, 2);
            cache.put(1, 1);
            cache.put(1, 1);
            cache.put(2, 2);
            cache.get(&1);

            let snap = cache.metrics_snapshot();
            assert_eq!(snap.admissions, 1);
            assert_eq!(snap.gated_puts, 2);
            assert_eq!(snap.history_observations, 4);
            assert_eq!(snap.primary.get_hits, 1);
            assert_eq!(snap.primary.cache_len, 1);
        }
    }

    mod property_tests {
        use proptest::prelude::*;

        use super::super::*;

        proptest! {
            #[test]
            fn primary_never_exceeds_capacity(
                capacity in 0usize..6,
                history_capacity in 0usize..6,
                k in 1usize..4,
                ops in prop::collection::vec((any::<bool>(), 0u8..12), 0..200),
            ) {
                let cache = LrukCache::new(capacity, history_capacity, k);
                for (is_put, key) in ops {
                    if is_put {
                        cache.put(key, key);
                    } else if let Some(value) = cache.get(&key) {
                        prop_assert_eq!(value, key);
                    }
                    prop_assert!(cache.len() <= capacity);
                    prop_assert!(cache.history_len() <= history_capacity);
                }
                prop_assert!(cache.check_invariants().is_ok());
            }
        }
    }
}
