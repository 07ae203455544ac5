//! # LFU (Least Frequently Used) Cache Implementation
//!
//! Frequency-bucketed eviction with O(1) average-case maintenance. Every
//! resident entry lives in the recency list of the bucket for its access
//! frequency; the victim is the least recently used entry of the lowest
//! frequency bucket.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────────┐
//!   │                          LfuCore<K, V>                                   │
//!   │                                                                          │
//!   │   index: FxHashMap<K, (freq, SlotId)>                                    │
//!   │                                                                          │
//!   │   buckets: FxHashMap<u64, IntrusiveList<Entry<K, V>>>                    │
//!   │   ┌──────┬──────────────────────────────────────────────────┐            │
//!   │   │ freq │ bucket (LRU ─────────────────► MRU)              │            │
//!   │   ├──────┼──────────────────────────────────────────────────┤            │
//!   │   │  1   │ [page_7] ◄──► [page_9]          ◄── min_freq     │            │
//!   │   │  3   │ [page_2]                                         │            │
//!   │   │  8   │ [page_1] ◄──► [page_4]                           │            │
//!   │   └──────┴──────────────────────────────────────────────────┘            │
//!   │                                                                          │
//!   │   min_freq: Option<u64>   smallest bucket key, None when empty           │
//!   │   total_freq: u64         running sum of all resident frequencies        │
//!   │   max_average: u64        decay threshold for total_freq / len           │
//!   └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A bucket exists only while it holds at least one entry. Moving an entry
//! to another frequency is remove-then-append, so it always lands at the MRU
//! end of its new bucket.
//!
//! ## Operations Flow
//!
//! ```text
//!   get(key) / put(existing key)
//!   ════════════════════════════
//!   unlink from bucket[f]
//!   bucket[f] empty? ──yes──► drop bucket; if f == min_freq, min_freq = f + 1
//!   append to bucket[f + 1], total_freq += 1
//!   total_freq / len > max_average? ──yes──► decay
//!
//!   put(new key)
//!   ════════════
//!   len == capacity? ──yes──► evict LRU node of bucket[min_freq]
//!   append to bucket[1], min_freq = 1
//! ```
//!
//! ## Average-Frequency Decay
//!
//! Without decay a key that was hot long ago keeps a frequency no newcomer
//! can reach. When the mean frequency exceeds `max_average`, every
//! frequency is halved (floored at 1) and the buckets are rebuilt:
//!
//! ```text
//!   before (max_average = 2)        after
//!   ────────────────────────        ─────
//!   a: 7  b: 1  c: 1   avg 3        a: 3  b: 1  c: 1   avg 1
//! ```
//!
//! The rebuild visits buckets in ascending frequency and each bucket from
//! LRU to MRU, so recency order is preserved among entries that merge into
//! the same bucket. It costs O(len) and only runs once the increments since
//! the previous rebuild have pushed the mean over the threshold again.
//!
//! ## Performance Characteristics
//!
//! | Operation     | Time        | Notes                                 |
//! |---------------|-------------|---------------------------------------|
//! | `get`         | O(1) avg    | Bucket move; O(n) when decay runs     |
//! | `insert`      | O(1) avg    | Evicts from the min bucket            |
//! | `remove`      | O(1)*       | *O(buckets) if the min bucket empties |
//! | `pop_lfu`     | O(1)*       | *O(buckets) if the min bucket empties |
//!
//! ## Example Usage
//!
//! ```
//! use ledgercache::policy::lfu::LfuCache;
//! use ledgercache::traits::CachePolicy;
//!
//! let cache = LfuCache::new(2);
//! cache.put("a", 1);
//! cache.put("b", 2);
//! cache.get(&"a");
//! cache.get(&"a");
//! cache.put("c", 3); // "b" has the lowest frequency
//!
//! assert!(cache.contains(&"a"));
//! assert!(!cache.contains(&"b"));
//! assert_eq!(cache.min_frequency(), Some(1));
//! ```

use std::fmt;
use std::hash::Hash;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::ds::intrusive_list::IntrusiveList;
use crate::ds::slot_arena::SlotId;
use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::LfuMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LfuMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{CoreMetricsRecorder, LfuMetricsRecorder, MetricsSnapshotProvider};
use crate::traits::{CachePolicy, ConcurrentCache};

/// Decay threshold used by [`LfuCore::new`] and [`LfuCache::new`].
pub const DEFAULT_MAX_AVERAGE: u64 = 10;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Single-threaded frequency ledger.
pub struct LfuCore<K, V> {
    index: FxHashMap<K, (u64, SlotId)>,
    buckets: FxHashMap<u64, IntrusiveList<Entry<K, V>>>,
    min_freq: Option<u64>,
    total_freq: u64,
    capacity: usize,
    max_average: u64,
    #[cfg(feature = "metrics")]
    metrics: LfuMetrics,
}

impl<K, V> LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a ledger with the default max average frequency of 10.
    pub fn new(capacity: usize) -> Self {
        Self::build(capacity, DEFAULT_MAX_AVERAGE)
    }

    /// # Panics
    ///
    /// Panics if `max_average` is 0.
    pub fn with_max_average(capacity: usize, max_average: u64) -> Self {
        match Self::try_with_max_average(capacity, max_average) {
            Ok(core) => core,
            Err(err) => panic!("{}", err),
        }
    }

    pub fn try_with_max_average(capacity: usize, max_average: u64) -> Result<Self, ConfigError> {
        if max_average == 0 {
            return Err(ConfigError::new("max_average must be at least 1, got 0"));
        }
        Ok(Self::build(capacity, max_average))
    }

    fn build(capacity: usize, max_average: u64) -> Self {
        Self {
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            buckets: FxHashMap::default(),
            min_freq: None,
            total_freq: 0,
            capacity,
            max_average,
            #[cfg(feature = "metrics")]
            metrics: LfuMetrics::default(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Current frequency of `key`.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.index.get(key).map(|&(freq, _)| freq)
    }

    /// Smallest frequency among resident entries, `None` when empty.
    pub fn min_frequency(&self) -> Option<u64> {
        self.min_freq
    }

    /// Integer mean of all resident frequencies; 0 when empty.
    pub fn average_frequency(&self) -> u64 {
        match self.index.len() {
            0 => 0,
            len => self.total_freq / len as u64,
        }
    }

    pub fn max_average_frequency(&self) -> u64 {
        self.max_average
    }

    /// Number of non-empty frequency buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Inserts or updates `key`, returning the previous value on update.
    ///
    /// An update counts as an access and promotes the entry exactly like
    /// [`get`](Self::get) before the value is overwritten.
    ///
    /// ```
    /// use ledgercache::policy::lfu::LfuCore;
    ///
    /// let mut core = LfuCore::new(4);
    /// assert_eq!(core.insert("k", 1), None);
    /// assert_eq!(core.insert("k", 2), Some(1));
    /// assert_eq!(core.frequency(&"k"), Some(2));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        if self.index.contains_key(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();

            let (freq, id) = self.promote(&key)?;
            let entry = self.buckets.get_mut(&freq)?.get_mut(id)?;
            return Some(std::mem::replace(&mut entry.value, value));
        }

        if self.capacity == 0 {
            return None;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        if self.index.len() >= self.capacity {
            self.evict_lfu();
        }

        let id = self.buckets.entry(1).or_default().push_newest(Entry {
            key: key.clone(),
            value,
        });
        self.index.insert(key, (1, id));
        self.total_freq += 1;
        self.min_freq = Some(1);
        debug_assert!(self.index.len() <= self.capacity);
        None
    }

    /// Looks up `key` and bumps its frequency on a hit.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if !self.index.contains_key(key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            tracing::trace!("lfu miss");
            return None;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();
        tracing::trace!("lfu hit");

        let (freq, id) = self.promote(key)?;
        self.buckets.get(&freq)?.get(id).map(|entry| &entry.value)
    }

    /// Reads `key` without changing its frequency or recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let &(freq, id) = self.index.get(key)?;
        self.buckets.get(&freq)?.get(id).map(|entry| &entry.value)
    }

    /// Removes `key`, returning its value if it was resident.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let (freq, id) = self.index.remove(key)?;

        #[cfg(feature = "metrics")]
        self.metrics.record_remove();

        let entry = self.unlink(freq, id)?;
        if self.min_freq == Some(freq) && !self.buckets.contains_key(&freq) {
            self.refresh_min();
        }
        Some(entry.value)
    }

    /// Returns the next victim: the LRU entry of the minimum bucket.
    pub fn peek_lfu(&self) -> Option<(&K, &V)> {
        let bucket = self.buckets.get(&self.min_freq?)?;
        bucket.oldest().map(|(_, entry)| (&entry.key, &entry.value))
    }

    /// Removes and returns the next victim.
    pub fn pop_lfu(&mut self) -> Option<(K, V)> {
        let popped = self.evict_lfu()?;
        if self.min_freq.is_some_and(|min| !self.buckets.contains_key(&min)) {
            self.refresh_min();
        }
        Some(popped)
    }

    pub fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        self.index.clear();
        self.buckets.clear();
        self.min_freq = None;
        self.total_freq = 0;
    }

    /// Verifies index, buckets, tracked minimum and running total agree.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let mut resident = 0usize;
        let mut total = 0u64;

        for (&freq, bucket) in &self.buckets {
            if bucket.is_empty() {
                return Err(InvariantError::new(format!("bucket {} is empty", freq)));
            }
            bucket.validate()?;
            for (id, entry) in bucket.iter() {
                if self.index.get(&entry.key) != Some(&(freq, id)) {
                    return Err(InvariantError::new(format!(
                        "entry in bucket {} is not indexed at its slot",
                        freq
                    )));
                }
            }
            resident += bucket.len();
            total += freq * bucket.len() as u64;
        }

        if resident != self.index.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys but buckets hold {} entries",
                self.index.len(),
                resident
            )));
        }
        if resident > self.capacity {
            return Err(InvariantError::new(format!(
                "{} entries exceed capacity {}",
                resident, self.capacity
            )));
        }
        let expected_min = self.buckets.keys().copied().min();
        if self.min_freq != expected_min {
            return Err(InvariantError::new(format!(
                "tracked minimum {:?} but smallest bucket is {:?}",
                self.min_freq, expected_min
            )));
        }
        if total != self.total_freq {
            return Err(InvariantError::new(format!(
                "running total {} but frequencies sum to {}",
                self.total_freq, total
            )));
        }
        Ok(())
    }

    /// Moves `key` one bucket up and returns its final location, which
    /// differs from `freq + 1` when the move triggered a decay.
    fn promote(&mut self, key: &K) -> Option<(u64, SlotId)> {
        let (freq, id) = *self.index.get(key)?;
        let entry = self.unlink(freq, id)?;
        if self.min_freq == Some(freq) && !self.buckets.contains_key(&freq) {
            self.min_freq = Some(freq + 1);
        }

        let next = freq.saturating_add(1);
        let new_id = self.buckets.entry(next).or_default().push_newest(entry);
        if let Some(slot) = self.index.get_mut(key) {
            *slot = (next, new_id);
        }
        self.total_freq += next;

        if self.average_frequency() > self.max_average {
            self.decay();
        }
        self.index.get(key).copied()
    }

    /// Detaches a node from its bucket, dropping the bucket when it empties.
    /// The caller owns the index entry and the tracked minimum.
    fn unlink(&mut self, freq: u64, id: SlotId) -> Option<Entry<K, V>> {
        let bucket = self.buckets.get_mut(&freq)?;
        let entry = bucket.remove(id)?;
        if bucket.is_empty() {
            self.buckets.remove(&freq);
        }
        self.total_freq -= freq;
        Some(entry)
    }

    /// Evicts the LRU entry of the minimum bucket. Leaves `min_freq` stale
    /// when the bucket empties; callers fix it up.
    fn evict_lfu(&mut self) -> Option<(K, V)> {
        let freq = self.min_freq?;
        let (id, _) = self.buckets.get(&freq)?.oldest()?;
        let entry = self.unlink(freq, id)?;
        self.index.remove(&entry.key);

        #[cfg(feature = "metrics")]
        self.metrics.record_evicted_entry();

        tracing::debug!(
            frequency = freq,
            len = self.index.len(),
            capacity = self.capacity,
            "evicted least frequently used entry"
        );
        Some((entry.key, entry.value))
    }

    fn refresh_min(&mut self) {
        self.min_freq = self.buckets.keys().copied().min();
    }

    fn decay(&mut self) {
        let average = self.average_frequency();
        let mut freqs: Vec<u64> = self.buckets.keys().copied().collect();
        freqs.sort_unstable();

        let mut old = std::mem::take(&mut self.buckets);
        self.total_freq = 0;

        for freq in freqs {
            let Some(mut bucket) = old.remove(&freq) else {
                continue;
            };
            let halved = (freq / 2).max(1);
            while let Some(entry) = bucket.pop_oldest() {
                let target = self.buckets.entry(halved).or_default();
                let id = target.push_newest(entry);
                if let Some(slot) = target.get(id).and_then(|moved| self.index.get_mut(&moved.key)) {
                    *slot = (halved, id);
                }
                self.total_freq += halved;
            }
        }
        self.refresh_min();

        #[cfg(feature = "metrics")]
        self.metrics.record_decay();

        tracing::debug!(
            average_before = average,
            average_after = self.average_frequency(),
            max_average = self.max_average,
            buckets = self.buckets.len(),
            "halved all frequencies"
        );
    }
}

#[cfg(feature = "metrics")]
impl<K, V> LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn metrics_snapshot(&self) -> LfuMetricsSnapshot {
        LfuMetricsSnapshot {
            get_calls: self.metrics.get_calls,
            get_hits: self.metrics.get_hits,
            get_misses: self.metrics.get_misses,
            insert_calls: self.metrics.insert_calls,
            insert_updates: self.metrics.insert_updates,
            insert_new: self.metrics.insert_new,
            evicted_entries: self.metrics.evicted_entries,
            removes: self.metrics.removes,
            clears: self.metrics.clears,
            decays: self.metrics.decays,
            cache_len: self.index.len(),
            capacity: self.capacity,
            bucket_count: self.buckets.len(),
            min_frequency: self.min_freq,
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LfuMetricsSnapshot> for LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> LfuMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> fmt::Debug for LfuCore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfuCore")
            .field("len", &self.index.len())
            .field("capacity", &self.capacity)
            .field("min_freq", &self.min_freq)
            .field("buckets", &self.buckets.len())
            .field("max_average", &self.max_average)
            .finish_non_exhaustive()
    }
}

impl<K, V> Default for LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new(16)
    }
}

/// Thread-safe LFU cache: one [`LfuCore`] behind one exclusive lock.
pub struct LfuCache<K, V> {
    inner: Mutex<LfuCore<K, V>>,
}

impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LfuCore::new(capacity)),
        }
    }

    /// # Panics
    ///
    /// Panics if `max_average` is 0.
    pub fn with_max_average(capacity: usize, max_average: u64) -> Self {
        Self {
            inner: Mutex::new(LfuCore::with_max_average(capacity, max_average)),
        }
    }

    pub fn try_with_max_average(capacity: usize, max_average: u64) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: Mutex::new(LfuCore::try_with_max_average(capacity, max_average)?),
        })
    }

    pub fn peek(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.inner.lock().peek(key).cloned()
    }

    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.inner.lock().frequency(key)
    }

    pub fn min_frequency(&self) -> Option<u64> {
        self.inner.lock().min_frequency()
    }

    pub fn average_frequency(&self) -> u64 {
        self.inner.lock().average_frequency()
    }

    pub fn max_average_frequency(&self) -> u64 {
        self.inner.lock().max_average_frequency()
    }

    pub fn bucket_count(&self) -> usize {
        self.inner.lock().bucket_count()
    }

    pub fn pop_lfu(&self) -> Option<(K, V)> {
        self.inner.lock().pop_lfu()
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.lock().check_invariants()
    }

    pub fn into_inner(self) -> LfuCore<K, V> {
        self.inner.into_inner()
    }
}

#[cfg(feature = "metrics")]
impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn metrics_snapshot(&self) -> LfuMetricsSnapshot {
        self.inner.lock().metrics_snapshot()
    }
}

impl<K, V> CachePolicy<K, V> for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&self, key: K, value: V) {
        self.inner.lock().insert(key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key).cloned()
    }

    fn remove(&self, key: &K) {
        self.inner.lock().remove(key);
    }

    fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    fn len(&self) -> usize {
        self.inner.lock().len()
    }

    fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl<K: Send, V: Send> ConcurrentCache for LfuCache<K, V> {}

impl<K, V> fmt::Debug for LfuCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LfuCache").field(&*self.inner.lock()).finish()
    }
}

impl<K, V> Default for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new(16)
    }
}
