//! # Least Recently Used (LRU) Cache Implementation
//!
//! The recency ledger every other policy in this crate builds on: a
//! key → `SlotId` index plus an arena-backed doubly linked list ordered from
//! least to most recently used.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────────┐
//!   │                           LruCache<K, V>                                 │
//!   │                                                                          │
//!   │   ┌────────────────────────────────────────────────────────────────────┐ │
//!   │   │                    Mutex<LruCore<K, V>>                            │ │
//!   │   └────────────────────────────────────────────────────────────────────┘ │
//!   │                                  │                                       │
//!   │                                  ▼                                       │
//!   │   ┌────────────────────────────────────────────────────────────────────┐ │
//!   │   │                         LruCore<K, V>                              │ │
//!   │   │                                                                    │ │
//!   │   │   ┌──────────────────────────────────────────────────────────────┐ │ │
//!   │   │   │  FxHashMap<K, SlotId>                                        │ │ │
//!   │   │   │     key_a ──────────────┐                                    │ │ │
//!   │   │   │     key_b ──────────────┼───────────┐                        │ │ │
//!   │   │   │     key_c ──────────────┼───────────┼───────────┐            │ │ │
//!   │   │   └─────────────────────────┼───────────┼───────────┼────────────┘ │ │
//!   │   │                             ▼           ▼           ▼              │ │
//!   │   │   ┌──────────────────────────────────────────────────────────────┐ │ │
//!   │   │   │  IntrusiveList<Entry<K, V>>                                  │ │ │
//!   │   │   │  head ──► ┌──────┐ ◄──► ┌──────┐ ◄──► ┌──────┐ ◄── tail      │ │ │
//!   │   │   │   (LRU)   │ a    │      │ b    │      │ c    │   (MRU)       │ │ │
//!   │   │   │           └──────┘      └──────┘      └──────┘               │ │ │
//!   │   │   └──────────────────────────────────────────────────────────────┘ │ │
//!   │   └────────────────────────────────────────────────────────────────────┘ │
//!   └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Components
//!
//! | Component          | Description                                        |
//! |--------------------|----------------------------------------------------|
//! | `LruCore<K, V>`    | Single-threaded ledger: index + recency list       |
//! | `LruCache<K, V>`   | `CachePolicy` implementation, one exclusive lock   |
//! | `Entry<K, V>`      | Key, value and informational access counter        |
//!
//! ## LRU Operations Flow
//!
//! ```text
//!   put(key, value)                          get(key)
//!   ═══════════════                          ════════
//!   key in index? ──yes──► replace value     key in index? ──no──► None
//!        │                 move to tail            │
//!        no                                        yes
//!        │                                         ▼
//!        ▼                                  move to tail
//!   capacity == 0? ──yes──► drop value      frequency += 1
//!        │                                  return value
//!        no
//!        ▼
//!   len == capacity? ──yes──► pop head (LRU), unindex
//!        │
//!        ▼
//!   push at tail, index
//! ```
//!
//! Eviction removes exactly one entry per admission at capacity and never
//! runs proactively. The list is strictly ordered by last touch, so the head
//! node is always an unambiguous victim.
//!
//! ## Performance Characteristics
//!
//! | Operation        | Time       | Notes                          |
//! |------------------|------------|--------------------------------|
//! | `insert`         | O(1) avg   | Index update + list splice     |
//! | `get`            | O(1) avg   | Index lookup + move to tail    |
//! | `peek`           | O(1) avg   | Index lookup only              |
//! | `remove`         | O(1) avg   | Index remove + list unlink     |
//! | `pop_lru`        | O(1)       | Head removal                   |
//! | `recency_rank`   | O(r)       | Walks the r newer entries      |
//!
//! ## Example Usage
//!
//! ```
//! use ledgercache::policy::lru::{LruCache, LruCore};
//! use ledgercache::traits::CachePolicy;
//!
//! // Single-threaded core
//! let mut core = LruCore::new(2);
//! core.insert("a", 1);
//! core.insert("b", 2);
//! core.get(&"a");
//! core.insert("c", 3); // evicts "b"
//! assert!(!core.contains(&"b"));
//!
//! // Locked cache behind the policy contract
//! let cache = LruCache::new(2);
//! cache.put("a", 1);
//! assert_eq!(cache.get(&"a"), Some(1));
//! ```
//!
//! ## Thread Safety
//!
//! - `LruCore`: not synchronized, requires `&mut self` to mutate
//! - `LruCache`: every operation holds one `parking_lot::Mutex` for its full
//!   duration, which makes operations on one instance linearizable

use std::fmt;
use std::hash::Hash;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::ds::intrusive_list::IntrusiveList;
use crate::ds::slot_arena::SlotId;
use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::LruMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LruMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{CoreMetricsRecorder, MetricsSnapshotProvider};
use crate::traits::{CachePolicy, ConcurrentCache};

/// One resident entry.
#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    /// Informational; never consulted for eviction.
    frequency: u64,
}

/// Single-threaded recency ledger.
///
/// Holds at most `capacity` entries. A capacity of 0 creates an inert ledger
/// that drops every insert.
pub struct LruCore<K, V> {
    index: FxHashMap<K, SlotId>,
    list: IntrusiveList<Entry<K, V>>,
    capacity: usize,
    #[cfg(feature = "metrics")]
    metrics: LruMetrics,
}

impl<K, V> LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a new ledger holding at most `capacity` entries.
    ///
    /// # Example
    /// ```
    /// use ledgercache::policy::lru::LruCore;
    ///
    /// let core: LruCore<u32, String> = LruCore::new(100);
    /// assert_eq!(core.capacity(), 100);
    /// assert!(core.is_empty());
    /// ```
    pub fn new(capacity: usize) -> Self {
        LruCore {
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            list: IntrusiveList::with_capacity(capacity),
            capacity,
            #[cfg(feature = "metrics")]
            metrics: LruMetrics::default(),
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

    /// Inserts or updates `key`, returning the previous value on update.
    ///
    /// An update replaces the value in place and moves the entry to the MRU
    /// position. A new key at capacity first evicts the LRU entry.
    ///
    /// # Example
    /// ```
    /// use ledgercache::policy::lru::LruCore;
    ///
    /// let mut core = LruCore::new(2);
    /// assert_eq!(core.insert(1, "one"), None);
    /// assert_eq!(core.insert(1, "uno"), Some("one"));
    /// assert_eq!(core.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        if let Some(&id) = self.index.get(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();

            let previous = self
                .list
                .get_mut(id)
                .map(|entry| std::mem::replace(&mut entry.value, value));
            self.list.promote(id);
            return previous;
        }

        if self.capacity == 0 {
            return None;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        if self.index.len() >= self.capacity {
            self.evict_lru();
        }

        let id = self.list.push_newest(Entry {
            key: key.clone(),
            value,
            frequency: 1,
        });
        self.index.insert(key, id);
        debug_assert!(self.index.len() <= self.capacity);
        None
    }

    /// Looks up `key`, moving it to the MRU position on a hit.
    ///
    /// # Example
    /// ```
    /// use ledgercache::policy::lru::LruCore;
    ///
    /// let mut core = LruCore::new(2);
    /// core.insert("a", 1);
    /// core.insert("b", 2);
    /// assert_eq!(core.get(&"a"), Some(&1));
    /// core.insert("c", 3);
    /// assert!(core.contains(&"a"));
    /// assert!(!core.contains(&"b"));
    /// ```
    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.get_mut(key).map(|value| &*value)
    }

    /// Like [`get`](Self::get) but hands out the value mutably.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let id = match self.index.get(key) {
            Some(&id) => id,
            None => {
                #[cfg(feature = "metrics")]
                self.metrics.record_get_miss();
                tracing::trace!("lru miss");
                return None;
            },
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();
        tracing::trace!("lru hit");

        self.list.promote(id);
        let entry = self.list.get_mut(id)?;
        entry.frequency += 1;
        Some(&mut entry.value)
    }

    /// Reads `key` without touching recency or the access counter.
    #[inline]
    pub fn peek(&self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.list.get(id).map(|entry| &entry.value)
    }

    /// Access count of `key`: starts at 1 on admission and grows by one per
    /// successful `get`. Updates and peeks leave it alone.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        let id = *self.index.get(key)?;
        self.list.get(id).map(|entry| entry.frequency)
    }

    /// Removes `key`, returning its value if it was resident.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.index.remove(key)?;

        #[cfg(feature = "metrics")]
        self.metrics.record_remove();

        self.list.remove(id).map(|entry| entry.value)
    }

    /// Removes and returns the least recently used entry. Counted as an
    /// eviction.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let entry = self.list.pop_oldest()?;
        self.index.remove(&entry.key);

        #[cfg(feature = "metrics")]
        self.metrics.record_evicted_entry();

        Some((entry.key, entry.value))
    }

    /// Returns the least recently used entry without removing it.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.list.oldest().map(|(_, entry)| (&entry.key, &entry.value))
    }

    /// Moves `key` to the MRU position without reading it.
    ///
    /// Unlike `get`, the access counter is left alone.
    pub fn touch(&mut self, key: &K) -> bool {
        match self.index.get(key) {
            Some(&id) => self.list.promote(id),
            None => false,
        }
    }

    /// Position of `key` counted from the MRU end (0 = most recent).
    pub fn recency_rank(&self, key: &K) -> Option<usize> {
        self.list.rank_from_newest(*self.index.get(key)?)
    }

    /// Iterates resident entries from least to most recently used.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.list.iter().map(|(_, entry)| (&entry.key, &entry.value))
    }

    /// Resident keys ordered from least to most recently used.
    pub fn keys_lru_to_mru(&self) -> impl Iterator<Item = &K> {
        self.list.iter().map(|(_, entry)| &entry.key)
    }

    /// Changes the capacity, evicting from the LRU end until the ledger fits.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        while self.index.len() > capacity && self.evict_lru().is_some() {}
    }

    pub fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        self.index.clear();
        self.list.clear();
    }

    /// Verifies that index and list describe the same set of entries.
    ///
    /// Every indexed key must resolve to exactly one node holding that key,
    /// every node must be indexed, and the size must respect capacity.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.list.validate()?;
        if self.index.len() != self.list.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys but list holds {} nodes",
                self.index.len(),
                self.list.len()
            )));
        }
        if self.index.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "{} entries exceed capacity {}",
                self.index.len(),
                self.capacity
            )));
        }
        for (id, entry) in self.list.iter() {
            if self.index.get(&entry.key) != Some(&id) {
                return Err(InvariantError::new(format!(
                    "node in slot {} is not indexed under its key",
                    id.index()
                )));
            }
            if entry.frequency == 0 {
                return Err(InvariantError::new("entry with zero access count"));
            }
        }
        Ok(())
    }

    fn evict_lru(&mut self) -> Option<(K, V)> {
        let evicted = self.pop_lru()?;
        tracing::debug!(
            len = self.index.len(),
            capacity = self.capacity,
            "evicted least recently used entry"
        );
        Some(evicted)
    }
}

#[cfg(feature = "metrics")]
impl<K, V> LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn metrics_snapshot(&self) -> LruMetricsSnapshot {
        LruMetricsSnapshot {
            get_calls: self.metrics.get_calls,
            get_hits: self.metrics.get_hits,
            get_misses: self.metrics.get_misses,
            insert_calls: self.metrics.insert_calls,
            insert_updates: self.metrics.insert_updates,
            insert_new: self.metrics.insert_new,
            evicted_entries: self.metrics.evicted_entries,
            removes: self.metrics.removes,
            clears: self.metrics.clears,
            cache_len: self.index.len(),
            capacity: self.capacity,
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LruMetricsSnapshot> for LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> LruMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> fmt::Debug for LruCore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCore")
            .field("len", &self.index.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl<K, V> Default for LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an LRU ledger with a default capacity of 16.
    fn default() -> Self {
        Self::new(16)
    }
}

impl<K, V> Extend<(K, V)> for LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

/// Thread-safe LRU cache: one [`LruCore`] behind one exclusive lock.
///
/// `get` mutates recency, so every operation takes the same lock.
///
/// # Example
///
/// ```
/// use ledgercache::policy::lru::LruCache;
/// use ledgercache::traits::CachePolicy;
///
/// let cache = LruCache::new(2);
/// cache.put("a", 1);
/// cache.put("b", 2);
/// cache.get(&"a");
/// cache.put("c", 3);
///
/// assert!(cache.contains(&"a"));
/// assert!(!cache.contains(&"b"));
/// assert!(cache.contains(&"c"));
/// ```
pub struct LruCache<K, V> {
    inner: Mutex<LruCore<K, V>>,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LruCore::new(capacity)),
        }
    }

    /// Reads `key` without promoting it.
    pub fn peek(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.inner.lock().peek(key).cloned()
    }

    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.inner.lock().frequency(key)
    }

    pub fn touch(&self, key: &K) -> bool {
        self.inner.lock().touch(key)
    }

    pub fn pop_lru(&self) -> Option<(K, V)> {
        self.inner.lock().pop_lru()
    }

    /// Resident keys ordered from least to most recently used.
    pub fn keys_lru_to_mru(&self) -> Vec<K> {
        self.inner.lock().keys_lru_to_mru().cloned().collect()
    }

    pub fn set_capacity(&self, capacity: usize) {
        self.inner.lock().set_capacity(capacity);
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.lock().check_invariants()
    }

    pub fn into_inner(self) -> LruCore<K, V> {
        self.inner.into_inner()
    }
}

#[cfg(feature = "metrics")]
impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn metrics_snapshot(&self) -> LruMetricsSnapshot {
        self.inner.lock().metrics_snapshot()
    }
}

impl<K, V> CachePolicy<K, V> for LruCache<K, V>
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

impl<K: Send, V: Send> ConcurrentCache for LruCache<K, V> {}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.inner.lock();
        f.debug_struct("LruCache")
            .field("len", &core.index.len())
            .field("capacity", &core.capacity)
            .finish_non_exhaustive()
    }
}

impl<K, V> Default for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an LRU cache with a default capacity of 16.
    fn default() -> Self {
        Self::new(16)
    }
}
