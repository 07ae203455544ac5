//! # Cache Policy Contract
//!
//! Every eviction policy in this crate is a distinct type that implements
//! [`CachePolicy`]. Variants compose ledger cores as owned fields; none of
//! them inherits behaviour from another.
//!
//! ## Architecture
//!
//! ```text
//!                    ┌─────────────────────────────────────────┐
//!                    │          CachePolicy<K, V>              │
//!                    │                                         │
//!                    │  put(&, K, V)                           │
//!                    │  get(&, &K) → Option<V>                 │
//!                    │  get_or_default(&, &K) → V              │
//!                    │  remove(&, &K)                          │
//!                    │  contains / len / capacity / clear      │
//!                    └──────────────────┬──────────────────────┘
//!                                       │
//!     ┌───────────────────┬─────────────┴──────┬────────────────────┐
//!     ▼                   ▼                    ▼                    ▼
//! ┌──────────┐     ┌──────────────┐    ┌─────────────────┐    ┌──────────┐
//! │ LruCache │     │  LrukCache   │    │ ShardedLruCache │    │ LfuCache │
//! │ Mutex<   │     │ Mutex<{      │    │ [Mutex<         │    │ Mutex<   │
//! │  LruCore>│     │  primary,    │    │   LruCore>; N]  │    │  LfuCore>│
//! │          │     │  history }>  │    │                 │    │          │
//! └──────────┘     └──────────────┘    └─────────────────┘    └──────────┘
//! ```
//!
//! ## Semantics shared by all variants
//!
//! - Methods take `&self`. Each implementation serializes its own state behind
//!   exclusive locks, so any `CachePolicy` is usable from many threads at once.
//! - A miss is `None`, never an error.
//! - A capacity of zero makes the cache inert: `put` is a no-op and every
//!   `get` misses.
//! - `get` returns a clone of the stored value and promotes the entry under
//!   the policy's rule. [`contains`](CachePolicy::contains) never promotes.
//!
//! ## Example Usage
//!
//! ```
//! use ledgercache::policy::lfu::LfuCache;
//! use ledgercache::policy::lru::LruCache;
//! use ledgercache::traits::CachePolicy;
//!
//! fn warm<C: CachePolicy<u64, String>>(cache: &C, data: &[(u64, &str)]) {
//!     for (key, value) in data {
//!         cache.put(*key, value.to_string());
//!     }
//! }
//!
//! let lru = LruCache::new(8);
//! let lfu = LfuCache::new(8);
//! warm(&lru, &[(1, "one"), (2, "two")]);
//! warm(&lfu, &[(1, "one"), (2, "two")]);
//!
//! assert_eq!(lru.get(&1), Some("one".to_string()));
//! assert_eq!(lfu.get_or_default(&99), String::new());
//! ```

/// Bounded key-value storage with policy-driven eviction.
///
/// # Example
///
/// ```
/// use ledgercache::policy::lru_k::LrukCache;
/// use ledgercache::traits::CachePolicy;
///
/// let cache = LrukCache::new(10, 10, 2);
///
/// // First write is only an observation.
/// cache.put("x", 1);
/// assert_eq!(cache.get(&"x"), None);
///
/// // Second observation admits the key.
/// cache.put("x", 2);
/// assert_eq!(cache.get(&"x"), Some(2));
/// ```
pub trait CachePolicy<K, V> {
    /// Inserts a new entry or replaces the value of an existing one.
    ///
    /// Evicts according to the policy when a new key arrives at capacity.
    fn put(&self, key: K, value: V);

    /// Looks up `key`, promoting it on a hit.
    ///
    /// `Some(value)` is the found case; `None` is a miss.
    fn get(&self, key: &K) -> Option<V>;

    /// Looks up `key`, returning `V::default()` on a miss.
    ///
    /// Callers using this accept that a miss and a stored default value are
    /// indistinguishable.
    fn get_or_default(&self, key: &K) -> V
    where
        V: Default,
    {
        self.get(key).unwrap_or_default()
    }

    /// Deletes `key` if present; no-op otherwise.
    fn remove(&self, key: &K);

    /// Checks residency without promoting the entry.
    fn contains(&self, key: &K) -> bool;

    /// Returns the number of resident entries.
    fn len(&self) -> usize;

    /// Returns `true` if no entry is resident.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the configured maximum number of resident entries.
    fn capacity(&self) -> usize;

    /// Drops every resident entry.
    fn clear(&self);
}

/// Marker for cache types that may be shared across threads.
///
/// Every `CachePolicy` in this crate implements it when `K` and `V` are
/// `Send`.
///
/// ```
/// use ledgercache::policy::sharded_lru::ShardedLruCache;
/// use ledgercache::traits::{CachePolicy, ConcurrentCache};
///
/// fn share<C: CachePolicy<u64, u64> + ConcurrentCache>(_: &C) {}
///
/// share(&ShardedLruCache::new(64, 4));
/// ```
pub trait ConcurrentCache: Send + Sync {}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;

    // Unbounded map exercising the provided methods only.
    struct MapCache(RefCell<HashMap<u32, u32>>);

    impl CachePolicy<u32, u32> for MapCache {
        fn put(&self, key: u32, value: u32) {
            self.0.borrow_mut().insert(key, value);
        }

        fn get(&self, key: &u32) -> Option<u32> {
            self.0.borrow().get(key).copied()
        }

        fn remove(&self, key: &u32) {
            self.0.borrow_mut().remove(key);
        }

        fn contains(&self, key: &u32) -> bool {
            self.0.borrow().contains_key(key)
        }

        fn len(&self) -> usize {
            self.0.borrow().len()
        }

        fn capacity(&self) -> usize {
            usize::MAX
        }

        fn clear(&self) {
            self.0.borrow_mut().clear();
        }
    }

    #[test]
    fn get_or_default_maps_miss_to_default() {
        let cache = MapCache(RefCell::new(HashMap::new()));
        assert!(cache.is_empty());
        assert_eq!(cache.get_or_default(&1), 0);

        cache.put(1, 42);
        assert_eq!(cache.get_or_default(&1), 42);
        assert!(!cache.is_empty());
    }
}
