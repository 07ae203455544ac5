//! ledgercache: bounded in-process caches with interchangeable eviction
//! policies.
//!
//! Four policies share one contract, [`traits::CachePolicy`]:
//!
//! | Policy                                      | Evicts                                   |
//! |---------------------------------------------|------------------------------------------|
//! | [`LruCache`](policy::lru::LruCache)         | least recently used entry                |
//! | [`LrukCache`](policy::lru_k::LrukCache)     | LRU, admitting only after K observations |
//! | [`ShardedLruCache`](policy::sharded_lru::ShardedLruCache) | LRU within the key's shard |
//! | [`LfuCache`](policy::lfu::LfuCache)         | least frequently used, LRU among ties    |
//!
//! Every policy stores its entries in arena slots linked by
//! [`SlotId`](ds::SlotId) and serializes access behind `parking_lot`
//! mutexes, so any cache can be shared across threads through an `Arc`.
//! Evictions, admissions and frequency decay are reported as `tracing`
//! events; enable the `metrics` feature for per-cache counters.

pub mod builder;
pub mod ds;
pub mod error;
pub mod policy;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod traits;
