//! Per-cache operation counters (feature `metrics`).
//!
//! Recorders live inside each ledger core and are only touched while the
//! owning lock is held, so plain `u64` fields are enough. Snapshots are
//! copied out through [`MetricsSnapshotProvider`](traits::MetricsSnapshotProvider).

pub mod metrics_impl;
pub mod snapshot;
pub mod traits;
