//! # Metrics Trait Hierarchy
//!
//! Recording and snapshotting are split into small traits so the policy
//! code only ever calls `record_*` and callers only ever see snapshots.
//!
//! ```text
//!                 ┌─────────────────────────────┐
//!                 │     CoreMetricsRecorder     │
//!                 │  get_hit/get_miss/insert    │
//!                 │  evict/clear                │
//!                 └──────────────┬──────────────┘
//!                                │
//!              ┌─────────────────┴─────────────────┐
//!              ▼                                   ▼
//!     ┌──────────────────┐               ┌──────────────────┐
//!     │ LfuMetrics       │               │ LrukMetrics      │
//!     │ Recorder (decay) │               │ Recorder (gate)  │
//!     └──────────────────┘               └──────────────────┘
//! ```

/// Common counters for any cache policy.
pub trait CoreMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_insert_call(&mut self);
    fn record_insert_new(&mut self);
    fn record_insert_update(&mut self);
    fn record_evicted_entry(&mut self);
    fn record_remove(&mut self);
    fn record_clear(&mut self);
}

/// Frequency-ledger specific signals.
pub trait LfuMetricsRecorder: CoreMetricsRecorder {
    /// One average-frequency decay rebuild ran.
    fn record_decay(&mut self);
}

/// Admission-gate specific signals.
pub trait LrukMetricsRecorder {
    /// A key was counted in the history ledger.
    fn record_history_observation(&mut self);
    /// A key crossed the threshold and entered the primary ledger.
    fn record_admission(&mut self);
    /// A `put` was dropped because its key had not yet earned admission.
    fn record_gated_put(&mut self);
}

/// Snapshot provider for tests and benches.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}
