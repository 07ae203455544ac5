use std::ops::Add;

/// Point-in-time copy of a recency ledger's counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LruMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,

    pub evicted_entries: u64,
    pub removes: u64,
    pub clears: u64,

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub capacity: usize,
}

/// Shards are summed field by field.
impl Add for LruMetricsSnapshot {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            get_calls: self.get_calls + rhs.get_calls,
            get_hits: self.get_hits + rhs.get_hits,
            get_misses: self.get_misses + rhs.get_misses,
            insert_calls: self.insert_calls + rhs.insert_calls,
            insert_updates: self.insert_updates + rhs.insert_updates,
            insert_new: self.insert_new + rhs.insert_new,
            evicted_entries: self.evicted_entries + rhs.evicted_entries,
            removes: self.removes + rhs.removes,
            clears: self.clears + rhs.clears,
            cache_len: self.cache_len + rhs.cache_len,
            capacity: self.capacity + rhs.capacity,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LfuMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,

    pub evicted_entries: u64,
    pub removes: u64,
    pub clears: u64,
    pub decays: u64,

    pub cache_len: usize,
    pub capacity: usize,
    pub bucket_count: usize,
    pub min_frequency: Option<u64>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LrukMetricsSnapshot {
    pub history_observations: u64,
    pub admissions: u64,
    pub gated_puts: u64,

    pub history_len: usize,
    pub history_capacity: usize,

    /// Counters of the primary ledger.
    pub primary: LruMetricsSnapshot,
}
