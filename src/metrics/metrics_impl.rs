use crate::metrics::traits::{CoreMetricsRecorder, LfuMetricsRecorder, LrukMetricsRecorder};

#[derive(Debug, Default, Clone)]
pub struct LruMetrics {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,
    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,
    pub evicted_entries: u64,
    pub removes: u64,
    pub clears: u64,
}

#[derive(Debug, Default, Clone)]
pub struct LfuMetrics {
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
}

#[derive(Debug, Default, Clone)]
pub struct LrukMetrics {
    pub history_observations: u64,
    pub admissions: u64,
    pub gated_puts: u64,
}

macro_rules! impl_core_recorder {
    ($ty:ty) => {
        impl CoreMetricsRecorder for $ty {
            fn record_get_hit(&mut self) {
                self.get_calls += 1;
                self.get_hits += 1;
            }

            fn record_get_miss(&mut self) {
                self.get_calls += 1;
                self.get_misses += 1;
            }

            fn record_insert_call(&mut self) {
                self.insert_calls += 1;
            }

            fn record_insert_new(&mut self) {
                self.insert_new += 1;
            }

            fn record_insert_update(&mut self) {
                self.insert_updates += 1;
            }

            fn record_evicted_entry(&mut self) {
                self.evicted_entries += 1;
            }

            fn record_remove(&mut self) {
                self.removes += 1;
            }

            fn record_clear(&mut self) {
                self.clears += 1;
            }
        }
    };
}

impl_core_recorder!(LruMetrics);
impl_core_recorder!(LfuMetrics);

impl LfuMetricsRecorder for LfuMetrics {
    fn record_decay(&mut self) {
        self.decays += 1;
    }
}

impl LrukMetricsRecorder for LrukMetrics {
    fn record_history_observation(&mut self) {
        self.history_observations += 1;
    }

    fn record_admission(&mut self) {
        self.admissions += 1;
    }

    fn record_gated_put(&mut self) {
        self.gated_puts += 1;
    }
}
