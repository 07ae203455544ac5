use std::sync::Arc;
use std::thread;

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use ledgercache::policy::lfu::{LfuCache, LfuCore};
use ledgercache::policy::lru::{LruCache, LruCore};
use ledgercache::policy::lru_k::LrukCache;
use ledgercache::policy::sharded_lru::ShardedLruCache;
use ledgercache::traits::CachePolicy;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const CAPACITY: usize = 1024;

// Skewed keys: 80% of reads hit the first eighth of the key space.
fn hotset_keys(count: usize, universe: u64, seed: u64) -> Vec<u64> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            if rng.random_bool(0.8) {
                rng.random_range(0..universe / 8)
            } else {
                rng.random_range(0..universe)
            }
        })
        .collect()
}

fn bench_lru_core(c: &mut Criterion) {
    c.bench_function("lru_core_insert_get", |b| {
        b.iter_batched(
            || {
                let mut cache = LruCore::new(CAPACITY);
                for i in 0..CAPACITY as u64 {
                    cache.insert(i, i);
                }
                cache
            },
            |mut cache| {
                for i in 0..CAPACITY as u64 {
                    cache.insert(std::hint::black_box(i + 10_000), i);
                    let _ = std::hint::black_box(cache.get(&std::hint::black_box(i)));
                }
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("lru_core_eviction_churn", |b| {
        b.iter_batched(
            || LruCore::new(CAPACITY),
            |mut cache| {
                for i in 0..4 * CAPACITY as u64 {
                    cache.insert(std::hint::black_box(i), i);
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_lfu_core(c: &mut Criterion) {
    let keys = hotset_keys(8 * CAPACITY, 4 * CAPACITY as u64, 42);

    for max_average in [2u64, 10, 1_000] {
        c.bench_with_input(
            BenchmarkId::new("lfu_core_hotset", max_average),
            &max_average,
            |b, &max_average| {
                b.iter_batched(
                    || LfuCore::with_max_average(CAPACITY, max_average),
                    |mut cache| {
                        for &key in &keys {
                            if cache.get(&key).is_none() {
                                cache.insert(key, key);
                            }
                        }
                    },
                    BatchSize::SmallInput,
                )
            },
        );
    }
}

fn run_policy<C: CachePolicy<u64, u64>>(cache: &C, keys: &[u64]) -> usize {
    let mut hits = 0;
    for &key in keys {
        match cache.get(&key) {
            Some(_) => hits += 1,
            None => cache.put(key, key),
        }
    }
    hits
}

fn bench_policies_hotset(c: &mut Criterion) {
    let keys = hotset_keys(8 * CAPACITY, 4 * CAPACITY as u64, 7);
    let mut group = c.benchmark_group("policy_hotset");

    group.bench_function("lru", |b| {
        b.iter_batched(
            || LruCache::new(CAPACITY),
            |cache| std::hint::black_box(run_policy(&cache, &keys)),
            BatchSize::SmallInput,
        )
    });
    group.bench_function("lru_k2", |b| {
        b.iter_batched(
            || LrukCache::new(CAPACITY, CAPACITY, 2),
            |cache| std::hint::black_box(run_policy(&cache, &keys)),
            BatchSize::SmallInput,
        )
    });
    group.bench_function("sharded_lru_16", |b| {
        b.iter_batched(
            || ShardedLruCache::new(CAPACITY, 16),
            |cache| std::hint::black_box(run_policy(&cache, &keys)),
            BatchSize::SmallInput,
        )
    });
    group.bench_function("lfu", |b| {
        b.iter_batched(
            || LfuCache::new(CAPACITY),
            |cache| std::hint::black_box(run_policy(&cache, &keys)),
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended_4_threads");

    for shards in [1usize, 4, 16] {
        group.bench_with_input(BenchmarkId::new("sharded_lru", shards), &shards, |b, &shards| {
            b.iter_batched(
                || Arc::new(ShardedLruCache::new(CAPACITY, shards)),
                |cache| {
                    let handles: Vec<_> = (0..4u64)
                        .map(|t| {
                            let cache = Arc::clone(&cache);
                            thread::spawn(move || {
                                let keys = hotset_keys(2_000, 4 * CAPACITY as u64, t);
                                run_policy(&*cache, &keys)
                            })
                        })
                        .collect();
                    for handle in handles {
                        let _ = std::hint::black_box(handle.join());
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_lru_core,
    bench_lfu_core,
    bench_policies_hotset,
    bench_contention
);
criterion_main!(benches);
