use chained_hashset::{BuildHasherFunc, HashSetList};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn bench_insert(c: &mut Criterion) {
    c.bench_function("hash_set_list_insert_10k", |b| {
        b.iter_batched(
            || HashSetList::<String>::new(16_384),
            |mut s| {
                for x in lcg(1).take(10_000) {
                    s.insert(key(x));
                }
                black_box(s)
            },
            BatchSize::SmallInput,
        )
    });
}

// Same workload with a quarter of the buckets: chains average ~2.5 nodes.
fn bench_insert_crowded(c: &mut Criterion) {
    c.bench_function("hash_set_list_insert_10k_crowded", |b| {
        b.iter_batched(
            || HashSetList::<String>::new(4_096),
            |mut s| {
                for x in lcg(1).take(10_000) {
                    s.insert(key(x));
                }
                black_box(s)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_contains_hit(c: &mut Criterion) {
    c.bench_function("hash_set_list_contains_hit", |b| {
        let mut s: HashSetList<String, BuildHasherFunc> =
            HashSetList::with_hasher(16_384, BuildHasherFunc::default());
        let keys: Vec<_> = lcg(7).take(10_000).map(key).collect();
        s.extend(keys.iter().cloned());
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(s.contains(k.as_str()));
        })
    });
}

fn bench_contains_miss(c: &mut Criterion) {
    c.bench_function("hash_set_list_contains_miss", |b| {
        let mut s: HashSetList<String> = HashSetList::new(16_384);
        s.extend(lcg(11).take(10_000).map(key));
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            // generate keys unlikely in the set
            let k = key(miss.next().unwrap());
            black_box(s.contains(k.as_str()));
        })
    });
}

fn bench_rehash(c: &mut Criterion) {
    c.bench_function("hash_set_list_rehash_10k", |b| {
        let mut base: HashSetList<String> = HashSetList::new(1_024);
        base.extend(lcg(3).take(10_000).map(key));
        b.iter_batched(
            || base.clone(),
            |mut s| {
                s.rehash(16_384);
                black_box(s)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_iterate(c: &mut Criterion) {
    c.bench_function("hash_set_list_iterate_10k", |b| {
        let mut s: HashSetList<u64> = HashSetList::new(32_768);
        s.extend(lcg(5).take(10_000));
        b.iter(|| black_box(s.iter().fold(0u64, |acc, k| acc ^ k)))
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_insert, bench_insert_crowded, bench_contains_hit, bench_contains_miss, bench_rehash, bench_iterate
}
criterion_main!(benches);
