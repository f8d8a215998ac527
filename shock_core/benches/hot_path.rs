use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use shock_core::{BucketMap, Corner, HistogramBank};

// Generate a synthetic velocity trace with a tiny PRNG
fn synth_velocities(n: usize, span: i32, seed: u32) -> Vec<i32> {
    let mut state = seed.max(1);
    let mut next = || {
        let mut x = state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        state = x;
        x
    };
    (0..n)
        .map(|_| (next() % (2 * span as u32 + 1)) as i32 - span)
        .collect()
}

pub fn bench_accumulate(c: &mut Criterion) {
    let mut g = c.benchmark_group("accumulate");
    g.sample_size(50);

    let velocities = synth_velocities(50_000, 3000, 0xC0FFEE);
    let map = BucketMap::new(10, 2000);

    g.bench_function("bucket_and_increment", |b| {
        b.iter_batched(
            || HistogramBank::new(10),
            |bank| {
                for &v in &velocities {
                    bank.increment(Corner::FrontLeft, map.bucket_for(black_box(v)));
                }
                black_box(bank.samples(Corner::FrontLeft));
            },
            BatchSize::SmallInput,
        )
    });

    let bank = HistogramBank::new(10);
    for &v in &velocities {
        bank.increment(Corner::FrontLeft, map.bucket_for(v));
    }
    g.bench_function("normalize_snapshot", |b| {
        b.iter(|| black_box(bank.normalized(Corner::FrontLeft)))
    });

    g.finish();
}

criterion_group!(hot_path, bench_accumulate);
criterion_main!(hot_path);
