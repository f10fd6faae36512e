use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use fnv::FnvBuildHasher;
use heavy_sketches::{
    ArrivalStrength, BucketSketchBuilder, DefaultKeyHasher, ExponentialDecay, HeavyGuardian,
    LinearDecaySketch, ProbeSketchBuilder, Sketch, StableSketch, TightSketch, TwoFaSketch,
    TwoStageBuilder,
};
use rand::rngs::StdRng;
use rand::{thread_rng, Rng, SeedableRng};
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;

const CASES: usize = 1_000_000;
const MEMORY: usize = 100_000;

fn stream() -> Vec<u64> {
    let mut rng = thread_rng();
    black_box(
        (0..CASES)
            .map(|i| {
                if i % 2 == 0 {
                    rng.gen::<u64>() % 1024
                } else {
                    rng.gen::<u64>() % 1_000_000
                }
            })
            .collect(),
    )
}

fn bench_insert<S, F>(c: &mut Criterion, name: &str, make: F)
where
    S: Sketch<u64>,
    F: Fn() -> S + Copy,
{
    c.bench_function(name, move |b| {
        b.iter_batched(
            || (make(), stream()),
            |(mut sketch, nums)| {
                nums.iter().for_each(|k| sketch.insert(k));
                black_box(sketch.query(&nums[0]));
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_single_hash(c: &mut Criterion) {
    bench_insert(c, "Test HeavyGuardian insert default hasher", || {
        HeavyGuardian::<u64, StdRng>::with_rng(MEMORY, StdRng::seed_from_u64(0)).unwrap()
    });
    bench_insert(c, "Test HeavyGuardian insert FX hasher", || {
        BucketSketchBuilder::<u64, ExponentialDecay, 8>::new(MEMORY)
            .set_key_hasher(DefaultKeyHasher::with_hasher(
                BuildHasherDefault::<FxHasher>::default(),
            ))
            .finalize_with_rng(StdRng::seed_from_u64(0))
            .unwrap()
    });
    bench_insert(c, "Test LinearDecaySketch insert default hasher", || {
        LinearDecaySketch::<u64, StdRng>::with_rng(MEMORY, StdRng::seed_from_u64(0)).unwrap()
    });
}

fn bench_multi_hash(c: &mut Criterion) {
    bench_insert(c, "Test StableSketch insert default hasher", || {
        StableSketch::<u64, StdRng>::with_rng(MEMORY, StdRng::seed_from_u64(0)).unwrap()
    });
    bench_insert(c, "Test TightSketch insert default hasher", || {
        TightSketch::<u64, StdRng>::with_rng(MEMORY, StdRng::seed_from_u64(0)).unwrap()
    });
    bench_insert(c, "Test TightSketch insert FNV hasher", || {
        ProbeSketchBuilder::<u64, ArrivalStrength>::new(MEMORY)
            .set_key_hasher(DefaultKeyHasher::with_hasher(FnvBuildHasher::default()))
            .finalize_with_rng(StdRng::seed_from_u64(0))
            .unwrap()
    });
}

fn bench_composed(c: &mut Criterion) {
    bench_insert(c, "Test TwoFASketch insert default hasher", || {
        TwoFaSketch::<u64>::new(MEMORY).unwrap()
    });
    bench_insert(c, "Test TwoStage insert default hasher", || {
        TwoStageBuilder::<u64>::new(MEMORY, 500)
            .finalize_with_rng(StdRng::seed_from_u64(0))
            .unwrap()
    });
}

criterion_group!(sketches, bench_single_hash, bench_multi_hash, bench_composed);

criterion_main!(sketches);
