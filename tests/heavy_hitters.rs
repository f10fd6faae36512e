//! Heavy-hitter retention and reporting invariants shared by every sketch.
use heavy_sketches::{
    ArrivalStrength, BucketSketch, BucketSketchBuilder, Count, DecayPolicy, DecaySketch,
    ExponentialDecay, Filter, HeavyGuardian, LinearDecay, LinearDecaySketch, NoDecay, NoDecaySketch,
    PlainDecay, ProbePolicy, ProbeSketch, ProbeSketchBuilder, Sketch, Stability, StableSketch,
    TightSketch, TwoFaSketch, TwoStageBuilder,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

const HEAVY: u64 = 0;
const ROUNDS: u64 = 1_000;
const HEAD_START: u64 = 3;

fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Feeds one heavy key and `per_round` fresh singletons per round into a
/// one-bucket (or one-slot-per-table) sketch, then returns the heavy estimate.
fn retained<S: Sketch<u64>>(mut sketch: S, per_round: u64) -> Count {
    let mut next = 1;
    for _ in 0..HEAD_START {
        sketch.insert(&HEAVY);
    }
    for _ in 0..ROUNDS {
        sketch.insert(&HEAVY);
        for _ in 0..per_round {
            sketch.insert(&next);
            next += 1;
        }
    }
    sketch.query(&HEAVY)
}

fn assert_retained(name: &str, estimate: Count) {
    let inserted = HEAD_START + ROUNDS;
    assert!(
        estimate as u64 >= inserted * 9 / 10,
        "{} kept the heavy key at {} out of {}",
        name,
        estimate,
        inserted
    );
}

fn one_probe_slot<P: ProbePolicy + Default>(seed: u64) -> ProbeSketch<u64, P, StdRng> {
    ProbeSketchBuilder::<u64, P>::new(ProbeSketch::<u64, P, StdRng>::slot_bytes() * 4)
        .finalize_with_rng(seeded(seed))
        .unwrap()
}

#[test]
fn heavy_key_survives_a_full_bucket() {
    for seed in 0..20 {
        let hg: HeavyGuardian<u64, StdRng> =
            HeavyGuardian::with_rng(HeavyGuardian::<u64, StdRng>::bucket_bytes(), seeded(seed))
                .unwrap();
        assert_eq!(hg.len(), 1);
        assert_retained("HeavyGuardian", retained(hg, 32));

        let linear: LinearDecaySketch<u64, StdRng> = LinearDecaySketch::with_rng(
            LinearDecaySketch::<u64, StdRng>::bucket_bytes(),
            seeded(seed),
        )
        .unwrap();
        // linear decay turns slots over faster, so one challenger per other counter
        assert_retained("LinearDecaySketch", retained(linear, 3));

        let none: NoDecaySketch<u64, StdRng> =
            NoDecaySketch::with_rng(NoDecaySketch::<u64, StdRng>::bucket_bytes(), seeded(seed))
                .unwrap();
        assert_eq!(retained(none, 16), (HEAD_START + ROUNDS) as Count);

        let decay: DecaySketch<u64, StdRng> = one_probe_slot::<PlainDecay>(seed);
        assert_eq!(decay.capacity(), 4);
        assert_retained("DecaySketch", retained(decay, 16));

        let stable: StableSketch<u64, StdRng> = one_probe_slot::<Stability>(seed);
        assert_retained("StableSketch", retained(stable, 16));

        let tight: TightSketch<u64, StdRng> = one_probe_slot::<ArrivalStrength>(seed);
        assert_retained("TightSketch", retained(tight, 16));
    }

    let vote: TwoFaSketch<u64> =
        TwoFaSketch::new(TwoFaSketch::<u64>::bucket_bytes()).unwrap();
    assert_eq!(vote.len(), 1);
    assert_retained("TwoFASketch", retained(vote, 32));
}

#[test]
fn light_keys_are_not_reported_heavy() {
    let mut hg: HeavyGuardian<u64, StdRng> =
        HeavyGuardian::with_rng(HeavyGuardian::<u64, StdRng>::bucket_bytes(), seeded(1)).unwrap();
    for _ in 0..HEAD_START {
        hg.insert(&HEAVY);
    }
    for k in 1..=ROUNDS {
        hg.insert(&HEAVY);
        hg.insert(&k);
    }

    let heavy = hg.heavy_hitters(100);
    assert_eq!(heavy.len(), 1);
    assert!(heavy.contains_key(&HEAVY));
    assert_eq!(hg.top_k(1)[0].0, HEAVY);
}

fn four_counter_bucket<P: DecayPolicy + Default>(seed: u64) -> BucketSketch<u64, P, 4, StdRng> {
    BucketSketchBuilder::<u64, P, 4>::new(BucketSketch::<u64, P, 4, StdRng>::bucket_bytes())
        .finalize_with_rng(seeded(seed))
        .unwrap()
}

fn check_scenario<S: Sketch<u64>>(mut sketch: S) {
    // A x5, then B, C, D, E into a single bucket of four counters
    for k in [1u64, 1, 1, 1, 1, 2, 3, 4, 5].iter() {
        sketch.insert(k);
    }
    let a = sketch.query(&1);
    assert_eq!(a, 5, "{}", sketch.name());
    for k in 2..=5u64 {
        assert!(a > sketch.query(&k), "{}", sketch.name());
    }
    let all = sketch.all_query();
    assert_eq!(all.get(&1), Some(&5));
    assert_eq!(all.len(), 4);
}

#[test]
fn concrete_bucket_scenario() {
    for seed in 0..100 {
        check_scenario(four_counter_bucket::<ExponentialDecay>(seed));
        check_scenario(four_counter_bucket::<LinearDecay>(seed));
        check_scenario(four_counter_bucket::<NoDecay>(seed));
    }
}

/// Inserts `distinct` keys, key `k` inserted `k % 7 + 1` times, and checks that
/// `all_query` reports each of them exactly once with its exact count.
fn assert_complete<S: Sketch<u64>>(mut sketch: S, distinct: u64) {
    let mut total = 0;
    for k in 0..distinct {
        for _ in 0..(k % 7 + 1) {
            sketch.insert(&k);
            total += 1;
        }
    }

    let all = sketch.all_query();
    assert_eq!(all.len() as u64, distinct, "{}", sketch.name());
    assert_eq!(all.values().map(|&c| c as u64).sum::<u64>(), total);
    for k in 0..distinct {
        assert_eq!(all.get(&k), Some(&((k % 7 + 1) as Count)));
        assert_eq!(sketch.query(&k), (k % 7 + 1) as Count);
    }
    assert_eq!(sketch.query(&distinct), 0);
}

#[test]
fn all_query_is_complete_without_eviction() {
    const MEMORY: usize = 1 << 20;
    const DISTINCT: u64 = 100;

    assert_complete(
        HeavyGuardian::<u64, StdRng>::with_rng(MEMORY, seeded(0)).unwrap(),
        DISTINCT,
    );
    assert_complete(
        LinearDecaySketch::<u64, StdRng>::with_rng(MEMORY, seeded(0)).unwrap(),
        DISTINCT,
    );
    assert_complete(
        NoDecaySketch::<u64, StdRng>::with_rng(MEMORY, seeded(0)).unwrap(),
        DISTINCT,
    );
    assert_complete(
        DecaySketch::<u64, StdRng>::with_rng(MEMORY, seeded(0)).unwrap(),
        DISTINCT,
    );
    assert_complete(
        StableSketch::<u64, StdRng>::with_rng(MEMORY, seeded(0)).unwrap(),
        DISTINCT,
    );
    assert_complete(
        TightSketch::<u64, StdRng>::with_rng(MEMORY, seeded(0)).unwrap(),
        DISTINCT,
    );
    assert_complete(TwoFaSketch::<u64>::new(MEMORY).unwrap(), DISTINCT);
}

#[test]
fn two_stage_cascade() {
    let mut rng = seeded(2024);
    let mut ts = TwoStageBuilder::<u64>::new(1 << 20, 100)
        .finalize_with_rng(seeded(7))
        .unwrap();
    let thr = ts.stage1_threshold();
    assert_eq!(thr, 50);

    let mut exact: HashMap<u64, u64> = HashMap::new();
    for _ in 0..50_000 {
        let mut key = rng.gen_range(0..2_000u64);
        if rng.gen_bool(0.5) {
            key %= 20;
        }
        ts.insert(&key);
        *exact.entry(key).or_insert(0) += 1;
    }

    let all = ts.all_query();
    for (key, &count) in &exact {
        let estimate = ts.filter().query(key);
        assert!(estimate as u64 >= count);
        if estimate < thr {
            assert_eq!(ts.query(key), estimate);
            assert!(!all.contains_key(key));
        } else {
            assert!(all.contains_key(key), "promoted key {} is missing", key);
            assert!(ts.query(key) >= estimate);
        }
    }

    for key in 0..20u64 {
        let reported = all[&key] as u64;
        let truth = exact[&key];
        // the sketch counts what arrived after promotion, plus the bias
        assert!(reported <= truth + 1);
        assert!(reported + 10 >= truth, "{} reported {} of {}", key, reported, truth);
    }
}
