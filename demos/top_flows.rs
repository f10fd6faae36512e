use heavy_sketches::metrics::evaluate;
use heavy_sketches::{
    DecaySketch, HeavyGuardian, LinearDecaySketch, Sketch, StableSketch, TightSketch,
    TwoFaSketchBuilder, TwoStageBuilder,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
struct Flow {
    src: [u8; 4],
    dst: [u8; 4],
    src_port: u16,
    dst_port: u16,
    proto: u8,
}

const PACKETS: usize = 1_000_000;
const FLOWS: u64 = 50_000;
const MEMORY: usize = 100_000;
const THRESHOLD: u32 = (PACKETS / 10_000) as u32;

fn flow(id: u64) -> Flow {
    let b = id.to_be_bytes();
    Flow {
        src: [10, b[5], b[6], b[7]],
        dst: [192, 168, b[7], b[6]],
        src_port: 1024 + (id % 50_000) as u16,
        dst_port: 443,
        proto: 6,
    }
}

// a few elephant flows over a long tail of mice
fn trace(rng: &mut StdRng) -> Vec<Flow> {
    (0..PACKETS)
        .map(|_| {
            let u: f64 = rng.gen();
            flow((u * u * u * FLOWS as f64) as u64)
        })
        .collect()
}

fn run<S: Sketch<Flow>>(mut sketch: S, packets: &[Flow], truth: &HashMap<Flow, u64>) {
    for p in packets {
        sketch.insert(p);
    }
    let acc = evaluate(truth, &sketch.all_query(), THRESHOLD as u64);
    println!(
        "{:<50} recall {:.3}  precision {:.3}  F1 {:.3}  AAE {:>8.2}  ARE {:.4}",
        sketch.name(),
        acc.recall,
        acc.precision,
        acc.f1,
        acc.aae,
        acc.are
    );
}

fn main() {
    let mut rng = StdRng::seed_from_u64(42);
    let packets = trace(&mut rng);

    let mut truth: HashMap<Flow, u64> = HashMap::new();
    packets
        .iter()
        .for_each(|p| *truth.entry(*p).or_insert(0) += 1);

    println!(
        "{} packets, {} flows, heavy-hitter threshold {}",
        packets.len(),
        truth.len(),
        THRESHOLD
    );

    run(
        HeavyGuardian::<Flow, StdRng>::with_rng(MEMORY, StdRng::seed_from_u64(1)).unwrap(),
        &packets,
        &truth,
    );
    run(
        LinearDecaySketch::<Flow, StdRng>::with_rng(MEMORY, StdRng::seed_from_u64(1)).unwrap(),
        &packets,
        &truth,
    );
    run(
        DecaySketch::<Flow, StdRng>::with_rng(MEMORY, StdRng::seed_from_u64(1)).unwrap(),
        &packets,
        &truth,
    );
    run(
        StableSketch::<Flow, StdRng>::with_rng(MEMORY, StdRng::seed_from_u64(1)).unwrap(),
        &packets,
        &truth,
    );
    run(
        TightSketch::<Flow, StdRng>::with_rng(MEMORY, StdRng::seed_from_u64(1)).unwrap(),
        &packets,
        &truth,
    );
    run(
        TwoFaSketchBuilder::<Flow>::new(MEMORY)
            .set_threshold(THRESHOLD)
            .finalize()
            .unwrap(),
        &packets,
        &truth,
    );
    run(
        TwoStageBuilder::<Flow>::new(MEMORY, THRESHOLD)
            .finalize_with_rng(StdRng::seed_from_u64(1))
            .unwrap(),
        &packets,
        &truth,
    );
}
