//! Accuracy of a heavy-hitter report against the exact counts of a stream.
//!
//! A key is a true heavy hitter when its exact count reaches the threshold,
//! and a reported one when its estimated count does. Estimation errors are
//! measured over the keys that are both.
//!
//! # Example
//! ```rust
//! use heavy_sketches::metrics::evaluate;
//! use heavy_sketches::{HeavyGuardian, Sketch};
//! use rand::{rngs::StdRng, SeedableRng};
//! use std::collections::HashMap;
//!
//! let mut sketch: HeavyGuardian<u64, StdRng> =
//!     HeavyGuardian::with_rng(1 << 14, StdRng::seed_from_u64(0)).unwrap();
//! let mut truth = HashMap::new();
//! for i in 0..10_000u64 {
//!     let key = if i % 2 == 0 { i % 10 } else { i };
//!     sketch.insert(&key);
//!     *truth.entry(key).or_insert(0u64) += 1;
//! }
//!
//! let accuracy = evaluate(&truth, &sketch.all_query(), 100);
//! assert!(accuracy.recall > 0.9);
//! ```
use crate::HeavyHitters;
use core::hash::Hash;

/// Scores of one heavy-hitter report.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Accuracy {
    /// Share of the true heavy hitters that were reported.
    pub recall: f64,
    /// Share of the reported heavy hitters that are true ones.
    pub precision: f64,
    /// Harmonic mean of recall and precision.
    pub f1: f64,
    /// Average absolute error of the reported counts.
    pub aae: f64,
    /// Average relative error of the reported counts.
    pub are: f64,
}

/// Scores `reported` against the exact counts in `truth`.
///
/// `truth` is any map-like collection of exact counts, such as a `&HashMap<K, u64>`.
/// Ratios with an empty denominator are reported as zero.
pub fn evaluate<'a, K, T>(truth: T, reported: &HeavyHitters<K>, threshold: u64) -> Accuracy
where
    K: Hash + Eq + 'a,
    T: IntoIterator<Item = (&'a K, &'a u64)>,
{
    let reported_heavy = reported
        .values()
        .filter(|&&c| c as u64 >= threshold)
        .count();
    let mut true_heavy = 0usize;
    let mut hits = 0usize;
    let mut abs_err = 0f64;
    let mut rel_err = 0f64;

    for (key, &exact) in truth {
        if exact < threshold || exact == 0 {
            continue;
        }
        true_heavy += 1;

        let est = reported.get(key).map_or(0, |&c| c as u64);
        if est >= threshold {
            hits += 1;
            let diff = if est > exact { est - exact } else { exact - est } as f64;
            abs_err += diff;
            rel_err += diff / exact as f64;
        }
    }

    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
    let recall = ratio(hits, true_heavy);
    let precision = ratio(hits, reported_heavy);
    let f1 = if recall + precision > 0.0 {
        2.0 * recall * precision / (recall + precision)
    } else {
        0.0
    };
    let (aae, are) = if hits == 0 {
        (0.0, 0.0)
    } else {
        (abs_err / hits as f64, rel_err / hits as f64)
    };

    tracing::debug!(recall, precision, f1, aae, are, "heavy hitters evaluated");

    Accuracy {
        recall,
        precision,
        f1,
        aae,
        are,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Count, HashMap};

    fn truth() -> HashMap<&'static str, u64> {
        let mut m = HashMap::new();
        m.insert("a", 100);
        m.insert("b", 50);
        m.insert("c", 10);
        m.insert("d", 5);
        m
    }

    #[test]
    fn test_perfect_report() {
        let mut reported = HashMap::new();
        reported.insert("a", 100);
        reported.insert("b", 50);
        reported.insert("c", 10);

        let acc = evaluate(&truth(), &reported, 40);
        assert_eq!(
            acc,
            Accuracy {
                recall: 1.0,
                precision: 1.0,
                f1: 1.0,
                aae: 0.0,
                are: 0.0,
            }
        );
    }

    #[test]
    fn test_misses_and_false_positives() {
        let mut reported = HashMap::new();
        // over-estimated by 20
        reported.insert("a", 120);
        // under the threshold, so a miss
        reported.insert("b", 30);
        // a light key reported as heavy
        reported.insert("d", 45);
        // never seen at all
        reported.insert("z", 60);

        let acc = evaluate(&truth(), &reported, 40);
        assert_eq!(acc.recall, 0.5);
        assert_eq!(acc.precision, 1.0 / 3.0);
        assert!((acc.f1 - 0.4).abs() < 1e-9);
        assert_eq!(acc.aae, 20.0);
        assert_eq!(acc.are, 0.2);
    }

    #[test]
    fn test_empty() {
        let reported: HashMap<&str, Count> = HashMap::new();
        assert_eq!(evaluate(&truth(), &reported, 40), Accuracy::default());
        assert_eq!(
            evaluate(&HashMap::<&str, u64>::new(), &reported, 1),
            Accuracy::default()
        );
    }
}
