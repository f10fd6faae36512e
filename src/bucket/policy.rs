use crate::error::SketchError;
use crate::polyfill::powf;
use crate::Count;
use rand::{Rng, RngCore};

const DEFAULT_DECAY_BASE: f64 = 1.08;

/// `DecayPolicy` decides what happens when a key meets a full bucket.
///
/// The bucket hands the policy the counter of its weakest slot; the policy may
/// change it and returns `true` when the incoming key should take the slot
/// over (the sketch then stores the key with count 1).
pub trait DecayPolicy {
    /// The default name of a sketch using this policy.
    const NAME: &'static str;

    /// Resolves a collision against the weakest counter of a full bucket.
    fn collide<R: RngCore>(&self, count: &mut Count, rng: &mut R) -> bool;
}

/// Exponential decay, as in HeavyGuardian.
///
/// With probability `1 / floor(base^count)` the weakest counter is decremented;
/// the key is replaced when it reaches zero. Large counters are exponentially
/// hard to wear down.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ExponentialDecay {
    base: f64,
}

impl ExponentialDecay {
    /// Creates an exponential decay with the given base, which must be greater than 1.0.
    pub fn new(base: f64) -> Result<Self, SketchError> {
        if base > 1.0 && base.is_finite() {
            Ok(Self { base })
        } else {
            Err(SketchError::InvalidDecayBase(base))
        }
    }

    /// Returns the decay base.
    pub fn base(&self) -> f64 {
        self.base
    }
}

impl Default for ExponentialDecay {
    fn default() -> Self {
        Self {
            base: DEFAULT_DECAY_BASE,
        }
    }
}

impl DecayPolicy for ExponentialDecay {
    const NAME: &'static str = "HeavyGuardian";

    fn collide<R: RngCore>(&self, count: &mut Count, rng: &mut R) -> bool {
        // float to int casts saturate, huge counters simply never decay
        let range = (powf(self.base, *count as f64) as u64).max(1);
        if rng.gen_range(0..range) == 0 {
            *count = count.saturating_sub(1);
            return *count == 0;
        }
        false
    }
}

/// Linear decay.
///
/// The weakest counter is incremented first, then the incoming key replaces
/// it outright with probability `1 / count`. Turnover is faster than with
/// [`ExponentialDecay`].
///
/// [`ExponentialDecay`]: struct.ExponentialDecay.html
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LinearDecay;

impl DecayPolicy for LinearDecay {
    const NAME: &'static str = "LinearDecaySketch";

    fn collide<R: RngCore>(&self, count: &mut Count, rng: &mut R) -> bool {
        *count = count.saturating_add(1);
        rng.gen_range(0..*count) == 0
    }
}

/// The baseline policy: a full bucket never yields and the incoming key is dropped.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NoDecay;

impl DecayPolicy for NoDecay {
    const NAME: &'static str = "NoDecaySketch";

    fn collide<R: RngCore>(&self, _count: &mut Count, _rng: &mut R) -> bool {
        false
    }
}
