use core::fmt::{Debug, Display, Formatter};

/// `SketchError` contains the construction errors of this crate.
///
/// Once a sketch is built, `insert` and `query` never fail: all degradation
/// is statistical.
#[derive(Copy, Clone, PartialEq)]
pub enum SketchError {
    /// The memory budget cannot hold a single bucket (or slot) of the sketch.
    InsufficientMemory {
        /// The memory budget given, in bytes.
        memory: usize,
        /// The smallest budget that yields a table of length one.
        required: usize,
    },
    /// The number of hash functions of a multi-hash sketch must be at least one.
    InvalidHashNum(usize),
    /// The exponential decay base must be greater than 1.0.
    InvalidDecayBase(f64),
    /// The decay constant of a plain multi-hash sketch must be at least one.
    InvalidDecayConst(u32),
    /// A memory or threshold ratio must be in range (0.0, 1.0], and so must
    /// the sum of the two memory ratios of a two-stage sketch.
    InvalidRatio(f64),
}

impl SketchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            SketchError::InsufficientMemory { memory, required } => write!(
                f,
                "insufficient memory: {} bytes, which should be at least {} bytes",
                *memory, *required
            ),
            SketchError::InvalidHashNum(v) => {
                write!(f, "invalid number of hash functions: {}", *v)
            }
            SketchError::InvalidDecayBase(v) => write!(
                f,
                "invalid decay base: {}, which should be greater than 1.0",
                *v
            ),
            SketchError::InvalidDecayConst(v) => {
                write!(f, "invalid decay constant: {}, which should be at least 1", *v)
            }
            SketchError::InvalidRatio(v) => write!(
                f,
                "invalid ratio: {}, which should be in range (0.0, 1.0]",
                *v
            ),
        }
    }
}

impl Display for SketchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        self.fmt(f)
    }
}

impl Debug for SketchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        self.fmt(f)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SketchError {}

/// Derives the table length from a memory budget, rejecting budgets that
/// cannot hold one unit of `unit_bytes`.
pub(crate) fn table_length(memory: usize, unit_bytes: usize) -> Result<usize, SketchError> {
    let length = memory / unit_bytes;
    if length == 0 {
        return Err(SketchError::InsufficientMemory {
            memory,
            required: unit_bytes,
        });
    }
    Ok(length)
}

pub(crate) fn check_ratio(ratio: f64) -> Result<f64, SketchError> {
    if ratio > 0.0 && ratio <= 1.0 {
        Ok(ratio)
    } else {
        Err(SketchError::InvalidRatio(ratio))
    }
}
