use crate::search::pattern::SearchPattern;

/// Sizing policy: expected match count for a pattern against a base population.
///
/// Implementations must be monotone non-increasing in pattern length and stay
/// within `[0, base]`.
pub trait CountEstimator: Send + Sync {
    fn estimate(&self, base: usize, pattern: &SearchPattern) -> usize;
}

/// Geometric decay past a length threshold: `round(base * decay^(len - threshold))`,
/// clamped to `[0, base]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayEstimator {
    pub decay: f64,
    pub threshold: usize,
}

impl Default for DecayEstimator {
    fn default() -> Self {
        Self {
            decay: 0.3,
            threshold: 10,
        }
    }
}

impl DecayEstimator {
    pub fn new(decay: f64, threshold: usize) -> Self {
        Self { decay, threshold }
    }

    pub fn estimate_len(&self, base: usize, pattern_len: usize) -> usize {
        let exponent = pattern_len as f64 - self.threshold as f64;
        let estimate = (base as f64 * self.decay.powf(exponent)).round();

        // Short patterns blow past the base; long ones underflow towards zero.
        if estimate.is_nan() {
            return base;
        }
        estimate.clamp(0.0, base as f64) as usize
    }
}

impl CountEstimator for DecayEstimator {
    fn estimate(&self, base: usize, pattern: &SearchPattern) -> usize {
        self.estimate_len(base, pattern.char_len())
    }
}
