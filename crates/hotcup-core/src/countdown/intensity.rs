//! Danger intensity and the cosmetic shake derived from it.

use serde::{Deserialize, Serialize};

use crate::random::RandomSource;

/// Linear ramp toward the explosion.
///
/// `max(0, (reference - remaining) / divisor)`. The reference is the upper
/// bound of the duration range, not the run's own duration, so a short round
/// starts partway up the scale.
pub fn danger_intensity(remaining_secs: f64, reference_secs: f64, divisor: f64) -> f64 {
    if divisor <= 0.0 {
        return 0.0;
    }
    ((reference_secs - remaining_secs) / divisor).max(0.0)
}

/// One frame of board shake.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shake {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

impl Shake {
    pub const REST: Shake = Shake {
        offset_x: 0.0,
        offset_y: 0.0,
        scale: 1.0,
    };

    /// Random jitter in `[-intensity/2, intensity/2)` on each axis, plus a
    /// scale that grows `scale_per_sec` for every second below the reference.
    pub fn sample(
        intensity: f64,
        remaining_secs: f64,
        reference_secs: f64,
        scale_per_sec: f64,
        rng: &mut dyn RandomSource,
    ) -> Self {
        let half = intensity / 2.0;
        Self {
            offset_x: rng.unit() * intensity - half,
            offset_y: rng.unit() * intensity - half,
            scale: 1.0 + (reference_secs - remaining_secs) * scale_per_sec,
        }
    }
}

impl Default for Shake {
    fn default() -> Self {
        Self::REST
    }
}
