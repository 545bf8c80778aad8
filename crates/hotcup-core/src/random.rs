//! Injectable randomness.
//!
//! Everything random in a round (the countdown duration, the mission and
//! title, the cosmetic shake) is drawn through [`RandomSource`] so tests can
//! substitute a seeded or scripted generator.

use std::collections::VecDeque;

use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;

/// Uniform draws over integers, list indices and the unit interval.
pub trait RandomSource {
    /// Uniform integer in `[low, high]`, both ends inclusive.
    fn int_inclusive(&mut self, low: u32, high: u32) -> u32;

    /// Uniform index in `[0, len)`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize;

    /// Uniform float in `[0, 1)`.
    fn unit(&mut self) -> f64;
}

impl<R: RngCore> RandomSource for R {
    fn int_inclusive(&mut self, low: u32, high: u32) -> u32 {
        if low >= high {
            return low;
        }
        self.gen_range(low..=high)
    }

    fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "index drawn from an empty collection");
        if len <= 1 {
            return 0;
        }
        self.gen_range(0..len)
    }

    fn unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// The generator used for real rounds.
pub type SeededRandom = Mcg128Xsl64;

/// Reproducible generator for a given seed.
pub fn seeded(seed: u64) -> SeededRandom {
    Mcg128Xsl64::seed_from_u64(seed)
}

/// Generator seeded from OS entropy.
pub fn from_entropy() -> SeededRandom {
    Mcg128Xsl64::from_entropy()
}

/// Replays a fixed script of draws.
///
/// Integers are clamped into the requested range, indices are reduced modulo
/// the length and units are clamped into `[0, 1)`. Once a script runs dry it
/// keeps returning the lowest legal value.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    ints: VecDeque<u32>,
    indices: VecDeque<usize>,
    units: VecDeque<f64>,
}

impl ScriptedRandom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ints(mut self, ints: impl IntoIterator<Item = u32>) -> Self {
        self.ints.extend(ints);
        self
    }

    pub fn with_indices(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.indices.extend(indices);
        self
    }

    pub fn with_units(mut self, units: impl IntoIterator<Item = f64>) -> Self {
        self.units.extend(units);
        self
    }
}

impl RandomSource for ScriptedRandom {
    fn int_inclusive(&mut self, low: u32, high: u32) -> u32 {
        self.ints
            .pop_front()
            .map(|v| v.clamp(low, high.max(low)))
            .unwrap_or(low)
    }

    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.indices.pop_front().map(|i| i % len).unwrap_or(0)
    }

    fn unit(&mut self) -> f64 {
        self.units
            .pop_front()
            .map(|u| u.clamp(0.0, 1.0 - f64::EPSILON))
            .unwrap_or(0.0)
    }
}
