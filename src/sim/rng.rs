//! Seeded random sampling for the simulation
//!
//! Every random decision (spawn picks, placement, spread, first-shot jitter)
//! goes through one `SimRng` owned by the game state, so a seed fully
//! determines a run.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Deterministic RNG wrapper with the sampling helpers the game uses
#[derive(Debug, Clone)]
pub struct SimRng {
    seed: u64,
    inner: Pcg32,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: Pcg32::seed_from_u64(seed),
        }
    }

    /// Seed this generator was created with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform float in [0, 1)
    pub fn float(&mut self) -> f32 {
        self.inner.random::<f32>()
    }

    /// Uniform float in [min, max)
    pub fn range_float(&mut self, min: f32, max: f32) -> f32 {
        self.float() * (max - min) + min
    }

    /// Uniform integer in [min, max). An empty range yields `min`.
    pub fn range_int(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.inner.random_range(min..max)
    }
}

impl Default for SimRng {
    fn default() -> Self {
        Self::new(0)
    }
}
