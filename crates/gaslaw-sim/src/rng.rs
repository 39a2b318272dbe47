//! Seeded randomness for particle spawns.
//!
//! One `StdRng` per simulation. With a configured seed the whole spawn
//! sequence is reproducible; without one a seed is drawn once at startup
//! and logged so a run can be replayed.

use std::f64::consts::TAU;

use glam::DVec2;
use rand::{rng, rngs::StdRng, Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct SpawnRng {
    rng: StdRng,
    seed: u64,
}

impl SpawnRng {
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| rng().random());
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed this generator was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform point in the square [-extent, extent]².
    pub fn position(&mut self, extent: f64) -> DVec2 {
        let e = extent.max(0.0);
        DVec2::new(
            self.rng.random_range(-e..=e),
            self.rng.random_range(-e..=e),
        )
    }

    /// Uniform unit vector.
    pub fn direction(&mut self) -> DVec2 {
        DVec2::from_angle(self.rng.random_range(0.0..TAU))
    }
}
