//! # Random Service
//!
//! The per-run source of randomness handed to a generation method: a seeded
//! ChaCha8 stream plus the factory for coherent noise bound to the same seed.
//!
//! Nothing here reads global state. The only entropy-backed entry point is
//! [`RandomService::random_seed`], used when the configuration asks for a
//! fresh world.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::noise::{CoherentNoise, NoiseSettings, WorldSeed};

/// Seeded random generator and noise factory.
#[derive(Clone, Debug)]
pub struct RandomService {
    seed: WorldSeed,
    rng: ChaCha8Rng,
}

impl RandomService {
    /// Creates a service whose every output derives from `seed`.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed.value()),
        }
    }

    /// Draws a fresh world seed from operating-system entropy.
    #[must_use]
    pub fn random_seed() -> WorldSeed {
        WorldSeed::new(ChaCha8Rng::from_entropy().gen())
    }

    /// The seed this service was built from.
    #[inline]
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// Derives an independent seed for a named purpose.
    #[inline]
    #[must_use]
    pub const fn derive_seed(&self, purpose: u64) -> WorldSeed {
        self.seed.derive(purpose)
    }

    /// Builds a coherent noise sampler bound to this service's seed.
    #[must_use]
    pub fn coherent_noise(&self, settings: NoiseSettings) -> CoherentNoise {
        CoherentNoise::new(self.seed, settings)
    }

    /// Next raw value of the seeded stream.
    pub fn next_u64(&mut self) -> u64 {
        self.rng.gen()
    }

    /// Uniform integer in `[min, max)`. Returns `min` for an empty range.
    pub fn range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    /// Returns true with the given probability (clamped to [0, 1]).
    pub fn chance(&mut self, probability: f64) -> bool {
        if probability.is_nan() {
            return false;
        }
        self.rng.gen_bool(probability.clamp(0.0, 1.0))
    }
}
