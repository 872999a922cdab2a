use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{GameError, Result};

/// Produces target sequences from an injected random source.
pub struct SequenceGenerator {
    rng: StdRng,
}

impl SequenceGenerator {
    pub fn new(rng: StdRng) -> Self { Self { rng } }

    /// Deterministic generator, used for `--seed` runs and tests.
    pub fn seeded(seed: u64) -> Self { Self::new(StdRng::seed_from_u64(seed)) }

    pub fn from_entropy() -> Self { Self::new(StdRng::from_entropy()) }

    /// `length` tile indices, each drawn independently from `[0, tile_count)`.
    /// Consecutive repeats are allowed.
    pub fn generate(&mut self, length: usize, tile_count: usize) -> Result<Vec<usize>> {
        if length < 1 {
            return Err(GameError::InvalidArgument(format!("sequence length must be >= 1, got {length}")));
        }
        if tile_count < 1 {
            return Err(GameError::InvalidArgument(format!("tile count must be >= 1, got {tile_count}")));
        }
        Ok((0..length).map(|_| self.rng.gen_range(0..tile_count)).collect())
    }
}
