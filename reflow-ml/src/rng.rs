//! Seeded random streams
//!
//! Every randomized model draws from a `ChaCha8Rng`. Parallel work (one tree
//! per rayon task) derives an independent stream per task from the model seed,
//! so results do not depend on thread scheduling.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Generator for a model seed
pub fn seeded(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Independent generator for task `index` of a seeded job
pub fn derived(seed: u64, index: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(index as u64 + 1);
    rng
}
