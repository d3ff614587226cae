//! Deterministic RNG utilities for reproducible tests.

use nalgebra::DVector;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Create a deterministic `ChaCha8Rng` from a seed.
///
/// All test randomization should go through this to ensure reproducibility.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Generate a deterministic `Vec<f64>` of length `dim` in `[-scale, scale)`.
pub fn deterministic_vec(dim: usize, scale: f64, seed: u64) -> Vec<f64> {
    let mut rng = seeded_rng(seed);
    (0..dim).map(|_| rng.gen_range(-scale..scale)).collect()
}

/// A plausible 6-D auxiliary state: CoM offsets within ±5 cm, velocities
/// within ±0.5 m/s, accelerations within ±1 m/s².
pub fn random_state(seed: u64) -> DVector<f64> {
    let mut rng = seeded_rng(seed);
    let mut xi = DVector::zeros(6);
    for axis in 0..2 {
        xi[axis] = rng.gen_range(-0.05..0.05);
        xi[2 + axis] = rng.gen_range(-0.5..0.5);
        xi[4 + axis] = rng.gen_range(-1.0..1.0);
    }
    xi
}

/// Stacked jerk decisions for `horizon` steps, each component in
/// `[-max_jerk, max_jerk)`.
pub fn random_decisions(horizon: usize, max_jerk: f64, seed: u64) -> DVector<f64> {
    DVector::from_vec(deterministic_vec(2 * horizon, max_jerk, seed))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
