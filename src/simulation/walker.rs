use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

use crate::windows::Window;

/// Mutable state of one Wang-Landau walker.
///
/// Each walker privately owns a species configuration, a PRNG, its window's
/// visit histogram, and a running log-DoS estimate over all global bins (only
/// the window's entries are touched by its own sweeps).
pub struct Walker {
    /// Global bin range this walker samples.
    pub window: Window,
    /// Species configuration, flat over lattice sites.
    pub species: Vec<u8>,
    pub rng: Xoshiro256StarStar,
    /// Current total energy, kept in sync with `species`.
    pub energy: f64,
    /// Global bin index of `energy`; valid once burn-in has finished.
    pub bin: usize,
    /// Visit histogram of the current refinement round, window width.
    pub hist: Vec<u64>,
    /// Running log g(E) estimate over all global bins.
    pub log_dos: Vec<f64>,
}

impl Walker {
    /// Allocate a walker with deterministic seeding (`seed` should already
    /// include the worker rank).
    pub fn new(window: Window, species: Vec<u8>, n_bins: usize, seed: u64) -> Self {
        Self {
            window,
            species,
            rng: Xoshiro256StarStar::seed_from_u64(seed),
            energy: 0.0,
            bin: window.lo,
            hist: vec![0; window.width()],
            log_dos: vec![0.0; n_bins],
        }
    }
}
