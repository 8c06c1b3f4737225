use rand::Rng;

use crate::alloy::EnergySurface;

/// Probability of keeping a move that increases the distance to the window
/// midpoint, so the drift cannot lock into a local minimum.
pub const ESCAPE_PROBABILITY: f64 = 1e-3;

/// Drift a configuration into the open energy interval `(min_e, max_e)` by
/// greedy species exchange.
///
/// Swaps that bring the energy closer to the interval midpoint are kept;
/// all others are undone except for the occasional escape. Terminates the
/// first time the energy lies strictly inside the interval and returns it.
/// A configuration that already starts inside performs no trials. No
/// histogram or DoS state is touched.
pub fn burn_in<R: Rng>(
    surface: &dyn EnergySurface,
    species: &mut [u8],
    rng: &mut R,
    min_e: f64,
    max_e: f64,
) -> f64 {
    let n_sites = species.len();
    let mid = 0.5 * (min_e + max_e);
    let mut energy = surface.full_energy(species);

    while energy <= min_e || energy >= max_e {
        let a = rng.gen_range(0..n_sites);
        let b = rng.gen_range(0..n_sites);
        if species[a] == species[b] {
            continue;
        }
        species.swap(a, b);
        let trial = surface.full_energy(species);
        if (trial - mid).abs() < (energy - mid).abs() || rng.gen::<f64>() < ESCAPE_PROBABILITY {
            energy = trial;
        } else {
            species.swap(a, b);
        }
    }
    energy
}
