use rand::seq::SliceRandom;
use rand::Rng;

/// Fill a configuration with species drawn to match `concentrations`, then
/// shuffle site assignments.
///
/// Species counts use largest-remainder rounding so they always sum to
/// `n_sites`. Concentrations must be non-negative and sum to 1 (within
/// rounding noise); the caller validates them.
pub fn initial_setup<R: Rng>(n_sites: usize, concentrations: &[f64], rng: &mut R) -> Vec<u8> {
    let n_species = concentrations.len();
    let mut counts = vec![0usize; n_species];
    let mut remainders: Vec<(usize, f64)> = Vec::with_capacity(n_species);
    let mut assigned = 0usize;

    for (s, &c) in concentrations.iter().enumerate() {
        let exact = c * n_sites as f64;
        let floor = exact.floor() as usize;
        counts[s] = floor;
        assigned += floor;
        remainders.push((s, exact - floor as f64));
    }

    remainders.sort_by(|a, b| b.1.total_cmp(&a.1));
    for (s, _) in remainders.iter().take(n_sites - assigned) {
        counts[*s] += 1;
    }

    let mut species = Vec::with_capacity(n_sites);
    for (s, &n) in counts.iter().enumerate() {
        species.extend(std::iter::repeat(s as u8).take(n));
    }
    species.shuffle(rng);
    species
}
