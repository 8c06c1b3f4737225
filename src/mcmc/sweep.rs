use rand::Rng;

use crate::alloy::EnergySurface;
use crate::simulation::Walker;
use crate::windows::EnergyGrid;

/// One batch of Wang-Landau species-exchange trials for one walker.
///
/// Per trial, two sites are drawn uniformly and their species exchanged. The
/// move is accepted with probability `min(1, exp(log_dos[ibin] - log_dos[jbin]))`
/// provided the destination bin lies inside the walker's window; otherwise it
/// is undone. Accounting rules:
///
/// * accepted move: histogram and log-DoS updated at the destination bin
/// * rejected in-window move: updated at the current bin
/// * same-species draw: a rejection at the current bin, without evaluating
///   the energy
/// * destination outside the window: undone with no bookkeeping at all
///
/// Keeping rejected trials accounted at the current bin confines the random
/// walk to the window while boundary moves are still physically attempted.
///
/// Returns the number of accepted moves.
pub fn wl_sweep(
    surface: &dyn EnergySurface,
    walker: &mut Walker,
    grid: &EnergyGrid,
    f: f64,
    n_trials: usize,
) -> usize {
    let n_sites = walker.species.len();
    let lo = walker.window.lo;
    let mut accepted = 0usize;

    for _ in 0..n_trials {
        let a = walker.rng.gen_range(0..n_sites);
        let b = walker.rng.gen_range(0..n_sites);
        let ibin = walker.bin;

        if walker.species[a] == walker.species[b] {
            walker.hist[ibin - lo] += 1;
            walker.log_dos[ibin] += f;
            continue;
        }

        walker.species.swap(a, b);
        let trial_energy = surface.full_energy(&walker.species);
        let jbin = grid.bin_of(trial_energy);

        if !walker.window.contains(jbin) {
            walker.species.swap(a, b);
            continue;
        }
        let jbin = jbin as usize;

        let log_ratio = walker.log_dos[ibin] - walker.log_dos[jbin];
        if log_ratio >= 0.0 || walker.rng.gen::<f64>() < log_ratio.exp() {
            walker.energy = trial_energy;
            walker.bin = jbin;
            walker.hist[jbin - lo] += 1;
            walker.log_dos[jbin] += f;
            accepted += 1;
        } else {
            walker.species.swap(a, b);
            walker.hist[ibin - lo] += 1;
            walker.log_dos[ibin] += f;
        }
    }

    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::windows::Window;

    struct WeightedCount {
        weights: Vec<f64>,
    }

    impl EnergySurface for WeightedCount {
        fn full_energy(&self, species: &[u8]) -> f64 {
            species
                .iter()
                .zip(self.weights.iter())
                .filter(|(&s, _)| s == 1)
                .map(|(_, &w)| w)
                .sum()
        }
    }

    fn weighted_surface(n: usize) -> WeightedCount {
        WeightedCount {
            weights: (0..n).map(|i| i as f64).collect(),
        }
    }

    #[test]
    fn test_same_species_draws_count_as_rejections() {
        let surface = weighted_surface(8);
        let grid = EnergyGrid::new(0.0, 32.0, 8);
        // single species: every draw hits the same-species branch
        let mut walker = Walker::new(Window { lo: 0, hi: 7 }, vec![0u8; 8], 8, 3);
        walker.energy = 0.0;
        walker.bin = 0;

        let accepted = wl_sweep(&surface, &mut walker, &grid, 0.5, 100);
        assert_eq!(accepted, 0);
        assert_eq!(walker.hist[0], 100);
        assert_eq!(walker.log_dos[0], 50.0);
        assert!(walker.hist[1..].iter().all(|&h| h == 0));
    }

    #[test]
    fn test_energy_and_bin_stay_consistent() {
        let surface = weighted_surface(12);
        // 6 ones over weights 0..11: energies in [15, 51]
        let grid = EnergyGrid::new(14.5, 51.5, 10);
        let species: Vec<u8> = (0..12).map(|i| u8::from(i % 2 == 0)).collect();
        let energy = surface.full_energy(&species);
        let bin = grid.bin_of(energy);
        let window = Window { lo: 0, hi: 9 };
        assert!(window.contains(bin));

        let mut walker = Walker::new(window, species, 10, 11);
        walker.energy = energy;
        walker.bin = bin as usize;

        wl_sweep(&surface, &mut walker, &grid, 1.0, 500);
        assert_eq!(walker.energy, surface.full_energy(&walker.species));
        assert_eq!(walker.bin, grid.bin_of(walker.energy) as usize);
        assert!(window.contains(walker.bin as i64));
    }

    #[test]
    fn test_out_of_window_moves_leave_no_trace() {
        let surface = weighted_surface(12);
        // unit-width bins: every distinct-species swap changes the energy by
        // at least 1 and so leaves its bin
        let grid = EnergyGrid::new(14.5, 51.5, 37);
        let species: Vec<u8> = (0..12).map(|i| u8::from(i % 2 == 0)).collect();
        let energy = surface.full_energy(&species);
        // confine to the single bin holding the current energy: every
        // energy-changing move lands outside and must be undone
        let bin = grid.bin_of(energy) as usize;
        let window = Window { lo: bin, hi: bin };

        let mut walker = Walker::new(window, species, 37, 17);
        walker.energy = energy;
        walker.bin = bin;

        wl_sweep(&surface, &mut walker, &grid, 1.0, 300);
        assert_eq!(walker.energy, energy);
        assert_eq!(walker.energy, surface.full_energy(&walker.species));
        // only rejected-in-window and same-species trials were recorded
        let outside: f64 = walker
            .log_dos
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != bin)
            .map(|(_, &v)| v)
            .sum();
        assert_eq!(outside, 0.0);
    }

    #[test]
    fn test_swap_is_its_own_inverse() {
        let mut species: Vec<u8> = vec![0, 1, 2, 1, 0];
        let snapshot = species.clone();
        species.swap(1, 4);
        species.swap(1, 4);
        assert_eq!(species, snapshot);
    }
}
