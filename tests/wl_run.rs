//! End-to-end runs of the sampler on a synthetic energy surface.
//!
//! The surface assigns each lattice site a weight and sums the weights of
//! sites holding species 1. Exchanging species moves weight around at fixed
//! composition, so with distinct integer weights every intermediate energy is
//! reachable and each bin of a grid over the full span gets visits.

use alloy_wl::{run_local, EnergySurface, RebaseMode, WlConfig, WlError};

struct WeightedCount {
    weights: Vec<f64>,
}

impl WeightedCount {
    fn new(n: usize) -> Self {
        Self {
            weights: (0..n).map(|i| i as f64).collect(),
        }
    }
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

/// Half species 1 over `n` sites.
fn half_filled(n: usize) -> Vec<u8> {
    (0..n).map(|i| u8::from(i < n / 2)).collect()
}

fn base_config() -> WlConfig {
    WlConfig {
        wl_f: 1.0,
        flatness: 0.8,
        mc_sweeps: 50,
        temperature: 300.0,
        rebase: RebaseMode::Magnitude,
        max_batches: Some(200_000),
        ..WlConfig::default()
    }
}

#[test]
fn test_single_window_halves_f_to_tolerance() {
    let surface = WeightedCount::new(8);
    // 4 ones over weights 0..7: energies span [6, 22]
    let cfg = WlConfig {
        bins: 8,
        energy_min: 5.5,
        energy_max: 22.5,
        num_windows: 1,
        bin_overlap: 1,
        tolerance: 0.125,
        ..base_config()
    };
    // the grid is built directly in surface units
    let grid = alloy_wl::EnergyGrid::new(5.5, 22.5, 8);

    let report = run_local(&cfg, &surface, &grid, &half_filled(8), 1, None, 42).unwrap();

    // 1.0 -> 0.5 -> 0.25 -> 0.125: exactly three refinements
    assert_eq!(report.refinements, 3);
    assert_eq!(report.final_f, 0.125);

    let dos = report.global_dos.expect("root report carries the global DoS");
    assert_eq!(dos.len(), 8);
    assert!(dos.iter().all(|v| v.is_finite()));
    // every bin was visited
    assert!(dos.iter().filter(|&&v| v > 0.0).count() >= 7);
}

#[test]
fn test_two_windows_stitch_into_one_curve() {
    let surface = WeightedCount::new(16);
    // 8 ones over weights 0..15: energies span [28, 92]
    let cfg = WlConfig {
        bins: 20,
        energy_min: 27.5,
        energy_max: 92.5,
        num_windows: 2,
        bin_overlap: 4,
        tolerance: 0.25,
        ..base_config()
    };
    let grid = alloy_wl::EnergyGrid::new(27.5, 92.5, 20);

    // two windows, two walkers each
    let report = run_local(&cfg, &surface, &grid, &half_filled(16), 4, None, 7).unwrap();

    assert_eq!(report.refinements, 2);
    assert_eq!(report.final_f, 0.25);
    let dos = report.global_dos.unwrap();
    assert_eq!(dos.len(), 20);
    assert!(dos.iter().all(|v| v.is_finite()));
}

#[test]
fn test_indivisible_worker_count_is_a_config_error() {
    let surface = WeightedCount::new(8);
    let cfg = WlConfig {
        bins: 12,
        energy_min: 5.5,
        energy_max: 22.5,
        num_windows: 3,
        ..base_config()
    };
    let grid = alloy_wl::EnergyGrid::new(5.5, 22.5, 12);

    let err = run_local(&cfg, &surface, &grid, &half_filled(8), 7, None, 1).unwrap_err();
    match err {
        WlError::Config(msg) => assert!(msg.contains("not divisible")),
        other => panic!("expected a config error, got {other}"),
    }
}

#[test]
fn test_batch_cap_surfaces_as_unconverged() {
    let surface = WeightedCount::new(8);
    let cfg = WlConfig {
        bins: 8,
        energy_min: 5.5,
        energy_max: 22.5,
        num_windows: 1,
        mc_sweeps: 1,
        max_batches: Some(2),
        ..base_config()
    };
    let grid = alloy_wl::EnergyGrid::new(5.5, 22.5, 8);

    let err = run_local(&cfg, &surface, &grid, &half_filled(8), 1, None, 3).unwrap_err();
    assert!(matches!(err, WlError::Unconverged { batches: 2 }));
}
