//! Parallel Wang-Landau sampling of the density of states of lattice alloys.
//!
//! The sampler estimates log g(E) by biased random walks in energy space:
//! walkers exchange the species of two lattice sites, accept moves with
//! probability `min(1, exp(log_g[before] - log_g[after]))`, and add a
//! refinement factor f to the log-DoS of every visited bin. Whenever the
//! visit histogram is flat, f is halved; the run ends once f reaches a
//! tolerance.
//!
//! # Components
//!
//! | Piece | Module |
//! |-------|--------|
//! | Energy windows and binning | [`windows`] |
//! | Burn-in, WL sweep, flatness control | [`mcmc`] |
//! | Walker state, reductions, stitching, orchestration | [`simulation`] |
//! | Lattice geometry and shells | [`geometry`] |
//! | Alloy configurations and energy model | [`alloy`] |
//! | Worker messaging | [`transport`] |
//!
//! The global bin range is split into overlapping windows, each sampled by a
//! group of walkers. On every refinement the walkers of a window average
//! their log-DoS estimates, and the root splices the windows into one global
//! curve by matching means over the overlaps.
//!
//! Workers run as independent threads behind the [`transport::Transport`]
//! seam; a fabric of size 1 drives the whole protocol single-threaded.
//!
//! # Quick start
//!
//! ```no_run
//! use alloy_wl::{initial_setup, run_local, AlloyModel, Lattice, WlConfig};
//! use rand::SeedableRng;
//! use rand_xoshiro::Xoshiro256StarStar;
//!
//! let lattice = Lattice::new([8, 8, 8, 1], 2);
//! let n_sites = lattice.n_sites;
//! let model = AlloyModel::from_shell_couplings(lattice, 2, &[1.0e-3, 0.4e-3]);
//!
//! let mut rng = Xoshiro256StarStar::seed_from_u64(42);
//! let species = initial_setup(n_sites, &[0.5, 0.5], &mut rng);
//!
//! let cfg = WlConfig {
//!     bins: 64,
//!     energy_min: -40.0,
//!     energy_max: 40.0,
//!     num_windows: 2,
//!     bin_overlap: 4,
//!     ..WlConfig::default()
//! };
//! let grid = cfg.energy_grid(n_sites);
//!
//! let report = run_local(&cfg, &model, &grid, &species, 4, None, 42).unwrap();
//! let log_dos = report.global_dos.unwrap();
//! ```

pub mod alloy;
pub mod config;
pub mod error;
pub mod geometry;
pub mod mcmc;
pub mod output;
pub mod simulation;
pub mod transport;
pub mod windows;

pub use alloy::{initial_setup, AlloyModel, EnergySurface};
pub use config::WlConfig;
pub use error::WlError;
pub use geometry::Lattice;
pub use mcmc::RebaseMode;
pub use output::DosWriter;
pub use simulation::{run_local, run_walker, Walker, WlReport};
pub use transport::{LocalTransport, Transport};
pub use windows::{partition_bins, EnergyGrid, Window};
