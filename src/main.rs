use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use tracing_subscriber::EnvFilter;

use alloy_wl::config::{report_config_error, RYDBERG_EV};
use alloy_wl::{
    initial_setup, run_local, AlloyModel, DosWriter, Lattice, RebaseMode, WlConfig, WlError,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Lattice extent along each of the four dimensions
    #[arg(long, value_delimiter = ',', default_value = "8,8,8,1")]
    shape: Vec<usize>,

    /// Number of atomic species
    #[arg(long, default_value_t = 2)]
    species: usize,

    /// Species concentrations; uniform when omitted
    #[arg(long, value_delimiter = ',')]
    concentrations: Option<Vec<f64>>,

    /// Pair couplings per coordination shell, meV (like pairs at -J, unlike at +J)
    #[arg(long, value_delimiter = ',', default_value = "1.0")]
    couplings: Vec<f64>,

    /// Number of global energy bins
    #[arg(long, default_value_t = 64)]
    bins: usize,

    /// Lower edge of the binned energy range, meV/atom
    #[arg(long, allow_hyphen_values = true)]
    energy_min: f64,

    /// Upper edge of the binned energy range, meV/atom
    #[arg(long, allow_hyphen_values = true)]
    energy_max: f64,

    /// Number of energy windows
    #[arg(long, default_value_t = 1)]
    num_windows: usize,

    /// Bins shared across an interior window boundary
    #[arg(long, default_value_t = 1)]
    bin_overlap: usize,

    /// Sweeps per batch (one sweep is n_atoms trials)
    #[arg(long, default_value_t = 100)]
    mc_sweeps: usize,

    /// Initial refinement factor
    #[arg(long, default_value_t = 1.0)]
    wl_f: f64,

    /// Terminate once the refinement factor reaches this value
    #[arg(long, default_value_t = 1e-4)]
    tolerance: f64,

    /// Histogram flatness ratio required for a refinement
    #[arg(long, default_value_t = 0.8)]
    flatness: f64,

    /// Temperature in K (diagnostic beta only)
    #[arg(long, default_value_t = 300.0)]
    temperature: f64,

    /// Total workers; must be a multiple of num_windows
    #[arg(long, default_value_t = 1)]
    workers: usize,

    /// Pre-average rebase mode: magnitude or clamp
    #[arg(long, default_value = "magnitude")]
    rebase: String,

    /// Abort after this many sweep batches without convergence
    #[arg(long)]
    max_batches: Option<u64>,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Directory receiving wl_dos_bins.dat, wl_dos.dat, wl_hist.dat
    #[arg(long, default_value = "wl-out")]
    out_dir: PathBuf,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // configuration errors already printed their banner on the root
            if !matches!(e, WlError::Config(_)) {
                tracing::error!("{e}");
            }
            ExitCode::FAILURE
        }
    }
}

struct Setup {
    cfg: WlConfig,
    model: AlloyModel,
    species: Vec<u8>,
    workers: usize,
    seed: u64,
    out_dir: PathBuf,
}

fn run(args: Args) -> Result<(), WlError> {
    // the sampler prints the banner for errors it detects itself; assembly
    // errors never reach it, so they are reported here
    let setup = assemble(args).map_err(|e| {
        if matches!(e, WlError::Config(_)) {
            report_config_error(&e);
        }
        e
    })?;

    let grid = setup.cfg.energy_grid(setup.species.len());
    let writer = DosWriter::new(&setup.out_dir)?;
    let report = run_local(
        &setup.cfg,
        &setup.model,
        &grid,
        &setup.species,
        setup.workers,
        Some(&writer),
        setup.seed,
    )?;
    tracing::info!(
        refinements = report.refinements,
        final_f = report.final_f,
        out_dir = %setup.out_dir.display(),
        "done"
    );
    Ok(())
}

fn assemble(args: Args) -> Result<Setup, WlError> {
    let shape: [usize; 4] = args
        .shape
        .as_slice()
        .try_into()
        .map_err(|_| WlError::Config("shape must have exactly four extents".into()))?;
    let rebase = RebaseMode::try_from(args.rebase.as_str()).map_err(WlError::Config)?;

    if args.species < 2 {
        return Err(WlError::Config("at least two species are required".into()));
    }
    let concentrations = args
        .concentrations
        .unwrap_or_else(|| vec![1.0 / args.species as f64; args.species]);
    if concentrations.len() != args.species {
        return Err(WlError::Config(format!(
            "{} concentrations given for {} species",
            concentrations.len(),
            args.species
        )));
    }
    let total: f64 = concentrations.iter().sum();
    if concentrations.iter().any(|&c| c < 0.0) || (total - 1.0).abs() > 1e-6 {
        return Err(WlError::Config(
            "concentrations must be non-negative and sum to 1".into(),
        ));
    }

    let lattice = Lattice::new(shape, args.couplings.len());
    let n_sites = lattice.n_sites;
    // meV to Ry, matching the energy-range conversion
    let couplings_ry: Vec<f64> = args
        .couplings
        .iter()
        .map(|j| j / (RYDBERG_EV * 1000.0))
        .collect();
    let model = AlloyModel::from_shell_couplings(lattice, args.species, &couplings_ry);

    let mut rng = Xoshiro256StarStar::seed_from_u64(args.seed);
    let species = initial_setup(n_sites, &concentrations, &mut rng);

    let cfg = WlConfig {
        bins: args.bins,
        energy_min: args.energy_min,
        energy_max: args.energy_max,
        num_windows: args.num_windows,
        bin_overlap: args.bin_overlap,
        mc_sweeps: args.mc_sweeps,
        wl_f: args.wl_f,
        tolerance: args.tolerance,
        flatness: args.flatness,
        temperature: args.temperature,
        rebase,
        max_batches: args.max_batches,
    };
    Ok(Setup {
        cfg,
        model,
        species,
        workers: args.workers,
        seed: args.seed,
        out_dir: args.out_dir,
    })
}
