use validator::{Validate, ValidationError};

use crate::error::WlError;
use crate::mcmc::RebaseMode;
use crate::windows::{partition_bins, EnergyGrid};

/// Rydberg energy in eV.
pub const RYDBERG_EV: f64 = 13.605_698_066;
/// Boltzmann constant in Ry/K.
pub const BOLTZMANN_RY: f64 = 8.617_333_262e-5 / RYDBERG_EV;

fn validate_wl_config(cfg: &WlConfig) -> Result<(), ValidationError> {
    if cfg.bins < 1 {
        return Err(ValidationError::new("bins must be >= 1"));
    }
    if cfg.energy_min >= cfg.energy_max {
        return Err(ValidationError::new("energy_min must be < energy_max"));
    }
    if cfg.mc_sweeps < 1 {
        return Err(ValidationError::new("mc_sweeps must be >= 1"));
    }
    if !(cfg.wl_f > 0.0) {
        return Err(ValidationError::new("wl_f must be > 0"));
    }
    if !(cfg.tolerance > 0.0) {
        return Err(ValidationError::new("tolerance must be > 0"));
    }
    if !(cfg.flatness > 0.0 && cfg.flatness < 1.0) {
        return Err(ValidationError::new("flatness must lie in (0, 1)"));
    }
    if !(cfg.temperature > 0.0) {
        return Err(ValidationError::new("temperature must be > 0"));
    }
    Ok(())
}

/// Run parameters of the Wang-Landau sampler.
///
/// `energy_min`/`energy_max` are given in meV/atom and converted to the
/// units of the energy evaluator by [`WlConfig::energy_grid`].
#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_wl_config"))]
pub struct WlConfig {
    /// Number of global energy bins.
    pub bins: usize,
    /// Lower edge of the binned energy range, meV/atom.
    pub energy_min: f64,
    /// Upper edge of the binned energy range, meV/atom.
    pub energy_max: f64,
    /// Number of energy windows; must divide the worker count.
    pub num_windows: usize,
    /// Bins shared across an interior window boundary.
    pub bin_overlap: usize,
    /// Sweeps per batch; one batch is `mc_sweeps * n_atoms` trials.
    pub mc_sweeps: usize,
    /// Initial refinement factor (log-DoS increment per visit).
    pub wl_f: f64,
    /// Run terminates once the refinement factor falls to or below this.
    pub tolerance: f64,
    /// Histogram flatness ratio (min/mean) required for a refinement.
    pub flatness: f64,
    /// Temperature in K; enters only the diagnostic beta.
    pub temperature: f64,
    /// Negative-entry handling of the pre-average rebase.
    pub rebase: RebaseMode,
    /// Abort with `Unconverged` after this many batches without refinement.
    pub max_batches: Option<u64>,
}

impl Default for WlConfig {
    fn default() -> Self {
        Self {
            bins: 64,
            energy_min: -10.0,
            energy_max: 10.0,
            num_windows: 1,
            bin_overlap: 1,
            mc_sweeps: 100,
            wl_f: 1.0,
            tolerance: 1e-4,
            flatness: 0.8,
            temperature: 300.0,
            rebase: RebaseMode::default(),
            max_batches: None,
        }
    }
}

impl WlConfig {
    /// Full validation for a run on `num_proc` workers: scalar options,
    /// window geometry, and worker divisibility.
    pub fn validate_for(&self, num_proc: usize) -> Result<(), WlError> {
        self.validate()
            .map_err(|e| WlError::Config(e.to_string()))?;
        partition_bins(self.bins, self.num_windows, self.bin_overlap)?;
        if num_proc == 0 || num_proc % self.num_windows != 0 {
            return Err(WlError::Config(format!(
                "num_proc ({num_proc}) not divisible by num_windows ({})",
                self.num_windows
            )));
        }
        Ok(())
    }

    /// The bin grid in the units of `full_energy` (Rydberg for the alloy
    /// model): meV/atom scaled by `n_atoms / (RYDBERG_EV * 1000)`.
    pub fn energy_grid(&self, n_atoms: usize) -> EnergyGrid {
        let scale = n_atoms as f64 / (RYDBERG_EV * 1000.0);
        EnergyGrid::new(self.energy_min * scale, self.energy_max * scale, self.bins)
    }

    /// Inverse temperature 1/(k_B T) in 1/Ry. Diagnostic only; never enters
    /// the acceptance rule.
    pub fn beta(&self) -> f64 {
        1.0 / (BOLTZMANN_RY * self.temperature)
    }

    /// Threshold below which a log-DoS entry does not qualify for the
    /// stitch overlap.
    pub fn min_dos_value(&self) -> f64 {
        self.tolerance * 1e-1
    }
}

/// Print the configuration-error banner. Called on the root only.
pub fn report_config_error(err: &WlError) {
    eprintln!("=================== configuration error ===================");
    eprintln!("  {err}");
    eprintln!("===========================================================");
}
