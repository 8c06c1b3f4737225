use crate::error::WlError;

/// Inclusive range of global bin indices assigned to one group of walkers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub lo: usize,
    pub hi: usize,
}

impl Window {
    #[inline]
    pub fn width(&self) -> usize {
        self.hi - self.lo + 1
    }

    #[inline]
    pub fn contains(&self, bin: i64) -> bool {
        bin >= self.lo as i64 && bin <= self.hi as i64
    }
}

/// Divide `bins` global bins into `num_windows` contiguous windows that share
/// `overlap` bins on each side of an interior boundary.
///
/// With `fw = bins / num_windows`, window `i` spans
/// `[max(i*fw - overlap, 0), min((i+1)*fw + overlap - 1, bins - 1)]`.
///
/// Rejects geometries where a window would have no bin of its own
/// (`fw < 2*overlap + 1`) or where the last window would not reach the final
/// bin (`overlap < bins % num_windows`).
pub fn partition_bins(
    bins: usize,
    num_windows: usize,
    overlap: usize,
) -> Result<Vec<Window>, WlError> {
    if num_windows == 0 {
        return Err(WlError::Config("num_windows must be >= 1".into()));
    }
    if bins < num_windows {
        return Err(WlError::Config(format!(
            "bins ({bins}) must be >= num_windows ({num_windows})"
        )));
    }
    let fw = bins / num_windows;
    if overlap < 1 {
        return Err(WlError::Config("bin_overlap must be >= 1".into()));
    }
    if overlap >= fw {
        return Err(WlError::Config(format!(
            "bin_overlap ({overlap}) must be < bins/num_windows ({fw})"
        )));
    }
    if fw < 2 * overlap + 1 {
        return Err(WlError::Config(format!(
            "window width {fw} leaves no non-overlap bin with bin_overlap {overlap}"
        )));
    }
    if overlap < bins % num_windows {
        return Err(WlError::Config(format!(
            "bins ({bins}) not divisible by num_windows ({num_windows}): \
             the last {} bins would not be covered",
            bins % num_windows - overlap
        )));
    }

    let windows = (0..num_windows)
        .map(|i| Window {
            lo: (i * fw).saturating_sub(overlap),
            hi: ((i + 1) * fw + overlap - 1).min(bins - 1),
        })
        .collect();
    Ok(windows)
}

/// Fixed equidistant energy binning in the units of the energy evaluator.
#[derive(Debug, Clone, Copy)]
pub struct EnergyGrid {
    pub e_min: f64,
    pub e_max: f64,
    pub n_bins: usize,
}

impl EnergyGrid {
    pub fn new(e_min: f64, e_max: f64, n_bins: usize) -> Self {
        Self {
            e_min,
            e_max,
            n_bins,
        }
    }

    /// Global bin index of `energy`. May fall outside `[0, n_bins - 1]` for
    /// out-of-range energies; callers treat such indices as rejections.
    #[inline]
    pub fn bin_of(&self, energy: f64) -> i64 {
        ((energy - self.e_min) / (self.e_max - self.e_min) * self.n_bins as f64).floor() as i64
    }

    /// The `n_bins + 1` bin edges.
    pub fn edges(&self) -> Vec<f64> {
        let width = (self.e_max - self.e_min) / self.n_bins as f64;
        (0..=self.n_bins)
            .map(|k| self.e_min + k as f64 * width)
            .collect()
    }
}
