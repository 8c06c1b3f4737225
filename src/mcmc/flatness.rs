/// Minimum visits every bin needs before a histogram is considered at all.
const MIN_VISITS: u64 = 10;

/// How a walker's log-DoS is re-zeroed before intra-window averaging.
///
/// The minimum positive entry is subtracted from every entry; the modes
/// differ in what happens to entries that go negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RebaseMode {
    /// Negative entries keep their magnitude.
    #[default]
    Magnitude,
    /// Negative entries are zeroed.
    Clamp,
}

impl TryFrom<&str> for RebaseMode {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "magnitude" => Ok(Self::Magnitude),
            "clamp" => Ok(Self::Clamp),
            _ => Err(format!(
                "unknown rebase mode '{s}', expected 'magnitude' or 'clamp'"
            )),
        }
    }
}

/// Decides when a walker's histogram warrants a refinement.
///
/// The first time every bin exceeds `MIN_VISITS` (10) the histogram is zeroed
/// without proposing a refinement; that round only discards the initial
/// exploration. From then on a refinement is proposed whenever the flatness
/// ratio `min/mean` exceeds the threshold and every bin again exceeds
/// `MIN_VISITS` (10).
pub struct FlatnessController {
    threshold: f64,
    first_reset: bool,
}

impl FlatnessController {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            first_reset: false,
        }
    }

    /// Evaluate the histogram after a sweep batch. Returns `true` when this
    /// walker proposes a refinement.
    pub fn check(&mut self, hist: &mut [u64]) -> bool {
        let min = *hist.iter().min().unwrap();
        if !self.first_reset {
            if min > MIN_VISITS {
                self.first_reset = true;
                hist.fill(0);
            }
            return false;
        }
        min > MIN_VISITS && flatness_ratio(hist) > self.threshold
    }

    pub fn first_reset(&self) -> bool {
        self.first_reset
    }
}

/// Ratio of the minimum to the mean of a visit histogram.
pub fn flatness_ratio(hist: &[u64]) -> f64 {
    let min = *hist.iter().min().unwrap() as f64;
    let mean = hist.iter().sum::<u64>() as f64 / hist.len() as f64;
    if mean == 0.0 {
        0.0
    } else {
        min / mean
    }
}

/// Re-zero a log-DoS estimate before averaging: subtract the minimum
/// positive entry everywhere, resolving negatives per `mode`. An estimate
/// with no positive entry is left untouched.
pub fn rebase_log_dos(log_dos: &mut [f64], mode: RebaseMode) {
    let min_pos = log_dos
        .iter()
        .copied()
        .filter(|&v| v > 0.0)
        .fold(f64::INFINITY, f64::min);
    if !min_pos.is_finite() {
        return;
    }
    for v in log_dos.iter_mut() {
        let shifted = *v - min_pos;
        *v = if shifted < 0.0 {
            match mode {
                RebaseMode::Magnitude => -shifted,
                RebaseMode::Clamp => 0.0,
            }
        } else {
            shifted
        };
    }
}
