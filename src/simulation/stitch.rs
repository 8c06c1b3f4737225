use crate::error::WlError;
use crate::windows::Window;

/// Splice one window's averaged log-DoS onto the global estimate.
///
/// The global buffer already holds the curve up to and including this
/// window's overlap region. The shift is the mean of `global - received`
/// over the first `overlap` positions of the window, counting only positions
/// where both values exceed `min_val`; the window's remaining bins are then
/// written shifted. Overlap bins stay owned by the earlier window.
///
/// Returns [`WlError::Stitch`] when no overlap position qualifies, since no
/// meaningful shift exists.
pub fn splice(
    global: &mut [f64],
    received: &[f64],
    window: Window,
    window_id: usize,
    overlap: usize,
    min_val: f64,
) -> Result<(), WlError> {
    let lo = window.lo;
    let mut sum = 0.0f64;
    let mut count = 0usize;
    for j in 0..overlap {
        let g = global[lo + j];
        let r = received[lo + j];
        if g > min_val && r > min_val {
            sum += g - r;
            count += 1;
        }
    }
    if count == 0 {
        return Err(WlError::Stitch {
            window: window_id,
            min_val,
        });
    }
    let shift = sum / count as f64;
    for j in lo + overlap..=window.hi {
        global[j] = received[j] + shift;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_window_splice() {
        // window 1 owns bins 0..=4, window 2 spans 3..=9 with overlap 2
        let mut global = vec![1.0, 2.0, 3.0, 4.0, 5.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let mut received = vec![0.0; 10];
        received[3..=9].copy_from_slice(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0]);

        splice(&mut global, &received, Window { lo: 3, hi: 9 }, 1, 2, 1e-5).unwrap();
        // shift = mean(4-10, 5-11) = -6
        assert_eq!(global, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
    }

    #[test]
    fn test_splice_mean_shift_vanishes_over_overlap() {
        let mut global = vec![0.0; 12];
        for (i, g) in global.iter_mut().enumerate().take(8) {
            *g = 2.0 + 1.5 * i as f64;
        }
        let window = Window { lo: 5, hi: 11 };
        let received: Vec<f64> = (0..12).map(|i| 40.0 + 1.3 * i as f64).collect();
        let before: Vec<f64> = global.clone();

        splice(&mut global, &received, window, 1, 3, 1e-8).unwrap();

        // continuity: the applied shift reproduces the overlap mean difference
        let shift: f64 = (0..3)
            .map(|j| before[window.lo + j] - received[window.lo + j])
            .sum::<f64>()
            / 3.0;
        for j in window.lo + 3..=window.hi {
            assert!((global[j] - (received[j] + shift)).abs() < 1e-12);
        }
        // overlap bins stay owned by the earlier window
        for j in window.lo..window.lo + 3 {
            assert_eq!(global[j], before[j]);
        }
    }

    #[test]
    fn test_empty_overlap_is_an_error() {
        // global still zero over the overlap: nothing qualifies
        let mut global = vec![0.0; 6];
        let received = vec![5.0; 6];
        let err = splice(&mut global, &received, Window { lo: 2, hi: 5 }, 1, 2, 1e-3);
        assert!(matches!(err, Err(WlError::Stitch { window: 1, .. })));
    }
}
