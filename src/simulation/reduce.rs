use crate::error::WlError;
use crate::transport::{tag, Transport};

/// Average the log-DoS estimates of all walkers of one window in place.
///
/// Two-phase gather/scatter: every non-root walker sends its view to the
/// window root, the root accumulates and divides by the walker count, then
/// broadcasts the mean back. The broadcast copies one buffer, so afterwards
/// every walker of the window holds a bitwise-identical average. Traffic is
/// tagged by window id and never crosses window boundaries.
pub fn window_average<T: Transport>(
    transport: &mut T,
    window_id: usize,
    window_root: usize,
    n_walkers: usize,
    log_dos: &mut [f64],
) -> Result<(), WlError> {
    if n_walkers == 1 {
        return Ok(());
    }
    let rank = transport.rank();

    if rank == window_root {
        for src in window_root + 1..window_root + n_walkers {
            let part = transport.recv(src, tag::for_window(tag::WINDOW_GATHER, window_id))?;
            for (acc, v) in log_dos.iter_mut().zip(part) {
                *acc += v;
            }
        }
        let inv = 1.0 / n_walkers as f64;
        for v in log_dos.iter_mut() {
            *v *= inv;
        }
        for dst in window_root + 1..window_root + n_walkers {
            transport.send(dst, tag::for_window(tag::WINDOW_SCATTER, window_id), log_dos)?;
        }
    } else {
        transport.send(
            window_root,
            tag::for_window(tag::WINDOW_GATHER, window_id),
            log_dos,
        )?;
        let mean = transport.recv(window_root, tag::for_window(tag::WINDOW_SCATTER, window_id))?;
        log_dos.copy_from_slice(&mean);
    }
    Ok(())
}
