pub mod reduce;
pub mod stitch;
pub mod walker;

pub use walker::Walker;

use std::thread;
use std::time::Instant;

use tracing::info;

use crate::alloy::EnergySurface;
use crate::config::{report_config_error, WlConfig};
use crate::error::WlError;
use crate::mcmc::{burn_in, flatness_ratio, rebase_log_dos, wl_sweep, FlatnessController};
use crate::output::DosWriter;
use crate::transport::{tag, LocalTransport, Transport};
use crate::windows::{partition_bins, EnergyGrid, Window};

/// Outcome of one worker's run.
#[derive(Debug)]
pub struct WlReport {
    /// Stitched global log-DoS; populated on the root only.
    pub global_dos: Option<Vec<f64>>,
    /// Number of refinements performed (f halvings).
    pub refinements: usize,
    /// Refinement factor at termination.
    pub final_f: f64,
    /// Sweep batches executed.
    pub batches: u64,
}

/// Drive one walker through the full run: burn-in, biased sweeping, and the
/// collective refinement protocol, until the refinement factor falls to the
/// configured tolerance.
///
/// Every worker of the run calls this with its own transport endpoint. A
/// refinement fires only when all workers propose it (logical-AND
/// all-reduce), which keeps f transitions, reductions, and termination in
/// lock-step across the fleet. On each refinement the walkers of a window
/// average their log-DoS, the root splices the windows into the global
/// estimate, writes the output files, and reports progress.
#[allow(clippy::too_many_arguments)]
pub fn run_walker<T: Transport>(
    cfg: &WlConfig,
    surface: &dyn EnergySurface,
    grid: &EnergyGrid,
    init_species: &[u8],
    transport: &mut T,
    writer: Option<&DosWriter>,
    seed: u64,
) -> Result<WlReport, WlError> {
    let num_proc = transport.size();
    let rank = transport.rank();

    if let Err(e) = cfg.validate_for(num_proc).and_then(|()| {
        if grid.n_bins == cfg.bins {
            Ok(())
        } else {
            Err(WlError::Config(format!(
                "energy grid has {} bins, config expects {}",
                grid.n_bins, cfg.bins
            )))
        }
    }) {
        if rank == 0 {
            report_config_error(&e);
        }
        return Err(e);
    }

    let windows = partition_bins(cfg.bins, cfg.num_windows, cfg.bin_overlap)?;
    let walkers_per_window = num_proc / cfg.num_windows;
    let window_id = rank / walkers_per_window;
    let window_root = window_id * walkers_per_window;
    let window = windows[window_id];

    if rank == 0 {
        info!(
            num_proc,
            num_windows = cfg.num_windows,
            walkers_per_window,
            bins = cfg.bins,
            beta = cfg.beta(),
            "starting wang-landau sampling"
        );
    }

    let edges = grid.edges();
    let mut walker = Walker::new(window, init_species.to_vec(), cfg.bins, seed);

    let (min_e, max_e) = (edges[window.lo], edges[window.hi + 1]);
    walker.energy = burn_in(surface, &mut walker.species, &mut walker.rng, min_e, max_e);
    walker.bin = grid
        .bin_of(walker.energy)
        .clamp(window.lo as i64, window.hi as i64) as usize;

    transport.barrier()?;

    let mut f = cfg.wl_f;
    let mut controller = FlatnessController::new(cfg.flatness);
    let trials_per_batch = cfg.mc_sweeps * walker.species.len();
    let mut refinements = 0usize;
    let mut batches = 0u64;
    let mut global = if rank == 0 {
        vec![0.0f64; cfg.bins]
    } else {
        Vec::new()
    };

    loop {
        let t0 = Instant::now();
        let _accepted = wl_sweep(surface, &mut walker, grid, f, trials_per_batch);
        let elapsed = t0.elapsed().as_secs_f64();
        batches += 1;

        let proposed = controller.check(&mut walker.hist);
        if !transport.all_and(proposed)? {
            if cfg.max_batches.is_some_and(|cap| batches >= cap) {
                return Err(WlError::Unconverged { batches });
            }
            continue;
        }

        refinements += 1;
        let flatness = flatness_ratio(&walker.hist);

        rebase_log_dos(&mut walker.log_dos, cfg.rebase);
        reduce::window_average(
            transport,
            window_id,
            window_root,
            walkers_per_window,
            &mut walker.log_dos,
        )?;

        if rank != 0 && rank == window_root {
            transport.send(0, tag::for_window(tag::STITCH, window_id), &walker.log_dos)?;
        }

        // the root stitches and writes, then broadcasts the outcome so a
        // failure there does not strand the other workers at the next
        // collective
        let outcome: Result<(), WlError> = if rank == 0 {
            stitch_and_write(
                cfg,
                &windows,
                walkers_per_window,
                transport,
                &walker,
                &mut global,
                &edges,
                writer,
            )
        } else {
            Ok(())
        };

        let times = transport.reduce_minmax(elapsed)?;

        if rank == 0 {
            let ok = f64::from(u8::from(outcome.is_ok()));
            for dst in 1..num_proc {
                transport.send(dst, tag::STATUS_BCAST, &[ok])?;
            }
            outcome?;
            let (t_min, t_max) = times.unwrap_or((elapsed, elapsed));
            info!(
                refinement = refinements,
                flatness,
                f,
                t_min,
                t_max,
                "refinement"
            );
        } else if transport.recv(0, tag::STATUS_BCAST)?[0] == 0.0 {
            return Err(WlError::Transport("refinement aborted by the root".into()));
        }

        walker.hist.fill(0);
        f *= 0.5;
        if f <= cfg.tolerance {
            break;
        }
    }

    if rank == 0 {
        info!(refinements, final_f = f, batches, "converged");
    }

    Ok(WlReport {
        global_dos: (rank == 0).then_some(global),
        refinements,
        final_f: f,
        batches,
    })
}

/// Root-only refinement epilogue: splice every window onto the global
/// estimate and rewrite the output files.
#[allow(clippy::too_many_arguments)]
fn stitch_and_write<T: Transport>(
    cfg: &WlConfig,
    windows: &[Window],
    walkers_per_window: usize,
    transport: &mut T,
    walker: &Walker,
    global: &mut [f64],
    edges: &[f64],
    writer: Option<&DosWriter>,
) -> Result<(), WlError> {
    let own = walker.window;
    global[own.lo..=own.hi].copy_from_slice(&walker.log_dos[own.lo..=own.hi]);
    for (w, win) in windows.iter().enumerate().skip(1) {
        let received = transport.recv(w * walkers_per_window, tag::for_window(tag::STITCH, w))?;
        stitch::splice(
            global,
            &received,
            *win,
            w,
            cfg.bin_overlap,
            cfg.min_dos_value(),
        )?;
    }
    if let Some(writer) = writer {
        writer.write_bins(edges)?;
        writer.write_dos(global)?;
        writer.write_hist(&hist_snapshot(walker, cfg.bins))?;
    }
    Ok(())
}

/// The root walker's histogram embedded into a global-length array, for the
/// `wl_hist.dat` diagnostic.
fn hist_snapshot(walker: &Walker, bins: usize) -> Vec<f64> {
    let mut out = vec![0.0f64; bins];
    for (k, &h) in walker.hist.iter().enumerate() {
        out[walker.window.lo + k] = h as f64;
    }
    out
}

/// Run `num_proc` walkers on scoped threads connected by a
/// [`LocalTransport`] fabric and return the root's report.
///
/// Walker seeds are `base_seed + rank`. A failed worker tears its channels
/// down, which surfaces on its peers as a transport fault; the first
/// non-transport error is reported as the cause.
pub fn run_local(
    cfg: &WlConfig,
    surface: &dyn EnergySurface,
    grid: &EnergyGrid,
    init_species: &[u8],
    num_proc: usize,
    writer: Option<&DosWriter>,
    base_seed: u64,
) -> Result<WlReport, WlError> {
    let fabric = LocalTransport::fabric(num_proc);

    let results: Vec<Result<WlReport, WlError>> = thread::scope(|s| {
        let handles: Vec<_> = fabric
            .into_iter()
            .enumerate()
            .map(|(rank, mut transport)| {
                let writer = (rank == 0).then_some(writer).flatten();
                s.spawn(move || {
                    run_walker(
                        cfg,
                        surface,
                        grid,
                        init_species,
                        &mut transport,
                        writer,
                        base_seed + rank as u64,
                    )
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| {
                h.join()
                    .unwrap_or_else(|_| Err(WlError::Transport("worker panicked".into())))
            })
            .collect()
    });

    let mut root_report = None;
    let mut transport_err = None;
    for result in results {
        match result {
            Ok(report) if report.global_dos.is_some() => root_report = Some(report),
            Ok(_) => {}
            Err(WlError::Transport(msg)) => {
                transport_err.get_or_insert(WlError::Transport(msg));
            }
            Err(e) => return Err(e),
        }
    }
    if let Some(e) = transport_err {
        return Err(e);
    }
    root_report.ok_or_else(|| WlError::Transport("root produced no report".into()))
}
