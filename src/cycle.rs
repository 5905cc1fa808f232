// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The photon-parallel cycle scheduler. Disjoint photon
//! batches run on independent rayon workers; each worker owns a private
//! `EstimatorTable` and `WorkerRng` stream, with no suspension points
//! below a single photon's `translate` loop. At cycle end, per-worker
//! estimator tables are reduced (summed) associatively, and error counts
//! are reduced the same way into one `CycleSummary`.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use rayon::prelude::*;

use crate::diagnostics::{CycleSummary, ErrorCounts};
use crate::estimators::EstimatorTable;
use crate::photon::{Photon, PhotonStatus};
use crate::rng::WorkerRng;
use crate::transport::{reemit, translate, TransportContext, TranslateStatus};

/// Drives a single photon from its source-sampled initial state to a
/// terminal status, alternating `translate` steps with `reemit` whenever
/// a step ends in a resonant scatter.
/// Bounded by `max_steps` as a defensive measure against a photon that
/// never reaches a terminal state (e.g. a grid-construction defect);
/// exceeding it marks the photon `Error` rather than looping forever.
pub fn run_photon(
    ctx: &TransportContext,
    photon: &mut Photon,
    rng: &mut WorkerRng,
    estimators: &mut EstimatorTable,
    errors: &mut ErrorCounts,
    max_steps: u32,
) {
    for _ in 0..max_steps {
        if !photon.is_in_flight() {
            return;
        }
        let status = translate(ctx, photon, rng, estimators, errors);
        match status {
            TranslateStatus::ScatterResonant => reemit(ctx, photon, rng, errors),
            // Electron scattering redirects isotropically (`randvec` in
            // the original engine); only line resonances get the
            // anisotropic Sobolev treatment.
            TranslateStatus::ScatterElectron => photon.direction = rng.isotropic_direction(),
            _ => {}
        }
    }
    if photon.is_in_flight() {
        photon.status = PhotonStatus::Error;
    }
}

/// Runs one ionization or spectrum cycle over `photons`, splitting them
/// across rayon's global thread pool. Each worker's chunk gets its own
/// `WorkerRng` stream (seeded from `cycle_seed` and the chunk's index, so
/// results replay identically at fixed worker/chunk count)
/// and a private `EstimatorTable`, reduced into the returned table once
/// every chunk has finished.
pub fn run_cycle(
    ctx: &TransportContext,
    mut photons: Vec<Photon>,
    cycle_seed: u64,
    n_plasma_cells: usize,
    max_steps_per_photon: u32,
    show_progress: bool,
) -> (Vec<Photon>, EstimatorTable, CycleSummary) {
    let n_photons = photons.len();
    let n_workers = rayon::current_num_threads().max(1);
    let chunk_size = (n_photons / n_workers).max(1);

    let progress = ProgressBar::with_draw_target(
        Some(n_photons as u64),
        if show_progress { ProgressDrawTarget::stdout() } else { ProgressDrawTarget::hidden() },
    )
    .with_style(
        ProgressStyle::default_bar()
            .template("{msg:17}: [{wide_bar:.blue}] {pos}/{len} photons ({elapsed_precise}<{eta_precise})")
            .unwrap()
            .progress_chars("=> "),
    )
    .with_message("Transport cycle");

    let results: Vec<(EstimatorTable, ErrorCounts, usize, usize, usize, usize, usize)> = photons
        .par_chunks_mut(chunk_size)
        .enumerate()
        .map(|(worker_index, chunk)| {
            let mut rng = WorkerRng::new(cycle_seed, worker_index as u64);
            let mut estimators = EstimatorTable::new(n_plasma_cells);
            let mut errors = ErrorCounts::default();
            let (mut escaped, mut hit_star, mut hit_disk, mut absorbed, mut errored) = (0, 0, 0, 0, 0);

            for photon in chunk.iter_mut() {
                run_photon(ctx, photon, &mut rng, &mut estimators, &mut errors, max_steps_per_photon);
                match photon.status {
                    PhotonStatus::Escaped => escaped += 1,
                    PhotonStatus::HitStar => hit_star += 1,
                    PhotonStatus::HitDisk => hit_disk += 1,
                    PhotonStatus::Absorbed => absorbed += 1,
                    PhotonStatus::Error => errored += 1,
                    PhotonStatus::InFlight => errored += 1,
                }
                progress.inc(1);
            }
            (estimators, errors, escaped, hit_star, hit_disk, absorbed, errored)
        })
        .collect();

    progress.finish_and_clear();

    let mut total = EstimatorTable::new(n_plasma_cells);
    let mut summary = CycleSummary { n_photons: n_photons as u64, ..Default::default() };
    for (table, errors, escaped, hit_star, hit_disk, absorbed, errored) in results {
        total.reduce(&table);
        summary.errors += errors;
        summary.n_escaped += escaped as u64;
        summary.n_hit_star += hit_star as u64;
        summary.n_hit_disk += hit_disk as u64;
        summary.n_absorbed += absorbed as u64;
        summary.n_error += errored as u64;
    }

    (photons, total, summary)
}
