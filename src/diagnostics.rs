// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Non-fatal error bookkeeping: every geometric/numerical
//! error kind is counted per worker, reduced associatively across workers,
//! and surfaced in a per-cycle summary. No photon-level error aborts the
//! simulation.

use std::ops::AddAssign;

/// Per-kind non-fatal error counts, one table per worker.
#[derive(Clone, Copy, Debug, Default)]
pub struct ErrorCounts {
    /// Photon found in neither a domain's wind nor its grid.
    pub not_in_wind_or_grid: u64,
    /// `ds_in_cell` returned a negative sentinel.
    pub negative_ds_in_cell: u64,
    /// A cell reported `inwind = NotInwind` during transport (logged
    /// anomaly, not fatal).
    pub not_inwind_anomaly: u64,
    /// `P_max <= 0` in the anisotropic re-emission sampler; fell back to
    /// isotropic scattering.
    pub non_positive_p_max: u64,
    /// The re-emission rejection loop exceeded
    /// `constants::MAX_REJECTION_ITERATIONS`.
    pub rejection_loop_exceeded: u64,
    /// The photon's previous position was found to be inside the disk
    /// (recoverable: re-computed with relaxed tolerance).
    pub previous_position_inside_disk: u64,
}

impl ErrorCounts {
    pub fn total(&self) -> u64 {
        self.not_in_wind_or_grid
            + self.negative_ds_in_cell
            + self.not_inwind_anomaly
            + self.non_positive_p_max
            + self.rejection_loop_exceeded
            + self.previous_position_inside_disk
    }
}

impl AddAssign for ErrorCounts {
    fn add_assign(&mut self, rhs: ErrorCounts) {
        self.not_in_wind_or_grid += rhs.not_in_wind_or_grid;
        self.negative_ds_in_cell += rhs.negative_ds_in_cell;
        self.not_inwind_anomaly += rhs.not_inwind_anomaly;
        self.non_positive_p_max += rhs.non_positive_p_max;
        self.rejection_loop_exceeded += rhs.rejection_loop_exceeded;
        self.previous_position_inside_disk += rhs.previous_position_inside_disk;
    }
}

/// Per-cycle outcome counts and error totals, logged at `info!` once a
/// batch of photons has finished transport.
#[derive(Clone, Copy, Debug, Default)]
pub struct CycleSummary {
    pub n_photons: u64,
    pub n_escaped: u64,
    pub n_hit_star: u64,
    pub n_hit_disk: u64,
    pub n_absorbed: u64,
    pub n_error: u64,
    pub errors: ErrorCounts,
}

impl CycleSummary {
    pub fn log(&self) {
        log::info!(
            "cycle complete: {} photons ({} escaped, {} hit star, {} hit disk, {} absorbed, {} errored)",
            self.n_photons,
            self.n_escaped,
            self.n_hit_star,
            self.n_hit_disk,
            self.n_absorbed,
            self.n_error
        );
        if self.errors.total() > 0 {
            log::warn!(
                "non-fatal errors this cycle: {} not-in-wind/grid, {} negative ds_in_cell, \
                 {} not-inwind anomalies, {} non-positive P_max, {} rejection-loop exceedances, \
                 {} previous-position-inside-disk",
                self.errors.not_in_wind_or_grid,
                self.errors.negative_ds_in_cell,
                self.errors.not_inwind_anomaly,
                self.errors.non_positive_p_max,
                self.errors.rejection_loop_exceeded,
                self.errors.previous_position_inside_disk,
            );
        }
    }
}
