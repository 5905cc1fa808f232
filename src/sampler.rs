// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The optical-depth sampler: walks sub-resonances
//! encountered along a ray segment, accumulates continuum and Sobolev
//! optical depth, and decides whether and where the photon scatters
//! before exiting the cell.

use crate::constants::C;
use crate::grid::{Cell, PlasmaCell};
use crate::photon::Resonance;
use crate::rng::WorkerRng;
use crate::sources::{dvwind_ds, sobolev, LineDataAccess, LineParams};

/// Outcome of walking a segment of length up to `smax`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SamplerOutcome {
    /// The photon scattered at distance `ds` (< `smax`) on resonance
    /// `nres`. `tau` is the accumulated optical depth at the point of
    /// scattering (== the target `tau_scat`, modulo round-off).
    Scatter { ds: f64, nres: Resonance, tau: f64 },
    /// The photon exited the cell at `smax` without scattering;
    /// `tau` is the total optical depth accumulated over the segment.
    NoEvent { tau: f64 },
}

/// One resonance encountered along the path, at path-distance `s` and
/// rest-frame-matching lab frequency `freq_at_s`.
struct PathResonance {
    s: f64,
    freq_at_s: f64,
    nres: u32,
    params: LineParams,
}

/// Doppler-shifted frequency a photon of rest frequency `freq` appears to
/// have, as seen by wind material moving with line-of-sight velocity
/// `v_los` (cm/s) away from the photon's direction of travel (non-
/// relativistic: `nu_obs = nu_rest * (1 + v_los / c)`).
fn doppler_shift(freq_rest: f64, v_los: f64) -> f64 {
    freq_rest * (1.0 + v_los / C)
}

/// Enumerates every line whose Doppler-shifted rest frequency, evaluated
/// along the photon's path between `s=0` and `s=smax`, crosses the
/// photon's (unchanging, in the comoving sense used here) frequency —
/// i.e. every line the photon's frequency sweeps past as the wind's
/// bulk velocity along the line of sight changes with position. The
/// cell's line-of-sight velocity is taken as locally linear in path
/// distance `s` (monotonic over a single cell, as guaranteed by the wind
/// velocity field within one resolution element).
fn enumerate_resonances(
    lines: &dyn LineDataAccess,
    photon_freq: f64,
    cell: &Cell,
    direction: &crate::math::Vec3,
    smax: f64,
) -> Vec<PathResonance> {
    let v_los_start = cell.velocity.dot(direction);
    // Over a single cell the velocity is taken as locally linear in `s`
    // via `dvds_max`; the photon's frequency as seen by the local wind at
    // `s` is `photon_freq / (1 + v(s)/c)`, and a resonance occurs where
    // that equals the line's rest frequency, i.e. `v(s)/c = photon_freq /
    // line.freq - 1`. We solve that directly per line rather than
    // scanning, since `v(s)` is linear: `v(s) = v_los_start + dvds_max * s`
    // along the direction of travel.
    let dv_ds = cell.dvds_max;
    let freq_lo = doppler_shift(photon_freq, v_los_start).min(doppler_shift(photon_freq, v_los_start + dv_ds * smax));
    let freq_hi = doppler_shift(photon_freq, v_los_start).max(doppler_shift(photon_freq, v_los_start + dv_ds * smax));

    let mut out = Vec::new();
    for nres in lines.lines_in_range(freq_lo, freq_hi) {
        let params = match lines.line(nres) {
            Some(p) => p,
            None => continue,
        };
        if dv_ds.abs() < 1e-30 {
            continue;
        }
        // Solve photon_freq / (1 + v(s)/c) == params.freq for s.
        let v_needed = C * (photon_freq / params.freq - 1.0);
        let s = (v_needed - v_los_start) / dv_ds;
        if s >= 0.0 && s <= smax {
            let freq_at_s = doppler_shift(photon_freq, v_los_start + dv_ds * s);
            out.push(PathResonance { s, freq_at_s, nres, params });
        }
    }
    // Order along the path; ties broken by lower frequency first.
    out.sort_by(|a, b| {
        a.s.partial_cmp(&b.s)
            .unwrap()
            .then_with(|| a.freq_at_s.partial_cmp(&b.freq_at_s).unwrap())
    });
    out
}

/// Runs the sampler over a segment `[0, smax]` through `cell`, whose
/// plasma state is `plasma`.
///
/// `tau_scat` is the target cumulative optical depth (`-ln(U)`, drawn by
/// the caller so the same draw can be logged/retried). `rng` is used only
/// for the resonance's Bernoulli "does it actually scatter" decision.
#[allow(clippy::too_many_arguments)]
pub fn sample_step(
    cell: &Cell,
    plasma: &PlasmaCell,
    lines: &dyn LineDataAccess,
    direction: &crate::math::Vec3,
    photon_freq: f64,
    smax: f64,
    tau_scat: f64,
    rng: &mut WorkerRng,
) -> SamplerOutcome {
    let resonances = enumerate_resonances(lines, photon_freq, cell, direction, smax);
    let continuum_kappa = plasma.continuum.total();

    let mut tau = 0.0;
    let mut prev_s = 0.0;

    for res in &resonances {
        let ds = res.s - prev_s;
        let tau_before_resonance = tau + continuum_kappa * ds;
        if tau_before_resonance >= tau_scat {
            // Scattered in the continuum sub-interval before this
            // resonance was reached.
            let remaining = tau_scat - tau;
            let ds_scatter = if continuum_kappa > 0.0 { remaining / continuum_kappa } else { ds };
            return SamplerOutcome::Scatter {
                ds: prev_s + ds_scatter,
                nres: Resonance::ElectronScatter,
                tau: tau_scat,
            };
        }
        tau = tau_before_resonance;

        let dvds = dvwind_ds(cell, direction);
        let tau_sobolev = sobolev(plasma, &res.params, dvds);
        let scatter_prob = 1.0 - (-tau_sobolev).exp();
        if rng.uniform() < scatter_prob {
            return SamplerOutcome::Scatter {
                ds: res.s,
                nres: Resonance::Line(res.nres),
                tau: tau + tau_sobolev,
            };
        }
        // Passed through unabsorbed: the Sobolev tau is still added to
        // the running total,
        // it simply didn't trigger a scatter this time.
        tau += tau_sobolev;
        if tau >= tau_scat {
            // The Bernoulli draw above failed, but this line's own
            // Sobolev tau still pushed the cumulative budget over the
            // top: the scatter is still attributable to this line, not
            // to the continuum, so it gets the same anisotropic
            // re-emission treatment as a direct resonance hit.
            return SamplerOutcome::Scatter { ds: res.s, nres: Resonance::Line(res.nres), tau };
        }
        prev_s = res.s;
    }

    let ds_tail = smax - prev_s;
    let tau_tail = continuum_kappa * ds_tail;
    if tau + tau_tail >= tau_scat {
        let remaining = tau_scat - tau;
        let ds_scatter = if continuum_kappa > 0.0 { remaining / continuum_kappa } else { ds_tail };
        return SamplerOutcome::Scatter {
            ds: prev_s + ds_scatter,
            nres: Resonance::ElectronScatter,
            tau: tau_scat,
        };
    }

    SamplerOutcome::NoEvent { tau: tau + tau_tail }
}
