// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Narrow trait boundaries to the external collaborators this engine
//! depends on but does not own: radiation-source sampling, atomic/line
//! data, and the plasma table's level populations. The full
//! ionization/atomic-data solvers behind these traits are out of scope;
//! the transport driver only ever calls through the traits themselves,
//! so a caller can substitute a full implementation (or a small fixture,
//! as the test suite and the `wind-transport` binary both do) without
//! the engine knowing the difference.

use crate::geometry::Ray;
use crate::grid::{Cell, PlasmaCell};
use crate::math::Vec3;
use crate::photon::Photon;

/// Rest-frame parameters of a single line resonance, looked up by `nres`.
#[derive(Clone, Copy, Debug)]
pub struct LineParams {
    /// Rest-frame frequency, Hz.
    pub freq: f64,
    pub oscillator_strength: f64,
    pub element: u16,
    pub ion: u16,
    /// Whether this line is handled by a macro-atom (weight-preserving)
    /// formalism rather than the simple absorption/re-emission mode.
    pub is_macro_atom: bool,
}

/// Produces new photon bundles at the start of a cycle, with initial
/// position on a named radiating surface and an initial direction drawn
/// from that surface's emissivity. A full multi-surface emissivity model
/// (star plus disk plus boundary layer) is out of scope for this crate;
/// `wind-transport`'s `ShellSurfaceSampler` is the simple single-surface
/// implementation this binary uses, and a caller with a real atomic-data
/// stack can supply its own.
pub trait SourceSampler {
    fn sample(&mut self, serial: u64) -> Photon;
}

/// Read-only access to line-list data, keyed by the photon's `nres` line
/// index. Out of scope for this crate; backed by the atomic-data loader.
pub trait LineDataAccess {
    fn line(&self, nres: u32) -> Option<LineParams>;

    /// All lines whose rest frequency could be encountered somewhere
    /// along `freq_lo..=freq_hi` (the photon's Doppler-shifted frequency
    /// range over the step), for the sampler's resonance enumeration.
    /// Implementations typically binary-search a frequency-sorted line
    /// list; this trait does not mandate an order.
    fn lines_in_range(&self, freq_lo: f64, freq_hi: f64) -> Vec<u32>;
}

/// Read-only access to plasma-table state, keyed by plasma index. The
/// sampler and transport driver only ever read through this trait; the
/// ionization/level-population solver that writes it is out of scope.
pub trait PlasmaAccess {
    fn plasma(&self, plasma_index: usize) -> &PlasmaCell;
}

/// Local scalar velocity gradient `|dv . d|` along the photon's current
/// direction at its current position, computed from `cell`'s velocity
/// model. The core does not own a velocity-field model; this
/// free function's signature is the contract a domain's velocity law must
/// satisfy.
pub fn dvwind_ds(cell: &Cell, direction: &Vec3) -> f64 {
    // A cell only carries a single center velocity and a precomputed
    // `dvds_max`; absent a full velocity-field model (out of scope), the
    // gradient along an arbitrary direction is taken as the fraction of
    // `dvds_max` implied by how aligned `direction` is with the cell's own
    // velocity vector — matching `dvwind_ds`'s role as "a scalar local
    // gradient", without fabricating a velocity law this crate doesn't own.
    match cell.velocity.normalize() {
        Some(v_hat) => cell.dvds_max * direction.dot(&v_hat).abs(),
        None => cell.dvds_max,
    }
}

/// Sobolev optical depth for `line` at `dvds`:
/// `tau_S = kappa_line * nu / (dv/ds)`, using `kappa_line` derived from the
/// line's oscillator strength and the local electron/mass density in
/// `plasma`. Guards against a non-positive `dvds` (degenerate direction)
/// by returning `f64::INFINITY` (total trapping), matching the original's
/// convention that zero velocity gradient implies an unresolved, fully
/// trapped resonance.
pub fn sobolev(plasma: &PlasmaCell, line: &LineParams, dvds: f64) -> f64 {
    if dvds.abs() < 1e-30 {
        return f64::INFINITY;
    }
    const CLASSICAL_ELECTRON_CROSS_SECTION: f64 = 2.654e-2; // cm^2 Hz, pi e^2 / (m_e c)
    let kappa_line = CLASSICAL_ELECTRON_CROSS_SECTION
        * line.oscillator_strength
        * plasma.electron_density.max(0.0);
    (kappa_line * line.freq / dvds.abs()).max(0.0)
}

/// Escape probability `P(tau) = (1 - exp(-tau)) / tau`, with `P(0) = 1`.
/// Numerically stable as `tau -> 0` via a short Taylor expansion,
/// avoiding `0/0`.
pub fn p_escape_from_tau(tau: f64) -> f64 {
    if tau <= 0.0 {
        return 1.0;
    }
    if tau < 1e-4 {
        // (1 - (1 - tau + tau^2/2 - ...)) / tau = 1 - tau/2 + tau^2/6 - ...
        return 1.0 - tau / 2.0 + tau * tau / 6.0;
    }
    (1.0 - (-tau).exp()) / tau
}

/// A trivial `Ray` built from a photon's current position/direction, used
/// throughout the traversal and sampler layers.
pub fn photon_ray(p: &Photon) -> Ray {
    Ray::new(p.position, p.direction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn p_escape_zero_is_one() {
        assert_eq!(p_escape_from_tau(0.0), 1.0);
    }

    #[test]
    fn p_escape_in_unit_interval() {
        for &tau in &[1e-6, 1e-3, 0.1, 1.0, 10.0, 1e3] {
            let p = p_escape_from_tau(tau);
            assert!(p > 0.0 && p <= 1.0, "P({tau}) = {p} out of (0, 1]");
        }
    }

    #[test]
    fn p_escape_large_tau_approaches_one_over_tau() {
        let tau = 1e6;
        let p = p_escape_from_tau(tau);
        assert!((p - 1.0 / tau).abs() / (1.0 / tau) < 1e-6);
    }

    #[test]
    fn p_escape_continuous_across_small_tau_threshold() {
        let a = p_escape_from_tau(9e-5);
        let b = p_escape_from_tau(1.1e-4);
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn sobolev_zero_gradient_is_infinite_trapping() {
        let plasma = PlasmaCell::new(1e10, 1e-15, 1e4, 1e4, 1.0);
        let line = LineParams {
            freq: 1e15,
            oscillator_strength: 0.5,
            element: 1,
            ion: 1,
            is_macro_atom: false,
        };
        assert_eq!(sobolev(&plasma, &line, 0.0), f64::INFINITY);
    }
}
