// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Plasma state: the densities, temperatures and radiation-field
//! estimators the ionization solver consumes between cycles. This crate
//! only ever *writes* the estimator fields (during transport); everything
//! else is read-only input produced by the (out-of-scope) ionization
//! solver.

/// Static (read-mostly) plasma properties, populated by the (out-of-scope)
/// ionization solver between cycles.
#[derive(Clone, Debug)]
pub struct PlasmaCell {
    pub electron_density: f64,
    pub mass_density: f64,
    /// Radiation temperature, K.
    pub t_r: f64,
    /// Electron temperature, K.
    pub t_e: f64,
    /// Radiation dilution factor.
    pub w: f64,
    /// Continuum (electron scattering + bound-free + free-free) opacity
    /// coefficients, consumed by the sampler via `sources::PlasmaAccess`.
    pub continuum: super::ContinuumOpacity,
}

impl PlasmaCell {
    pub fn new(electron_density: f64, mass_density: f64, t_r: f64, t_e: f64, w: f64) -> Self {
        Self {
            electron_density,
            mass_density,
            t_r,
            t_e,
            w,
            continuum: super::ContinuumOpacity::default(),
        }
    }
}
