// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The domain: an independent subregion of space with its own coordinate
//! system, cell mesh, and wind-boundary description.

use crate::geometry::{Cone, Plane};
use crate::grid::coord::CoordType;

/// How a domain's wind is physically generated. Drives which boundary
/// tests `traversal::ds_to_wind` runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindType {
    AnalyticBiconical,
    Corona,
    Import,
    Spherical,
}

/// Which surface a photon's `ds_to_wind` step actually hit. Named
/// directly from which radius produced the shorter distance (inner vs
/// outer), rather than reproducing the original C source's swapped
/// `BOUND_RMIN`/`BOUND_RMAX` tags (see DESIGN.md Open Question #2).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindBoundary {
    None,
    InnerRadius,
    OuterRadius,
    InnerCone,
    OuterCone,
    ZMin,
    ZMax,
    InnerRho,
    OuterRho,
}

/// A domain: coordinate system, mesh dimensions, and the geometric
/// description of its wind boundary.
#[derive(Clone, Debug)]
pub struct Domain {
    pub coord_type: CoordType,
    /// Mesh dimensions (first, second coordinate).
    pub n: usize,
    pub m: usize,
    pub log_spacing: bool,
    pub rmin: f64,
    pub rmax: f64,
    pub wind_cone_inner: Cone,
    pub wind_cone_outer: Cone,
    pub wind_plane_inner: Plane,
    pub wind_plane_outer: Plane,
    pub wind_rho_min: f64,
    pub wind_rho_max: f64,
    pub zmin: f64,
    pub zmax: f64,
    pub wind_type: WindType,
    /// `[nstart, nstop)` indexes this domain's cells in the flat,
    /// cross-domain cell array owned by `Grid`.
    pub nstart: usize,
    pub nstop: usize,
    /// This domain's push-through scale, derived once at construction by
    /// `derive_dfudge`. Individual cells further scale this to their own
    /// size.
    pub dfudge: f64,
}

impl Domain {
    pub fn cell_count(&self) -> usize {
        self.nstop - self.nstart
    }

    pub fn contains_cell(&self, cell_id: usize) -> bool {
        (self.nstart..self.nstop).contains(&cell_id)
    }
}

/// The three-tier `dfudge` policy from `setup.c`'s `setup_dfudge`: a
/// linear fraction of `rmax - rmin` for compact domains, a fixed value for
/// intermediate-scale domains, and a tiny fraction of `rmax` for huge
/// (e.g. AGN-scale) domains. Kept per-domain rather than as the original's
/// single global, so domains of very different physical
/// scale in the same grid don't share an inappropriate push-through.
pub fn derive_dfudge(rmax: f64, rmin: f64) -> f64 {
    let delta = rmax - rmin;
    if delta < 1e8 {
        delta / 1000.0
    } else if delta < 1e15 {
        1e5
    } else {
        rmax / 1e10
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dfudge_tiers() {
        assert!((derive_dfudge(1e9, 1e8) - (1e9 - 1e8) / 1000.0).abs() < 1e-6);
        assert_eq!(derive_dfudge(1e10, 0.0), 1e5);
        assert_eq!(derive_dfudge(1e20, 0.0), 1e10);
    }
}
