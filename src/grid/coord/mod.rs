// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tagged-variant dispatch over coordinate system, replacing the original
//! `if (coord_type == ...)` chains with a
//! small trait implemented once per coordinate kind.

pub mod cylindrical;
pub mod cylvar;
pub mod rtheta;
pub mod spherical;

use crate::geometry::Ray;
use crate::math::Vec3;

pub use cylindrical::Cylindrical;
pub use cylvar::CylVar;
pub use rtheta::RTheta;
pub use spherical::Spherical;

/// Which coordinate system a domain's mesh uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoordType {
    Cylindrical,
    RTheta,
    Spherical,
    CylVar,
}

/// Negative sentinel returned by `ds_in_cell` / `where_in_grid` when the
/// photon is not actually in the claimed cell; callers must treat this as
/// an unrecoverable step error.
pub const NEGATIVE_ERROR: f64 = -1.0;

/// The four per-coordinate-kind operations the grid model needs. Each
/// coordinate kind (`Cylindrical`, `RTheta`, `Spherical`, `CylVar`)
/// implements this once; `grid::Grid` dispatches through a `CoordType` tag
/// rather than branching on it everywhere the computation is needed.
pub trait CoordKind {
    /// Local (i, j) cell indices for a point, or `None` if outside the mesh.
    fn locate(&self, p: &Vec3) -> Option<(usize, usize)>;

    /// Distance to the nearest face of cell `(i, j)` along `ray`, assuming
    /// the ray's origin is inside that cell. Returns `NEGATIVE_ERROR` if
    /// the origin is not actually inside `(i, j)`.
    fn ds_in_cell(&self, i: usize, j: usize, ray: &Ray) -> f64;

    /// Cell-center position for `(i, j)`.
    fn cell_center(&self, i: usize, j: usize) -> Vec3;

    /// Cell volume (cm^3) for `(i, j)`.
    fn volume(&self, i: usize, j: usize) -> f64;

    /// Number of cells along the first/second mesh dimension.
    fn dims(&self) -> (usize, usize);

    /// Row-major linear index for `(i, j)` within this domain's mesh.
    fn linear_index(&self, i: usize, j: usize) -> usize {
        let (_, m) = self.dims();
        i * m + j
    }
}

/// Build a monotonically increasing edge array, linear or log-spaced,
/// covering `[lo, hi]` with `n` cells (`n + 1` edges). Shared by all four
/// coordinate kinds' constructors.
pub fn make_edges(lo: f64, hi: f64, n: usize, log_spacing: bool) -> Vec<f64> {
    assert!(n > 0, "a mesh dimension must have at least one cell");
    let mut edges = Vec::with_capacity(n + 1);
    if log_spacing && lo > 0.0 {
        let log_lo = lo.ln();
        let log_hi = hi.ln();
        for i in 0..=n {
            let t = i as f64 / n as f64;
            edges.push((log_lo + t * (log_hi - log_lo)).exp());
        }
    } else {
        for i in 0..=n {
            let t = i as f64 / n as f64;
            edges.push(lo + t * (hi - lo));
        }
    }
    edges
}

/// Binary search a monotonically increasing edge array for the bin index
/// containing `value`, or `None` if `value` falls outside `[edges[0],
/// edges[last]]`.
pub fn bin_of(edges: &[f64], value: f64) -> Option<usize> {
    if value < edges[0] || value > *edges.last().unwrap() {
        return None;
    }
    match edges.binary_search_by(|e| e.partial_cmp(&value).unwrap()) {
        Ok(i) => Some(i.min(edges.len() - 2)),
        Err(i) => Some((i - 1).min(edges.len() - 2)),
    }
}
