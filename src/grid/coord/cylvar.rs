// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Variable-z cylindrical mesh: used by `IMPORT`ed grids whose z-spacing
//! is not uniform across rho columns (e.g. a density grid lifted from a
//! hydrodynamic simulation that isn't rectangular in (rho, z)). Each rho
//! column carries its own z-edge array.

use super::{bin_of, make_edges, CoordKind, NEGATIVE_ERROR};
use crate::geometry::{ds_to_cylinder, ds_to_plane, Plane, Ray};
use crate::math::Vec3;

#[derive(Clone, Debug)]
pub struct CylVar {
    pub rho_edges: Vec<f64>,
    /// `z_edges_per_column[i]` is the `n_z + 1`-length z-edge array for rho
    /// column `i`; lengths must all match `n_z + 1`.
    pub z_edges_per_column: Vec<Vec<f64>>,
}

impl CylVar {
    pub fn new(rho_edges: Vec<f64>, z_edges_per_column: Vec<Vec<f64>>) -> Self {
        assert_eq!(rho_edges.len() - 1, z_edges_per_column.len());
        Self {
            rho_edges,
            z_edges_per_column,
        }
    }

    /// Convenience constructor building a regular mesh that still carries
    /// per-column z-edges (for tests / the simple uniform case).
    pub fn regular(rho_max: f64, z_max: f64, n_rho: usize, n_z: usize) -> Self {
        let rho_edges = make_edges(0.0, rho_max, n_rho, false);
        let z_edges = make_edges(0.0, z_max, n_z, false);
        let z_edges_per_column = vec![z_edges; n_rho];
        Self {
            rho_edges,
            z_edges_per_column,
        }
    }
}

impl CoordKind for CylVar {
    fn locate(&self, p: &Vec3) -> Option<(usize, usize)> {
        let rho = p.rho();
        let z = p.z().abs();
        let i = bin_of(&self.rho_edges, rho)?;
        let j = bin_of(&self.z_edges_per_column[i], z)?;
        Some((i, j))
    }

    fn ds_in_cell(&self, i: usize, j: usize, ray: &Ray) -> f64 {
        let origin_rho = ray.origin.rho();
        let origin_z = ray.origin.z().abs();
        let z_edges = &self.z_edges_per_column[i];
        if origin_rho < self.rho_edges[i] - 1e-6
            || origin_rho > self.rho_edges[i + 1] + 1e-6
            || origin_z < z_edges[j] - 1e-6
            || origin_z > z_edges[j + 1] + 1e-6
        {
            return NEGATIVE_ERROR;
        }

        let mut best = f64::INFINITY;
        if self.rho_edges[i] > 0.0 {
            best = best.min(ds_to_cylinder(self.rho_edges[i], ray));
        }
        best = best.min(ds_to_cylinder(self.rho_edges[i + 1], ray));

        let z_sign = if ray.origin.z() >= 0.0 { 1.0 } else { -1.0 };
        if z_edges[j] > 0.0 {
            best = best.min(ds_to_plane(
                &Plane {
                    z0: z_sign * z_edges[j],
                },
                ray,
            ));
        }
        best = best.min(ds_to_plane(
            &Plane {
                z0: z_sign * z_edges[j + 1],
            },
            ray,
        ));

        if best.is_finite() && best >= 0.0 {
            best
        } else {
            NEGATIVE_ERROR
        }
    }

    fn cell_center(&self, i: usize, j: usize) -> Vec3 {
        let rho = 0.5 * (self.rho_edges[i] + self.rho_edges[i + 1]);
        let z_edges = &self.z_edges_per_column[i];
        let z = 0.5 * (z_edges[j] + z_edges[j + 1]);
        Vec3::new(rho, 0.0, z)
    }

    fn volume(&self, i: usize, j: usize) -> f64 {
        let r0 = self.rho_edges[i];
        let r1 = self.rho_edges[i + 1];
        let z_edges = &self.z_edges_per_column[i];
        let dz = z_edges[j + 1] - z_edges[j];
        std::f64::consts::PI * (r1 * r1 - r0 * r0) * dz
    }

    fn dims(&self) -> (usize, usize) {
        (
            self.rho_edges.len() - 1,
            self.z_edges_per_column[0].len() - 1,
        )
    }
}
