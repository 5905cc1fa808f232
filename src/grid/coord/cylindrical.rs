// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Cylindrical (rho, z) coordinate mesh. Like the original engine, the
//! mesh is stored for `z >= 0` only and reflected about the midplane: a
//! photon at negative `z` is looked up using `|z|`.

use super::{bin_of, make_edges, CoordKind, NEGATIVE_ERROR};
use crate::geometry::{ds_to_cylinder, ds_to_plane, Plane, Ray};
use crate::math::Vec3;

#[derive(Clone, Debug)]
pub struct Cylindrical {
    pub rho_edges: Vec<f64>,
    pub z_edges: Vec<f64>,
}

impl Cylindrical {
    pub fn new(rho_max: f64, z_max: f64, n_rho: usize, n_z: usize, log_spacing: bool) -> Self {
        Self {
            rho_edges: make_edges(0.0, rho_max, n_rho, log_spacing),
            z_edges: make_edges(0.0, z_max, n_z, log_spacing),
        }
    }
}

impl CoordKind for Cylindrical {
    fn locate(&self, p: &Vec3) -> Option<(usize, usize)> {
        let rho = p.rho();
        let z = p.z().abs();
        Some((bin_of(&self.rho_edges, rho)?, bin_of(&self.z_edges, z)?))
    }

    fn ds_in_cell(&self, i: usize, j: usize, ray: &Ray) -> f64 {
        let origin_rho = ray.origin.rho();
        let origin_z = ray.origin.z().abs();
        if origin_rho < self.rho_edges[i] - 1e-6
            || origin_rho > self.rho_edges[i + 1] + 1e-6
            || origin_z < self.z_edges[j] - 1e-6
            || origin_z > self.z_edges[j + 1] + 1e-6
        {
            return NEGATIVE_ERROR;
        }

        let mut best = f64::INFINITY;

        if self.rho_edges[i] > 0.0 {
            best = best.min(ds_to_cylinder(self.rho_edges[i], ray));
        }
        best = best.min(ds_to_cylinder(self.rho_edges[i + 1], ray));

        let z_sign = if ray.origin.z() >= 0.0 { 1.0 } else { -1.0 };
        if self.z_edges[j] > 0.0 {
            best = best.min(ds_to_plane(
                &Plane {
                    z0: z_sign * self.z_edges[j],
                },
                ray,
            ));
        }
        best = best.min(ds_to_plane(
            &Plane {
                z0: z_sign * self.z_edges[j + 1],
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
        let z = 0.5 * (self.z_edges[j] + self.z_edges[j + 1]);
        Vec3::new(rho, 0.0, z)
    }

    fn volume(&self, i: usize, j: usize) -> f64 {
        let r0 = self.rho_edges[i];
        let r1 = self.rho_edges[i + 1];
        let dz = self.z_edges[j + 1] - self.z_edges[j];
        std::f64::consts::PI * (r1 * r1 - r0 * r0) * dz
    }

    fn dims(&self) -> (usize, usize) {
        (self.rho_edges.len() - 1, self.z_edges.len() - 1)
    }
}
