// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pure radial (1-D, spherically symmetric) mesh.

use super::{bin_of, make_edges, CoordKind, NEGATIVE_ERROR};
use crate::geometry::{ds_to_sphere, Ray};
use crate::math::Vec3;

#[derive(Clone, Debug)]
pub struct Spherical {
    pub r_edges: Vec<f64>,
}

impl Spherical {
    pub fn new(r_min: f64, r_max: f64, n_r: usize, log_spacing: bool) -> Self {
        Self {
            r_edges: make_edges(r_min, r_max, n_r, log_spacing),
        }
    }
}

impl CoordKind for Spherical {
    fn locate(&self, p: &Vec3) -> Option<(usize, usize)> {
        Some((bin_of(&self.r_edges, p.r())?, 0))
    }

    fn ds_in_cell(&self, i: usize, _j: usize, ray: &Ray) -> f64 {
        let origin_r = ray.origin.r();
        if origin_r < self.r_edges[i] - 1e-6 || origin_r > self.r_edges[i + 1] + 1e-6 {
            return NEGATIVE_ERROR;
        }
        let mut best = f64::INFINITY;
        if self.r_edges[i] > 0.0 {
            best = best.min(ds_to_sphere(self.r_edges[i], ray));
        }
        best = best.min(ds_to_sphere(self.r_edges[i + 1], ray));
        if best.is_finite() && best >= 0.0 {
            best
        } else {
            NEGATIVE_ERROR
        }
    }

    fn cell_center(&self, i: usize, _j: usize) -> Vec3 {
        let r = 0.5 * (self.r_edges[i] + self.r_edges[i + 1]);
        Vec3::new(r, 0.0, 0.0)
    }

    fn volume(&self, i: usize, _j: usize) -> f64 {
        let r0 = self.r_edges[i];
        let r1 = self.r_edges[i + 1];
        std::f64::consts::TAU * 2.0 / 3.0 * (r1.powi(3) - r0.powi(3))
    }

    fn dims(&self) -> (usize, usize) {
        (self.r_edges.len() - 1, 1)
    }
}
