// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Polar (r, theta) coordinate mesh, theta measured from the positive
//! z-axis. Used for biconical winds whose natural cell boundaries are
//! spheres and cones rather than cylinders and planes.

use super::{bin_of, make_edges, CoordKind, NEGATIVE_ERROR};
use crate::geometry::{ds_to_cone, ds_to_sphere, Cone, Ray};
use crate::math::Vec3;

#[derive(Clone, Debug)]
pub struct RTheta {
    pub r_edges: Vec<f64>,
    pub theta_edges: Vec<f64>,
}

impl RTheta {
    pub fn new(r_min: f64, r_max: f64, n_r: usize, n_theta: usize, log_spacing: bool) -> Self {
        Self {
            r_edges: make_edges(r_min, r_max, n_r, log_spacing),
            theta_edges: make_edges(0.0, std::f64::consts::FRAC_PI_2, n_theta, false),
        }
    }

    fn theta_of(p: &Vec3) -> f64 {
        p.rho().atan2(p.z().abs())
    }
}

impl CoordKind for RTheta {
    fn locate(&self, p: &Vec3) -> Option<(usize, usize)> {
        let r = p.r();
        let theta = Self::theta_of(p);
        Some((
            bin_of(&self.r_edges, r)?,
            bin_of(&self.theta_edges, theta)?,
        ))
    }

    fn ds_in_cell(&self, i: usize, j: usize, ray: &Ray) -> f64 {
        let origin_r = ray.origin.r();
        let origin_theta = Self::theta_of(&ray.origin);
        if origin_r < self.r_edges[i] - 1e-6
            || origin_r > self.r_edges[i + 1] + 1e-6
            || origin_theta < self.theta_edges[j] - 1e-6
            || origin_theta > self.theta_edges[j + 1] + 1e-6
        {
            return NEGATIVE_ERROR;
        }

        let mut best = f64::INFINITY;
        if self.r_edges[i] > 0.0 {
            best = best.min(ds_to_sphere(self.r_edges[i], ray));
        }
        best = best.min(ds_to_sphere(self.r_edges[i + 1], ray));

        for &theta in &[self.theta_edges[j], self.theta_edges[j + 1]] {
            if theta > 0.0 && theta < std::f64::consts::FRAC_PI_2 {
                let cone = Cone::new(0.0, theta);
                best = best.min(ds_to_cone(&cone, ray));
            }
        }

        if best.is_finite() && best >= 0.0 {
            best
        } else {
            NEGATIVE_ERROR
        }
    }

    fn cell_center(&self, i: usize, j: usize) -> Vec3 {
        let r = 0.5 * (self.r_edges[i] + self.r_edges[i + 1]);
        let theta = 0.5 * (self.theta_edges[j] + self.theta_edges[j + 1]);
        Vec3::new(r * theta.sin(), 0.0, r * theta.cos())
    }

    fn volume(&self, i: usize, j: usize) -> f64 {
        let r0 = self.r_edges[i];
        let r1 = self.r_edges[i + 1];
        let t0 = self.theta_edges[j];
        let t1 = self.theta_edges[j + 1];
        // Volume of the spherical-shell wedge between two cones, doubled
        // for the mirrored southern hemisphere as the original engine does.
        2.0 * std::f64::consts::TAU / 3.0 * (r1.powi(3) - r0.powi(3)) * (t0.cos() - t1.cos()) / 2.0
    }

    fn dims(&self) -> (usize, usize) {
        (self.r_edges.len() - 1, self.theta_edges.len() - 1)
    }
}
