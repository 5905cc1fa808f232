// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Cell traversal: given a photon and its containing cell,
//! the distance to the nearest cell face; given a photon outside all
//! winds, the distance to the nearest wind boundary.

use crate::constants::VERY_BIG;
use crate::geometry::{ds_to_cone, ds_to_cylinder, ds_to_plane, ds_to_sphere, Ray};
use crate::grid::coord::{CoordKind, NEGATIVE_ERROR};
use crate::grid::{DomainId, Grid, WindType};
use crate::math::Vec3;

/// Distance to the nearest face of the cell the ray's origin is claimed to
/// be in, dispatched by the domain's coordinate type. A
/// negative return is the `NEGATIVE_ERROR` sentinel: the caller must treat
/// this as an unrecoverable step error.
pub fn ds_in_cell(grid: &Grid, domain_id: DomainId, i: usize, j: usize, ray: &Ray) -> f64 {
    grid.domains[domain_id].mesh.ds_in_cell(i, j, ray)
}

/// Which boundary a `ds_to_wind` call actually reported as closest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindHit {
    /// No domain boundary is closer than the outer computational sphere.
    OuterSphere,
    Domain(DomainId),
}

/// Finds the shortest positive distance from `ray` to any domain's wind
/// boundary, or to the outer computational sphere if nothing is closer.
/// Mirrors `photon2d.c`'s `ds_to_wind`: ANALYTIC_BICONICAL
/// and SPHERICAL domains are tested via their two wind cones and
/// `rmin`/`rmax` spheres; CORONA and cylindrical IMPORT domains via their
/// two wind planes and inner/outer rho cylinders (each crossing confirmed
/// to fall within the complementary bound, per DESIGN.md Open Question #1
/// — this implements the *intended* `wind_rho_min <= rho <= wind_rho_max`
/// test, not the original's defective same-bound-on-both-sides check).
pub fn ds_to_wind(grid: &Grid, ray: &Ray) -> (f64, WindHit) {
    let mut best = ds_to_sphere(grid.rmax, ray);
    let mut hit = WindHit::OuterSphere;

    for (dom_id, dm) in grid.domains.iter().enumerate() {
        let d = &dm.domain;
        match d.wind_type {
            WindType::AnalyticBiconical | WindType::Spherical => {
                for cand in [
                    ds_to_sphere(d.rmax, ray),
                    ds_to_sphere(d.rmin, ray),
                    ds_to_cone(&d.wind_cone_inner, ray),
                    ds_to_cone(&d.wind_cone_outer, ray),
                ] {
                    if cand < best {
                        best = cand;
                        hit = WindHit::Domain(dom_id);
                    }
                }
            }
            WindType::Corona => {
                test_plane_and_cylinder_boundaries(d, ray, dom_id, &mut best, &mut hit);
            }
            WindType::Import => {
                if d.coord_type == crate::grid::coord::CoordType::Cylindrical {
                    test_plane_and_cylinder_boundaries(d, ray, dom_id, &mut best, &mut hit);
                }
                // For IMPORT domains of other coordinate types the core
                // cannot compute a wind boundary; such a domain simply never becomes the
                // closest boundary here, matching the original's fatal
                // `Error`/`exit` at a point this crate instead leaves
                // for the caller to detect (no in-wind domain ever
                // reached via this path).
            }
        }
    }

    (best, hit)
}

fn test_plane_and_cylinder_boundaries(
    d: &crate::grid::Domain,
    ray: &Ray,
    dom_id: DomainId,
    best: &mut f64,
    hit: &mut WindHit,
) {
    let x = ds_to_plane(&d.wind_plane_inner, ray);
    if x > 0.0 && x < *best {
        let p = ray.at(x);
        if d.wind_rho_min <= p.rho() && p.rho() <= d.wind_rho_max {
            *best = x;
            *hit = WindHit::Domain(dom_id);
        }
    }
    let x = ds_to_plane(&d.wind_plane_outer, ray);
    if x > 0.0 && x < *best {
        let p = ray.at(x);
        if d.wind_rho_min <= p.rho() && p.rho() <= d.wind_rho_max {
            *best = x;
            *hit = WindHit::Domain(dom_id);
        }
    }
    let x = ds_to_cylinder(d.wind_rho_min, ray);
    if x > 0.0 && x < *best {
        let p = ray.at(x);
        if d.zmin <= p.z().abs() && p.z().abs() <= d.zmax {
            *best = x;
            *hit = WindHit::Domain(dom_id);
        }
    }
    let x = ds_to_cylinder(d.wind_rho_max, ray);
    if x > 0.0 && x < *best {
        let p = ray.at(x);
        if d.zmin <= p.z().abs() && p.z().abs() <= d.zmax {
            *best = x;
            *hit = WindHit::Domain(dom_id);
        }
    }
}

/// Result of translating a photon through empty space up to the wind
/// boundary, including any IMPORT-domain empty-cell scan.
pub struct SpaceStep {
    /// Total distance advanced, including the push-through epsilon(s).
    pub distance: f64,
    /// Domain the photon is expected to be in wind of after the move
    /// (`None` if it escaped the outer sphere instead).
    pub domain: Option<DomainId>,
}

/// Advances a photon (conceptually; the caller applies `distance` to the
/// actual photon) from outside all winds to the point it first enters a
/// genuine in-wind cell, or to the outer sphere / domain exit if it never
/// does.
///
/// For an IMPORT domain, crossing the nominal wind boundary may still
/// land in an empty (non-wind) cell; this walks cell-by-cell (each hop
/// `ds_in_cell + dfudge`) until either an in-wind cell is found or the
/// domain's opposite boundary is crossed, accumulating the scanned
/// distance into the returned total.
pub fn translate_in_space(grid: &Grid, position: Vec3, direction: Vec3, dfudge: f64) -> SpaceStep {
    let ray = Ray::new(position, direction);
    let (ds, hit) = ds_to_wind(grid, &ray);

    let dom_id = match hit {
        WindHit::OuterSphere => return SpaceStep { distance: ds + dfudge, domain: None },
        WindHit::Domain(d) => d,
    };

    if grid.domains[dom_id].domain.wind_type != WindType::Import {
        return SpaceStep { distance: ds + dfudge, domain: Some(dom_id) };
    }

    // IMPORT: step to the nominal boundary, then scan cell-by-cell while
    // still outside the wind, as long as we remain in the same domain.
    let mut test_pos = ray.at(ds + dfudge);
    if grid.where_in_wind(&test_pos).is_some() {
        return SpaceStep { distance: ds + dfudge, domain: Some(dom_id) };
    }

    let scan_ray = Ray::new(test_pos, direction);
    let (smax, _) = ds_to_wind(grid, &scan_ray);
    let mut s = 0.0;
    while s < smax && grid.where_in_wind(&test_pos).is_none() {
        let cell_id = match grid.where_in_grid(dom_id, &test_pos) {
            Ok(c) => c,
            Err(_) => break,
        };
        let (i, j) = match grid.domains[dom_id].mesh.locate(&test_pos) {
            Some(ij) => ij,
            None => break,
        };
        let _ = cell_id;
        let step_ray = Ray::new(test_pos, direction);
        let delta = ds_in_cell(grid, dom_id, i, j, &step_ray);
        if delta <= NEGATIVE_ERROR || !delta.is_finite() || delta >= VERY_BIG {
            break;
        }
        let hop = delta + grid.domains[dom_id].domain.dfudge;
        test_pos = step_ray.at(hop);
        s += hop;
    }

    // photon2d.c's translate_in_space does `ds += s - DFUDGE` then moves by
    // `ds + DFUDGE`; the DFUDGE it subtracts and re-adds cancel, leaving
    // `ds_original + s` as the total distance from the photon's original
    // position once it actually entered a wind cell (or exhausted the scan).
    let total = if s > 0.0 { ds + s } else { ds + dfudge };
    SpaceStep { distance: total, domain: Some(dom_id) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Cone, Plane};
    use crate::grid::coord::Spherical;
    use crate::grid::{Cell, Domain, DomainMesh, InWind, Mesh, PlasmaCell};

    fn spherical_grid(rmin: f64, rmax: f64) -> Grid {
        let n = 5;
        let mesh = Mesh::Spherical(Spherical::new(rmin, rmax, n, false));
        let domain = Domain {
            coord_type: crate::grid::coord::CoordType::Spherical,
            n,
            m: 1,
            log_spacing: false,
            rmin,
            rmax,
            wind_cone_inner: Cone::new(0.0, std::f64::consts::FRAC_PI_2),
            wind_cone_outer: Cone::new(0.0, std::f64::consts::FRAC_PI_2),
            wind_plane_inner: Plane { z0: 0.0 },
            wind_plane_outer: Plane { z0: 0.0 },
            wind_rho_min: 0.0,
            wind_rho_max: rmax,
            zmin: -rmax,
            zmax: rmax,
            wind_type: WindType::Spherical,
            nstart: 0,
            nstop: n,
            dfudge: crate::grid::domain::derive_dfudge(rmax, rmin),
        };
        let cells = (0..n)
            .map(|i| Cell {
                lower_corner: Vec3::ZERO,
                center: if let Mesh::Spherical(m) = &mesh {
                    m.cell_center(i, 0)
                } else {
                    unreachable!()
                },
                velocity: Vec3::ZERO,
                dvds_max: 0.0,
                inwind: InWind::AllInwind,
                plasma_index: Some(i),
                domain_index: 0,
                dfudge: domain.dfudge,
            })
            .collect();
        let plasma = (0..n).map(|_| PlasmaCell::new(1e10, 1e-15, 1e4, 1e4, 1.0)).collect();
        Grid { domains: vec![DomainMesh { domain, mesh }], cells, plasma, rmax, rstar: rmin }
    }

    #[test]
    fn ds_to_wind_from_outside_hits_inner_radius() {
        let grid = spherical_grid(1.0, 10.0);
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let (d, hit) = ds_to_wind(&grid, &ray);
        assert!((d - 4.0).abs() < 1e-9);
        assert_eq!(hit, WindHit::Domain(0));
    }

    #[test]
    fn ds_to_wind_prefers_outer_sphere_when_no_domain_closer() {
        let grid = spherical_grid(1.0, 10.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        // origin is inside rmin, so nearest domain boundary (rmin=1) beats rmax=10 (grid.rmax)
        let (d, hit) = ds_to_wind(&grid, &ray);
        assert!((d - 1.0).abs() < 1e-9);
        assert_eq!(hit, WindHit::Domain(0));
    }

    #[test]
    fn translate_in_space_reaches_wind_in_one_hop_for_non_import() {
        let grid = spherical_grid(1.0, 10.0);
        let step = translate_in_space(&grid, Vec3::new(-5.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), 1e-3);
        assert_eq!(step.domain, Some(0));
        assert!(step.distance > 4.0);
    }
}
