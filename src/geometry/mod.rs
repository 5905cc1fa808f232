// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The geometry oracle: pure functions computing the distance from a ray
//! to canonical surfaces. No state, no panics — every routine returns a
//! sentinel (`f64::INFINITY`, or a documented negative value for the disk)
//! rather than failing, so callers can always keep moving photons forward.

use crate::constants::VERY_BIG;
use crate::math::Vec3;

/// A ray: an origin and a (assumed unit) direction.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, s: f64) -> Vec3 {
        self.origin.advance(&self.direction, s)
    }
}

/// A cone about the z-axis with its apex at `z_apex` opening at
/// `half_angle` radians. `apex_is_south` distinguishes the two
/// "wind cone" senses used by biconical domains (the cone can open up from
/// below or down from above).
#[derive(Clone, Copy, Debug)]
pub struct Cone {
    pub z_apex: f64,
    pub half_angle: f64,
}

impl Cone {
    pub fn new(z_apex: f64, half_angle: f64) -> Self {
        Self {
            z_apex,
            half_angle,
        }
    }

    fn tan2(&self) -> f64 {
        let t = self.half_angle.tan();
        t * t
    }
}

/// An axis-aligned plane `z = z0`.
#[derive(Clone, Copy, Debug)]
pub struct Plane {
    pub z0: f64,
}

/// A flat or vertically-extended disk. `height` is `None` for a flat disk
/// (z=0) and `Some(f)` for a vertically extended one, where `f(rho)` gives
/// the disk half-height at cylindrical radius `rho`.
pub struct Disk<'a> {
    pub radius: f64,
    pub height: Option<&'a dyn Fn(f64) -> f64>,
}

/// Nearest positive root of the ray/sphere intersection, or the far root
/// if the photon is already inside the sphere (near root <= 0). Returns
/// `f64::INFINITY` if the ray never meets the sphere.
pub fn ds_to_sphere(radius: f64, ray: &Ray) -> f64 {
    let oc = ray.origin;
    let b = oc.dot(&ray.direction);
    let c = oc.dot(&oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return f64::INFINITY;
    }
    let sqrt_disc = disc.sqrt();
    let near = -b - sqrt_disc;
    let far = -b + sqrt_disc;
    if near > 0.0 {
        near
    } else if far > 0.0 {
        far
    } else {
        f64::INFINITY
    }
}

/// Nearest positive intersection of the ray with the infinite double cone
/// about the z-axis described by `cone`. Degenerate rays running exactly
/// along the axis (`rho == 0` and direction parallel to z) never hit a
/// cone with half-angle > 0 and correctly return infinity rather than
/// dividing by zero.
pub fn ds_to_cone(cone: &Cone, ray: &Ray) -> f64 {
    let dx = ray.direction.x();
    let dy = ray.direction.y();
    let dz = ray.direction.z();
    let ox = ray.origin.x();
    let oy = ray.origin.y();
    let oz = ray.origin.z() - cone.z_apex;

    let tan2 = cone.tan2();
    let a = dx * dx + dy * dy - tan2 * dz * dz;
    let b = 2.0 * (ox * dx + oy * dy - tan2 * oz * dz);
    let c = ox * ox + oy * oy - tan2 * oz * oz;

    let mut best = f64::INFINITY;

    if a.abs() < 1e-14 {
        if b.abs() > 1e-14 {
            let s = -c / b;
            if s > 0.0 {
                best = s;
            }
        }
        return best;
    }

    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return f64::INFINITY;
    }
    let sqrt_disc = disc.sqrt();
    let s1 = (-b - sqrt_disc) / (2.0 * a);
    let s2 = (-b + sqrt_disc) / (2.0 * a);
    let (lo, hi) = if s1 < s2 { (s1, s2) } else { (s2, s1) };
    if lo > 1e-10 {
        best = lo;
    } else if hi > 1e-10 {
        best = hi;
    }
    best
}

/// Signed distance along `ray.direction` to reach `plane`. `f64::INFINITY`
/// when the ray runs parallel to the plane. May be negative; callers that
/// only want forward intersections must filter.
pub fn ds_to_plane(plane: &Plane, ray: &Ray) -> f64 {
    let dz = ray.direction.z();
    if dz.abs() < 1e-14 {
        return f64::INFINITY;
    }
    (plane.z0 - ray.origin.z()) / dz
}

/// Nearest positive intersection with an infinite cylinder of radius `rho`
/// about the z-axis.
pub fn ds_to_cylinder(rho: f64, ray: &Ray) -> f64 {
    let dx = ray.direction.x();
    let dy = ray.direction.y();
    let ox = ray.origin.x();
    let oy = ray.origin.y();

    let a = dx * dx + dy * dy;
    if a < 1e-14 {
        return f64::INFINITY;
    }
    let b = 2.0 * (ox * dx + oy * dy);
    let c = ox * ox + oy * oy - rho * rho;
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return f64::INFINITY;
    }
    let sqrt_disc = disc.sqrt();
    let s1 = (-b - sqrt_disc) / (2.0 * a);
    let s2 = (-b + sqrt_disc) / (2.0 * a);
    let (lo, hi) = if s1 < s2 { (s1, s2) } else { (s2, s1) };
    if lo > 0.0 {
        lo
    } else if hi > 0.0 {
        hi
    } else {
        f64::INFINITY
    }
}

/// Distance to the disk. For a flat disk, solves for the `z=0` crossing
/// within `disk.radius`. For a vertically extended disk, brackets and
/// root-finds the surface `z = height(rho)` (bisection on the signed
/// "above/below surface" function, since the surface is monotonic in `s`
/// along any ray that actually crosses it).
///
/// On a miss: returns `f64::INFINITY` if `return_very_big_on_miss` is
/// true, otherwise returns a negative sentinel meaning "the ray's origin
/// was already inside/below the disk surface" — the caller (`walls`)
/// interprets this as a recoverable numerical error.
pub fn ds_to_disk(ray: &Ray, disk: &Disk, return_very_big_on_miss: bool) -> f64 {
    match disk.height {
        None => ds_to_flat_disk(ray, disk.radius, return_very_big_on_miss),
        Some(h) => ds_to_vertical_disk(ray, disk.radius, h, return_very_big_on_miss),
    }
}

fn ds_to_flat_disk(ray: &Ray, radius: f64, return_very_big_on_miss: bool) -> f64 {
    let dz = ray.direction.z();
    if dz.abs() < 1e-14 {
        return if return_very_big_on_miss {
            f64::INFINITY
        } else {
            -VERY_BIG
        };
    }
    let s = -ray.origin.z() / dz;
    if s <= 0.0 {
        return if return_very_big_on_miss {
            f64::INFINITY
        } else {
            -VERY_BIG
        };
    }
    let hit = ray.at(s);
    if hit.rho() <= radius {
        s
    } else if return_very_big_on_miss {
        f64::INFINITY
    } else {
        -VERY_BIG
    }
}

/// signed "height above the disk surface" at parameter `s` along the ray:
/// positive outside the disk, negative inside it.
fn disk_surface_fn<'a>(ray: &'a Ray, height: &'a dyn Fn(f64) -> f64) -> impl Fn(f64) -> f64 + 'a {
    move |s: f64| {
        let p = ray.at(s);
        p.z().abs() - height(p.rho())
    }
}

fn ds_to_vertical_disk(
    ray: &Ray,
    radius: f64,
    height: &dyn Fn(f64) -> f64,
    return_very_big_on_miss: bool,
) -> f64 {
    let f = disk_surface_fn(ray, height);

    // The origin is already inside/below the disk surface: this is the
    // recoverable "previous position was inside the disk" case.
    if ray.origin.rho() <= radius && f(0.0) < 0.0 {
        return if return_very_big_on_miss {
            f64::INFINITY
        } else {
            -VERY_BIG
        };
    }

    // Search forward for a bracket where the sign flips from + to -.
    let max_s = radius.max(1.0) * 10.0 + ray.origin.length() * 2.0 + 1.0;
    let steps = 4096;
    let ds = max_s / steps as f64;

    let mut prev_s = 0.0;
    let mut prev_f = f(0.0);
    for i in 1..=steps {
        let s = i as f64 * ds;
        let cur = f(s);
        if prev_f > 0.0 && cur <= 0.0 {
            // Bisect between prev_s and s.
            let mut lo = prev_s;
            let mut hi = s;
            let mut flo = prev_f;
            for _ in 0..60 {
                let mid = 0.5 * (lo + hi);
                let fm = f(mid);
                if (flo > 0.0) == (fm > 0.0) {
                    lo = mid;
                    flo = fm;
                } else {
                    hi = mid;
                }
            }
            let mid = 0.5 * (lo + hi);
            // Confirm the crossing is within the disk radius.
            if ray.at(mid).rho() <= radius {
                return mid;
            }
        }
        prev_s = s;
        prev_f = cur;
    }

    if return_very_big_on_miss {
        f64::INFINITY
    } else {
        -VERY_BIG
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn sphere_from_outside() {
        let ray = Ray::new(Vec3::new(-10.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert_abs_diff_eq!(ds_to_sphere(5.0, &ray), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn sphere_from_inside() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert_abs_diff_eq!(ds_to_sphere(5.0, &ray), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn sphere_miss() {
        let ray = Ray::new(Vec3::new(-10.0, 10.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(ds_to_sphere(5.0, &ray), f64::INFINITY);
    }

    #[test]
    fn cylinder_on_axis_parallel_is_infinite() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(ds_to_cylinder(5.0, &ray), f64::INFINITY);
    }

    #[test]
    fn cone_on_axis_no_infinity_panic() {
        // direction exactly along +z at rho=0 must not divide by zero.
        let cone = Cone::new(0.0, 20f64.to_radians());
        let ray = Ray::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        // a is negative (since tan2 * dz^2 dominates), b and c are zero:
        // the only solution is s=0 which is filtered out, giving infinity.
        let d = ds_to_cone(&cone, &ray);
        assert!(d.is_finite() || d == f64::INFINITY);
    }

    #[test]
    fn flat_disk_hit() {
        let disk = Disk {
            radius: 10.0,
            height: None,
        };
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let d = ds_to_disk(&ray, &disk, true);
        assert_abs_diff_eq!(d, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn flat_disk_miss_beyond_radius() {
        let disk = Disk {
            radius: 10.0,
            height: None,
        };
        let ray = Ray::new(Vec3::new(20.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(ds_to_disk(&ray, &disk, true), f64::INFINITY);
    }

    #[test]
    fn vertical_disk_hit() {
        let height = |rho: f64| 0.1 * rho;
        let disk = Disk {
            radius: 10.0,
            height: Some(&height),
        };
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.6), Vec3::new(0.0, 0.0, -1.0));
        let d = ds_to_disk(&ray, &disk, true);
        let hit = ray.at(d);
        assert_abs_diff_eq!(hit.rho(), 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(hit.z(), 0.5, epsilon = 1e-4);
    }
}
