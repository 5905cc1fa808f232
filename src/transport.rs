// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The transport driver: the per-photon state machine that
//! dispatches each step to in-space or in-wind motion, invokes the
//! sampler, updates radiation-field estimators, handles scattering
//! (including the anisotropic Sobolev re-emission sub-loop), and checks
//! wall collisions to terminate the photon.

use crate::constants::{EPSILON, MAX_REJECTION_ITERATIONS, P_MAX_SAFETY_FACTOR, SMAX_FRAC, VERY_BIG};
use crate::diagnostics::ErrorCounts;
use crate::estimators::EstimatorTable;
use crate::geometry::{ds_to_disk, Disk, Ray};
use crate::grid::coord::NEGATIVE_ERROR;
use crate::grid::{Grid, InWind};
use crate::math::Vec3;
use crate::photon::{Photon, PhotonStatus, Resonance};
use crate::rng::WorkerRng;
use crate::sampler::{sample_step, SamplerOutcome};
use crate::sources::{dvwind_ds, p_escape_from_tau, sobolev, LineDataAccess, PlasmaAccess};
use crate::traversal::{ds_in_cell, translate_in_space};

/// Status returned by one `translate` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TranslateStatus {
    InWind,
    InSpace,
    HitStar,
    HitDisk,
    Escaped,
    Error,
    ScatterResonant,
    ScatterElectron,
}

impl TranslateStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TranslateStatus::HitStar | TranslateStatus::HitDisk | TranslateStatus::Escaped | TranslateStatus::Error)
    }
}

/// The flat, vertically-extended disk description `walls` needs. A flat
/// disk is `height: None`; a vertically extended one supplies `height`,
/// `zdisk(rho)`.
pub struct DiskGeometry<'a> {
    pub radius: f64,
    pub height: Option<&'a dyn Fn(f64) -> f64>,
}

/// Everything `translate`/`walls`/`reemit` need beyond the photon itself:
/// the grid, the read-only line/plasma collaborators, and the star/disk
/// geometry.
pub struct TransportContext<'a> {
    pub grid: &'a Grid,
    pub plasma: &'a dyn PlasmaAccess,
    pub lines: &'a dyn LineDataAccess,
    pub disk: Option<DiskGeometry<'a>>,
    /// Macro-atom mode: continuum absorption is treated as a counted
    /// interaction rather than a weight reduction.
    pub macro_atom_mode: bool,
}

/// One step of transport. Advances `photon` by
/// exactly one state-machine tick: a single in-space hop to the wind
/// boundary, a single in-wind cell crossing (possibly ending in a
/// scatter), or a terminal wall collision. Updates `estimators` for any
/// cell actually traversed and `errors` for any non-fatal condition
/// encountered.
pub fn translate(
    ctx: &TransportContext,
    photon: &mut Photon,
    rng: &mut WorkerRng,
    estimators: &mut EstimatorTable,
    errors: &mut ErrorCounts,
) -> TranslateStatus {
    if !photon.is_in_flight() {
        return status_of(photon.status);
    }

    match ctx.grid.where_in_wind(&photon.position) {
        None => translate_in_space_step(ctx, photon, errors),
        Some(domain_id) => match ctx.grid.where_in_grid(domain_id, &photon.position) {
            Ok(cell_id) => {
                photon.domain = Some(domain_id);
                photon.cell = Some(cell_id);
                translate_in_wind_step(ctx, photon, rng, estimators, errors)
            }
            Err(_) => {
                errors.not_in_wind_or_grid += 1;
                photon.status = PhotonStatus::Error;
                TranslateStatus::Error
            }
        },
    }
}

fn translate_in_space_step(
    ctx: &TransportContext,
    photon: &mut Photon,
    errors: &mut ErrorCounts,
) -> TranslateStatus {
    // The in-space hop's own push-through isn't tied to any one domain
    // (the photon isn't in a cell yet); the global default mirrors the
    // original engine's single `DFUDGE` constant for this particular use.
    let old_position = photon.position;
    let step = translate_in_space(ctx.grid, photon.position, photon.direction, crate::constants::DFUDGE_DEFAULT);
    photon.advance(step.distance);

    match check_walls(ctx, photon, old_position, errors) {
        Some(terminal) => terminal,
        None => {
            if photon.position.r() > ctx.grid.rmax {
                photon.status = PhotonStatus::Escaped;
                TranslateStatus::Escaped
            } else if step.domain.is_some() {
                TranslateStatus::InWind
            } else {
                TranslateStatus::InSpace
            }
        }
    }
}

fn translate_in_wind_step(
    ctx: &TransportContext,
    photon: &mut Photon,
    rng: &mut WorkerRng,
    estimators: &mut EstimatorTable,
    errors: &mut ErrorCounts,
) -> TranslateStatus {
    let domain_id = photon.domain.unwrap();
    let cell_id = photon.cell.unwrap();
    let cell = match ctx.grid.cell(cell_id) {
        Some(c) => c,
        None => {
            errors.not_in_wind_or_grid += 1;
            photon.status = PhotonStatus::Error;
            return TranslateStatus::Error;
        }
    };

    let (i, j) = match ctx.grid.domains[domain_id].mesh.locate(&photon.position) {
        Some(ij) => ij,
        None => {
            errors.not_in_wind_or_grid += 1;
            photon.status = PhotonStatus::Error;
            return TranslateStatus::Error;
        }
    };
    let ray = Ray::new(photon.position, photon.direction);
    let mut smax = ds_in_cell(ctx.grid, domain_id, i, j, &ray);
    if smax <= NEGATIVE_ERROR {
        errors.negative_ds_in_cell += 1;
        photon.status = PhotonStatus::Error;
        return TranslateStatus::Error;
    }

    match cell.inwind {
        InWind::Ignore => {
            photon.advance(smax + cell.dfudge);
            return TranslateStatus::InWind;
        }
        InWind::NotInwind => {
            errors.not_inwind_anomaly += 1;
            photon.advance(smax);
            return TranslateStatus::InWind;
        }
        InWind::PartInwind => {
            let (ds_wind, _) = crate::traversal::ds_to_wind(ctx.grid, &ray);
            if ds_wind < smax {
                smax = ds_wind;
            }
            if let Some(disk) = &ctx.disk {
                let geom = Disk { radius: disk.radius, height: disk.height };
                let ds_disk = ds_to_disk(&ray, &geom, false);
                if ds_disk > 0.0 && ds_disk < smax {
                    smax = ds_disk;
                }
            }
        }
        InWind::AllInwind => {}
    }

    smax += cell.dfudge;
    let cap = SMAX_FRAC * photon.position.length().max(1.0);
    if smax > cap {
        smax = cap;
    }

    let plasma = match cell.plasma_index.map(|p| ctx.plasma.plasma(p)) {
        Some(p) => p,
        None => {
            photon.advance(smax);
            return TranslateStatus::InWind;
        }
    };

    let tau_scat = rng.tau_scat();
    let outcome = sample_step(cell, plasma, ctx.lines, &photon.direction, photon.freq, smax, tau_scat, rng);

    let plasma_idx = cell.plasma_index.unwrap();
    let est = &mut estimators.cells[plasma_idx];

    let old_position = photon.position;
    match outcome {
        SamplerOutcome::NoEvent { .. } => {
            est.accumulate_step(photon.weight, photon.freq, smax);
            if !ctx.macro_atom_mode {
                photon.weight *= (-plasma.continuum.total() * smax).exp().max(0.0);
            }
            photon.advance(smax);
            match check_walls(ctx, photon, old_position, errors) {
                Some(terminal) => terminal,
                None => TranslateStatus::InWind,
            }
        }
        SamplerOutcome::Scatter { ds, nres, .. } => {
            est.accumulate_step(photon.weight, photon.freq, ds);
            match nres {
                Resonance::ElectronScatter => est.record_electron_scatter(),
                Resonance::Line(_) => est.record_line_scatter(),
                Resonance::Continuum => est.record_ionization(),
            }
            if !ctx.macro_atom_mode && !matches!(nres, Resonance::Line(_)) {
                photon.weight *= (-plasma.continuum.total() * ds).exp().max(0.0);
            }
            photon.advance(ds);
            photon.nres = nres;
            match check_walls(ctx, photon, old_position, errors) {
                Some(terminal) => terminal,
                None => match nres {
                    Resonance::Line(_) => TranslateStatus::ScatterResonant,
                    _ => TranslateStatus::ScatterElectron,
                },
            }
        }
    }
}

/// Checks star/disk/outer-sphere collisions for the move `old -> new`.
/// On a hit, moves the photon exactly to the contact point (minus one
/// epsilon into vacuum) and records a terminal status; returns `None` if
/// no wall was hit.
fn check_walls(
    ctx: &TransportContext,
    photon: &mut Photon,
    old_position: Vec3,
    errors: &mut ErrorCounts,
) -> Option<TranslateStatus> {
    let rstar = ctx.grid.rstar;
    if photon.position.r() < rstar {
        let ray = Ray::new(old_position, photon.direction);
        let s = crate::geometry::ds_to_sphere(rstar, &ray);
        photon.position = ray.at(s);
        photon.status = PhotonStatus::HitStar;
        photon.wall_normal = photon.position.normalize();
        return Some(TranslateStatus::HitStar);
    }

    if let Some(disk) = &ctx.disk {
        let geom = Disk { radius: disk.radius, height: disk.height };
        let candidate = match disk.height {
            // Flat disk: only a midplane crossing can possibly hit it.
            None => old_position.z() * photon.position.z() < 0.0,
            // Vertically extended disk: test containment directly, not
            // midplane crossing (a photon can cross z=0 far outside
            // disk.radius without coming anywhere near the surface).
            Some(height) => {
                photon.position.rho() < disk.radius && photon.position.z().abs() <= height(photon.position.rho())
            }
        };

        if candidate {
            let ray = Ray::new(old_position, photon.direction);
            let mut s = ds_to_disk(&ray, &geom, false);
            if s <= 0.0 {
                errors.previous_position_inside_disk += 1;
                // Recoverable: recompute with the same (already relaxed,
                // sentinel-tolerant) routine and proceed.
                s = ds_to_disk(&ray, &geom, false);
            }
            if s > 0.0 && s < VERY_BIG {
                photon.position = ray.at((s - EPSILON).max(0.0));
                photon.status = PhotonStatus::HitDisk;
                photon.wall_normal = Some(disk_normal(disk, old_position, photon.position));
                return Some(TranslateStatus::HitDisk);
            }
        }
    }

    let rho_sq = photon.position.x() * photon.position.x() + photon.position.y() * photon.position.y();
    if rho_sq > ctx.grid.rmax * ctx.grid.rmax || photon.position.z().abs() > ctx.grid.rmax {
        photon.status = PhotonStatus::Escaped;
        return Some(TranslateStatus::Escaped);
    }

    None
}

/// Outward normal at a disk contact point. A flat disk's normal is just
/// `+/- ẑ`, whichever side `old_position` approached from. A vertically
/// extended disk's normal follows the local gradient of `zdisk(rho)`,
/// estimated by a central difference since the caller only hands us the
/// height function itself.
fn disk_normal(disk: &DiskGeometry<'_>, old_position: Vec3, contact: Vec3) -> Vec3 {
    let side = if old_position.z() >= 0.0 { 1.0 } else { -1.0 };
    match disk.height {
        None => Vec3::new(0.0, 0.0, side),
        Some(height) => {
            let rho = contact.rho();
            let d = (disk.radius * 1e-6).max(1e-10);
            let dh_drho = (height((rho + d).max(0.0)) - height((rho - d).max(0.0))) / (2.0 * d);
            let rho_hat = Vec3::new(contact.x(), contact.y(), 0.0)
                .normalize()
                .unwrap_or_else(|| Vec3::new(1.0, 0.0, 0.0));
            let n = rho_hat.scale(-dh_drho * side) + Vec3::new(0.0, 0.0, side);
            n.normalize().unwrap_or_else(|| Vec3::new(0.0, 0.0, side))
        }
    }
}

fn status_of(status: PhotonStatus) -> TranslateStatus {
    match status {
        PhotonStatus::InFlight => TranslateStatus::InWind,
        PhotonStatus::HitStar => TranslateStatus::HitStar,
        PhotonStatus::HitDisk => TranslateStatus::HitDisk,
        PhotonStatus::Escaped => TranslateStatus::Escaped,
        PhotonStatus::Absorbed => TranslateStatus::Error,
        PhotonStatus::Error => TranslateStatus::Error,
    }
}

/// Anisotropic Sobolev re-emission, run after a
/// `translate` call returns `ScatterResonant`. Draws a new photon
/// direction by rejection sampling so the distribution is proportional to
/// the local escape probability; `photon.nnscat` accumulates the number
/// of internal rejections, later used by the (out-of-scope) spectrum
/// extractor as a `1/nnscat` weight correction.
///
/// Falls back to isotropic scattering if the photon's cell/line cannot be
/// resolved, or if `P_max <= 0`.
pub fn reemit(ctx: &TransportContext, photon: &mut Photon, rng: &mut WorkerRng, errors: &mut ErrorCounts) {
    let fallback_isotropic = |photon: &mut Photon, rng: &mut WorkerRng| {
        photon.direction = rng.isotropic_direction();
        photon.nnscat = photon.nnscat.saturating_add(1);
    };

    let nres = match photon.nres {
        Resonance::Line(n) => n,
        _ => return fallback_isotropic(photon, rng),
    };
    let cell = match photon.cell.and_then(|c| ctx.grid.cell(c)) {
        Some(c) => c,
        None => return fallback_isotropic(photon, rng),
    };
    let plasma = match cell.plasma_index.map(|p| ctx.plasma.plasma(p)) {
        Some(p) => p,
        None => return fallback_isotropic(photon, rng),
    };
    let line = match ctx.lines.line(nres) {
        Some(l) => l,
        None => return fallback_isotropic(photon, rng),
    };

    // Normalise the rejection sampler by the escape probability along the
    // cell's direction of maximum velocity gradient.
    let tau_norm = sobolev(plasma, &line, cell.dvds_max);
    let p_max = (p_escape_from_tau(tau_norm) * P_MAX_SAFETY_FACTOR).min(1.0);

    if p_max <= 0.0 {
        errors.non_positive_p_max += 1;
        return fallback_isotropic(photon, rng);
    }

    let mut nnscat: i64 = -1;
    for _ in 0..MAX_REJECTION_ITERATIONS {
        nnscat += 1;
        let candidate = rng.isotropic_direction();
        let dvds = dvwind_ds(cell, &candidate);
        let tau = sobolev(plasma, &line, dvds);
        let p = p_escape_from_tau(tau);
        let z_test = rng.uniform() * p_max;
        if z_test <= p {
            photon.direction = candidate;
            photon.nnscat = nnscat.max(0) as u32;
            return;
        }
    }

    errors.rejection_loop_exceeded += 1;
    fallback_isotropic(photon, rng);
}
