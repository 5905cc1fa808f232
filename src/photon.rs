// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The photon bundle: the unit of work the transport driver advances one
//! step at a time. Exclusively owned by the driver for the duration of a
//! step; estimator updates on plasma cells are the only external writes.

use crate::grid::{CellId, DomainId};
use crate::math::Vec3;

/// Bookkeeping identifier for what caused (or will cause) a scattering
/// event: negative for electron scattering, zero for pure continuum,
/// positive for a specific line index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resonance {
    ElectronScatter,
    Continuum,
    Line(u32),
}

impl Resonance {
    pub fn is_line(&self) -> bool {
        matches!(self, Resonance::Line(_))
    }
}

/// Terminal and in-flight photon states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhotonStatus {
    InFlight,
    HitStar,
    HitDisk,
    Escaped,
    Absorbed,
    Error,
}

impl PhotonStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PhotonStatus::InFlight)
    }
}

/// A photon bundle in transit.
#[derive(Clone, Debug)]
pub struct Photon {
    pub position: Vec3,
    pub direction: Vec3,
    /// Frequency, Hz.
    pub freq: f64,
    /// Statistical weight.
    pub weight: f64,
    pub cell: Option<CellId>,
    pub domain: Option<DomainId>,
    pub nres: Resonance,
    /// Monotonic serial number, for tracing a photon across steps/logs.
    pub serial: u64,
    pub status: PhotonStatus,
    /// Number of internal rejections in the last anisotropic re-emission
    ///; `0` until the photon has scattered resonantly at
    /// least once.
    pub nnscat: u32,
    /// Outward surface normal at the contact point of the wall that
    /// terminated this photon (`HitStar`/`HitDisk` only), for a caller
    /// that wants to reflect rather than discard it. `None` until a wall
    /// hit sets it.
    pub wall_normal: Option<Vec3>,
}

impl Photon {
    pub fn new(position: Vec3, direction: Vec3, freq: f64, weight: f64, serial: u64) -> Self {
        Self {
            position,
            direction,
            freq,
            weight,
            cell: None,
            domain: None,
            nres: Resonance::Continuum,
            serial,
            status: PhotonStatus::InFlight,
            nnscat: 0,
            wall_normal: None,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.status == PhotonStatus::InFlight
    }

    /// Debug/test invariant: position and direction remain unit/finite.
    pub fn is_physically_valid(&self) -> bool {
        self.position.is_finite()
            && self.direction.is_finite()
            && (self.direction.length() - 1.0).abs() < 1e-6
            && self.freq.is_finite()
            && self.freq > 0.0
            && self.weight.is_finite()
            && self.weight >= 0.0
    }

    pub fn advance(&mut self, distance: f64) {
        self.position = self.position.advance(&self.direction, distance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_photon_is_valid_and_in_flight() {
        let p = Photon::new(
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            1e15,
            1.0,
            0,
        );
        assert!(p.is_in_flight());
        assert!(p.is_physically_valid());
    }

    #[test]
    fn advance_updates_position() {
        let mut p = Photon::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0), 1e15, 1.0, 1);
        p.advance(3.0);
        assert_eq!(p.position, Vec3::new(0.0, 3.0, 0.0));
    }
}
