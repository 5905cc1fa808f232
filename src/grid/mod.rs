// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The static description of space: one or more domains, each with its
//! own coordinate system and cell mesh. Answers "where is this point?"
//! queries and publishes cell geometry to the traversal layer.

pub mod cell;
pub mod coord;
pub mod domain;
pub mod plasma;

pub use cell::{Cell, CellId, DomainId, InWind, PlasmaId};
pub use domain::{Domain, WindBoundary, WindType};
pub use plasma::PlasmaCell;

use coord::{CoordKind, CoordType, CylVar, Cylindrical, RTheta, Spherical};
use thiserror::Error;

use crate::geometry::Ray;
use crate::math::Vec3;

/// Continuum opacity coefficients handed back by `sources::PlasmaAccess`;
/// the sampler adds them up, it does not compute them from level
/// populations (that solver lives outside this engine).
#[derive(Clone, Copy, Debug, Default)]
pub struct ContinuumOpacity {
    pub electron_scattering: f64,
    pub bound_free: f64,
    pub free_free: f64,
}

impl ContinuumOpacity {
    pub fn total(&self) -> f64 {
        self.electron_scattering + self.bound_free + self.free_free
    }
}

#[derive(Debug, Error)]
pub enum GridError {
    #[error("photon at {0:?} is not in any domain's wind")]
    NotInWind(Vec3),
    #[error("photon at {0:?} claims domain {1} but where_in_grid found no matching cell")]
    NotInGrid(Vec3, DomainId),
    #[error("unknown coordinate type for domain {0}: unsupported imported-grid geometry")]
    UnsupportedGeometry(DomainId),
}

/// Per-domain coordinate mesh, tagged by `CoordType`.
#[derive(Clone, Debug)]
pub enum Mesh {
    Cylindrical(Cylindrical),
    RTheta(RTheta),
    Spherical(Spherical),
    CylVar(CylVar),
}

impl Mesh {
    pub fn coord_type(&self) -> CoordType {
        match self {
            Mesh::Cylindrical(_) => CoordType::Cylindrical,
            Mesh::RTheta(_) => CoordType::RTheta,
            Mesh::Spherical(_) => CoordType::Spherical,
            Mesh::CylVar(_) => CoordType::CylVar,
        }
    }
}

impl CoordKind for Mesh {
    fn locate(&self, p: &Vec3) -> Option<(usize, usize)> {
        match self {
            Mesh::Cylindrical(m) => m.locate(p),
            Mesh::RTheta(m) => m.locate(p),
            Mesh::Spherical(m) => m.locate(p),
            Mesh::CylVar(m) => m.locate(p),
        }
    }

    fn ds_in_cell(&self, i: usize, j: usize, ray: &Ray) -> f64 {
        match self {
            Mesh::Cylindrical(m) => m.ds_in_cell(i, j, ray),
            Mesh::RTheta(m) => m.ds_in_cell(i, j, ray),
            Mesh::Spherical(m) => m.ds_in_cell(i, j, ray),
            Mesh::CylVar(m) => m.ds_in_cell(i, j, ray),
        }
    }

    fn cell_center(&self, i: usize, j: usize) -> Vec3 {
        match self {
            Mesh::Cylindrical(m) => m.cell_center(i, j),
            Mesh::RTheta(m) => m.cell_center(i, j),
            Mesh::Spherical(m) => m.cell_center(i, j),
            Mesh::CylVar(m) => m.cell_center(i, j),
        }
    }

    fn volume(&self, i: usize, j: usize) -> f64 {
        match self {
            Mesh::Cylindrical(m) => m.volume(i, j),
            Mesh::RTheta(m) => m.volume(i, j),
            Mesh::Spherical(m) => m.volume(i, j),
            Mesh::CylVar(m) => m.volume(i, j),
        }
    }

    fn dims(&self) -> (usize, usize) {
        match self {
            Mesh::Cylindrical(m) => m.dims(),
            Mesh::RTheta(m) => m.dims(),
            Mesh::Spherical(m) => m.dims(),
            Mesh::CylVar(m) => m.dims(),
        }
    }
}

/// A domain plus its mesh, bundled so `Grid` can own a flat `Vec` of them.
#[derive(Clone, Debug)]
pub struct DomainMesh {
    pub domain: Domain,
    pub mesh: Mesh,
}

/// The full, static grid: every domain, the flat cross-domain cell array,
/// and the plasma table cells index into.
#[derive(Clone, Debug)]
pub struct Grid {
    pub domains: Vec<DomainMesh>,
    pub cells: Vec<Cell>,
    pub plasma: Vec<PlasmaCell>,
    /// Outer computational-domain radius; a photon beyond this has
    /// escaped regardless of which domain's wind it last occupied.
    pub rmax: f64,
    pub rstar: f64,
}

impl Grid {
    /// Returns the first domain whose mesh contains `x` *and* whose
    /// corresponding cell is classified in-wind, or `None` if `x` is in
    /// vacuum or inside the empty interior of an imported-model cell.
    ///
    /// Invariant: this must stay consistent with
    /// `where_in_grid` — a point mapped into a cell is reported as in that
    /// wind, except for `PartInwind`/`NotInwind` cells which may be only
    /// partly covered.
    pub fn where_in_wind(&self, x: &Vec3) -> Option<DomainId> {
        for (dom_id, dm) in self.domains.iter().enumerate() {
            if let Some((i, j)) = dm.mesh.locate(x) {
                let cell_id = dm.domain.nstart + dm.mesh.linear_index(i, j);
                if let Some(cell) = self.cells.get(cell_id) {
                    if cell.is_in_wind() {
                        return Some(dom_id);
                    }
                }
            }
        }
        None
    }

    /// Locates the cell containing `x` within `domain_id`'s mesh.
    pub fn where_in_grid(&self, domain_id: DomainId, x: &Vec3) -> Result<CellId, GridError> {
        let dm = &self.domains[domain_id];
        match dm.mesh.locate(x) {
            Some((i, j)) => Ok(dm.domain.nstart + dm.mesh.linear_index(i, j)),
            None => Err(GridError::NotInGrid(*x, domain_id)),
        }
    }

    pub fn coord_type(&self, domain_id: DomainId) -> CoordType {
        self.domains[domain_id].mesh.coord_type()
    }

    pub fn cell(&self, cell_id: CellId) -> Option<&Cell> {
        self.cells.get(cell_id)
    }

    pub fn plasma_of(&self, cell_id: CellId) -> Option<&PlasmaCell> {
        self.cells
            .get(cell_id)
            .and_then(|c| c.plasma_index)
            .and_then(|p| self.plasma.get(p))
    }

    pub fn domain_of(&self, cell_id: CellId) -> Option<DomainId> {
        self.cells.get(cell_id).map(|c| c.domain_index)
    }
}

impl crate::sources::PlasmaAccess for Grid {
    fn plasma(&self, plasma_index: usize) -> &PlasmaCell {
        &self.plasma[plasma_index]
    }
}
