// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The wind element ("cell"): static geometry plus the classification and
//! push-through distance the traversal and transport layers need.

use crate::math::Vec3;

/// Index into the flat, cross-domain cell array.
pub type CellId = usize;

/// Index into the plasma table. Cells with no plasma (e.g. `Ignore` cells)
/// carry `None` rather than the C original's `-1` sentinel.
pub type PlasmaId = usize;

/// Index into the domain array.
pub type DomainId = usize;

/// Per-cell coverage classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InWind {
    /// Entirely in the wind.
    AllInwind,
    /// Only partially covered by the wind (e.g. clipped by the disk or a
    /// windcone); transport must additionally check `ds_to_wind`/`ds_to_disk`.
    PartInwind,
    /// Not in the wind at all, but still part of the regular mesh.
    NotInwind,
    /// Should be skipped entirely: move the photon through with no physics.
    Ignore,
}

/// A single wind element ("grid cell").
#[derive(Clone, Debug)]
pub struct Cell {
    /// Position of the cell's lower corner (minimum of each coordinate).
    pub lower_corner: Vec3,
    /// Cell-center position, used for plasma-state lookups.
    pub center: Vec3,
    /// Cell-center velocity, cm/s.
    pub velocity: Vec3,
    /// Maximum directional velocity gradient `|dv . d/ds|` over a sampled
    /// direction grid, used to normalise the anisotropic re-emission
    /// rejection sampler.
    pub dvds_max: f64,
    pub inwind: InWind,
    /// `None` if this cell has no associated plasma state (unplasma).
    pub plasma_index: Option<PlasmaId>,
    pub domain_index: DomainId,
    /// Push-through epsilon, scaled to this cell's size at grid
    /// construction (see `domain::derive_dfudge`).
    pub dfudge: f64,
}

impl Cell {
    pub fn is_in_wind(&self) -> bool {
        matches!(self.inwind, InWind::AllInwind | InWind::PartInwind)
    }
}
