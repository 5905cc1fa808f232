// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A Monte Carlo radiative-transfer photon transport engine for
//! axisymmetric winds and stellar atmospheres.
//!
//! Photons are sampled at a source surface, pushed through a static grid
//! of cells (each tagged with a coordinate system and a plasma state),
//! and followed until they escape, are absorbed, or strike a boundary.
//! Scattering is either isotropic (electron scattering) or anisotropic,
//! using the Sobolev escape-probability formalism for line resonances in
//! a differentially moving medium.
//!
//! Module layout mirrors the transport pipeline's dependency order:
//! geometry primitives and the grid/domain model at the bottom, then
//! cell traversal, the optical-depth sampler, and the transport driver
//! on top, with the photon-parallel cycle scheduler as the entry point
//! most callers want (`cycle::run_cycle`).

pub mod config;
pub(crate) mod constants;
pub mod cycle;
pub mod diagnostics;
pub mod error;
pub mod estimators;
pub mod geometry;
pub mod grid;
pub mod logging;
pub mod math;
pub mod photon;
pub mod rng;
pub mod sampler;
pub mod sources;
pub mod transport;
pub mod traversal;

// Re-exports of the types most callers need without reaching into
// individual modules.
pub use config::{EngineConfig, ScatteringMode};
pub use cycle::{run_cycle, run_photon};
pub use diagnostics::{CycleSummary, ErrorCounts};
pub use error::{EngineError, Result};
pub use estimators::{Estimators, EstimatorTable};
pub use math::Vec3;
pub use photon::{Photon, PhotonStatus, Resonance};
pub use rng::WorkerRng;
pub use sources::{LineDataAccess, LineParams, PlasmaAccess, SourceSampler};
pub use transport::{translate, DiskGeometry, TransportContext, TranslateStatus};
