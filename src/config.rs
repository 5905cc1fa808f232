// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Engine tunables: numbers that would otherwise be process-wide scalars
//! or `#define`s, promoted to named, per-run configuration. Parsed from a
//! flat TOML file via `serde`.

use serde::{Deserialize, Serialize};

use crate::constants;

/// How continuum absorption is treated during transport.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScatteringMode {
    /// Continuum absorption reduces photon weight each step.
    Simple,
    /// Weight is preserved; bound-free is a counted interaction instead.
    MacroAtom,
}

impl Default for ScatteringMode {
    fn default() -> Self {
        ScatteringMode::Simple
    }
}

/// A run's full set of engine tunables.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Step-length cap fraction.
    pub smax_frac: f64,
    /// Deterministic bound on the anisotropic re-emission rejection loop.
    pub max_rejection_iterations: u64,
    /// Safety factor applied to `P_max` in the rejection sampler.
    pub p_max_safety_factor: f64,
    /// Photons per cycle.
    pub photons_per_cycle: usize,
    /// Base RNG seed; each worker derives its own stream from this plus
    /// its worker index.
    pub rng_seed: u64,
    /// Defensive cap on transport steps per photon before it is forced
    /// to an `Error` terminal state.
    pub max_steps_per_photon: u32,
    pub scattering_mode: ScatteringMode,
    /// Whether to draw an indicatif progress bar for each cycle.
    pub show_progress: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            smax_frac: constants::SMAX_FRAC,
            max_rejection_iterations: constants::MAX_REJECTION_ITERATIONS,
            p_max_safety_factor: constants::P_MAX_SAFETY_FACTOR,
            photons_per_cycle: 1_000_000,
            rng_seed: 0,
            max_steps_per_photon: 100_000,
            scattering_mode: ScatteringMode::default(),
            show_progress: true,
        }
    }
}

impl EngineConfig {
    /// Parses a tunables file, falling back to defaults for any field the
    /// file omits (`#[serde(default)]` on every field).
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
