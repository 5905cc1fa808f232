// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Numerical constants shared across the transport engine.

/// Speed of light, cm/s.
pub const C: f64 = 2.997_924_58e10;

/// Sentinel standing in for "no intersection"/"very far away". Kept finite
/// (rather than `f64::INFINITY`) so it can be compared and subtracted
/// safely, matching the original engine's `VERY_BIG`.
pub const VERY_BIG: f64 = 1e30;

/// Step-length cap: `smax` is clamped to `SMAX_FRAC * |x|` so a single step
/// cannot blur line-profile structure.
pub const SMAX_FRAC: f64 = 0.5;

/// Deterministic bound on the anisotropic re-emission rejection loop
/// (spec says "say, 10^6").
pub const MAX_REJECTION_ITERATIONS: u64 = 1_000_000;

/// Safety factor applied to `P_max` in the rejection sampler, compensating
/// for under-sampling of `dvds_max` over the cell's direction grid.
pub const P_MAX_SAFETY_FACTOR: f64 = 1.2;

/// A small angle/length epsilon used where an exact zero would cause a
/// division or a degenerate direction.
pub const EPSILON: f64 = 1e-6;

/// Default per-cell push-through distance used when a domain's derived
/// `dfudge` has not yet been set (should not be reached once grid
/// construction has run `derive_dfudge`).
pub const DFUDGE_DEFAULT: f64 = 1e5;
