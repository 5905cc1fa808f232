// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A per-worker seeded, reproducible RNG. Results are reproducible only
//! at fixed worker count: each worker's stream is derived
//! deterministically from a cycle seed and the worker's index, so the
//! same `(seed, worker_count)` pair always replays identically, but
//! changing the worker count changes which draws land on which worker.

use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A worker's private random stream.
pub struct WorkerRng {
    inner: ChaCha8Rng,
}

impl WorkerRng {
    /// Derives a worker's stream from a cycle-level seed and its worker
    /// index. Uses `ChaCha8Rng::seed_from_u64`'s stream-splitting via a
    /// simple mix rather than sharing one seed verbatim across workers,
    /// so adjacent worker indices don't produce correlated early draws.
    pub fn new(cycle_seed: u64, worker_index: u64) -> Self {
        let mixed = cycle_seed
            .wrapping_mul(0x9E3779B97F4A7C15)
            .wrapping_add(worker_index.wrapping_mul(0xBF58476D1CE4E5B9));
        Self {
            inner: ChaCha8Rng::seed_from_u64(mixed),
        }
    }

    /// Uniform draw in `(0, 1]`, suitable for `tau_scat = -ln(U)`.
    pub fn uniform_pos(&mut self) -> f64 {
        loop {
            let u: f64 = self.inner.gen();
            if u > 0.0 {
                return u;
            }
        }
    }

    /// Uniform draw in `[0, 1)`.
    pub fn uniform(&mut self) -> f64 {
        self.inner.gen()
    }

    /// Draws `-ln(U)` for `U ~ Uniform(0, 1]`, the target cumulative
    /// optical depth at which a photon scatters.
    pub fn tau_scat(&mut self) -> f64 {
        -self.uniform_pos().ln()
    }

    /// An isotropically distributed unit vector.
    pub fn isotropic_direction(&mut self) -> crate::math::Vec3 {
        // Marsaglia's method: uniform point on the sphere via rejection in
        // the unit disk, avoiding trig calls.
        loop {
            let x1 = 2.0 * self.uniform() - 1.0;
            let x2 = 2.0 * self.uniform() - 1.0;
            let s = x1 * x1 + x2 * x2;
            if s < 1.0 {
                let factor = 2.0 * (1.0 - s).sqrt();
                return crate::math::Vec3::new(x1 * factor, x2 * factor, 1.0 - 2.0 * s);
            }
        }
    }
}
