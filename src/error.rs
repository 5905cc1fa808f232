// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The *only* publicly visible error from this crate. Per-subsystem
//! errors (`grid::GridError`, TOML parse errors, ...) are folded into
//! this one at the boundary. Distinct from `diagnostics::ErrorCounts`,
//! which tracks *non-fatal*, per-photon conditions counted during
//! transport; `EngineError` is for conditions fatal at setup time.

use thiserror::Error;

use crate::grid::GridError;

/// The *only* publicly visible error from this crate.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A grid/domain construction error: bad coordinate type, a photon
    /// resolving to no domain, or an unsupported imported-grid geometry.
    #[error("grid error: {0}")]
    Grid(#[from] GridError),

    /// The tunables file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A setup-time consistency check on the domain list failed (e.g. no
    /// domains at all, or domains overlapping in radius).
    #[error("invalid domain setup: {0}")]
    InvalidDomainSetup(String),

    /// A line list or plasma table referenced an index the grid does not
    /// have enough cells/domains to resolve.
    #[error("index {index} out of range for {what} (len {len})")]
    IndexOutOfRange { what: &'static str, index: usize, len: usize },

    /// A generic I/O error, e.g. reading a config or line-list file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
