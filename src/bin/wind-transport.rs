// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A small CLI front-end for running a transport cycle against a plain
//! spherically symmetric wind, mostly useful for smoke-testing a
//! configuration file or reproducing a seed's outcome summary. A real
//! production run supplies its own grid/source/line data; this binary
//! exists to exercise the library end to end without one.

use std::path::PathBuf;

use clap::Parser;
use wind_transport::grid::coord::{CoordType, Spherical};
use wind_transport::grid::domain::derive_dfudge;
use wind_transport::grid::{Cell, Domain, DomainMesh, Grid, InWind, Mesh, PlasmaCell, WindType};
use wind_transport::math::Vec3;
use wind_transport::sources::{LineParams, SourceSampler};
use wind_transport::{run_cycle, EngineConfig, LineDataAccess, Photon, TransportContext};

/// Runs a Monte Carlo photon transport cycle.
#[derive(Parser, Debug)]
#[clap(name = "wind-transport", author, version, about)]
struct Args {
    /// Path to a TOML file of engine tunables. Missing fields fall back
    /// to defaults.
    #[clap(short, long, help_heading = "INPUT")]
    config: Option<PathBuf>,

    /// Inner radius of the test shell, in the same length unit as
    /// `--outer-radius`.
    #[clap(long, default_value = "1.0", help_heading = "GRID")]
    inner_radius: f64,

    /// Outer radius of the test shell.
    #[clap(long, default_value = "100.0", help_heading = "GRID")]
    outer_radius: f64,

    /// Number of radial cells.
    #[clap(long, default_value = "30", help_heading = "GRID")]
    n_cells: usize,

    /// Electron density of the shell, cm^-3.
    #[clap(long, default_value = "1e8", help_heading = "GRID")]
    electron_density: f64,

    /// Don't draw a progress bar.
    #[clap(long, help_heading = "USER INTERFACE")]
    no_progress_bars: bool,
}

struct NoLines;
impl LineDataAccess for NoLines {
    fn line(&self, _nres: u32) -> Option<LineParams> {
        None
    }
    fn lines_in_range(&self, _lo: f64, _hi: f64) -> Vec<u32> {
        Vec::new()
    }
}

/// Launches photons isotropically from the shell's inner radius, just
/// outside it so the first `translate` call starts already in the wind.
struct ShellSurfaceSampler {
    launch_radius: f64,
    freq: f64,
    rng: wind_transport::WorkerRng,
}

impl SourceSampler for ShellSurfaceSampler {
    fn sample(&mut self, serial: u64) -> Photon {
        let dir = self.rng.isotropic_direction();
        Photon::new(dir.scale(self.launch_radius), dir, self.freq, 1.0, serial)
    }
}

fn build_shell_grid(rmin: f64, rmax: f64, n: usize, electron_density: f64) -> Grid {
    let mesh = Mesh::Spherical(Spherical::new(rmin, rmax, n, false));
    let dfudge = derive_dfudge(rmax, rmin);
    let domain = Domain {
        coord_type: CoordType::Spherical,
        n,
        m: 1,
        log_spacing: false,
        rmin,
        rmax,
        wind_cone_inner: wind_transport::geometry::Cone::new(0.0, std::f64::consts::FRAC_PI_2),
        wind_cone_outer: wind_transport::geometry::Cone::new(0.0, std::f64::consts::FRAC_PI_2),
        wind_plane_inner: wind_transport::geometry::Plane { z0: 0.0 },
        wind_plane_outer: wind_transport::geometry::Plane { z0: 0.0 },
        wind_rho_min: 0.0,
        wind_rho_max: rmax,
        zmin: -rmax,
        zmax: rmax,
        wind_type: WindType::Spherical,
        nstart: 0,
        nstop: n,
        dfudge,
    };
    let cells = (0..n)
        .map(|i| Cell {
            lower_corner: Vec3::ZERO,
            center: if let Mesh::Spherical(m) = &mesh { m.cell_center(i, 0) } else { unreachable!() },
            velocity: Vec3::ZERO,
            dvds_max: 0.0,
            inwind: InWind::AllInwind,
            plasma_index: Some(i),
            domain_index: 0,
            dfudge,
        })
        .collect();
    let plasma = (0..n)
        .map(|_| {
            let mut p = PlasmaCell::new(electron_density, 1e-15, 1e4, 1e4, 1.0);
            p.continuum.electron_scattering = electron_density * 6.652e-25;
            p
        })
        .collect();
    Grid { domains: vec![DomainMesh { domain, mesh }], cells, plasma, rmax, rstar: rmin }
}

fn main() {
    let args = Args::parse();
    if let Err(e) = wind_transport::logging::init(log::LevelFilter::Info) {
        eprintln!("failed to initialise logging: {e}");
    }

    let config = match &args.config {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(s) => match EngineConfig::from_toml_str(&s) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("invalid configuration: {e}");
                    std::process::exit(1);
                }
            },
            Err(e) => {
                eprintln!("could not read {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };

    let grid = build_shell_grid(args.inner_radius, args.outer_radius, args.n_cells, args.electron_density);
    let ctx = TransportContext { grid: &grid, plasma: &grid, lines: &NoLines, disk: None, macro_atom_mode: false };

    let mut sampler = ShellSurfaceSampler {
        launch_radius: args.inner_radius * 1.0001,
        freq: 1e15,
        rng: wind_transport::WorkerRng::new(config.rng_seed, 0),
    };
    let photons: Vec<Photon> = (0..config.photons_per_cycle).map(|serial| sampler.sample(serial as u64)).collect();

    let (_photons, _estimators, summary) = run_cycle(
        &ctx,
        photons,
        config.rng_seed,
        grid.plasma.len(),
        config.max_steps_per_photon,
        config.show_progress && !args.no_progress_bars,
    );

    summary.log();
}
