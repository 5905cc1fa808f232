// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use wind_transport::diagnostics::ErrorCounts;
use wind_transport::estimators::EstimatorTable;
use wind_transport::geometry::{Cone, Plane};
use wind_transport::grid::coord::{CoordKind, CoordType, Spherical};
use wind_transport::grid::domain::derive_dfudge;
use wind_transport::grid::{Cell, Domain, DomainMesh, Grid, InWind, Mesh, PlasmaCell, WindType};
use wind_transport::rng::WorkerRng;
use wind_transport::sources::LineDataAccess;
use wind_transport::transport::{DiskGeometry, TransportContext};
use wind_transport::{run_photon, LineParams, Photon, Vec3};

struct NoLines;
impl LineDataAccess for NoLines {
    fn line(&self, _nres: u32) -> Option<LineParams> {
        None
    }
    fn lines_in_range(&self, _lo: f64, _hi: f64) -> Vec<u32> {
        Vec::new()
    }
}

/// A single-domain spherical wind with modest continuum opacity: enough
/// optical depth that most photons scatter a handful of times before
/// escaping or
/// hitting the star, which is the regime the transport driver spends
/// nearly all of its time in during a real run.
fn bench_grid(n: usize) -> Grid {
    let (rmin, rmax) = (1.0, 10.0);
    let mesh = Mesh::Spherical(Spherical::new(rmin, rmax, n, false));
    let domain = Domain {
        coord_type: CoordType::Spherical,
        n,
        m: 1,
        log_spacing: false,
        rmin,
        rmax,
        wind_cone_inner: Cone::new(0.0, std::f64::consts::FRAC_PI_2),
        wind_cone_outer: Cone::new(0.0, std::f64::consts::FRAC_PI_2),
        wind_plane_inner: Plane { z0: 0.0 },
        wind_plane_outer: Plane { z0: 0.0 },
        wind_rho_min: 0.0,
        wind_rho_max: rmax,
        zmin: -rmax,
        zmax: rmax,
        wind_type: WindType::Spherical,
        nstart: 0,
        nstop: n,
        dfudge: derive_dfudge(rmax, rmin),
    };
    let cells: Vec<Cell> = (0..n)
        .map(|i| {
            let center = if let Mesh::Spherical(m) = &mesh { m.cell_center(i, 0) } else { unreachable!() };
            Cell {
                lower_corner: Vec3::ZERO,
                center,
                velocity: Vec3::ZERO,
                dvds_max: 0.0,
                inwind: InWind::AllInwind,
                plasma_index: Some(i),
                domain_index: 0,
                dfudge: domain.dfudge,
            }
        })
        .collect();
    let plasma: Vec<PlasmaCell> = (0..n)
        .map(|_| {
            let mut p = PlasmaCell::new(1e10, 1e-15, 1e4, 1e4, 1.0);
            p.continuum.electron_scattering = 0.05;
            p
        })
        .collect();
    Grid { domains: vec![DomainMesh { domain, mesh }], cells, plasma, rmax, rstar: rmin }
}

fn bench_translate_to_completion(c: &mut Criterion) {
    let grid = bench_grid(50);
    let ctx = TransportContext { grid: &grid, plasma: &grid, lines: &NoLines, disk: None, macro_atom_mode: false };

    c.bench_function("run_photon radial through 50-shell spherical wind", |b| {
        b.iter(|| {
            let mut rng = WorkerRng::new(1, 0);
            let mut estimators = EstimatorTable::new(grid.plasma.len());
            let mut errors = ErrorCounts::default();
            let mut photon = Photon::new(black_box(Vec3::new(1.5, 0.0, 0.0)), Vec3::new(1.0, 0.0, 0.0), 1e15, 1.0, 0);
            run_photon(&ctx, &mut photon, &mut rng, &mut estimators, &mut errors, 10_000);
            photon
        })
    });
}

fn bench_translate_with_disk(c: &mut Criterion) {
    let grid = bench_grid(50);
    let ctx = TransportContext {
        grid: &grid,
        plasma: &grid,
        lines: &NoLines,
        disk: Some(DiskGeometry { radius: 10.0, height: None }),
        macro_atom_mode: false,
    };

    c.bench_function("run_photon toward a flat disk", |b| {
        b.iter(|| {
            let mut rng = WorkerRng::new(2, 0);
            let mut estimators = EstimatorTable::new(grid.plasma.len());
            let mut errors = ErrorCounts::default();
            let mut photon = Photon::new(Vec3::new(3.0, 0.0, 9.0), Vec3::new(0.0, 0.0, -1.0), 1e15, 1.0, 0);
            run_photon(&ctx, &mut photon, &mut rng, &mut estimators, &mut errors, 10_000);
            photon
        })
    });
}

criterion_group!(benches, bench_translate_to_completion, bench_translate_with_disk);
criterion_main!(benches);
