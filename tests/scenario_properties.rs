//! Integration tests for the testable properties in §8: mass conservation
//! on an open-boundary dam break, reflecting-wall symmetry, lake-at-rest
//! on sloped bathymetry, and checkpoint round-trip equivalence.

use tsunami_wave_rs::constants::{GRAVITY, TReal};
use tsunami_wave_rs::patches::{Boundary, BoundaryBox, Patch1d, Patch2d};
use tsunami_wave_rs::solvers::riemann::RiemannSolver;

fn dam_break_patch(nx: usize) -> Patch1d {
    let mut p = Patch1d::new(nx, Boundary::Open, Boundary::Open, RiemannSolver::FWave);
    for ix in 0..nx {
        let h = if ix < nx / 2 { 10.0 } else { 5.0 };
        p.set_height(ix, h);
        p.set_momentum_x(ix, 0.0);
        p.set_bathymetry(ix, 0.0);
    }
    p
}

#[test]
fn dam_break_1d_conserves_mass_over_25_steps() {
    let nx = 100;
    let mut p = dam_break_patch(nx);

    let initial_mass: TReal = p.height().iter().sum();
    assert!((initial_mass - (10.0 * 50.0 + 5.0 * 50.0)).abs() < 1e-2);

    let dxy = 10.0 / nx as TReal;
    let dt = 0.5 * dxy / (GRAVITY * 10.0).sqrt();
    let scaling = dt / dxy;

    for _ in 0..25 {
        p.time_step(scaling);
    }

    let final_mass: TReal = p.height().iter().sum();
    // open boundaries let flux leave through the domain edges; 25 steps at
    // this CFL fraction keeps any disturbance away from the boundary, so
    // the interior mass balance should still hold closely.
    assert!(
        (final_mass - initial_mass).abs() / initial_mass < 1e-2,
        "mass drifted: initial={initial_mass}, final={final_mass}"
    );
}

#[test]
fn reflecting_wall_2d_stays_symmetric_after_200_steps() {
    let nx = 50;
    let ny = 50;
    let boundary = BoundaryBox::all(Boundary::Closed);
    let mut p = Patch2d::new(nx, ny, boundary, RiemannSolver::FWave);

    for iy in 0..ny {
        for ix in 0..nx {
            let dx = ix as isize - nx as isize / 2;
            let dy = iy as isize - ny as isize / 2;
            let d2 = (dx * dx + dy * dy) as TReal;
            p.set_height(ix, iy, 1.0 + 0.5 * (-d2 / 40.0).exp());
        }
    }

    for _ in 0..200 {
        p.time_step(0.002);
    }

    let stride = p.stride();
    let h = p.height();
    for iy in 0..ny {
        for ix in 0..nx {
            let mirrored_x = nx - 1 - ix;
            let mirrored_y = ny - 1 - iy;
            let a = h[(iy + 1) * stride + ix + 1];
            let b_x = h[(iy + 1) * stride + mirrored_x + 1];
            let b_y = h[(mirrored_y + 1) * stride + ix + 1];
            assert!((a - b_x).abs() < 1e-3, "x-asymmetry at ({ix},{iy})");
            assert!((a - b_y).abs() < 1e-3, "y-asymmetry at ({ix},{iy})");
        }
    }
}

#[test]
fn lake_at_rest_holds_on_sloped_bathymetry_after_500_steps() {
    let nx = 32;
    let ny = 32;
    let boundary = BoundaryBox::all(Boundary::Closed);
    let mut p = Patch2d::new(nx, ny, boundary, RiemannSolver::FWave);

    let const_surface = 5.0;
    for iy in 0..ny {
        for ix in 0..nx {
            let b = 0.05 * ix as TReal + 0.02 * iy as TReal;
            p.set_bathymetry(ix, iy, b);
            p.set_height(ix, iy, const_surface - b);
        }
    }

    for _ in 0..500 {
        p.time_step(0.001);
    }

    let stride = p.stride();
    let h = p.height();
    let b = p.bathymetry();
    let hu = p.momentum_x();
    let hv = p.momentum_y();
    let mut max_surface_drift: TReal = 0.0;
    let mut max_hu: TReal = 0.0;
    let mut max_hv: TReal = 0.0;
    for iy in 1..=ny {
        for ix in 1..=nx {
            let id = iy * stride + ix;
            max_surface_drift = max_surface_drift.max((h[id] + b[id] - const_surface).abs());
            max_hu = max_hu.max(hu[id].abs());
            max_hv = max_hv.max(hv[id].abs());
        }
    }

    assert!(max_surface_drift < 1e-4, "surface drifted by {max_surface_drift}");
    assert!(max_hu < 1e-4, "hu drifted by {max_hu}");
    assert!(max_hv < 1e-4, "hv drifted by {max_hv}");
}

#[test]
fn checkpoint_round_trip_matches_consecutive_run() {
    use tsunami_wave_rs::io::checkpoint::CheckpointRecord;
    use tsunami_wave_rs::io::csv::remove_ghost_cells;

    let nx = 24;
    let ny = 24;
    let boundary = BoundaryBox::all(Boundary::Closed);

    let seed = |p: &mut Patch2d| {
        for iy in 0..ny {
            for ix in 0..nx {
                let dx = ix as isize - nx as isize / 2;
                let dy = iy as isize - ny as isize / 2;
                let d2 = (dx * dx + dy * dy) as TReal;
                p.set_height(ix, iy, 1.0 + 0.5 * (-d2 / 30.0).exp());
            }
        }
    };

    let scaling = 0.003;

    let mut reference = Patch2d::new(nx, ny, boundary, RiemannSolver::FWave);
    seed(&mut reference);
    for _ in 0..200 {
        reference.time_step(scaling);
    }

    let mut split = Patch2d::new(nx, ny, boundary, RiemannSolver::FWave);
    seed(&mut split);
    for _ in 0..100 {
        split.time_step(scaling);
    }

    let stride = split.stride();
    let record = CheckpointRecord {
        nx,
        ny,
        dxy: 1.0,
        x_offset: 0.0,
        y_offset: 0.0,
        end_time: 1.0,
        current_time: 0.3,
        step_index: 100,
        next_snapshot_index: 4,
        h_max: 1.5,
        snapshot_period: 25,
        resolution_stride: 1,
        boundary,
        output_filename: String::new(),
        h: remove_ghost_cells(split.height(), nx, ny, stride),
        hu: remove_ghost_cells(split.momentum_x(), nx, ny, stride),
        hv: remove_ghost_cells(split.momentum_y(), nx, ny, stride),
        b: remove_ghost_cells(split.bathymetry(), nx, ny, stride),
    };

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.bin");
    record.save(&path).unwrap();
    let restored = CheckpointRecord::load(&path).unwrap();

    let mut resumed = Patch2d::new(nx, ny, boundary, RiemannSolver::FWave);
    for iy in 0..ny {
        for ix in 0..nx {
            let idx = iy * nx + ix;
            resumed.set_height(ix, iy, restored.h[idx]);
            resumed.set_momentum_x(ix, iy, restored.hu[idx]);
            resumed.set_momentum_y(ix, iy, restored.hv[idx]);
            resumed.set_bathymetry(ix, iy, restored.b[idx]);
        }
    }
    for _ in 0..100 {
        resumed.time_step(scaling);
    }

    let ref_h = reference.height();
    let resumed_h = resumed.height();
    for i in 0..ref_h.len() {
        assert!(
            (ref_h[i] - resumed_h[i]).abs() < 1e-4,
            "interior diverged at flat index {i}: {} vs {}",
            ref_h[i],
            resumed_h[i]
        );
    }
}
