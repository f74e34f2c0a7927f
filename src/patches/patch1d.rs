/// ==============================================================================================
/// ======================================== 1D Patch ==============================================
/// ==============================================================================================
///
/// Grounded on `WavePropagation1d.{h,cpp}`: a double-buffered `h`/`hu`
/// pair, a single static `b` buffer, one ghost cell on each side.

use crate::constants::{CLOSED_BOUNDARY_BATHYMETRY, TReal, TIdx};
use crate::patches::boundary::Boundary;
use crate::patches::buffer::DoubleBuffer;
use crate::solvers::riemann::RiemannSolver;

pub struct Patch1d {
    nx: TIdx,
    boundary_left: Boundary,
    boundary_right: Boundary,
    h: DoubleBuffer<TReal>,
    hu: DoubleBuffer<TReal>,
    b: Vec<TReal>,
    solver: RiemannSolver,
}

impl Patch1d {
    pub fn new(nx: TIdx, boundary_left: Boundary, boundary_right: Boundary, solver: RiemannSolver) -> Self {
        let len = nx + 2;
        Self {
            nx,
            boundary_left,
            boundary_right,
            h: DoubleBuffer::zeros(len),
            hu: DoubleBuffer::zeros(len),
            b: vec![0.0; len],
            solver,
        }
    }

    #[inline]
    pub fn stride(&self) -> TIdx {
        self.nx + 2
    }

    #[inline]
    pub fn nx(&self) -> TIdx {
        self.nx
    }

    #[inline]
    pub fn height(&self) -> &[TReal] {
        &self.h.active()[1..self.nx + 1]
    }

    #[inline]
    pub fn momentum_x(&self) -> &[TReal] {
        &self.hu.active()[1..self.nx + 1]
    }

    #[inline]
    pub fn bathymetry(&self) -> &[TReal] {
        &self.b[1..self.nx + 1]
    }

    /// Full `nx+2` buffer including both ghost cells, for sinks that
    /// want to apply their own ghost-stripping convention uniformly
    /// across patch dimensionality.
    #[inline]
    pub fn height_with_ghosts(&self) -> &[TReal] {
        self.h.active()
    }

    #[inline]
    pub fn momentum_x_with_ghosts(&self) -> &[TReal] {
        self.hu.active()
    }

    #[inline]
    pub fn bathymetry_with_ghosts(&self) -> &[TReal] {
        &self.b
    }

    #[inline]
    pub fn h_max(&self) -> TReal {
        self.height().iter().copied().fold(TReal::MIN, TReal::max)
    }

    pub fn set_height(&mut self, ix: TIdx, value: TReal) {
        self.h.active_mut()[ix + 1] = value;
    }

    pub fn set_momentum_x(&mut self, ix: TIdx, value: TReal) {
        self.hu.active_mut()[ix + 1] = value;
    }

    pub fn set_bathymetry(&mut self, ix: TIdx, value: TReal) {
        self.b[ix + 1] = value;
    }

    fn apply_ghost(&mut self) {
        let h = self.h.active_mut();
        apply_edge_1d(h, self.boundary_left, 0, 1);
        let nx = self.nx;
        apply_edge_1d(h, self.boundary_right, nx + 1, nx);

        let hu = self.hu.active_mut();
        apply_edge_1d_momentum(hu, self.boundary_left, 0, 1);
        apply_edge_1d_momentum(hu, self.boundary_right, nx + 1, nx);

        match self.boundary_left {
            Boundary::Open => self.b[0] = self.b[1],
            Boundary::Closed => self.b[0] = CLOSED_BOUNDARY_BATHYMETRY,
        }
        match self.boundary_right {
            Boundary::Open => self.b[nx + 1] = self.b[nx],
            Boundary::Closed => self.b[nx + 1] = CLOSED_BOUNDARY_BATHYMETRY,
        }
    }

    /// Advance the patch by one time step. `scaling = dt / dx`.
    pub fn time_step(&mut self, scaling: TReal) {
        self.apply_ghost();

        // Copy interior from active into next before accumulating updates.
        {
            let (active, next) = self.h.split_mut();
            next[1..self.nx + 1].copy_from_slice(&active[1..self.nx + 1]);
        }
        {
            let (active, next) = self.hu.split_mut();
            next[1..self.nx + 1].copy_from_slice(&active[1..self.nx + 1]);
        }

        let h_old = self.h.active().to_vec();
        let hu_old = self.hu.active().to_vec();
        let b = &self.b;
        let solver = self.solver;

        let h_next = self.h.next_mut();
        let hu_next = self.hu.next_mut();

        for edge in 0..=self.nx {
            let left = edge;
            let right = edge + 1;

            let (delta_minus, delta_plus) = solver.net_updates(
                h_old[left],
                h_old[right],
                hu_old[left],
                hu_old[right],
                b[left],
                b[right],
            );

            h_next[left] -= scaling * delta_minus[0];
            hu_next[left] -= scaling * delta_minus[1];

            h_next[right] -= scaling * delta_plus[0];
            hu_next[right] -= scaling * delta_plus[1];
        }

        self.h.flip();
        self.hu.flip();
    }
}

fn apply_edge_1d(field: &mut [TReal], boundary: Boundary, ghost: TIdx, interior: TIdx) {
    match boundary {
        Boundary::Open => field[ghost] = field[interior],
        Boundary::Closed => field[ghost] = 0.0,
    }
}

fn apply_edge_1d_momentum(field: &mut [TReal], boundary: Boundary, ghost: TIdx, interior: TIdx) {
    match boundary {
        Boundary::Open => field[ghost] = field[interior],
        Boundary::Closed => field[ghost] = 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_patch(nx: TIdx, h: TReal, b: TReal) -> Patch1d {
        let mut p = Patch1d::new(nx, Boundary::Closed, Boundary::Closed, RiemannSolver::FWave);
        for ix in 0..nx {
            p.set_height(ix, h);
            p.set_momentum_x(ix, 0.0);
            p.set_bathymetry(ix, b);
        }
        p
    }

    #[test]
    fn lake_at_rest_is_preserved() {
        let mut p = flat_patch(10, 2.0, 1.0);
        for _ in 0..50 {
            p.time_step(0.01);
        }
        for &h in p.height() {
            assert!((h - 2.0).abs() < 1e-4);
        }
        for &hu in p.momentum_x() {
            assert!(hu.abs() < 1e-4);
        }
    }

    #[test]
    fn mass_is_conserved_under_closed_boundaries() {
        let mut p = Patch1d::new(20, Boundary::Closed, Boundary::Closed, RiemannSolver::FWave);
        for ix in 0..20 {
            let h = if ix < 10 { 4.0 } else { 1.0 };
            p.set_height(ix, h);
            p.set_bathymetry(ix, 0.0);
        }
        let initial_mass: TReal = p.height().iter().sum();

        for _ in 0..30 {
            p.time_step(0.01);
        }

        let final_mass: TReal = p.height().iter().sum();
        assert!((final_mass - initial_mass).abs() < 1e-2);
    }

    #[test]
    fn symmetric_initial_state_stays_symmetric() {
        let nx = 21;
        let mut p = Patch1d::new(nx, Boundary::Closed, Boundary::Closed, RiemannSolver::FWave);
        for ix in 0..nx {
            let d = (ix as isize - (nx as isize / 2)).unsigned_abs();
            p.set_height(ix, 1.0 + 0.5 * (-((d * d) as f32) / 20.0).exp());
        }
        for _ in 0..40 {
            p.time_step(0.01);
        }
        let h = p.height();
        for i in 0..nx {
            assert!((h[i] - h[nx - 1 - i]).abs() < 1e-4, "asymmetry at {i}");
        }
    }
}
