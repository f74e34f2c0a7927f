pub mod fwave;
pub mod roe;

use crate::constants::TReal;
use crate::error::{Result, SolverError};

/// Net updates produced by a Riemann solver at a single edge: the
/// contribution subtracted from the left cell (`.0`) and from the right
/// cell (`.1`), each as `[delta_h, delta_hu]`. Scaling by `dt/dx` is the
/// caller's responsibility.
pub type NetUpdates = ([TReal; 2], [TReal; 2]);

/// Which approximate Riemann solver a patch evaluates at every edge.
///
/// `FWave` is the default: it carries the bathymetry source term and
/// handles wet/dry edges. `Roe` is a simpler linearisation retained for
/// 1D regression tests; it has no bathymetry source and is not wet/dry
/// aware beyond a zero-update short-circuit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RiemannSolver {
    FWave,
    Roe,
}

impl RiemannSolver {
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "fwave" | "f-wave" => Ok(RiemannSolver::FWave),
            "roe" => Ok(RiemannSolver::Roe),
            other => Err(SolverError::InvalidSolver(format!(
                "unknown riemann solver '{other}', expected 'fwave' or 'roe'"
            ))),
        }
    }

    /// Evaluate the net updates at an edge given left/right column state.
    #[inline]
    pub fn net_updates(
        self,
        h_l: TReal,
        h_r: TReal,
        hu_l: TReal,
        hu_r: TReal,
        b_l: TReal,
        b_r: TReal,
    ) -> NetUpdates {
        match self {
            RiemannSolver::FWave => fwave::net_updates(h_l, h_r, hu_l, hu_r, b_l, b_r),
            RiemannSolver::Roe => roe::net_updates(h_l, h_r, hu_l, hu_r),
        }
    }
}
