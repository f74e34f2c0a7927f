/// ==============================================================================================
/// ===================================== Boundary Policy =========================================
/// ==============================================================================================

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};

/// Boundary condition applied to one edge of the domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Boundary {
    /// Transmissive: ghost state mirrors the adjacent interior cell.
    Open,
    /// Reflective: ghost state is `h=0, hu=0, hv=0, b=CLOSED_BOUNDARY_BATHYMETRY`.
    Closed,
}

impl Boundary {
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "open" => Ok(Boundary::Open),
            "closed" => Ok(Boundary::Closed),
            other => Err(SolverError::InvalidBoundary(format!(
                "undefined boundary state '{other}', expected 'open' or 'closed'"
            ))),
        }
    }
}

/// The four edges of a 2D patch, in the order the CLI and checkpoint
/// record store them: left, right, top, bottom.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BoundaryBox {
    pub left: Boundary,
    pub right: Boundary,
    pub top: Boundary,
    pub bottom: Boundary,
}

impl BoundaryBox {
    pub fn all(mode: Boundary) -> Self {
        Self {
            left: mode,
            right: mode,
            top: mode,
            bottom: mode,
        }
    }

    pub fn as_array(&self) -> [Boundary; 4] {
        [self.left, self.right, self.top, self.bottom]
    }
}
