/// ==============================================================================================
/// ========================================= Patch ================================================
/// ==============================================================================================
///
/// One level of tagged-enum dispatch over the three patch kinds, per
/// the Design Note that no inheritance depth beyond one level is
/// needed. Callers that need dimensionality-specific accessors (e.g.
/// the snapshot sinks) match on the variant directly; the methods here
/// cover what every variant can do.

pub mod boundary;
pub mod buffer;
pub mod patch1d;
pub mod patch2d;
pub mod patch2d_accel;

use crate::constants::{TIdx, TReal};
use crate::error::Result;

pub use boundary::{Boundary, BoundaryBox};
pub use patch1d::Patch1d;
pub use patch2d::Patch2d;
pub use patch2d_accel::Patch2dAccel;

pub enum Patch {
    OneD(Patch1d),
    TwoD(Patch2d),
    TwoDAccel(Patch2dAccel),
}

impl Patch {
    pub fn nx(&self) -> TIdx {
        match self {
            Patch::OneD(p) => p.nx(),
            Patch::TwoD(p) => p.nx(),
            Patch::TwoDAccel(p) => p.nx(),
        }
    }

    pub fn h_max(&self) -> TReal {
        match self {
            Patch::OneD(p) => p.h_max(),
            Patch::TwoD(p) => p.h_max(),
            Patch::TwoDAccel(p) => p.h_max(),
        }
    }

    /// Advance by one time step; `scaling = dt / dx` (1D) or `dt / dxy`
    /// (2D, square cells). Only the accelerator variant can fail here.
    pub fn time_step(&mut self, scaling: TReal) -> Result<()> {
        match self {
            Patch::OneD(p) => {
                p.time_step(scaling);
                Ok(())
            }
            Patch::TwoD(p) => {
                p.time_step(scaling);
                Ok(())
            }
            Patch::TwoDAccel(p) => p.time_step(scaling),
        }
    }

    /// Upload staged initial state to the device. A no-op for the CPU
    /// variants, which have no separate host/device state.
    pub fn set_data(&mut self) -> Result<()> {
        match self {
            Patch::OneD(_) | Patch::TwoD(_) => Ok(()),
            Patch::TwoDAccel(p) => p.set_data(),
        }
    }

    /// Download device state before any snapshot/checkpoint read. A
    /// no-op for the CPU variants.
    pub fn get_data(&mut self) -> Result<()> {
        match self {
            Patch::OneD(_) | Patch::TwoD(_) => Ok(()),
            Patch::TwoDAccel(p) => p.get_data(),
        }
    }

    pub fn is_two_dimensional(&self) -> bool {
        matches!(self, Patch::TwoD(_) | Patch::TwoDAccel(_))
    }
}
