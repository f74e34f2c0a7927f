/// ==============================================================================================
/// ========================================= Setups ================================================
/// ==============================================================================================
///
/// C5: initial-condition sampling. All concretions share the four
/// `(x, y) -> t_real` sampling functions; `Restart` instead samples by
/// cell index, as called out in the Design Note on setup dispatch.

pub mod analytic_1d;
pub mod artificial_tsunami_2d;
pub mod dam_break_2d;
pub mod restart;
pub mod riemann_1d;
pub mod tsunami_event_1d;
pub mod tsunami_event_2d;

pub use analytic_1d::{Subcritical1d, Supercritical1d};
pub use artificial_tsunami_2d::ArtificialTsunami2d;
pub use dam_break_2d::DamBreak2d;
pub use restart::RestartSetup;
pub use riemann_1d::{DamBreak1d, RareRare1d, ShockShock1d};
pub use tsunami_event_1d::TsunamiEvent1d;
pub use tsunami_event_2d::TsunamiEvent2d;

use crate::constants::TReal;

pub enum Scenario {
    DamBreak1d(DamBreak1d),
    ShockShock1d(ShockShock1d),
    RareRare1d(RareRare1d),
    Subcritical1d(Subcritical1d),
    Supercritical1d(Supercritical1d),
    TsunamiEvent1d(TsunamiEvent1d),
    DamBreak2d(DamBreak2d),
    TsunamiEvent2d(TsunamiEvent2d),
    ArtificialTsunami2d(ArtificialTsunami2d),
    Restart(RestartSetup),
}

impl Scenario {
    pub fn is_restart(&self) -> bool {
        matches!(self, Scenario::Restart(_))
    }

    pub fn is_two_dimensional(&self) -> bool {
        matches!(
            self,
            Scenario::DamBreak2d(_)
                | Scenario::TsunamiEvent2d(_)
                | Scenario::ArtificialTsunami2d(_)
        )
    }

    /// Sample at a cell-centre coordinate. Must not be called on
    /// `Restart`, which samples by index instead (see `height_at`).
    pub fn height(&self, x: TReal, y: TReal) -> TReal {
        match self {
            Scenario::DamBreak1d(s) => s.height(x),
            Scenario::ShockShock1d(s) => s.height(x),
            Scenario::RareRare1d(s) => s.height(x),
            Scenario::Subcritical1d(s) => s.height(x),
            Scenario::Supercritical1d(s) => s.height(x),
            Scenario::TsunamiEvent1d(s) => s.height(x),
            Scenario::DamBreak2d(s) => s.height(x, y),
            Scenario::TsunamiEvent2d(s) => s.height(x, y),
            Scenario::ArtificialTsunami2d(s) => s.height(x, y),
            Scenario::Restart(_) => unreachable!("restart scenarios sample by index"),
        }
    }

    pub fn momentum_x(&self, x: TReal, y: TReal) -> TReal {
        match self {
            Scenario::DamBreak1d(s) => s.momentum_x(x),
            Scenario::ShockShock1d(s) => s.momentum_x(x),
            Scenario::RareRare1d(s) => s.momentum_x(x),
            Scenario::Subcritical1d(s) => s.momentum_x(x),
            Scenario::Supercritical1d(s) => s.momentum_x(x),
            Scenario::TsunamiEvent1d(s) => s.momentum_x(x),
            Scenario::DamBreak2d(s) => s.momentum_x(x, y),
            Scenario::TsunamiEvent2d(s) => s.momentum_x(x, y),
            Scenario::ArtificialTsunami2d(s) => s.momentum_x(x, y),
            Scenario::Restart(_) => unreachable!("restart scenarios sample by index"),
        }
    }

    pub fn momentum_y(&self, x: TReal, y: TReal) -> TReal {
        match self {
            Scenario::DamBreak2d(s) => s.momentum_y(x, y),
            Scenario::TsunamiEvent2d(s) => s.momentum_y(x, y),
            Scenario::ArtificialTsunami2d(s) => s.momentum_y(x, y),
            Scenario::Restart(_) => unreachable!("restart scenarios sample by index"),
            _ => 0.0,
        }
    }

    pub fn bathymetry(&self, x: TReal, y: TReal) -> TReal {
        match self {
            Scenario::DamBreak1d(s) => s.bathymetry(x),
            Scenario::ShockShock1d(s) => s.bathymetry(x),
            Scenario::RareRare1d(s) => s.bathymetry(x),
            Scenario::Subcritical1d(s) => s.bathymetry(x),
            Scenario::Supercritical1d(s) => s.bathymetry(x),
            Scenario::TsunamiEvent1d(s) => s.bathymetry(x),
            Scenario::DamBreak2d(s) => s.bathymetry(x, y),
            Scenario::TsunamiEvent2d(s) => s.bathymetry(x, y),
            Scenario::ArtificialTsunami2d(s) => s.bathymetry(x, y),
            Scenario::Restart(_) => unreachable!("restart scenarios sample by index"),
        }
    }

    /// Index-addressed sampling, used only for `Restart`.
    pub fn height_at(&self, ix: usize, iy: usize) -> TReal {
        match self {
            Scenario::Restart(r) => r.height_at(ix, iy),
            _ => unreachable!("only restart scenarios sample by index"),
        }
    }

    pub fn momentum_x_at(&self, ix: usize, iy: usize) -> TReal {
        match self {
            Scenario::Restart(r) => r.momentum_x_at(ix, iy),
            _ => unreachable!("only restart scenarios sample by index"),
        }
    }

    pub fn momentum_y_at(&self, ix: usize, iy: usize) -> TReal {
        match self {
            Scenario::Restart(r) => r.momentum_y_at(ix, iy),
            _ => unreachable!("only restart scenarios sample by index"),
        }
    }

    pub fn bathymetry_at(&self, ix: usize, iy: usize) -> TReal {
        match self {
            Scenario::Restart(r) => r.bathymetry_at(ix, iy),
            _ => unreachable!("only restart scenarios sample by index"),
        }
    }
}
