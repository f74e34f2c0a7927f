/// ==============================================================================================
/// =================================== 1D Riemann-pair Setups ======================================
/// ==============================================================================================
///
/// Three setups sharing a split-at-`x=0` shape, grounded in `main.cpp`'s
/// `-s "dambreak1d h_l h_r"` / `"shockshock1d h hu"` / `"rarerare1d h hu"`
/// argument handling.

use crate::constants::TReal;

/// `h = h_l` for `x < 0`, `h_r` otherwise; flat bathymetry, zero momentum.
pub struct DamBreak1d {
    h_l: TReal,
    h_r: TReal,
    bathymetry: TReal,
}

impl DamBreak1d {
    pub fn new(h_l: TReal, h_r: TReal, bathymetry: TReal) -> Self {
        Self { h_l, h_r, bathymetry }
    }

    pub fn height(&self, x: TReal) -> TReal {
        if x < 0.0 { self.h_l } else { self.h_r }
    }

    pub fn momentum_x(&self, _x: TReal) -> TReal {
        0.0
    }

    pub fn bathymetry(&self, _x: TReal) -> TReal {
        self.bathymetry
    }
}

/// Uniform height, momentum pointing inward from both sides (`+hu` for
/// `x < 0`, `-hu` for `x >= 0`) — two shocks collide at the origin.
pub struct ShockShock1d {
    h: TReal,
    hu: TReal,
    bathymetry: TReal,
}

impl ShockShock1d {
    pub fn new(h: TReal, hu: TReal, bathymetry: TReal) -> Self {
        Self { h, hu, bathymetry }
    }

    pub fn height(&self, _x: TReal) -> TReal {
        self.h
    }

    pub fn momentum_x(&self, x: TReal) -> TReal {
        if x < 0.0 { self.hu } else { -self.hu }
    }

    pub fn bathymetry(&self, _x: TReal) -> TReal {
        self.bathymetry
    }
}

/// Uniform height, momentum pointing outward from the origin (`-hu` for
/// `x < 0`, `+hu` for `x >= 0`) — a rarefaction fan opens at the origin.
pub struct RareRare1d {
    h: TReal,
    hu: TReal,
    bathymetry: TReal,
}

impl RareRare1d {
    pub fn new(h: TReal, hu: TReal, bathymetry: TReal) -> Self {
        Self { h, hu, bathymetry }
    }

    pub fn height(&self, _x: TReal) -> TReal {
        self.h
    }

    pub fn momentum_x(&self, x: TReal) -> TReal {
        if x < 0.0 { -self.hu } else { self.hu }
    }

    pub fn bathymetry(&self, _x: TReal) -> TReal {
        self.bathymetry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dam_break_splits_at_origin() {
        let s = DamBreak1d::new(10.0, 5.0, 0.0);
        assert_eq!(s.height(-0.1), 10.0);
        assert_eq!(s.height(0.1), 5.0);
    }

    #[test]
    fn shock_shock_points_inward() {
        let s = ShockShock1d::new(2.0, 1.5, 0.0);
        assert_eq!(s.momentum_x(-1.0), 1.5);
        assert_eq!(s.momentum_x(1.0), -1.5);
    }

    #[test]
    fn rare_rare_points_outward() {
        let s = RareRare1d::new(2.0, 1.5, 0.0);
        assert_eq!(s.momentum_x(-1.0), -1.5);
        assert_eq!(s.momentum_x(1.0), 1.5);
    }
}
