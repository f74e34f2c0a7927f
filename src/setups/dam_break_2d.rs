/// ==============================================================================================
/// ===================================== Dam Break (2D) ============================================
/// ==============================================================================================
///
/// Circular dam break: `h = h_inner` within radius `r` of the domain
/// centre, `h_outer` elsewhere, flat bathymetry, zero initial momentum.
/// Selected by `-s dambreak2d` (`l_width = 100`, `l_endTime = 15`,
/// offsets zero, per `main.cpp`).

use crate::constants::TReal;

pub struct DamBreak2d {
    center_x: TReal,
    center_y: TReal,
    radius: TReal,
    h_inner: TReal,
    h_outer: TReal,
}

impl DamBreak2d {
    pub fn new(center_x: TReal, center_y: TReal, radius: TReal) -> Self {
        Self {
            center_x,
            center_y,
            radius,
            h_inner: 10.0,
            h_outer: 5.0,
        }
    }

    pub fn height(&self, x: TReal, y: TReal) -> TReal {
        let dx = x - self.center_x;
        let dy = y - self.center_y;
        if dx * dx + dy * dy <= self.radius * self.radius {
            self.h_inner
        } else {
            self.h_outer
        }
    }

    pub fn momentum_x(&self, _x: TReal, _y: TReal) -> TReal {
        0.0
    }

    pub fn momentum_y(&self, _x: TReal, _y: TReal) -> TReal {
        0.0
    }

    pub fn bathymetry(&self, _x: TReal, _y: TReal) -> TReal {
        0.0
    }
}

impl Default for DamBreak2d {
    fn default() -> Self {
        Self::new(50.0, 50.0, 25.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn height_switches_at_radius() {
        let s = DamBreak2d::new(0.0, 0.0, 10.0);
        assert_eq!(s.height(0.0, 0.0), 10.0);
        assert_eq!(s.height(20.0, 0.0), 5.0);
    }
}
