/// ==============================================================================================
/// ==================================== Tsunami Event (1D) =========================================
/// ==============================================================================================
///
/// Reads a real-bathymetry depth profile via `io::csv::read_depths` (the
/// CSV's fourth column, per `Csv.cpp`'s reader) and exposes it as a
/// piecewise-constant bathymetry sampled at `250`-metre cell size — the
/// same `l_width = 250 * m_b_in.size()` convention `main.cpp` uses when
/// constructing `TsunamiEvent1d`.

use crate::constants::TReal;

const CELL_SIZE: TReal = 250.0;

pub struct TsunamiEvent1d {
    depths: Vec<TReal>,
}

impl TsunamiEvent1d {
    pub fn new(depths: Vec<TReal>) -> Self {
        Self { depths }
    }

    fn index_for(&self, x: TReal) -> usize {
        let ix = (x / CELL_SIZE).floor() as isize;
        ix.clamp(0, self.depths.len() as isize - 1) as usize
    }

    pub fn height(&self, x: TReal) -> TReal {
        let b = self.bathymetry(x);
        if b < 0.0 { -b } else { 0.0 }
    }

    pub fn momentum_x(&self, _x: TReal) -> TReal {
        0.0
    }

    pub fn bathymetry(&self, x: TReal) -> TReal {
        if self.depths.is_empty() {
            return 0.0;
        }
        self.depths[self.index_for(x)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn height_is_depth_below_sea_level_and_zero_on_land() {
        let s = TsunamiEvent1d::new(vec![-10.0, 5.0]);
        assert_eq!(s.height(0.0), 10.0);
        assert_eq!(s.height(260.0), 0.0);
    }
}
