/// ==============================================================================================
/// ==================================== Tsunami Event (2D) =========================================
/// ==============================================================================================
///
/// Real-tsunami bathymetry plus a displacement grid, read via
/// `io::grid::read_grid`. Mirrors `main.cpp`'s `TsunamiEvent2d(bat_path,
/// dis_path, &l_width, &l_height, &l_x_offset, &l_y_offset)` constructor:
/// domain width/height/offsets are derived from the loaded bathymetry
/// grid's extent rather than passed in.

use crate::io::grid::GridData;
use crate::constants::TReal;

pub struct TsunamiEvent2d {
    bathymetry: GridData,
    displacement: GridData,
}

pub struct TsunamiEvent2dExtent {
    pub width: TReal,
    pub height: TReal,
    pub x_offset: TReal,
    pub y_offset: TReal,
}

impl TsunamiEvent2d {
    pub fn new(bathymetry: GridData, displacement: GridData) -> (Self, TsunamiEvent2dExtent) {
        let width = bathymetry.nx as TReal * bathymetry.dx;
        let height = bathymetry.ny as TReal * bathymetry.dx;
        let extent = TsunamiEvent2dExtent {
            width,
            height,
            x_offset: -bathymetry.x0,
            y_offset: -bathymetry.y0,
        };
        (
            Self {
                bathymetry,
                displacement,
            },
            extent,
        )
    }

    pub fn height(&self, x: TReal, y: TReal) -> TReal {
        let b = self.bathymetry.sample(x, y);
        let d = self.displacement.sample(x, y);
        if b < 0.0 { -b + d } else { 0.0 }
    }

    pub fn momentum_x(&self, _x: TReal, _y: TReal) -> TReal {
        0.0
    }

    pub fn momentum_y(&self, _x: TReal, _y: TReal) -> TReal {
        0.0
    }

    pub fn bathymetry(&self, x: TReal, y: TReal) -> TReal {
        self.bathymetry.sample(x, y)
    }
}
