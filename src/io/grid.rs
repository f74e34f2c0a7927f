/// ==============================================================================================
/// ===================================== Binary Grid Sink ==========================================
/// ==============================================================================================
///
/// Binary grid snapshot sink (C7, 2D production) implemented against
/// the `netcdf` crate, the real Rust binding matching the indexed grid
/// format `main.cpp` opens via `io/netCDF/NetCDF`. `bathymetry` is
/// written once as a fixed variable at creation; every snapshot appends
/// a `time` slice of `height`/`momentum_x`/`momentum_y`, coarsened by
/// `resolution_stride`. The same reader path is reused by
/// `TsunamiEvent2d` to ingest bathymetry/displacement grid files.

use std::path::Path;

use crate::constants::{TIdx, TReal};
use crate::error::{Result, SolverError};

fn map_err(context: &str) -> impl Fn(netcdf::Error) -> SolverError + '_ {
    move |e| SolverError::Io(std::io::Error::other(format!("{context}: {e}")))
}

pub struct GridSink {
    file: netcdf::FileMut,
    nx_out: TIdx,
    ny_out: TIdx,
    next_slice: usize,
}

impl GridSink {
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        path: &Path,
        dxy: TReal,
        nx: TIdx,
        ny: TIdx,
        resolution_stride: TIdx,
        x_offset: TReal,
        y_offset: TReal,
        bathymetry: &[TReal],
    ) -> Result<Self> {
        let nx_out = nx.div_ceil(resolution_stride);
        let ny_out = ny.div_ceil(resolution_stride);

        let mut file = netcdf::create(path).map_err(map_err("creating grid file"))?;
        file.add_unlimited_dimension("time")
            .map_err(map_err("adding time dimension"))?;
        file.add_dimension("x", nx_out)
            .map_err(map_err("adding x dimension"))?;
        file.add_dimension("y", ny_out)
            .map_err(map_err("adding y dimension"))?;

        let xs: Vec<f32> = (0..nx_out)
            .map(|i| (i * resolution_stride) as TReal * dxy - x_offset)
            .collect();
        let ys: Vec<f32> = (0..ny_out)
            .map(|i| (i * resolution_stride) as TReal * dxy - y_offset)
            .collect();

        let mut x_var = file
            .add_variable::<f32>("x", &["x"])
            .map_err(map_err("adding x variable"))?;
        x_var.put_values(&xs, ..).map_err(map_err("writing x"))?;

        let mut y_var = file
            .add_variable::<f32>("y", &["y"])
            .map_err(map_err("adding y variable"))?;
        y_var.put_values(&ys, ..).map_err(map_err("writing y"))?;

        let mut b_var = file
            .add_variable::<f32>("bathymetry", &["y", "x"])
            .map_err(map_err("adding bathymetry variable"))?;
        let coarse_b = coarsen(bathymetry, nx, ny, resolution_stride);
        b_var
            .put_values(&coarse_b, ..)
            .map_err(map_err("writing bathymetry"))?;

        file.add_variable::<f32>("height", &["time", "y", "x"])
            .map_err(map_err("adding height variable"))?;
        file.add_variable::<f32>("momentum_x", &["time", "y", "x"])
            .map_err(map_err("adding momentum_x variable"))?;
        file.add_variable::<f32>("momentum_y", &["time", "y", "x"])
            .map_err(map_err("adding momentum_y variable"))?;
        file.add_variable::<f32>("sim_time", &["time"])
            .map_err(map_err("adding sim_time variable"))?;

        Ok(Self {
            file,
            nx_out,
            ny_out,
            next_slice: 0,
        })
    }

    /// Reopen an existing grid file for append, as the driver does after
    /// restoring from a checkpoint. `next_slice` is the first slice index
    /// to write to, recovered from the checkpoint record.
    pub fn open_existing(path: &Path, next_slice: u64) -> Result<Self> {
        let file = netcdf::append(path).map_err(map_err("reopening grid file"))?;
        let nx_out = file
            .dimension("x")
            .ok_or_else(|| SolverError::Io(std::io::Error::other("grid file missing x dimension")))?
            .len();
        let ny_out = file
            .dimension("y")
            .ok_or_else(|| SolverError::Io(std::io::Error::other("grid file missing y dimension")))?
            .len();
        Ok(Self {
            file,
            nx_out,
            ny_out,
            next_slice: next_slice as usize,
        })
    }

    /// Append one time slice. `h`/`hu`/`hv` are ghost-stripped `nx*ny`
    /// buffers at full resolution; coarsening to `resolution_stride`
    /// happens here.
    pub fn write(
        &mut self,
        nx: TIdx,
        ny: TIdx,
        resolution_stride: TIdx,
        h: &[TReal],
        hu: &[TReal],
        hv: &[TReal],
        sim_time: TReal,
    ) -> Result<()> {
        let t = self.next_slice;
        let coarse_h = coarsen(h, nx, ny, resolution_stride);
        let coarse_hu = coarsen(hu, nx, ny, resolution_stride);
        let coarse_hv = coarsen(hv, nx, ny, resolution_stride);

        let extents = t..t + 1;

        self.file
            .variable_mut("sim_time")
            .ok_or_else(|| SolverError::Io(std::io::Error::other("missing sim_time variable")))?
            .put_values(&[sim_time], extents.clone())
            .map_err(map_err("writing sim_time"))?;

        self.file
            .variable_mut("height")
            .ok_or_else(|| SolverError::Io(std::io::Error::other("missing height variable")))?
            .put_values(&coarse_h, (extents.clone(), .., ..))
            .map_err(map_err("writing height"))?;

        self.file
            .variable_mut("momentum_x")
            .ok_or_else(|| SolverError::Io(std::io::Error::other("missing momentum_x variable")))?
            .put_values(&coarse_hu, (extents.clone(), .., ..))
            .map_err(map_err("writing momentum_x"))?;

        self.file
            .variable_mut("momentum_y")
            .ok_or_else(|| SolverError::Io(std::io::Error::other("missing momentum_y variable")))?
            .put_values(&coarse_hv, (extents, .., ..))
            .map_err(map_err("writing momentum_y"))?;

        self.next_slice += 1;
        let _ = (self.nx_out, self.ny_out);
        Ok(())
    }
}

fn coarsen(field: &[TReal], nx: TIdx, ny: TIdx, stride: TIdx) -> Vec<TReal> {
    let nx_out = nx.div_ceil(stride);
    let ny_out = ny.div_ceil(stride);
    let mut out = Vec::with_capacity(nx_out * ny_out);
    for oy in 0..ny_out {
        for ox in 0..nx_out {
            out.push(field[(oy * stride) * nx + ox * stride]);
        }
    }
    out
}

/// Loaded 2D grid: row-major `z` values over an `nx * ny` axis pair.
pub struct GridData {
    pub nx: TIdx,
    pub ny: TIdx,
    pub dx: TReal,
    pub x0: TReal,
    pub y0: TReal,
    pub z: Vec<TReal>,
}

impl GridData {
    pub fn sample(&self, x: TReal, y: TReal) -> TReal {
        if self.z.is_empty() {
            return 0.0;
        }
        let ix = (((x - self.x0) / self.dx).floor() as isize).clamp(0, self.nx as isize - 1) as usize;
        let iy = (((y - self.y0) / self.dx).floor() as isize).clamp(0, self.ny as isize - 1) as usize;
        self.z[iy * self.nx + ix]
    }
}

/// Read a bathymetry/displacement grid file (`x`, `y`, `z` variables),
/// as produced by the real-tsunami data preparation tooling referenced
/// in `main.cpp`'s `bat_path`/`dis_path` defaults.
pub fn read_grid(path: &Path) -> Result<GridData> {
    let file = netcdf::open(path).map_err(map_err("opening grid file"))?;

    let x_var = file
        .variable("x")
        .ok_or_else(|| SolverError::Io(std::io::Error::other("grid file missing x variable")))?;
    let xs: Vec<f32> = x_var
        .get_values(..)
        .map_err(map_err("reading x"))?;

    let y_var = file
        .variable("y")
        .ok_or_else(|| SolverError::Io(std::io::Error::other("grid file missing y variable")))?;
    let ys: Vec<f32> = y_var
        .get_values(..)
        .map_err(map_err("reading y"))?;

    let z_var = file
        .variable("z")
        .ok_or_else(|| SolverError::Io(std::io::Error::other("grid file missing z variable")))?;
    let z: Vec<f32> = z_var
        .get_values(..)
        .map_err(map_err("reading z"))?;

    let nx = xs.len();
    let ny = ys.len();
    let dx = if nx > 1 { xs[1] - xs[0] } else { 1.0 };

    Ok(GridData {
        nx,
        ny,
        dx,
        x0: xs.first().copied().unwrap_or(0.0),
        y0: ys.first().copied().unwrap_or(0.0),
        z,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coarsen_takes_every_kth_cell() {
        let nx = 4;
        let ny = 1;
        let field: Vec<TReal> = (0..nx * ny).map(|i| i as TReal).collect();
        let out = coarsen(&field, nx, ny, 2);
        assert_eq!(out, vec![0.0, 2.0]);
    }
}
