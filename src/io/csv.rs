/// ==============================================================================================
/// ======================================== CSV Sink ================================================
/// ==============================================================================================
///
/// Text-row snapshot sink (C7, 1D and debug 2D) and the 1D bathymetry
/// reader used by `TsunamiEvent1d`. Grounded on `Csv.cpp`: header/row
/// construction with per-field presence checks, and a reader that skips
/// three columns before parsing the fourth as depth. The original
/// hard-codes the `-50` offset in the row formula; this generalises it
/// to a configurable `x_offset`/`y_offset` (passing `x_offset = 50`
/// reproduces the original rows exactly).

use std::io::{self, Write};

use crate::constants::{TIdx, TReal};

/// Strip the one-cell ghost border from a `(nx+2)*(ny+2)` row-major
/// buffer, producing a compact `nx*ny` array. Sink-side per spec.md
/// §4.6 ("the patch is not responsible for this transformation").
pub fn remove_ghost_cells(field: &[TReal], nx: TIdx, ny: TIdx, stride: TIdx) -> Vec<TReal> {
    let mut out = Vec::with_capacity(nx * ny);
    for iy in 1..=ny {
        let row_start = iy * stride + 1;
        out.extend_from_slice(&field[row_start..row_start + nx]);
    }
    out
}

/// Write one CSV snapshot. Ghosted (full `(nx+2)*(ny+2)`) field slices
/// are expected; the header and each row omit a field that is `None`.
#[allow(clippy::too_many_arguments)]
pub fn write<W: Write>(
    out: &mut W,
    dxy: TReal,
    nx: TIdx,
    ny: TIdx,
    x_offset: TReal,
    y_offset: TReal,
    stride: TIdx,
    h: Option<&[TReal]>,
    hu: Option<&[TReal]>,
    hv: Option<&[TReal]>,
    b: Option<&[TReal]>,
) -> io::Result<()> {
    write!(out, "x,y")?;
    if h.is_some() {
        write!(out, ",height")?;
    }
    if hu.is_some() {
        write!(out, ",momentum_x")?;
    }
    if hv.is_some() {
        write!(out, ",momentum_y")?;
    }
    if b.is_some() {
        write!(out, ",bathymetry")?;
    }
    writeln!(out)?;

    for iy in 1..=ny {
        let pos_y = (iy as TReal - 0.5) * dxy - y_offset;
        for ix in 1..=nx {
            let pos_x = (ix as TReal - 0.5) * dxy - x_offset;
            let id = iy * stride + ix;

            write!(out, "{pos_x},{pos_y}")?;
            if let Some(field) = h {
                write!(out, ",{}", field[id])?;
            }
            if let Some(field) = hu {
                write!(out, ",{}", field[id])?;
            }
            if let Some(field) = hv {
                write!(out, ",{}", field[id])?;
            }
            if let Some(field) = b {
                write!(out, ",{}", field[id])?;
            }
            writeln!(out)?;
        }
    }

    out.flush()
}

/// Read a 1D bathymetry CSV: skip the first three columns of every row,
/// parse the fourth as the depth value.
pub fn read_depths(path: &std::path::Path) -> crate::error::Result<Vec<TReal>> {
    let contents = std::fs::read_to_string(path)?;
    let mut depths = Vec::new();

    for line in contents.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let mut columns = line.split(',');
        columns.next();
        columns.next();
        columns.next();
        if let Some(fourth) = columns.next() {
            if let Ok(depth) = fourth.trim().parse::<TReal>() {
                depths.push(depth);
            }
        }
    }

    Ok(depths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_matches_pinned_shape() {
        let dxy = 0.5;
        let nx = 5;
        let ny = 1;
        let stride = nx + 2;

        let mut h = vec![0.0; stride * (ny + 2)];
        let mut hu = vec![0.0; stride * (ny + 2)];
        let mut b = vec![0.0; stride * (ny + 2)];

        let h_vals = [1.0, 2.0, 3.0, 4.0, 5.0];
        let hu_vals = [5.0, 4.0, 3.0, 2.0, 1.0];
        let b_vals = [2.0, 3.0, 4.0, 3.0, 2.0];
        for ix in 0..nx {
            let id = 1 * stride + ix + 1;
            h[id] = h_vals[ix];
            hu[id] = hu_vals[ix];
            b[id] = b_vals[ix];
        }

        let mut out = Vec::new();
        write(
            &mut out,
            dxy,
            nx,
            ny,
            0.0,
            0.0,
            stride,
            Some(&h),
            Some(&hu),
            None,
            Some(&b),
        )
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "x,y,height,momentum_x,bathymetry");
        assert_eq!(lines.next().unwrap(), "0.25,0.25,1,5,2");
        assert_eq!(lines.next().unwrap(), "0.75,0.25,2,4,3");
        assert_eq!(lines.next().unwrap(), "1.25,0.25,3,3,4");
        assert_eq!(lines.next().unwrap(), "1.75,0.25,4,2,3");
        assert_eq!(lines.next().unwrap(), "2.25,0.25,5,1,2");
        assert!(lines.next().is_none());
    }

    #[test]
    fn reader_extracts_fourth_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("real.csv");
        std::fs::write(
            &path,
            "0,0,0,-8.39972685779\n1,0,250,-100.0\n2,0,500,-5533.77099898\n",
        )
        .unwrap();

        let depths = read_depths(&path).unwrap();
        assert_eq!(depths.len(), 3);
        assert!((depths[0] - (-8.39972685779)).abs() < 1e-3);
        assert!((depths[depths.len() - 1] - (-5533.77099898)).abs() < 1e-1);
    }

    #[test]
    fn remove_ghost_cells_strips_one_cell_border() {
        let nx = 2;
        let ny = 2;
        let stride = nx + 2;
        let field: Vec<TReal> = (0..stride * (ny + 2)).map(|i| i as TReal).collect();
        let stripped = remove_ghost_cells(&field, nx, ny, stride);
        assert_eq!(stripped.len(), nx * ny);
        assert_eq!(stripped[0], field[stride + 1]);
    }
}
