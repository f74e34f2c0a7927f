/// ==============================================================================================
/// ==================================== Checkpoint Store ===========================================
/// ==============================================================================================
///
/// C9: save and restore the full simulation state. A hand-rolled
/// length-prefixed binary record over `std::io`, matching the teacher's
/// preference for manual `std::fs`/`std::io::Write` persistence rather
/// than a serialization-framework dependency for one fixed record shape
/// (see `time_series.rs::save`). No rolling retention: `save` always
/// overwrites `checkpoints/state.bin`.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::constants::{TIdx, TReal};
use crate::error::{Result, SolverError};
use crate::patches::boundary::{Boundary, BoundaryBox};

const MAGIC: u32 = 0x5453554e; // "TSUN" little-endian

pub struct CheckpointRecord {
    pub nx: TIdx,
    pub ny: TIdx,
    pub dxy: TReal,
    pub x_offset: TReal,
    pub y_offset: TReal,
    pub end_time: TReal,
    pub current_time: TReal,
    pub step_index: u64,
    pub next_snapshot_index: u64,
    pub h_max: TReal,
    pub snapshot_period: u64,
    pub resolution_stride: TIdx,
    pub boundary: BoundaryBox,
    pub output_filename: String,
    pub h: Vec<TReal>,
    pub hu: Vec<TReal>,
    pub hv: Vec<TReal>,
    pub b: Vec<TReal>,
}

fn write_u32<W: Write>(w: &mut W, v: u32) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}
fn write_u64<W: Write>(w: &mut W, v: u64) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}
fn write_f32<W: Write>(w: &mut W, v: f32) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}
fn write_string<W: Write>(w: &mut W, s: &str) -> io::Result<()> {
    write_u32(w, s.len() as u32)?;
    w.write_all(s.as_bytes())
}
fn write_field<W: Write>(w: &mut W, field: &[TReal]) -> io::Result<()> {
    write_u64(w, field.len() as u64)?;
    for &v in field {
        write_f32(w, v)?;
    }
    Ok(())
}
fn write_boundary<W: Write>(w: &mut W, b: Boundary) -> io::Result<()> {
    write_u32(w, if b == Boundary::Closed { 1 } else { 0 })
}

fn read_u32<R: Read>(r: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}
fn read_u64<R: Read>(r: &mut R) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}
fn read_f32<R: Read>(r: &mut R) -> io::Result<f32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}
fn read_string<R: Read>(r: &mut R) -> io::Result<String> {
    let len = read_u32(r)? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
fn read_field<R: Read>(r: &mut R) -> io::Result<Vec<TReal>> {
    let len = read_u64(r)? as usize;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        out.push(read_f32(r)?);
    }
    Ok(out)
}
fn read_boundary<R: Read>(r: &mut R) -> Result<Boundary> {
    let tag = read_u32(r)?;
    match tag {
        0 => Ok(Boundary::Open),
        1 => Ok(Boundary::Closed),
        other => Err(SolverError::CheckpointCorrupt(format!(
            "unknown boundary tag {other}"
        ))),
    }
}

impl CheckpointRecord {
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = io::BufWriter::new(fs::File::create(path)?);

        write_u32(&mut out, MAGIC)?;
        write_u64(&mut out, self.nx as u64)?;
        write_u64(&mut out, self.ny as u64)?;
        write_f32(&mut out, self.dxy)?;
        write_f32(&mut out, self.x_offset)?;
        write_f32(&mut out, self.y_offset)?;
        write_f32(&mut out, self.end_time)?;
        write_f32(&mut out, self.current_time)?;
        write_u64(&mut out, self.step_index)?;
        write_u64(&mut out, self.next_snapshot_index)?;
        write_f32(&mut out, self.h_max)?;
        write_u64(&mut out, self.snapshot_period)?;
        write_u64(&mut out, self.resolution_stride as u64)?;
        write_boundary(&mut out, self.boundary.left)?;
        write_boundary(&mut out, self.boundary.right)?;
        write_boundary(&mut out, self.boundary.top)?;
        write_boundary(&mut out, self.boundary.bottom)?;
        write_string(&mut out, &self.output_filename)?;
        write_field(&mut out, &self.h)?;
        write_field(&mut out, &self.hu)?;
        write_field(&mut out, &self.hv)?;
        write_field(&mut out, &self.b)?;

        out.flush()?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let mut input = io::BufReader::new(fs::File::open(path)?);

        let magic = read_u32(&mut input)?;
        if magic != MAGIC {
            return Err(SolverError::CheckpointCorrupt(
                "bad magic number".to_string(),
            ));
        }

        let nx = read_u64(&mut input)? as TIdx;
        let ny = read_u64(&mut input)? as TIdx;
        let dxy = read_f32(&mut input)?;
        let x_offset = read_f32(&mut input)?;
        let y_offset = read_f32(&mut input)?;
        let end_time = read_f32(&mut input)?;
        let current_time = read_f32(&mut input)?;
        let step_index = read_u64(&mut input)?;
        let next_snapshot_index = read_u64(&mut input)?;
        let h_max = read_f32(&mut input)?;
        let snapshot_period = read_u64(&mut input)?;
        let resolution_stride = read_u64(&mut input)? as TIdx;
        let boundary = BoundaryBox {
            left: read_boundary(&mut input)?,
            right: read_boundary(&mut input)?,
            top: read_boundary(&mut input)?,
            bottom: read_boundary(&mut input)?,
        };
        let output_filename = read_string(&mut input)?;
        let h = read_field(&mut input)?;
        let hu = read_field(&mut input)?;
        let hv = read_field(&mut input)?;
        let b = read_field(&mut input)?;

        if h.len() != nx * ny || hu.len() != nx * ny || hv.len() != nx * ny || b.len() != nx * ny {
            return Err(SolverError::CheckpointCorrupt(
                "field length does not match nx*ny".to_string(),
            ));
        }

        Ok(Self {
            nx,
            ny,
            dxy,
            x_offset,
            y_offset,
            end_time,
            current_time,
            step_index,
            next_snapshot_index,
            h_max,
            snapshot_period,
            resolution_stride,
            boundary,
            output_filename,
            h,
            hu,
            hv,
            b,
        })
    }
}

/// `true` if a non-empty `checkpoints/` directory exists — the restart
/// trigger `main.cpp` uses (`exists("checkpoints") &&
/// !is_empty("checkpoints")`).
pub fn restart_available(checkpoints_dir: &Path) -> bool {
    match fs::read_dir(checkpoints_dir) {
        Ok(mut entries) => entries.next().is_some(),
        Err(_) => false,
    }
}

pub fn clear_checkpoints(checkpoints_dir: &Path) -> Result<()> {
    if checkpoints_dir.exists() {
        fs::remove_dir_all(checkpoints_dir)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.bin");

        let record = CheckpointRecord {
            nx: 2,
            ny: 2,
            dxy: 1.0,
            x_offset: 0.0,
            y_offset: 0.0,
            end_time: 10.0,
            current_time: 3.5,
            step_index: 42,
            next_snapshot_index: 5,
            h_max: 9.0,
            snapshot_period: 25,
            resolution_stride: 1,
            boundary: BoundaryBox::all(Boundary::Closed),
            output_filename: "netCDF_dump/test.nc".to_string(),
            h: vec![1.0, 2.0, 3.0, 4.0],
            hu: vec![0.1, 0.2, 0.3, 0.4],
            hv: vec![0.0; 4],
            b: vec![-1.0; 4],
        };

        record.save(&path).unwrap();
        let restored = CheckpointRecord::load(&path).unwrap();

        assert_eq!(restored.nx, 2);
        assert_eq!(restored.step_index, 42);
        assert_eq!(restored.h, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(restored.output_filename, "netCDF_dump/test.nc");
        assert_eq!(restored.boundary.left, Boundary::Closed);
    }

    #[test]
    fn rejects_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.bin");
        fs::write(&path, [0u8; 3]).unwrap();
        assert!(CheckpointRecord::load(&path).is_err());
    }
}
