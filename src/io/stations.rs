/// ==============================================================================================
/// ====================================== Station Sampler ===========================================
/// ==============================================================================================
///
/// C8: point-wise probes at a cadence of simulated seconds. Parsed from
/// a JSON station list (`serde_json`, matching the teacher's
/// `serde`-based persistence elsewhere), one output stream per station.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::constants::{TIdx, TReal};
use crate::error::Result;

#[derive(Deserialize)]
struct StationDef {
    name: String,
    x: TReal,
    y: TReal,
}

#[derive(Deserialize)]
struct StationList {
    output_frequency: TReal,
    stations: Vec<StationDef>,
}

struct Station {
    name: String,
    x: TReal,
    y: TReal,
    file: File,
}

pub struct StationSampler {
    output_frequency: TReal,
    stations: Vec<Station>,
    next_tick: TReal,
}

impl StationSampler {
    pub fn load(path: &Path, output_dir: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let parsed: StationList = serde_json::from_str(&contents)
            .map_err(|e| crate::error::SolverError::InvalidArguments(format!(
                "malformed station list {}: {e}",
                path.display()
            )))?;

        fs::create_dir_all(output_dir)?;

        let mut stations = Vec::with_capacity(parsed.stations.len());
        for def in parsed.stations {
            let station_path: PathBuf = output_dir.join(format!("{}.csv", def.name));
            let mut file = File::create(&station_path)?;
            writeln!(file, "time,h,hu,hv,b")?;
            stations.push(Station {
                name: def.name,
                x: def.x,
                y: def.y,
                file,
            });
        }

        Ok(Self {
            output_frequency: parsed.output_frequency,
            stations,
            next_tick: 0.0,
        })
    }

    /// `true` once `sim_time` has crossed the next sampling tick; the
    /// caller then invokes `sample`, which advances the tick by
    /// `output_frequency`.
    pub fn is_due(&self, sim_time: TReal) -> bool {
        sim_time >= self.next_tick
    }

    pub fn sample(
        &mut self,
        sim_time: TReal,
        dxy: TReal,
        nx: TIdx,
        ny: TIdx,
        x_offset: TReal,
        y_offset: TReal,
        stride: TIdx,
        h: &[TReal],
        hu: &[TReal],
        hv: &[TReal],
        b: &[TReal],
    ) -> Result<()> {
        for station in &mut self.stations {
            let ix = (((station.x + x_offset) / dxy).floor() as isize)
                .clamp(0, nx as isize - 1) as TIdx
                + 1;
            let iy = (((station.y + y_offset) / dxy).floor() as isize)
                .clamp(0, ny as isize - 1) as TIdx
                + 1;
            let id = iy * stride + ix;

            writeln!(
                station.file,
                "{},{},{},{},{}",
                sim_time, h[id], hu[id], hv[id], b[id]
            )?;
        }

        self.next_tick += self.output_frequency;
        Ok(())
    }
}
