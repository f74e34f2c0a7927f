/// ==============================================================================================
/// ========================================== CLI ===================================================
/// ==============================================================================================
///
/// C10: hand-rolled argv parsing for the flag grammar `main.cpp` accepts
/// via `getopt`. No `clap`/`argh` dependency — the grammar is small and
/// irregular (a quoted multi-token `-s` value, a trailing positional),
/// and the teacher repo parses its own CLI surface by hand.

use crate::error::{Result, SolverError};
use crate::patches::boundary::Boundary;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dimension {
    OneD,
    TwoD,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Device {
    Cpu,
    Accelerator,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    Serial,
    Parallel,
}

pub struct Config {
    pub dimension: Dimension,
    pub scenario_name: String,
    pub scenario_args: Vec<String>,
    pub boundary_left: Boundary,
    pub boundary_right: Boundary,
    pub boundary_top: Boundary,
    pub boundary_bottom: Boundary,
    pub station_path: Option<String>,
    pub resolution_stride: usize,
    pub device: Device,
    pub write_mode: WriteMode,
    pub n_cells_x: usize,
}

impl Config {
    pub fn parse(args: &[String]) -> Result<Self> {
        if args.is_empty() || args.last().map(|a| a.starts_with('-')).unwrap_or(true) {
            return Err(SolverError::InvalidArguments(
                "usage: tsunami [-d 1d|2d] [-s \"<scenario> [args...]\"] [-l STATE] [-r STATE] \
                 [-t STATE] [-b STATE] [-i STATIONS] [-k STRIDE] [-o 0|1] [-w 0|1] N_CELLS_X"
                    .to_string(),
            ));
        }

        let n_cells_x: usize = args[args.len() - 1]
            .parse()
            .map_err(|_| SolverError::InvalidArguments("invalid number of cells".to_string()))?;
        if n_cells_x < 1 {
            return Err(SolverError::InvalidArguments(
                "invalid number of cells".to_string(),
            ));
        }

        let mut dimension = None;
        let mut scenario_name = "dambreak2d".to_string();
        let mut scenario_args = Vec::new();
        let mut boundary_left = Boundary::Open;
        let mut boundary_right = Boundary::Open;
        let mut boundary_top = Boundary::Open;
        let mut boundary_bottom = Boundary::Open;
        let mut station_path = None;
        let mut resolution_stride = 1usize;
        let mut device = Device::Cpu;
        let mut write_mode = WriteMode::Parallel;

        let flags = &args[..args.len() - 1];
        let mut i = 0;
        while i < flags.len() {
            let flag = &flags[i];
            let value = flags.get(i + 1).ok_or_else(|| {
                SolverError::InvalidArguments(format!("flag {flag} is missing a value"))
            })?;

            match flag.as_str() {
                "-d" => {
                    dimension = Some(match value.as_str() {
                        "1d" => Dimension::OneD,
                        "2d" => Dimension::TwoD,
                        other => {
                            return Err(SolverError::InvalidArguments(format!(
                                "undefined dimension '{other}', expected '1d' or '2d'"
                            )));
                        }
                    });
                }
                "-s" => {
                    let mut tokens = value.split(' ').filter(|t| !t.is_empty());
                    scenario_name = tokens
                        .next()
                        .ok_or_else(|| {
                            SolverError::InvalidScenario("empty scenario spec".to_string())
                        })?
                        .to_string();
                    scenario_args = tokens.map(str::to_string).collect();
                }
                "-l" => boundary_left = Boundary::parse(value)?,
                "-r" => boundary_right = Boundary::parse(value)?,
                "-t" => boundary_top = Boundary::parse(value)?,
                "-b" => boundary_bottom = Boundary::parse(value)?,
                "-i" => station_path = Some(value.clone()),
                "-k" => {
                    resolution_stride = value.parse().map_err(|_| {
                        SolverError::InvalidArguments("invalid resolution stride".to_string())
                    })?;
                    if resolution_stride < 1 {
                        return Err(SolverError::InvalidArguments(
                            "resolution stride must be at least 1".to_string(),
                        ));
                    }
                }
                "-o" => {
                    device = match value.as_str() {
                        "0" => Device::Cpu,
                        "1" => Device::Accelerator,
                        other => {
                            return Err(SolverError::InvalidArguments(format!(
                                "undefined device flag '{other}', expected '0' or '1'"
                            )));
                        }
                    };
                }
                "-w" => {
                    write_mode = match value.as_str() {
                        "1" => WriteMode::Parallel,
                        "0" => WriteMode::Serial,
                        other => {
                            return Err(SolverError::InvalidArguments(format!(
                                "undefined write flag '{other}', expected '0' or '1'"
                            )));
                        }
                    };
                }
                other => {
                    return Err(SolverError::InvalidArguments(format!(
                        "undefined option '{other}'"
                    )));
                }
            }

            i += 2;
        }

        let dimension = dimension
            .ok_or_else(|| SolverError::InvalidArguments("dimension has to be specified".to_string()))?;

        if dimension == Dimension::OneD && device == Device::Accelerator {
            return Err(SolverError::DeviceUnavailable(
                "accelerator offload is not supported in 1d".to_string(),
            ));
        }

        Ok(Self {
            dimension,
            scenario_name,
            scenario_args,
            boundary_left,
            boundary_right,
            boundary_top,
            boundary_bottom,
            station_path,
            resolution_stride,
            device,
            write_mode,
            n_cells_x,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_1d_dambreak() {
        let args: Vec<String> = vec!["-d", "1d", "-s", "dambreak1d 10 5", "100"]
            .into_iter()
            .map(str::to_string)
            .collect();
        let cfg = Config::parse(&args).unwrap();
        assert_eq!(cfg.dimension, Dimension::OneD);
        assert_eq!(cfg.scenario_name, "dambreak1d");
        assert_eq!(cfg.scenario_args, vec!["10", "5"]);
        assert_eq!(cfg.n_cells_x, 100);
    }

    #[test]
    fn rejects_missing_dimension() {
        let args: Vec<String> = vec!["-s", "dambreak2d", "50"]
            .into_iter()
            .map(str::to_string)
            .collect();
        assert!(Config::parse(&args).is_err());
    }

    #[test]
    fn rejects_trailing_flag_with_no_positional() {
        let args: Vec<String> = vec!["-d", "2d"].into_iter().map(str::to_string).collect();
        assert!(Config::parse(&args).is_err());
    }

    #[test]
    fn rejects_accelerator_in_1d() {
        let args: Vec<String> = vec!["-d", "1d", "-o", "1", "-s", "dambreak1d 10 5", "100"]
            .into_iter()
            .map(str::to_string)
            .collect();
        assert!(Config::parse(&args).is_err());
    }
}
