/// ==============================================================================================
/// ========================================= Entry Point ============================================
/// ==============================================================================================
///
/// Parses argv, initializes tracing, runs the time loop, and maps
/// failures onto the exit-code policy of spec.md §6/§7: 0 on success,
/// non-zero on CLI validation, invalid-scenario/solver, device-init, or
/// checkpoint-corruption errors. None of these are recoverable once
/// raised, so the binary reports and exits rather than retrying.

use std::process::ExitCode;

use tsunami_wave_rs::cli::Config;
use tsunami_wave_rs::driver::Driver;
use tsunami_wave_rs::error::SolverError;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let cfg = match Config::parse(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let driver = match Driver::new(cfg) {
        Ok(driver) => driver,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match driver.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(err: &SolverError) -> ExitCode {
    match err {
        SolverError::InvalidArguments(_)
        | SolverError::InvalidScenario(_)
        | SolverError::InvalidBoundary(_)
        | SolverError::InvalidSolver(_)
        | SolverError::DeviceUnavailable(_)
        | SolverError::Io(_)
        | SolverError::CheckpointCorrupt(_) => ExitCode::FAILURE,
    }
}
