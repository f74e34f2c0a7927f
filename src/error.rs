/// ==============================================================================================
/// ======================================== Error Model ==========================================
/// ==============================================================================================

use std::fmt;

/// Error kinds raised by CLI validation, patch construction, and the time
/// loop. Startup errors (everything except `InvalidBoundary`) are fatal and
/// must be surfaced before any simulation work begins.
#[derive(Debug)]
pub enum SolverError {
    InvalidArguments(String),
    InvalidScenario(String),
    InvalidBoundary(String),
    InvalidSolver(String),
    DeviceUnavailable(String),
    Io(std::io::Error),
    CheckpointCorrupt(String),
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::InvalidArguments(msg) => write!(f, "invalid arguments: {msg}"),
            SolverError::InvalidScenario(msg) => write!(f, "invalid scenario: {msg}"),
            SolverError::InvalidBoundary(msg) => write!(f, "invalid boundary: {msg}"),
            SolverError::InvalidSolver(msg) => write!(f, "invalid solver: {msg}"),
            SolverError::DeviceUnavailable(msg) => write!(f, "device unavailable: {msg}"),
            SolverError::Io(err) => write!(f, "io error: {err}"),
            SolverError::CheckpointCorrupt(msg) => write!(f, "checkpoint corrupt: {msg}"),
        }
    }
}

impl std::error::Error for SolverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolverError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SolverError {
    fn from(err: std::io::Error) -> Self {
        SolverError::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, SolverError>;
