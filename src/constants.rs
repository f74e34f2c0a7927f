/// ==============================================================================================
/// ===================================== Global Constants =======================================
/// ==============================================================================================

/// Scalar type used throughout the solver. Single precision, matching the
/// original `t_real` typedef.
pub type TReal = f32;

/// Index type. `usize` is sized generously enough for grids well past
/// the ~10^9-cell range mentioned in the spec on any 64-bit target.
pub type TIdx = usize;

/// Gravitational acceleration, m/s^2.
pub const GRAVITY: TReal = 9.80665;

/// A cell with `h <= DRY_TOLERANCE` is considered dry.
pub const DRY_TOLERANCE: TReal = 1e-6;

/// Bathymetry value written into ghost cells for a closed (reflective)
/// boundary. Hard-coded in the original implementation; kept as a named
/// constant per the Design Notes rather than a repeated literal.
pub const CLOSED_BOUNDARY_BATHYMETRY: TReal = 25.0;
