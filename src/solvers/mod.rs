/// ==============================================================================================
/// ======================================== Solvers ================================================
/// ==============================================================================================
///
/// C1: approximate Riemann solvers evaluated at every cell edge.

pub mod riemann;
