/// ==============================================================================================
/// ====================================== Roe Riemann Solver ======================================
/// ==============================================================================================
///
/// A simpler Roe linearisation that omits the bathymetry source term.
/// Retained for 1D regression tests (spec.md §4.1, "Alternative solver").
/// Not wet/dry aware beyond a zero-update short-circuit when both
/// columns are dry — it is not meant to run on bathymetry-bearing
/// scenarios.

use crate::constants::{DRY_TOLERANCE, GRAVITY};
use crate::constants::TReal;

use super::NetUpdates;

pub fn net_updates(h_l: TReal, h_r: TReal, hu_l: TReal, hu_r: TReal) -> NetUpdates {
    if h_l <= DRY_TOLERANCE && h_r <= DRY_TOLERANCE {
        return ([0.0, 0.0], [0.0, 0.0]);
    }

    let u_l = hu_l / h_l.max(DRY_TOLERANCE);
    let u_r = hu_r / h_r.max(DRY_TOLERANCE);

    let sqrt_h_l = h_l.sqrt();
    let sqrt_h_r = h_r.sqrt();

    let h_roe = 0.5 * (h_l + h_r);
    let u_roe = (u_l * sqrt_h_l + u_r * sqrt_h_r) / (sqrt_h_l + sqrt_h_r);
    let c_roe = (GRAVITY * h_roe).sqrt();

    let lambda1 = u_roe - c_roe;
    let lambda2 = u_roe + c_roe;

    let df0 = hu_r - hu_l;
    let df1 = (hu_r * u_r + 0.5 * GRAVITY * h_r * h_r) - (hu_l * u_l + 0.5 * GRAVITY * h_l * h_l);

    let denom = lambda2 - lambda1;
    let (alpha1, alpha2) = if denom.abs() > 0.0 {
        let alpha2 = (df1 - lambda1 * df0) / denom;
        let alpha1 = df0 - alpha2;
        (alpha1, alpha2)
    } else {
        (0.0, 0.0)
    };

    let wave1 = [alpha1, alpha1 * lambda1];
    let wave2 = [alpha2, alpha2 * lambda2];

    let mut delta_minus = [0.0f32; 2];
    let mut delta_plus = [0.0f32; 2];

    for (wave, speed) in [(wave1, lambda1), (wave2, lambda2)] {
        if speed < 0.0 {
            delta_minus[0] += wave[0];
            delta_minus[1] += wave[1];
        } else if speed > 0.0 {
            delta_plus[0] += wave[0];
            delta_plus[1] += wave[1];
        } else {
            delta_minus[0] += 0.5 * wave[0];
            delta_minus[1] += 0.5 * wave[1];
            delta_plus[0] += 0.5 * wave[0];
            delta_plus[1] += 0.5 * wave[1];
        }
    }

    (delta_minus, delta_plus)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consistency_without_source() {
        let (h_l, h_r, hu_l, hu_r) = (4.0f32, 4.0f32, 1.0f32, 0.5f32);
        let (delta_minus, delta_plus) = net_updates(h_l, h_r, hu_l, hu_r);
        let sum0 = delta_minus[0] + delta_plus[0];
        assert!((sum0 - (hu_r - hu_l)).abs() < 1e-4);
    }
}
