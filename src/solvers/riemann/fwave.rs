/// ==============================================================================================
/// ===================================== f-Wave Riemann Solver ===================================
/// ==============================================================================================
///
/// Approximate Riemann solver for the shallow-water equations with a
/// non-flat-bathymetry source term, decomposed in the eigenbasis of the
/// Roe-linearised flux Jacobian. Wet/dry edges are reflected into a
/// closed-wall problem rather than evaluated directly.

use crate::constants::{DRY_TOLERANCE, GRAVITY};
use crate::constants::TReal;

use super::NetUpdates;

/// Compute net updates `(delta_minus, delta_plus)` for an edge between a
/// left column `(h_l, hu_l, b_l)` and a right column `(h_r, hu_r, b_r)`.
/// The caller is responsible for scaling the result by `dt / dx` before
/// applying it to cell state. Always returns finite values.
pub fn net_updates(
    h_l: TReal,
    h_r: TReal,
    hu_l: TReal,
    hu_r: TReal,
    b_l: TReal,
    b_r: TReal,
) -> NetUpdates {
    let left_dry = h_l <= DRY_TOLERANCE;
    let right_dry = h_r <= DRY_TOLERANCE;

    if left_dry && right_dry {
        return ([0.0, 0.0], [0.0, 0.0]);
    }

    // Reflect the wet side into a closed-wall problem; the dry cell
    // itself receives no update since it carries no water to move.
    let (h_l, h_r, hu_l, hu_r, b_l, b_r) = if left_dry {
        (h_r, h_r, -hu_r, hu_r, b_r, b_r)
    } else if right_dry {
        (h_l, h_l, hu_l, -hu_l, b_l, b_l)
    } else {
        (h_l, h_r, hu_l, hu_r, b_l, b_r)
    };

    let (mut delta_minus, mut delta_plus) = decompose(h_l, h_r, hu_l, hu_r, b_l, b_r);

    if left_dry {
        delta_minus = [0.0, 0.0];
    }
    if right_dry {
        delta_plus = [0.0, 0.0];
    }

    (delta_minus, delta_plus)
}

/// Roe-average wave decomposition shared by the wet/wet path and the
/// reflected wet/dry path above. Assumes both columns are wet.
fn decompose(
    h_l: TReal,
    h_r: TReal,
    hu_l: TReal,
    hu_r: TReal,
    b_l: TReal,
    b_r: TReal,
) -> ([TReal; 2], [TReal; 2]) {
    let u_l = hu_l / h_l;
    let u_r = hu_r / h_r;

    let sqrt_h_l = h_l.sqrt();
    let sqrt_h_r = h_r.sqrt();

    let h_roe = 0.5 * (h_l + h_r);
    let u_roe = (u_l * sqrt_h_l + u_r * sqrt_h_r) / (sqrt_h_l + sqrt_h_r);

    let c_roe = (GRAVITY * h_roe).sqrt();
    let lambda1 = u_roe - c_roe;
    let lambda2 = u_roe + c_roe;

    // Flux jump f(q_r) - f(q_l).
    let flux_0 = hu_r - hu_l;
    let flux_1 = (hu_r * u_r + 0.5 * GRAVITY * h_r * h_r)
        - (hu_l * u_l + 0.5 * GRAVITY * h_l * h_l);

    // Bathymetry source contribution, subtracted from the flux jump.
    let source_1 = -0.5 * GRAVITY * (b_r - b_l) * (h_l + h_r);

    let df0 = flux_0;
    let df1 = flux_1 - source_1;

    // Solve [1 1; lambda1 lambda2] * [alpha1; alpha2] = [df0; df1].
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

    dispatch_wave(wave1, lambda1, &mut delta_minus, &mut delta_plus);
    dispatch_wave(wave2, lambda2, &mut delta_minus, &mut delta_plus);

    (delta_minus, delta_plus)
}

/// Send a wave to the left cell if its speed is negative, to the right
/// cell if positive, and split it evenly if the speed is exactly zero.
#[inline]
fn dispatch_wave(wave: [TReal; 2], speed: TReal, left: &mut [TReal; 2], right: &mut [TReal; 2]) {
    if speed < 0.0 {
        left[0] += wave[0];
        left[1] += wave[1];
    } else if speed > 0.0 {
        right[0] += wave[0];
        right[1] += wave[1];
    } else {
        left[0] += 0.5 * wave[0];
        left[1] += 0.5 * wave[1];
        right[0] += 0.5 * wave[0];
        right[1] += 0.5 * wave[1];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_bathymetry_consistency() {
        // Sum of left + right updates must equal the flux jump when b is flat.
        let (h_l, h_r, hu_l, hu_r) = (2.0f32, 1.0f32, 0.5f32, -0.3f32);
        let (delta_minus, delta_plus) = net_updates(h_l, h_r, hu_l, hu_r, 0.0, 0.0);

        let u_l = hu_l / h_l;
        let u_r = hu_r / h_r;
        let flux_0 = hu_r - hu_l;
        let flux_1 = (hu_r * u_r + 0.5 * GRAVITY * h_r * h_r)
            - (hu_l * u_l + 0.5 * GRAVITY * h_l * h_l);

        let sum0 = delta_minus[0] + delta_plus[0];
        let sum1 = delta_minus[1] + delta_plus[1];

        assert!((sum0 - flux_0).abs() < 1e-4, "h flux mismatch: {sum0} vs {flux_0}");
        assert!((sum1 - flux_1).abs() < 1e-3, "hu flux mismatch: {sum1} vs {flux_1}");
    }

    #[test]
    fn both_dry_is_zero() {
        let (delta_minus, delta_plus) = net_updates(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(delta_minus, [0.0, 0.0]);
        assert_eq!(delta_plus, [0.0, 0.0]);
    }

    #[test]
    fn one_dry_reflects() {
        // A wet column meeting a dry column should not move water into
        // the dry cell: its update stays zero.
        let (_, delta_plus) = net_updates(2.0, 0.0, 0.5, 0.0, 0.0, 0.0);
        assert_eq!(delta_plus, [0.0, 0.0]);

        let (delta_minus, _) = net_updates(0.0, 2.0, 0.0, -0.5, 0.0, 0.0);
        assert_eq!(delta_minus, [0.0, 0.0]);
    }

    #[test]
    fn symmetric_state_has_no_net_update() {
        // Identical left/right state (and flat b) means zero flux jump.
        let (delta_minus, delta_plus) = net_updates(3.0, 3.0, 1.2, 1.2, 5.0, 5.0);
        for v in delta_minus.iter().chain(delta_plus.iter()) {
            assert!(v.abs() < 1e-5, "expected ~0, got {v}");
        }
    }

    #[test]
    fn finite_for_large_jump() {
        let (delta_minus, delta_plus) = net_updates(10.0, 1e-3, 0.0, 0.0, 0.0, 2.0);
        for v in delta_minus.iter().chain(delta_plus.iter()) {
            assert!(v.is_finite());
        }
    }
}
