//! Angle normalization.

use std::f64::consts::TAU;

/// Normalize `angle` (radians) into `[0, 2π)`.
///
/// Non-finite input is returned unchanged.
#[must_use]
pub fn wrap(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid rounds tiny negative inputs up to exactly TAU.
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Convert degrees to radians using the literal `deg * 2π / 360` form.
#[must_use]
pub fn degrees(deg: f64) -> f64 {
    deg * TAU / 360.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [f64; 9] = [0.0, 0.5, -0.5, 3.0, -3.0, 7.5, -7.5, 100.25, -1234.5];

    #[test]
    fn wrap_stays_in_range() {
        for x in SAMPLES.into_iter().chain([-1e-18, 1e-18, TAU, -TAU]) {
            let w = wrap(x);
            assert!((0.0..TAU).contains(&w), "wrap({x}) = {w}");
        }
    }

    #[test]
    fn wrap_is_periodic() {
        for x in SAMPLES {
            for k in -3_i32..=3 {
                let shifted = TAU.mul_add(f64::from(k), x);
                let diff = (wrap(shifted) - wrap(x)).abs();
                assert!(diff < 1e-9, "wrap({shifted}) vs wrap({x}): {diff}");
            }
        }
    }

    #[test]
    fn wrap_identity_inside_range() {
        assert!((wrap(1.25) - 1.25).abs() < f64::EPSILON);
        assert!(wrap(0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn wrap_negative_tiny_is_zero_not_tau() {
        assert!(wrap(-1e-18) < TAU);
    }

    #[test]
    fn degrees_literal_form() {
        assert!((degrees(180.0) - std::f64::consts::PI).abs() < 1e-15);
        assert!((degrees(15.0) - 15.0 * TAU / 360.0).abs() < f64::EPSILON);
    }
}
