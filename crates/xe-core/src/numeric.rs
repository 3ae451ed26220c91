use crate::XeError;

/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, XeError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(XeError::NonFinite { what, value: v })
    }
}

/// Check `min <= v <= max` (and finiteness).
pub fn ensure_in_range(v: Real, min: Real, max: Real, what: &'static str) -> Result<Real, XeError> {
    let v = ensure_finite(v, what)?;
    if v < min || v > max {
        return Err(XeError::OutOfRange {
            what,
            value: v,
            min,
            max,
        });
    }
    Ok(v)
}

/// Round to a fixed number of decimals, ties to even on the scaled value.
pub fn round_to(v: Real, decimals: i32) -> Real {
    let scale = 10f64.powi(decimals);
    (v * scale).round_ties_even() / scale
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn round_to_stays_within_half_step(v in -1.0e4_f64..1.0e4_f64) {
            let r = round_to(v, 1);
            prop_assert!((r - v).abs() <= 0.05 + 1e-9);
        }

        #[test]
        fn nearly_equal_is_symmetric(a in -1.0e6_f64..1.0e6_f64, b in -1.0e6_f64..1.0e6_f64) {
            let tol = Tolerances::default();
            prop_assert_eq!(nearly_equal(a, b, tol), nearly_equal(b, a, tol));
        }
    }
}
