use crate::{FcsError, FcsResult};

/// Equality that absorbs the last few bits of floating point roundoff.
///
/// Used to decide when a servo has arrived at its commanded position.
#[inline]
pub fn equal_to_roundoff(a: f64, b: f64) -> bool {
    let diff = (a - b).abs();
    diff <= f64::MIN_POSITIVE || diff <= 4.0 * f64::EPSILON * a.abs().max(b.abs())
}

/// Pass `value` through unless it is NaN or infinite.
pub fn ensure_finite(value: f64, what: &'static str) -> FcsResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FcsError::NonFinite { what, value })
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn one_ulp_is_roundoff(x in -1e300_f64..1e300) {
            let next = f64::from_bits(x.to_bits() + 1);
            prop_assert!(equal_to_roundoff(x, next));
            prop_assert!(equal_to_roundoff(next, x));
        }

        #[test]
        fn ensure_finite_agrees_with_classification(x in prop::num::f64::ANY) {
            prop_assert_eq!(ensure_finite(x, "x").is_ok(), x.is_finite());
        }
    }
}
