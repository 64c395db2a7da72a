//! Deciding whether two expressions are the same function by sampling them.

use crate::algebra::{ops, Expression};

/// The relative tolerance used when nothing else is specified.
pub const DEFAULT_EPSILON: f64 = 1e-4;

/// Samples are taken at `x = 1, 2, ..., DEFAULT_SAMPLE_LIMIT - 1`.
pub const DEFAULT_SAMPLE_LIMIT: u32 = 1000;

/// Values whose combined magnitude falls below this are compared with an
/// absolute tolerance (`epsilon * NEAR_ZERO`) instead of a relative one.
pub const NEAR_ZERO: f64 = 1e-3;

/// Are two floats equal to within some relative `epsilon`?
///
/// Exactly equal values (including matching infinities) always pass. If
/// either value is zero, or both are tiny, a relative error is meaningless
/// so the absolute difference is compared against `epsilon * NEAR_ZERO`.
/// Otherwise the difference relative to the values' combined magnitude must
/// be below `epsilon`.
pub fn nearly_equal(a: f64, b: f64, epsilon: f64) -> bool {
    if a == b {
        return true;
    }

    let abs_a = a.abs();
    let abs_b = b.abs();
    let diff = (a - b).abs();

    if a == 0.0 || b == 0.0 || abs_a + abs_b < NEAR_ZERO {
        diff < epsilon * NEAR_ZERO
    } else {
        diff / (abs_a + abs_b) < epsilon
    }
}

/// The first sample at which two expressions disagreed.
#[derive(Debug, Copy, Clone, PartialEq, thiserror::Error)]
#[error("Expected {expected} but got {actual} at x = {sample}")]
pub struct Mismatch {
    pub sample: u32,
    pub expected: f64,
    pub actual: f64,
}

/// Check whether `candidate` evaluates to the same thing as `reference` at
/// every integer in `1..sample_limit`.
///
/// This stops at the first disagreement, so the same inputs always report
/// the same [`Mismatch`]. A `NaN` from either side counts as a
/// disagreement.
///
/// This is a heuristic, not a proof. Two expressions which only differ
/// outside the sampled range will be declared equivalent.
pub fn equivalent(
    reference: &Expression,
    candidate: &Expression,
    epsilon: f64,
    sample_limit: u32,
) -> Result<(), Mismatch> {
    for sample in 1..sample_limit {
        let x = f64::from(sample);
        let expected = ops::evaluate(reference, x);
        let actual = ops::evaluate(candidate, x);

        if expected.is_nan()
            || actual.is_nan()
            || !nearly_equal(expected, actual, epsilon)
        {
            let mismatch = Mismatch {
                sample,
                expected,
                actual,
            };
            tracing::debug!(
                %reference,
                %candidate,
                sample,
                expected,
                actual,
                "Expressions differ"
            );

            return Err(mismatch);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{algebra::ops::derivative, parse};

    #[test]
    fn nearly_equal_values() {
        let inputs = vec![
            (1.0, 1.0, true),
            (0.0, 1e-10, true),
            (1e-10, 0.0, true),
            (1.0, 1.1, false),
            (1_000_000.0, 1_000_001.0, true),
            (-1.0, 1.0, false),
            (0.0, 0.0, true),
            (0.0, -0.0, true),
            (0.0, 1e-3, false),
            (1e-9, -1e-9, true),
            (std::f64::INFINITY, std::f64::INFINITY, true),
            (std::f64::INFINITY, std::f64::NEG_INFINITY, false),
            (std::f64::INFINITY, 1e300, false),
            (std::f64::NAN, std::f64::NAN, false),
        ];

        for (a, b, should_be) in inputs {
            let got = nearly_equal(a, b, 1e-4);

            assert_eq!(got, should_be, "nearly_equal({}, {})", a, b);
        }
    }

    #[test]
    fn derivative_of_three_x_squared_is_six_x() {
        let reference = derivative(&parse("3*x^2").unwrap()).unwrap();
        let answer = parse("6*x").unwrap();

        let got = equivalent(&reference, &answer, DEFAULT_EPSILON, 1000);

        assert_eq!(got, Ok(()));
    }

    #[test]
    fn report_the_first_mismatch() {
        let reference = derivative(&parse("3*x^2").unwrap()).unwrap();
        let answer = parse("6*x+1").unwrap();

        let got = equivalent(&reference, &answer, DEFAULT_EPSILON, 1000);

        assert_eq!(
            got,
            Err(Mismatch {
                sample: 1,
                expected: 6.0,
                actual: 7.0
            })
        );
    }

    #[test]
    fn mismatches_past_the_first_sample() {
        // only agree at x = 1
        let reference = parse("x").unwrap();
        let answer = parse("x^2").unwrap();

        let got = equivalent(&reference, &answer, DEFAULT_EPSILON, 1000)
            .unwrap_err();

        assert_eq!(got.sample, 2);
        assert_eq!(got.to_string(), "Expected 2 but got 4 at x = 2");
    }

    #[test]
    fn nan_always_disagrees() {
        let reference = parse("ln(0-x)").unwrap();

        let got = equivalent(&reference, &reference, DEFAULT_EPSILON, 1000)
            .unwrap_err();

        assert_eq!(got.sample, 1);
        assert!(got.expected.is_nan());
    }

    #[test]
    fn infinities_are_equal_to_each_other() {
        let reference = parse("1/(x-x)").unwrap();
        let answer = parse("2/(x-x)").unwrap();

        assert_eq!(equivalent(&reference, &answer, DEFAULT_EPSILON, 10), Ok(()));
    }

    #[test]
    fn only_the_sampled_range_is_checked() {
        // these agree at every integer in 1..5, but not at 5
        let reference = parse("x").unwrap();
        let answer = parse("x+(x-1)(x-2)(x-3)(x-4)").unwrap();

        assert_eq!(equivalent(&reference, &answer, DEFAULT_EPSILON, 5), Ok(()));
        assert_eq!(
            equivalent(&reference, &answer, DEFAULT_EPSILON, 6)
                .unwrap_err()
                .sample,
            5
        );
    }

    #[test]
    fn empty_sample_range_accepts_anything() {
        let reference = parse("x").unwrap();
        let answer = parse("x+1").unwrap();

        assert_eq!(equivalent(&reference, &answer, DEFAULT_EPSILON, 1), Ok(()));
    }
}
