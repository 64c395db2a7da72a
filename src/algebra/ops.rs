//! [`Expression`] operations.

use crate::algebra::{BinaryOperation, ConstructionError, Expression, Node};

/// Calculate an [`Expression`]'s derivative by applying the usual calculus
/// rules to each node.
///
/// Every identifier is treated as the variable being differentiated with
/// respect to, and no simplification is done on the result. Operands of the
/// original tree are shared with the derivative rather than copied.
///
/// The power rule assumes the exponent is constant. Differentiating
/// something like `x^x` will give the wrong answer.
///
/// This fails when the logarithm rule would need to divide by a literal
/// zero, i.e. the derivative of `ln(0)`.
pub fn derivative(expr: &Expression) -> Result<Expression, ConstructionError> {
    let got = match expr.node() {
        Node::Constant(_) => Expression::constant(0),
        Node::Variable(_) => Expression::constant(1),
        Node::Negate(operand) => -derivative(operand)?,
        Node::Binary {
            left,
            right,
            op: BinaryOperation::Plus,
        } => derivative(left)? + derivative(right)?,
        Node::Binary {
            left,
            right,
            op: BinaryOperation::Minus,
        } => derivative(left)? - derivative(right)?,
        Node::Binary {
            left,
            right,
            op: BinaryOperation::Times,
        } => {
            // The product rule
            let d_left = derivative(left)?;
            let d_right = derivative(right)?;

            d_left * right.clone() + left.clone() * d_right
        },
        Node::Binary {
            left,
            right,
            op: BinaryOperation::Divide,
        } => {
            // The quotient rule
            let d_left = derivative(left)?;
            let d_right = derivative(right)?;
            let numerator = d_left * right.clone() - left.clone() * d_right;

            Expression::divide(
                numerator,
                right.clone().pow(Expression::constant(2)),
            )?
        },
        Node::Binary {
            left,
            right,
            op: BinaryOperation::Power,
        } => {
            // n * x^(n-1) * x'
            let exponent = right.clone() - Expression::constant(1);
            let d_left = derivative(left)?;

            right.clone() * left.clone().pow(exponent) * d_left
        },
        Node::NaturalLog(operand) => {
            Expression::divide(derivative(operand)?, operand.clone())?
        },
    };

    Ok(got)
}

/// Numerically evaluate an [`Expression`], substituting `x` for every
/// variable.
///
/// Dividing by zero or taking the logarithm of a non-positive number isn't
/// an error, you'll just get an infinity or `NaN` back.
pub fn evaluate(expr: &Expression, x: f64) -> f64 {
    match expr.node() {
        Node::Constant(value) => *value as f64,
        Node::Variable(_) => x,
        Node::Negate(operand) => -evaluate(operand, x),
        Node::NaturalLog(operand) => evaluate(operand, x).ln(),
        Node::Binary { left, right, op } => {
            let left = evaluate(left, x);
            let right = evaluate(right, x);

            match op {
                BinaryOperation::Plus => left + right,
                BinaryOperation::Minus => left - right,
                BinaryOperation::Times => left * right,
                BinaryOperation::Divide => left / right,
                BinaryOperation::Power => left.powf(right),
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use approx::assert_relative_eq;

    fn c(value: i64) -> Expression { Expression::constant(value) }

    fn x() -> Expression { Expression::variable("x") }

    #[test]
    fn evaluate_matches_rust_arithmetic() {
        let inputs: Vec<(&str, fn(f64) -> f64)> = vec![
            ("1", |_| 1.0),
            ("x", |x| x),
            ("-x", |x| -x),
            ("2+3*4", |_| 14.0),
            ("3*x^2+2x-1", |x| 3.0 * x.powi(2) + 2.0 * x - 1.0),
            ("(x+1)(x-1)", |x| (x + 1.0) * (x - 1.0)),
            ("x^3-x/2", |x| x.powi(3) - x / 2.0),
            ("-x^2", |x| -(x * x)),
            ("7(x+1)", |x| 7.0 * (x + 1.0)),
            ("2*-x", |x| -2.0 * x),
            ("x^(-1/2)", |x| x.powf(-0.5)),
            ("ln(x^2+1)", |x| (x * x + 1.0).ln()),
            ("10-x-x", |x| 10.0 - x - x),
            ("2^x", |x| 2_f64.powf(x)),
        ];

        for (src, should_be) in inputs {
            let expr = parse(src).unwrap();

            for sample in &[-3.0, -1.0, 0.0, 1.0, 2.0, 7.0] {
                let got = evaluate(&expr, *sample);
                let expected = should_be(*sample);

                if expected.is_nan() {
                    assert!(got.is_nan(), "{} at x = {}", src, sample);
                } else {
                    assert_relative_eq!(got, expected, epsilon = 1e-9);
                }
            }
        }
    }

    #[test]
    fn degenerate_evaluations_propagate() {
        let one_over_x = parse("1/x").unwrap();
        assert!(evaluate(&one_over_x, 0.0).is_infinite());

        let log = parse("ln(x)").unwrap();
        assert!(evaluate(&log, -1.0).is_nan());
        assert_eq!(evaluate(&log, 0.0), std::f64::NEG_INFINITY);
    }

    #[test]
    fn every_identifier_takes_the_sample_value() {
        let expr = parse("x*y+abc").unwrap();

        assert_relative_eq!(evaluate(&expr, 3.0), 12.0);
    }

    #[test]
    fn derivative_shapes() {
        let inputs = vec![
            (c(5), c(0)),
            (x(), c(1)),
            (-x(), -c(1)),
            (x() + c(2), c(1) + c(0)),
            (x() - c(2), c(1) - c(0)),
            (c(3) * x(), c(0) * x() + c(3) * c(1)),
            (
                x().pow(c(2)),
                c(2) * x().pow(c(2) - c(1)) * c(1),
            ),
            (
                Expression::natural_log(x()),
                Expression::divide(c(1), x()).unwrap(),
            ),
            (
                Expression::divide(c(1), x()).unwrap(),
                Expression::divide(
                    c(0) * x() - c(1) * c(1),
                    x().pow(c(2)),
                )
                .unwrap(),
            ),
        ];

        for (original, should_be) in inputs {
            let got = derivative(&original).unwrap();

            assert_eq!(got, should_be, "d/dx {}", original);
        }
    }

    #[test]
    fn derivative_of_three_x_squared() {
        let original = c(3) * x().pow(c(2));

        let got = derivative(&original).unwrap();

        assert_relative_eq!(evaluate(&got, 5.0), 30.0, epsilon = 1e-4);
    }

    #[test]
    fn differentiate_and_evaluate() {
        let inputs: Vec<(&str, fn(f64) -> f64)> = vec![
            ("x^3", |x| 3.0 * x * x),
            ("5x^2-3x+2", |x| 10.0 * x - 3.0),
            ("(x+1)(x-1)", |x| 2.0 * x),
            ("1/x", |x| -1.0 / (x * x)),
            ("x/(x+1)", |x| 1.0 / ((x + 1.0) * (x + 1.0))),
            ("ln(x^2)", |x| 2.0 / x),
            ("-4x^(-1/2)", |x| 2.0 * x.powf(-1.5)),
            ("ln(ln(x))", |x| 1.0 / (x * x.ln())),
        ];

        for (src, should_be) in inputs {
            let expr = parse(src).unwrap();
            let got = derivative(&expr).unwrap();

            for sample in &[2.0, 3.0, 10.0] {
                assert_relative_eq!(
                    evaluate(&got, *sample),
                    should_be(*sample),
                    epsilon = 1e-9,
                    max_relative = 1e-9
                );
            }
        }
    }

    #[test]
    fn derivative_shares_the_original_operands() {
        let left = x() + c(1);
        let right = x() - c(1);
        let product = left.clone() * right.clone();

        let got = derivative(&product).unwrap();

        // (left' * right) + (left * right')
        let (first, second) = match got.node() {
            Node::Binary { left, right, .. } => (left.clone(), right.clone()),
            other => panic!("Expected a sum, found {:?}", other),
        };
        match (first.node(), second.node()) {
            (
                Node::Binary { right: shared_right, .. },
                Node::Binary { left: shared_left, .. },
            ) => {
                assert!(shared_right.ptr_eq(&right));
                assert!(shared_left.ptr_eq(&left));
            },
            other => panic!("Unexpected shape {:?}", other),
        }
    }

    #[test]
    fn derivative_of_ln_zero_cant_be_built() {
        let got = derivative(&Expression::natural_log(c(0)));

        assert_eq!(got, Err(ConstructionError::DivideByZero));
    }

    #[test]
    fn power_rule_assumes_a_constant_exponent() {
        // d/dx x^x is x^x * (ln(x) + 1), but we only apply the power rule
        let original = parse("x^x").unwrap();
        let got = derivative(&original).unwrap();

        let power_rule = |x: f64| x * x.powf(x - 1.0);
        let correct = |x: f64| x.powf(x) * (x.ln() + 1.0);

        assert_relative_eq!(evaluate(&got, 2.0), power_rule(2.0));
        assert!((evaluate(&got, 2.0) - correct(2.0)).abs() > 1.0);
    }
}
