use crate::{
    algebra::{ops, ConstructionError, Expression, ParseError},
    equivalence::{self, Mismatch, DEFAULT_EPSILON, DEFAULT_SAMPLE_LIMIT},
};

/// Something which hands out the equations to be differentiated.
pub trait EquationSource {
    fn next_equation(&mut self) -> Option<String>;
}

/// An [`EquationSource`] backed by an iterator.
#[derive(Debug, Clone)]
pub struct Equations<I> {
    inner: I,
}

impl<I> Equations<I> {
    pub fn new(inner: I) -> Self { Equations { inner } }
}

impl<I, S> EquationSource for Equations<I>
where
    I: Iterator<Item = S>,
    S: Into<String>,
{
    fn next_equation(&mut self) -> Option<String> {
        self.inner.next().map(Into::into)
    }
}

/// Tuning for how answers are compared.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CheckerConfig {
    /// The relative tolerance handed to [`crate::nearly_equal()`].
    pub epsilon: f64,
    /// Answers are sampled at every integer in `1..sample_limit`.
    pub sample_limit: u32,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        CheckerConfig {
            epsilon: DEFAULT_EPSILON,
            sample_limit: DEFAULT_SAMPLE_LIMIT,
        }
    }
}

/// Why some text couldn't be turned into a [`Problem`] or an answer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidInput {
    #[error("Unbalanced parenthesis at index {index}")]
    UnbalancedParentheses { index: usize },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("Unable to differentiate: {0}")]
    NoDerivative(ConstructionError),
}

/// The outcome of checking an answer.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Correct,
    Incorrect(Mismatch),
    InvalidInput(InvalidInput),
}

impl Verdict {
    pub fn is_correct(&self) -> bool {
        match self {
            Verdict::Correct => true,
            _ => false,
        }
    }
}

/// Strip whitespace from some user input and make sure its parentheses
/// balance.
pub fn normalize(src: &str) -> Result<String, InvalidInput> {
    let stripped: String = src.chars().filter(|c| !c.is_whitespace()).collect();
    let mut depth = 0_usize;

    for (index, c) in stripped.char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => {
                return Err(InvalidInput::UnbalancedParentheses { index });
            },
            ')' => depth -= 1,
            _ => {},
        }
    }

    if depth == 0 {
        Ok(stripped)
    } else {
        Err(InvalidInput::UnbalancedParentheses {
            index: stripped.len(),
        })
    }
}

/// An equation to differentiate, along with its real derivative.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    equation: String,
    expression: Expression,
    derivative: Expression,
}

impl Problem {
    pub fn new(equation: &str) -> Result<Self, InvalidInput> {
        let expression = crate::parse(&normalize(equation)?)?;
        let derivative = ops::derivative(&expression).map_err(|e| {
            tracing::warn!(%equation, error = %e, "Unable to differentiate");
            InvalidInput::NoDerivative(e)
        })?;

        tracing::debug!(%equation, %derivative, "Prepared a problem");

        Ok(Problem {
            equation: equation.to_string(),
            expression,
            derivative,
        })
    }

    /// Create a [`Problem`] from the next equation in an
    /// [`EquationSource`], if there is one.
    pub fn from_source<E>(source: &mut E) -> Option<Result<Self, InvalidInput>>
    where
        E: EquationSource + ?Sized,
    {
        source
            .next_equation()
            .map(|equation| Problem::new(&equation))
    }

    /// The equation as originally written.
    pub fn equation(&self) -> &str { &self.equation }

    pub fn expression(&self) -> &Expression { &self.expression }

    pub fn derivative(&self) -> &Expression { &self.derivative }

    /// Check whether some user-provided text is the derivative of this
    /// problem's equation.
    pub fn check(&self, answer: &str, config: &CheckerConfig) -> Verdict {
        let candidate = match normalize(answer)
            .and_then(|answer| crate::parse(&answer).map_err(InvalidInput::from))
        {
            Ok(candidate) => candidate,
            Err(e) => {
                tracing::debug!(%answer, error = %e, "Invalid answer");
                return Verdict::InvalidInput(e);
            },
        };

        match equivalence::equivalent(
            &self.derivative,
            &candidate,
            config.epsilon,
            config.sample_limit,
        ) {
            Ok(()) => Verdict::Correct,
            Err(mismatch) => {
                tracing::debug!(
                    equation = %self.equation,
                    derivative = %self.derivative,
                    %answer,
                    sample = mismatch.sample,
                    expected = mismatch.expected,
                    actual = mismatch.actual,
                    "Incorrect answer"
                );
                Verdict::Incorrect(mismatch)
            },
        }
    }
}
