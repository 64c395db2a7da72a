//! Parse expressions in a single variable, differentiate them, and decide
//! whether an answer is the same function as the real derivative.
//!
//! ```rust
//! use derivatives::{CheckerConfig, Problem, Verdict};
//!
//! let problem = Problem::new("3*x^2 + 2x").unwrap();
//! let config = CheckerConfig::default();
//!
//! assert_eq!(problem.check("6x+2", &config), Verdict::Correct);
//! assert!(!problem.check("6x", &config).is_correct());
//! ```

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

pub mod algebra;
mod equivalence;
mod problem;

pub use algebra::{
    ops, parse, BinaryOperation, ConstructionError, Expression, Kind, Node,
    ParseError,
};
pub use equivalence::{
    equivalent, nearly_equal, Mismatch, DEFAULT_EPSILON, DEFAULT_SAMPLE_LIMIT,
    NEAR_ZERO,
};
pub use problem::{
    normalize, CheckerConfig, EquationSource, Equations, InvalidInput, Problem,
    Verdict,
};
