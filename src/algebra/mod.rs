//! The symbolic algebra system.

mod expr;
pub mod ops;
mod parse;
mod reduce;

pub use expr::{BinaryOperation, ConstructionError, Expression, Kind, Node};
pub use parse::{parse, ParseError};
