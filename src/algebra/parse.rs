use crate::algebra::{
    reduce::{self, PlaceholderTable},
    BinaryOperation, ConstructionError, Expression,
};
use std::str::FromStr;

/// Parse an [`Expression`] tree from some text.
///
/// The text must already have had its whitespace removed.
pub fn parse(src: &str) -> Result<Expression, ParseError> {
    if src.is_empty() {
        return Err(ParseError::Empty);
    }
    check_characters(src)?;

    let mut table = PlaceholderTable::seeded(src);
    let residual = reduce::reduce(src, &mut table);
    let expr = build(&residual, &mut table)?;

    tracing::debug!(%src, %expr, placeholders = table.len(), "Parsed");

    Ok(expr)
}

impl FromStr for Expression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { parse(s) }
}

/// Possible errors that may occur while parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("Nothing to parse")]
    Empty,
    #[error("Invalid character, '{character}', at index {index}")]
    InvalidCharacter { character: char, index: usize },
    #[error("\"{fragment}\" is not a valid expression")]
    InvalidExpression { fragment: String },
    #[error("\"{text}\" is not a valid integer")]
    InvalidInteger { text: String },
    #[error("There is no placeholder for \"{reference}\"")]
    UnknownPlaceholder { reference: String },
    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

fn check_characters(src: &str) -> Result<(), ParseError> {
    let bad = src.char_indices().find(|&(_, c)| {
        !(c.is_ascii_alphanumeric() || "+-*/^()".contains(c))
    });

    match bad {
        Some((index, character)) => {
            Err(ParseError::InvalidCharacter { character, index })
        },
        None => Ok(()),
    }
}

/// Reduce a piece of text from scratch, then build it.
fn reduce_and_build(
    src: &str,
    table: &mut PlaceholderTable,
) -> Result<Expression, ParseError> {
    let residual = reduce::reduce(src, table);
    build(&residual, table)
}

/// Turn a (partially reduced) fragment into an [`Expression`].
///
/// The rules are tried in a fixed order and the first one to match wins.
/// Most of them expect a single operator between two operands because the
/// reducer has already pulled everything else out into placeholders.
fn build(
    fragment: &str,
    table: &mut PlaceholderTable,
) -> Result<Expression, ParseError> {
    let bytes = fragment.as_bytes();

    if bytes.is_empty() {
        return Err(ParseError::InvalidExpression {
            fragment: String::new(),
        });
    }

    if is_ln_call(bytes) {
        let inner = &fragment[3..fragment.len() - 1];
        return Ok(Expression::natural_log(reduce_and_build(inner, table)?));
    }

    if bytes.len() >= 2 && bytes[0] == b'(' && bytes[bytes.len() - 1] == b')'
    {
        return reduce_and_build(&fragment[1..fragment.len() - 1], table);
    }

    if is_integer(bytes) {
        return fragment
            .parse()
            .map(Expression::constant)
            .map_err(|_| ParseError::InvalidInteger {
                text: fragment.to_string(),
            });
    }

    if reduce::letters(bytes, 0) == Some(bytes.len()) {
        return Ok(Expression::variable(fragment));
    }

    if reduce::placeholder(bytes, 0) == Some(bytes.len()) {
        let entry = lookup(fragment, table)?;
        return build(&entry, table);
    }

    if bytes[0] == b'-' && reduce::operand(bytes, 1) == Some(bytes.len()) {
        return Ok(Expression::negate(build(&fragment[1..], table)?));
    }

    if let Some(plus) = binary_shape(bytes, b'+', false) {
        return binary_at(fragment, plus, BinaryOperation::Plus, table);
    }

    if let Some(minus) = binary_shape(bytes, b'-', false) {
        return binary_at(fragment, minus, BinaryOperation::Minus, table);
    }

    if let Some(times) = binary_shape(bytes, b'*', true) {
        return binary_at(fragment, times, BinaryOperation::Times, table);
    }

    if let Some(second) = adjacent_placeholders(bytes) {
        return implicit_multiply(fragment, second, table);
    }

    if let Some(bracket) = factor_before_placeholder(bytes) {
        return implicit_multiply(fragment, bracket, table);
    }

    if let Some(letters) = factor_before_letters(bytes) {
        return implicit_multiply(fragment, letters, table);
    }

    if let Some(slash) = binary_shape(bytes, b'/', true) {
        return binary_at(fragment, slash, BinaryOperation::Divide, table);
    }

    if let Some(caret) = binary_shape(bytes, b'^', false) {
        return binary_at(fragment, caret, BinaryOperation::Power, table);
    }

    Err(ParseError::InvalidExpression {
        fragment: fragment.to_string(),
    })
}

/// Build both sides of the operator at `index`.
fn binary_at(
    fragment: &str,
    index: usize,
    op: BinaryOperation,
    table: &mut PlaceholderTable,
) -> Result<Expression, ParseError> {
    let left = build(&fragment[..index], table)?;
    let right = build(&fragment[index + 1..], table)?;

    Expression::binary(op, left, right).map_err(ParseError::from)
}

/// Multiply the text either side of `split` together.
fn implicit_multiply(
    fragment: &str,
    split: usize,
    table: &mut PlaceholderTable,
) -> Result<Expression, ParseError> {
    // the left side may carry a "*" we didn't need
    let left = fragment[..split].trim_end_matches('*');
    let left = build(left, table)?;
    let right = build(&fragment[split..], table)?;

    Ok(left * right)
}

fn lookup(
    reference: &str,
    table: &PlaceholderTable,
) -> Result<String, ParseError> {
    reference[1..reference.len() - 1]
        .parse::<usize>()
        .ok()
        .and_then(|index| table.get(index))
        .map(String::from)
        .ok_or_else(|| ParseError::UnknownPlaceholder {
            reference: reference.to_string(),
        })
}

/// `ln(...)` with no parentheses inside.
fn is_ln_call(src: &[u8]) -> bool {
    src.starts_with(b"ln(")
        && src.ends_with(b")")
        && src[3..src.len() - 1]
            .iter()
            .all(|&c| c != b'(' && c != b')')
}

/// An optionally negative run of digits.
fn is_integer(src: &[u8]) -> bool {
    let start = reduce::optional(src, 0, b'-');
    reduce::digits(src, start) == Some(src.len())
}

/// `operand OP operand`, where the operands may be negated if `signed` is
/// set, returning the index of the operator.
fn binary_shape(src: &[u8], op: u8, signed: bool) -> Option<usize> {
    let sign = |index| {
        if signed {
            reduce::optional(src, index, b'-')
        } else {
            index
        }
    };

    let op_index = reduce::operand(src, sign(0))?;
    let right = reduce::expect(src, op_index, op)?;

    if reduce::operand(src, sign(right))? == src.len() {
        Some(op_index)
    } else {
        None
    }
}

/// `[i][j]`, returning where the second placeholder starts.
fn adjacent_placeholders(src: &[u8]) -> Option<usize> {
    let second = reduce::placeholder(src, 0)?;

    if reduce::placeholder(src, second)? == src.len() {
        Some(second)
    } else {
        None
    }
}

/// A single letter or an integer (optionally negated), then an optional
/// `*`, then a placeholder (`2[1]`, `-x[1]`), returning where the
/// placeholder starts.
fn factor_before_placeholder(src: &[u8]) -> Option<usize> {
    let start = reduce::optional(src, 0, b'-');

    let factor_end = match src.get(start) {
        Some(c) if c.is_ascii_alphabetic() => start + 1,
        _ => reduce::digits(src, start)?,
    };
    let bracket = reduce::optional(src, factor_end, b'*');

    if reduce::placeholder(src, bracket)? == src.len() {
        Some(bracket)
    } else {
        None
    }
}

/// An integer or placeholder (optionally negated), then an optional `*`,
/// then a run of letters (`2x`, `[1]abc`), returning where the letters
/// start.
fn factor_before_letters(src: &[u8]) -> Option<usize> {
    let start = reduce::optional(src, 0, b'-');

    let factor_end = reduce::digits(src, start)
        .or_else(|| reduce::placeholder(src, start))?;
    let letters = reduce::optional(src, factor_end, b'*');

    if reduce::letters(src, letters)? == src.len() {
        Some(letters)
    } else {
        None
    }
}
