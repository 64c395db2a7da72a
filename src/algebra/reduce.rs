//! Flattening nested text into placeholders.
//!
//! The reducer repeatedly finds the highest priority sub-expression still
//! present in a string, moves its text into a [`PlaceholderTable`], and
//! replaces it with `[index]`. After every replacement the cascade restarts
//! from the top, so `ln(...)` and parenthesised groups are always collapsed
//! before any arithmetic, and `*`/`/` before `+`/`-`.
//!
//! An *operand* in the patterns below is a run of letters, a run of digits,
//! or a placeholder reference:
//!
//! ```text
//! operand := [a-zA-Z]+ | [0-9]+ | "[" [0-9]+ "]"
//! ```

use std::ops::Range;

/// An ordered, append-only list of the fragments replaced while reducing.
///
/// A fragment may mention `[i]` for any `i` smaller than its own index, but
/// never a later one.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct PlaceholderTable {
    fragments: Vec<String>,
}

impl PlaceholderTable {
    /// A table whose first entry is the original text.
    pub(crate) fn seeded(src: &str) -> Self {
        PlaceholderTable {
            fragments: vec![src.to_string()],
        }
    }

    pub(crate) fn push(&mut self, fragment: String) -> usize {
        self.fragments.push(fragment);
        self.fragments.len() - 1
    }

    pub(crate) fn get(&self, index: usize) -> Option<&str> {
        self.fragments.get(index).map(|s| s.as_str())
    }

    pub(crate) fn len(&self) -> usize { self.fragments.len() }
}

/// Try to match a pattern starting at some index, returning where the match
/// ends.
type Pattern = fn(&[u8], usize) -> Option<usize>;

/// The precedence cascade, highest priority first.
const TIERS: &[(&str, Pattern)] = &[
    ("ln", natural_log),
    ("parentheses", parentheses),
    ("unary minus", unary_minus),
    ("power", power),
    ("multiply/divide", multiply_divide),
    ("implicit multiply", implicit_multiply),
    ("add/subtract", add_subtract),
];

/// Reduce `src` until no pattern matches, returning whatever is left over.
///
/// This never fails. Text that can't be reduced any further is handed back
/// as-is and it's up to the tree builder to decide whether it makes sense.
pub(crate) fn reduce(src: &str, table: &mut PlaceholderTable) -> String {
    let mut current = src.to_string();

    'cascade: loop {
        for (name, pattern) in TIERS {
            if let Some(span) = leftmost(current.as_bytes(), *pattern) {
                let fragment = current[span.clone()].to_string();
                let index = table.push(fragment);
                tracing::trace!(
                    tier = *name,
                    fragment = %&current[span.clone()],
                    index,
                    "Reduced"
                );

                current.replace_range(span, &format!("[{}]", index));
                continue 'cascade;
            }
        }

        return current;
    }
}

fn leftmost(src: &[u8], pattern: Pattern) -> Option<Range<usize>> {
    (0..src.len()).find_map(|start| pattern(src, start).map(|end| start..end))
}

/// `ln(...)` with no parentheses inside.
fn natural_log(src: &[u8], start: usize) -> Option<usize> {
    if src[start..].starts_with(b"ln") {
        parentheses(src, start + 2)
    } else {
        None
    }
}

/// `(...)` with no parentheses inside.
fn parentheses(src: &[u8], start: usize) -> Option<usize> {
    let mut cursor = expect(src, start, b'(')?;

    loop {
        match src.get(cursor)? {
            b')' => return Some(cursor + 1),
            b'(' => return None,
            _ => cursor += 1,
        }
    }
}

/// A `-` directly in front of an operand, where the `-` is at the start of
/// the string or follows another operator.
///
/// The operand may not be followed by `^` (so `-x^2` is `-(x^2)`). When a
/// run of letters or digits is followed by `^`, shorter prefixes of the run
/// are tried, so `-ab^2` matches `-a`.
fn unary_minus(src: &[u8], start: usize) -> Option<usize> {
    let follows_operator = start == 0 || is_operator(src[start - 1]);
    if !follows_operator {
        return None;
    }

    let operand_start = expect(src, start, b'-')?;
    let not_before_power = |end: usize| src.get(end) != Some(&b'^');

    if let Some(end) = placeholder(src, operand_start) {
        return Some(end).filter(|&end| not_before_power(end));
    }

    let longest = letters(src, operand_start)
        .or_else(|| digits(src, operand_start))?;

    (operand_start + 1..=longest)
        .rev()
        .find(|&end| not_before_power(end))
}

/// `operand^operand`
fn power(src: &[u8], start: usize) -> Option<usize> {
    let caret = operand(src, start)?;
    operand(src, expect(src, caret, b'^')?)
}

/// `operand*operand`, `operand/operand`, or an operand immediately
/// followed by a placeholder (`2[1]`, `x[1]`, `[0][1]`).
fn multiply_divide(src: &[u8], start: usize) -> Option<usize> {
    let left = operand(src, start)?;

    match src.get(left) {
        Some(b'*') | Some(b'/') => operand(src, left + 1),
        _ => placeholder(src, left),
    }
}

/// An integer or placeholder followed by a single letter (`2x`, `[3]y`).
fn implicit_multiply(src: &[u8], start: usize) -> Option<usize> {
    let left = digits(src, start).or_else(|| placeholder(src, start))?;

    match src.get(left) {
        Some(c) if c.is_ascii_alphabetic() => Some(left + 1),
        _ => None,
    }
}

/// `operand+operand` or `operand-operand`
fn add_subtract(src: &[u8], start: usize) -> Option<usize> {
    let left = operand(src, start)?;

    match src.get(left) {
        Some(b'+') | Some(b'-') => operand(src, left + 1),
        _ => None,
    }
}

pub(crate) fn is_operator(c: u8) -> bool {
    matches!(c, b'+' | b'-' | b'*' | b'/' | b'^')
}

/// Consume a specific byte.
pub(crate) fn expect(src: &[u8], index: usize, expected: u8) -> Option<usize> {
    if src.get(index) == Some(&expected) {
        Some(index + 1)
    } else {
        None
    }
}

/// Consume a byte if it's there.
pub(crate) fn optional(src: &[u8], index: usize, expected: u8) -> usize {
    expect(src, index, expected).unwrap_or(index)
}

pub(crate) fn operand(src: &[u8], start: usize) -> Option<usize> {
    letters(src, start)
        .or_else(|| digits(src, start))
        .or_else(|| placeholder(src, start))
}

pub(crate) fn letters(src: &[u8], start: usize) -> Option<usize> {
    take_while(src, start, |c| c.is_ascii_alphabetic())
}

pub(crate) fn digits(src: &[u8], start: usize) -> Option<usize> {
    take_while(src, start, |c| c.is_ascii_digit())
}

/// `[index]`
pub(crate) fn placeholder(src: &[u8], start: usize) -> Option<usize> {
    let index_start = expect(src, start, b'[')?;
    let index_end = digits(src, index_start)?;
    expect(src, index_end, b']')
}

/// Consume a non-empty run of bytes matching the predicate.
fn take_while<P>(src: &[u8], start: usize, predicate: P) -> Option<usize>
where
    P: Fn(u8) -> bool,
{
    let len = src
        .get(start..)?
        .iter()
        .take_while(|&&c| predicate(c))
        .count();

    if len > 0 {
        Some(start + len)
    } else {
        None
    }
}
