//! The S-expression reader.
//!
//! Concrete syntax is a flat sequence of forms: atoms (integers, reals,
//! booleans, strings, symbols) and parenthesized lists. `#` starts a comment
//! running to the end of the line. Atoms are classified lexically: a token
//! is a number if it looks like one, `true`/`false` are booleans, and
//! everything else is a symbol. Symbols stay as plain strings here; interning
//! happens during lowering, which owns the universe.

use winnow::{
    PResult, Parser,
    ascii::{escaped_transform, multispace1, till_line_ending},
    combinator::{alt, cut_err, delimited, preceded, repeat, terminated},
    token::{take_till, take_while},
};

/// A concrete-syntax S-expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Sexpr {
    Symbol(String),
    Int(i64),
    Real(f64),
    Bool(bool),
    Str(String),
    List(Vec<Sexpr>),
}

/// A reader failure, carrying the 1-based line that contains the offending
/// byte.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("parse error on line {line}: {snippet}")]
pub struct ReadError {
    pub line: usize,
    pub snippet: String,
}

/// Parses an entire input as a sequence of top-level forms.
pub fn parse_forms(input: &str) -> Result<Vec<Sexpr>, ReadError> {
    match forms.parse(input) {
        Ok(forms) => Ok(forms),
        Err(error) => Err(read_error(input, error.offset())),
    }
}

fn read_error(input: &str, offset: usize) -> ReadError {
    let upto = &input[..offset.min(input.len())];
    let line = upto.matches('\n').count() + 1;

    let start = upto.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let end = input[start..]
        .find('\n')
        .map(|i| start + i)
        .unwrap_or(input.len());

    ReadError {
        line,
        snippet: input[start..end].to_string(),
    }
}

fn forms(input: &mut &str) -> PResult<Vec<Sexpr>> {
    terminated(repeat(0.., form), skip).parse_next(input)
}

fn form(input: &mut &str) -> PResult<Sexpr> {
    preceded(skip, alt((list, string, atom))).parse_next(input)
}

/// Consumes whitespace and `#` comments.
fn skip(input: &mut &str) -> PResult<()> {
    repeat(0.., alt((multispace1.void(), comment))).parse_next(input)
}

fn comment(input: &mut &str) -> PResult<()> {
    ('#', till_line_ending).void().parse_next(input)
}

fn list(input: &mut &str) -> PResult<Sexpr> {
    delimited('(', repeat(0.., form), preceded(skip, cut_err(')')))
        .map(Sexpr::List)
        .parse_next(input)
}

fn string(input: &mut &str) -> PResult<Sexpr> {
    delimited('"', string_contents, cut_err('"'))
        .map(Sexpr::Str)
        .parse_next(input)
}

fn string_contents(input: &mut &str) -> PResult<String> {
    escaped_transform(
        take_till(1.., ['\\', '"']),
        '\\',
        alt((
            "\\".value("\\"), // BACKSLASH
            "\"".value("\""), // DOUBLE QUOTE
            "n".value("\n"),  // NEWLINE (LINE FEED)
            "r".value("\r"),  // CARRIAGE RETURN
            "t".value("\t"),  // HORIZONTAL TAB
            "0".value("\0"),  // ASCII NULL
        )),
    )
    .parse_next(input)
}

fn atom(input: &mut &str) -> PResult<Sexpr> {
    take_while(1.., |c: char| !is_delimiter(c))
        .verify_map(classify)
        .parse_next(input)
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace()
        || c.is_control()
        || matches!(c, '(' | ')' | '"' | '#' | ';')
}

fn classify(token: &str) -> Option<Sexpr> {
    match token {
        "true" => Some(Sexpr::Bool(true)),
        "false" => Some(Sexpr::Bool(false)),
        _ => {
            if let Ok(value) = token.parse::<i64>() {
                Some(Sexpr::Int(value))
            } else if looks_numeric(token) {
                // numeric shape but not an integer: a real, or junk
                token.parse::<f64>().ok().map(Sexpr::Real)
            } else {
                Some(Sexpr::Symbol(token.to_string()))
            }
        }
    }
}

fn looks_numeric(token: &str) -> bool {
    let digits = token.strip_prefix(['+', '-']).unwrap_or(token);
    digits.chars().next().is_some_and(|c| c.is_ascii_digit())
}
