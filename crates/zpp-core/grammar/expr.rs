//! Expression/statement grammar (spec §4.3), grounded on
//! `std_rules.hpp`'s `expression`/`statement`/`paren_expression`/
//! `init_list` rules.
//!
//! The original composes these from `argument % operator_sep`, a full
//! operator-precedence-free sequence grammar. We keep the same shape
//! (sequence of arguments separated by operators) but capture the
//! matched span as raw text rather than building an operator tree,
//! since nothing downstream of the driver evaluates expressions —
//! spec §3 stores expressions as opaque text on `CodeFragment::Expression`.

use nom::bytes::complete::take_while1;
use nom::character::complete::char;
use nom::combinator::recognize;
use nom::multi::many0;
use nom::sequence::{delimited, pair};
use nom::IResult;

use crate::grammar::tokens::optionaly_space;

fn is_top_level_atom_char(c: char) -> bool {
  !matches!(c, '(' | ')' | '{' | '}' | ';' | ',')
}

fn is_nested_atom_char(c: char) -> bool {
  !matches!(c, '(' | ')' | '{' | '}')
}

/// A single `()`-delimited group, recursively containing balanced
/// content — `paren_expression`. Commas are part of the nested content
/// (argument separators live inside the group, not at this grammar's
/// level), they only terminate an `expression` at the top level.
fn paren_group(input: &str) -> IResult<&str, &str> {
  recognize(delimited(char('('), many0(nested_piece), char(')')))(input)
}

/// A single `{}`-delimited group — `init_list`.
fn brace_group(input: &str) -> IResult<&str, &str> {
  recognize(delimited(char('{'), many0(nested_piece), char('}')))(input)
}

fn nested_piece(input: &str) -> IResult<&str, &str> {
  nom::branch::alt((paren_group, brace_group, take_while1(is_nested_atom_char)))(input)
}

fn balanced_piece(input: &str) -> IResult<&str, &str> {
  nom::branch::alt((paren_group, brace_group, take_while1(is_top_level_atom_char)))(input)
}

/// `expression`: a run of balanced text up to (but not including) the
/// statement terminator `;`, a scope delimiter, or a comma at the
/// current nesting depth.
pub fn expression(input: &str) -> IResult<&str, &str> {
  recognize(many0(balanced_piece))(input)
}

/// `init_list`: a single top-level `{...}` group — `{1, {2, 3}}`.
pub fn init_list(input: &str) -> IResult<&str, &str> {
  brace_group(input)
}

/// `statement`: `optionaly_space >> expression >> statement_end`.
pub fn statement(input: &str) -> IResult<&str, &str> {
  recognize(pair(optionaly_space, pair(expression, pair(optionaly_space, char(';')))))(input)
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn parses_call_expression() {
    let (rest, text) = expression("foo(a, b) + 1;").unwrap();
    assert_eq!(rest, ";");
    assert_eq!(text, "foo(a, b) + 1");
  }

  #[test]
  fn parses_statement_with_terminator() {
    let (rest, text) = statement("x = y + 1 ;").unwrap();
    assert_eq!(rest, "");
    assert!(text.trim_end().ends_with(';'));
  }

  #[test]
  fn handles_nested_braces() {
    let (rest, text) = expression("Foo{1, {2, 3}}, next").unwrap();
    assert_eq!(rest, ", next");
    assert_eq!(text, "Foo{1, {2, 3}}");
  }
}
