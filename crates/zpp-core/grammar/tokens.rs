//! Lexical-level grammar rules (spec §4.3): whitespace, comments,
//! identifiers, numbers, string/char literals.
//!
//! Grounded on `include/std_rules.hpp`'s `some_space`/`optionaly_space`/
//! `name`/`digits`/`number`/`string_literal`/`char_literal` rules.

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while, take_while1};
use nom::character::complete::{alpha1, char, digit1, one_of};
use nom::combinator::{opt, recognize};
use nom::multi::many0;
use nom::sequence::{pair, preceded, tuple};
use nom::IResult;

fn is_space_char(c: char) -> bool {
  c == ' ' || c == '\t' || c == '\n' || c == '\r'
}

/// `optionaly_space`: zero or more whitespace characters.
pub fn optionaly_space(input: &str) -> IResult<&str, &str> {
  take_while(is_space_char)(input)
}

/// `some_space`: one or more whitespace characters.
pub fn some_space(input: &str) -> IResult<&str, &str> {
  take_while1(is_space_char)(input)
}

/// A single-line `//` comment or block `/* ... */` comment, with
/// leading optional space consumed (`std_rules.hpp::comment`).
pub fn comment(input: &str) -> IResult<&str, &str> {
  preceded(
    optionaly_space,
    alt((recognize(pair(tag("//"), take_while(|c| c != '\n'))), recognize(block_comment))),
  )(input)
}

fn block_comment(input: &str) -> IResult<&str, &str> {
  let (rest, _) = tag("/*")(input)?;
  match rest.find("*/") {
    Some(idx) => Ok((&rest[idx + 2..], &input[..input.len() - rest.len() + idx + 2])),
    None => Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Tag))),
  }
}

/// `name`: a C++-style identifier, `(alpha|_)(alnum|_)*`.
pub fn identifier(input: &str) -> IResult<&str, &str> {
  recognize(pair(alt((alpha1, recognize(char('_')))), many0(alt((alpha1, digit1, recognize(char('_')))))))(input)
}

/// `name >> *("::" >> name)`: a scoped path.
pub fn scoped_name(input: &str) -> IResult<&str, Vec<String>> {
  let (input, first) = identifier(input)?;
  let (input, rest) = many0(preceded(tag("::"), identifier))(input)?;
  let mut path = vec![first.to_string()];
  path.extend(rest.into_iter().map(String::from));
  Ok((input, path))
}

/// `digits`: an optional leading `-`, then digits, tolerating `'`
/// separators (`1'000'000`).
pub fn digits(input: &str) -> IResult<&str, &str> {
  recognize(tuple((
    opt(char('-')),
    optionaly_space,
    digit1,
    many0(preceded(char('\''), digit1)),
  )))(input)
}

/// `number`: `floating | integral`, both rooted in `digits`.
pub fn number(input: &str) -> IResult<&str, &str> {
  recognize(alt((
    recognize(tuple((digits, char('.'), opt(digit1), opt(alt((tag("f"), tag("F"), tag("l"), tag("L"))))))),
    recognize(pair(
      digits,
      opt(alt((
        tag("LLU"), tag("LLu"), tag("llU"), tag("llu"), tag("LU"), tag("lU"), tag("Lu"), tag("lu"), tag("LL"),
        tag("ll"), tag("U"), tag("u"), tag("L"), tag("l"),
      ))),
    )),
  )))(input)
}

/// `scope_begin`: an opening `{`, used everywhere a container (class,
/// function, scope, enum, namespace) is pushed onto the parser stack.
pub fn scope_begin(input: &str) -> IResult<&str, &str> {
  recognize(pair(optionaly_space, char('{')))(input)
}

/// `scope_end`: a closing `}`, with an optional trailing `;` (class and
/// enum bodies require it as a matter of grammar; function/scope bodies
/// don't but tolerate it harmlessly).
pub fn scope_end(input: &str) -> IResult<&str, &str> {
  recognize(tuple((optionaly_space, char('}'), optionaly_space, opt(char(';')))))(input)
}

/// `scope_end` with the trailing `;` mandatory — the span the
/// reflection expander and meta-class driver race the std parser for
/// (spec §4.4, §4.5).
pub fn scope_end_with_semicolon(input: &str) -> IResult<&str, &str> {
  recognize(tuple((optionaly_space, char('}'), optionaly_space, char(';'))))(input)
}

/// `statement_end`: a bare `;`.
pub fn statement_end(input: &str) -> IResult<&str, &str> {
  recognize(pair(optionaly_space, char(';')))(input)
}

/// `string_literal`: `"..."`, no escape handling (matches the
/// original's own TODO: "add support for escaped \" inside string").
pub fn string_literal(input: &str) -> IResult<&str, &str> {
  recognize(tuple((char('"'), take_while(|c| c != '"'), char('"'))))(input)
}

/// `char_literal`: `'x'`.
pub fn char_literal(input: &str) -> IResult<&str, &str> {
  recognize(tuple((char('\''), one_of_not_quote, char('\''))))(input)
}

fn one_of_not_quote(input: &str) -> IResult<&str, char> {
  nom::character::complete::none_of("'")(input)
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn parses_identifiers() {
    assert_eq!(identifier("_foo123 bar").unwrap(), (" bar", "_foo123"));
  }

  #[test]
  fn parses_scoped_names() {
    assert_eq!(scoped_name("std::vector<").unwrap(), ("<", vec!["std".into(), "vector".into()]));
  }

  #[test]
  fn parses_numbers() {
    assert_eq!(number("3.14f;").unwrap(), (";", "3.14f"));
    assert_eq!(number("1'000LLU,").unwrap(), (",", "1'000LLU"));
  }

  #[test]
  fn strips_line_comment() {
    let (rest, _) = comment("  // hi\nnext").unwrap();
    assert_eq!(rest, "\nnext");
  }
}
