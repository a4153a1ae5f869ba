//! `type`/`var_type`/`template_values` grammar rules (spec §4.3),
//! grounded on `include/std_rules.hpp`'s `type_def`/`var_type_def`/
//! `template_values_def`.

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::{map, opt};
use nom::multi::{many0, separated_list1};
use nom::sequence::{delimited, pair, preceded, tuple};
use nom::IResult;

use crate::grammar::tokens::{digits, identifier, optionaly_space, scoped_name, some_space};
use crate::types::ast::{LeftQualifier, RightQualifier, TemplateArg, Type};

fn left_qualifiers(input: &str) -> IResult<&str, Vec<LeftQualifier>> {
  let (input, constexpr) = opt(pair(tag("constexpr"), some_space))(input)?;
  let (input, const_) = opt(pair(tag("const"), some_space))(input)?;
  let mut out = Vec::new();
  if constexpr.is_some() {
    out.push(LeftQualifier::Constexpr);
  }
  if const_.is_some() {
    out.push(LeftQualifier::Const);
  }
  Ok((input, out))
}

fn template_values(input: &str) -> IResult<&str, Vec<TemplateArg>> {
  delimited(
    pair(char('<'), optionaly_space),
    separated_list1(
      tuple((optionaly_space, char(','), optionaly_space)),
      alt((map(ty, TemplateArg::Type), map(digits, |d: &str| TemplateArg::Number(d.to_string())))),
    ),
    char('>'),
  )(input)
}

/// `var_type`: a scoped name plus optional template argument list, with
/// no left/right qualifiers.
pub fn var_type(input: &str) -> IResult<&str, (Vec<String>, Vec<TemplateArg>)> {
  let (input, path) = scoped_name(input)?;
  let (input, args) = opt(preceded(optionaly_space, template_values))(input)?;
  Ok((input, (path, args.unwrap_or_default())))
}

fn right_qualifiers(input: &str) -> IResult<&str, Vec<RightQualifier>> {
  let (input, _) = opt(tuple((opt(some_space), opt(tag("const")), optionaly_space)))(input)?;
  alt((
    map(pair(char('&'), opt(preceded(optionaly_space, char('&')))), |(_, second)| {
      if second.is_some() {
        vec![RightQualifier::RValueRef]
      } else {
        vec![RightQualifier::Ref]
      }
    }),
    many0(map(
      preceded(optionaly_space, pair(char('*'), opt(preceded(some_space, tag("const"))))),
      |(_, c)| RightQualifier::Pointer { is_const: c.is_some() },
    )),
  ))(input)
}

/// `type`: `-constexpr -const var_type -(&|&&|*+)`.
pub fn ty(input: &str) -> IResult<&str, Type> {
  let (input, left_qualifiers) = left_qualifiers(input)?;
  let (input, (path, template_args)) = var_type(input)?;
  let (input, right_qualifiers) = right_qualifiers(input)?;
  Ok((input, Type { left_qualifiers, path, template_args, right_qualifiers }))
}

/// Unused standalone identifier parser kept for symmetry with
/// `std_rules.hpp::type_`, which grammar/decl.rs reuses for plain
/// (non-templated) scoped names such as base-class lists without
/// arguments.
pub fn bare_identifier(input: &str) -> IResult<&str, &str> {
  identifier(input)
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn parses_simple_type() {
    let (rest, t) = ty("int x").unwrap();
    assert_eq!(rest, " x");
    assert_eq!(t.path, vec!["int".to_string()]);
    assert!(t.left_qualifiers.is_empty());
  }

  #[test]
  fn parses_const_ref() {
    let (_, t) = ty("const std::string &name").unwrap();
    assert_eq!(t.left_qualifiers, vec![LeftQualifier::Const]);
    assert_eq!(t.path, vec!["std".to_string(), "string".to_string()]);
    assert_eq!(t.right_qualifiers, vec![RightQualifier::Ref]);
  }

  #[test]
  fn parses_templated_type() {
    let (_, t) = ty("std::vector<int>").unwrap();
    assert_eq!(t.path, vec!["std".to_string(), "vector".to_string()]);
    assert_eq!(t.template_args.len(), 1);
  }

  #[test]
  fn parses_pointer_chain() {
    let (_, t) = ty("char**").unwrap();
    assert_eq!(t.right_qualifiers.len(), 2);
  }
}
