//! Declaration-level grammar rules (spec §4.3): `var`, `param`,
//! `template_parameters`, `function_signiture`/`operator_signiture`,
//! `class_or_struct`, an enum header, `for_loop`, `if_expression`.
//!
//! Grounded on `include/std_rules.hpp`'s rules of the same name.

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::{opt, recognize};
use nom::multi::separated_list1;
use nom::sequence::{pair, preceded, terminated, tuple};
use nom::IResult;

use crate::grammar::expr::{expression, init_list};
use crate::grammar::tokens::{identifier, optionaly_space, scoped_name, some_space};
use crate::grammar::types::ty;
use crate::types::ast::{
  AccessModifier, ClassType, ConstructorKind, EnumType, Function, LeftQualifier, RefQualifier, TemplateParameter,
  TemplateParameters, Type, Variable,
};
use crate::types::error::PpError;

fn arg_separator(input: &str) -> IResult<&str, ()> {
  let (input, _) = tuple((optionaly_space, char(','), optionaly_space))(input)?;
  Ok((input, ()))
}

/// `param`: `type some_space name`.
pub fn param(input: &str) -> IResult<&str, Variable> {
  let (input, ty) = ty(input)?;
  let (input, _) = some_space(input)?;
  let (input, name) = identifier(input)?;
  Ok((input, Variable { ty, name: Some(name.to_string()) }))
}

/// `optional_param`: `type -(some_space name)`.
pub fn optional_param(input: &str) -> IResult<&str, Variable> {
  let (input, ty) = ty(input)?;
  let (input, name) = opt(preceded(some_space, identifier))(input)?;
  Ok((input, Variable { ty, name: name.map(String::from) }))
}

/// `var`: `param -(= expression | init_list) ;`. The original also
/// supports a bare `{...}` initializer with no `=`; we accept either
/// but discard the initializer text (only the declared shape matters
/// downstream).
pub fn var(input: &str) -> IResult<&str, Variable> {
  let (input, v) = param(input)?;
  let (input, _) = optionaly_space(input)?;
  let (input, _init) = opt(alt((
    preceded(tuple((char('='), optionaly_space)), expression),
    preceded(opt(tuple((char('='), optionaly_space))), init_list),
  )))(input)?;
  let (input, _) = optionaly_space(input)?;
  let (input, _) = char(';')(input)?;
  Ok((input, v))
}

fn template_parameter(input: &str) -> IResult<&str, TemplateParameter> {
  let (input, constraint_ty) = ty(input)?;
  let (input, _) = some_space(input)?;
  let (input, name) = identifier(input)?;
  // spec/SPEC_FULL Decision 1: default template arguments are parsed
  // (so the declaration round-trips) then discarded.
  let (input, _default) = opt(preceded(
    tuple((optionaly_space, char('='), optionaly_space)),
    alt((recognize(ty), crate::grammar::tokens::digits)),
  ))(input)?;
  Ok((input, TemplateParameter { constraint: constraint_ty.path, name: name.to_string() }))
}

/// `template_parameters`: `"template" < template_parameter % ',' >`.
/// Variadic packs (`...name`) are rejected per Decision 1.
pub fn template_parameters(input: &str) -> IResult<&str, TemplateParameters> {
  let (input, _) = tag("template")(input)?;
  let (input, _) = optionaly_space(input)?;
  let (input, _) = char('<')(input)?;
  let (input, _) = optionaly_space(input)?;
  let (input, params) = separated_list1(arg_separator, template_parameter)(input)?;
  let (input, _) = optionaly_space(input)?;
  let (input, _) = char('>')(input)?;
  Ok((input, TemplateParameters { params }))
}

/// Checked wrapper raising `PpError::ParseUnrecoverable` if the raw
/// template-parameter text contains an ellipsis, since nom's grammar
/// above has no representation for variadics to reject structurally.
pub fn reject_variadic(raw: &str) -> Result<(), PpError> {
  if raw.contains("...") {
    return Err(PpError::ParseUnrecoverable {
      file: String::new(),
      row: 0,
      col: 0,
      context: "variadic template parameters are not supported".into(),
    });
  }
  Ok(())
}

fn optionaly_params(input: &str) -> IResult<&str, Vec<Variable>> {
  let (input, params) = opt(separated_list1(arg_separator, param_with_default))(input)?;
  Ok((input, params.unwrap_or_default()))
}

fn param_with_default(input: &str) -> IResult<&str, Variable> {
  let (input, v) = optional_param(input)?;
  let (input, _) = opt(preceded(
    tuple((optionaly_space, char('='), optionaly_space)),
    alt((expression, crate::grammar::tokens::identifier)),
  ))(input)?;
  Ok((input, v))
}

const OPERATOR_TOKENS: &[&str] = &[
  "+=", "++", "+", "-=", "->*", "->", "--", "-", "*=", "*", "/=", "/", "%=", "%", ">>=", ">>", ">=", ">", "<<=",
  "<<", "<=", "<", "&&", "&=", "&", "||", "|=", "|", "~=", "~", "^=", "^", "!=", "!", "==", "=",
];

fn all_overloadable_operators(input: &str) -> IResult<&str, &str> {
  alt((
    alt((tag(OPERATOR_TOKENS[0]), tag(OPERATOR_TOKENS[1]), tag(OPERATOR_TOKENS[2]), tag(OPERATOR_TOKENS[3]), tag(OPERATOR_TOKENS[4]))),
    alt((tag(OPERATOR_TOKENS[5]), tag(OPERATOR_TOKENS[6]), tag(OPERATOR_TOKENS[7]), tag(OPERATOR_TOKENS[8]), tag(OPERATOR_TOKENS[9]))),
    alt((tag(OPERATOR_TOKENS[10]), tag(OPERATOR_TOKENS[11]), tag(OPERATOR_TOKENS[12]), tag(OPERATOR_TOKENS[13]), tag(OPERATOR_TOKENS[14]))),
    alt((tag(OPERATOR_TOKENS[15]), tag(OPERATOR_TOKENS[16]), tag(OPERATOR_TOKENS[17]), tag(OPERATOR_TOKENS[18]), tag(OPERATOR_TOKENS[19]))),
    alt((tag(OPERATOR_TOKENS[20]), tag(OPERATOR_TOKENS[21]), tag(OPERATOR_TOKENS[22]), tag(OPERATOR_TOKENS[23]), tag(OPERATOR_TOKENS[24]))),
    alt((tag(OPERATOR_TOKENS[25]), tag(OPERATOR_TOKENS[26]), tag(OPERATOR_TOKENS[27]), tag(OPERATOR_TOKENS[28]), tag(OPERATOR_TOKENS[29]))),
    alt((tag(OPERATOR_TOKENS[30]), tag(OPERATOR_TOKENS[31]), tag(OPERATOR_TOKENS[32]), tag(OPERATOR_TOKENS[33]))),
    recognize(pair(char('('), preceded(optionaly_space, char(')')))),
    recognize(pair(char('['), preceded(optionaly_space, char(']')))),
  ))(input)
}

/// `function_signiture`: `-template_parameters type some_space name ( optionaly_params )`.
pub fn function_signature(input: &str) -> IResult<&str, Function> {
  let (input, template_parameters) = opt(terminated(template_parameters, optionaly_space))(input)?;
  let (input, return_type) = ty(input)?;
  let (input, _) = some_space(input)?;
  let (input, name) = identifier(input)?;
  let (input, _) = optionaly_space(input)?;
  let (input, _) = char('(')(input)?;
  let (input, _) = optionaly_space(input)?;
  let (input, parameters) = optionaly_params(input)?;
  let (input, _) = char(')')(input)?;
  let (input, (is_const, ref_qualifier, is_override)) = trailing_qualifiers(input)?;
  let is_constexpr = return_type.left_qualifiers.contains(&LeftQualifier::Constexpr);
  Ok((
    input,
    Function {
      template_parameters: template_parameters.unwrap_or_default(),
      is_virtual: false,
      is_constexpr,
      constructor_kind: ConstructorKind::None,
      return_type: Some(return_type),
      name: name.to_string(),
      operator_token: None,
      parameters,
      is_const,
      ref_qualifier,
      is_override,
    },
  ))
}

/// `operator_signiture`: `-template_parameters type some_space "operator" all_overloadable_operators ( optionaly_params )`.
pub fn operator_signature(input: &str) -> IResult<&str, Function> {
  let (input, template_parameters) = opt(terminated(template_parameters, optionaly_space))(input)?;
  let (input, return_type) = ty(input)?;
  let (input, _) = some_space(input)?;
  let (input, _) = tag("operator")(input)?;
  let (input, _) = optionaly_space(input)?;
  let (input, op) = all_overloadable_operators(input)?;
  let (input, _) = optionaly_space(input)?;
  let (input, _) = char('(')(input)?;
  let (input, _) = optionaly_space(input)?;
  let (input, parameters) = optionaly_params(input)?;
  let (input, _) = char(')')(input)?;
  let (input, (is_const, ref_qualifier, is_override)) = trailing_qualifiers(input)?;
  let is_constexpr = return_type.left_qualifiers.contains(&LeftQualifier::Constexpr);
  Ok((
    input,
    Function {
      template_parameters: template_parameters.unwrap_or_default(),
      is_virtual: false,
      is_constexpr,
      constructor_kind: ConstructorKind::None,
      return_type: Some(return_type),
      name: format!("operator{op}"),
      operator_token: Some(op.to_string()),
      parameters,
      is_const,
      ref_qualifier,
      is_override,
    },
  ))
}

fn trailing_qualifiers(input: &str) -> IResult<&str, (bool, Option<RefQualifier>, bool)> {
  let (input, _) = optionaly_space(input)?;
  let (input, is_const) = opt(tag("const"))(input)?;
  let (input, _) = optionaly_space(input)?;
  let (input, ref_q) = opt(alt((
    nom::combinator::value(RefQualifier::RValue, tag("&&")),
    nom::combinator::value(RefQualifier::LValue, tag("&")),
  )))(input)?;
  let (input, _) = optionaly_space(input)?;
  let (input, is_override) = opt(tag("override"))(input)?;
  Ok((input, (is_const.is_some(), ref_q, is_override.is_some())))
}

/// A constructor or destructor signature: `Name(params)` or `~Name(params)`,
/// matched against the enclosing class's own name by the driver (the
/// grammar layer only recognizes the shape, per `std_rules.hpp`'s
/// separate `constructor`/`method_signiture` rules, which we fold into
/// one parser parameterized by the expected name).
pub fn constructor_or_destructor(input: &str, class_name: &str) -> IResult<&str, Function> {
  let (input, is_dtor) = opt(char('~'))(input)?;
  let (input, name) = identifier(input)?;
  if name != class_name {
    return Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Tag)));
  }
  let (input, _) = optionaly_space(input)?;
  let (input, _) = char('(')(input)?;
  let (input, _) = optionaly_space(input)?;
  let (input, parameters) = optionaly_params(input)?;
  let (input, _) = char(')')(input)?;
  Ok((
    input,
    Function {
      template_parameters: TemplateParameters::default(),
      is_virtual: false,
      is_constexpr: false,
      constructor_kind: if is_dtor.is_some() { ConstructorKind::Dtor } else { ConstructorKind::Ctor },
      return_type: None,
      name: name.to_string(),
      operator_token: None,
      parameters,
      is_const: false,
      ref_qualifier: None,
      is_override: false,
    },
  ))
}

fn class_type_keyword(input: &str) -> IResult<&str, ClassType> {
  alt((
    nom::combinator::value(ClassType::Class, tag("class")),
    nom::combinator::value(ClassType::Struct, tag("struct")),
    nom::combinator::value(ClassType::MetaClass, tag("meta class")),
  ))(input)
}

/// `class_or_struct`: `-template_parameters (class|struct) some_space name -(class_inheritances)`.
/// Returns `(class_type, name, template_parameters, bases)`. Base
/// access modifiers are parsed but resolved by the driver, since the
/// driver owns `add_base`'s `AccessModifier` mapping.
pub fn class_header(
  input: &str,
) -> IResult<&str, (ClassType, String, TemplateParameters, Vec<(Option<AccessModifier>, Type)>)> {
  let (input, template_parameters) = opt(terminated(template_parameters, optionaly_space))(input)?;
  let (input, class_type) = class_type_keyword(input)?;
  let (input, _) = some_space(input)?;
  let (input, name) = identifier(input)?;
  let (input, bases) = opt(preceded(optionaly_space, class_inheritances))(input)?;
  Ok((input, (class_type, name.to_string(), template_parameters.unwrap_or_default(), bases.unwrap_or_default())))
}

fn access_modifier_keyword(input: &str) -> IResult<&str, AccessModifier> {
  alt((
    nom::combinator::value(AccessModifier::Public, tag("public")),
    nom::combinator::value(AccessModifier::Protected, tag("protected")),
    nom::combinator::value(AccessModifier::Private, tag("private")),
  ))(input)
}

fn class_inheritance(input: &str) -> IResult<&str, (Option<AccessModifier>, Type)> {
  let (input, modifier) = opt(terminated(access_modifier_keyword, some_space))(input)?;
  let (input, (path, template_args)) = crate::grammar::types::var_type(input)?;
  Ok((input, (modifier, Type { left_qualifiers: vec![], path, template_args, right_qualifiers: vec![] })))
}

/// `class_inheritances`: `':' base % ','`. Exposed for the meta-class
/// driver's own header grammar (spec §4.5 `class_bases`), which reuses
/// the same base-list shape after a meta-class name instead of
/// `class`/`struct`.
pub fn class_inheritances(input: &str) -> IResult<&str, Vec<(Option<AccessModifier>, Type)>> {
  let (input, _) = char(':')(input)?;
  let (input, _) = optionaly_space(input)?;
  separated_list1(arg_separator, class_inheritance)(input)
}

/// `class_access_modifier`: `access_modifier ':'`.
pub fn class_access_modifier(input: &str) -> IResult<&str, AccessModifier> {
  terminated(access_modifier_keyword, pair(optionaly_space, char(':')))(input)
}

/// An enum header — not present in the original grammar (see
/// `DESIGN.md`: the original's `Enumeration` AST type is never wired
/// into a grammar rule), built in the same style as `class_or_struct`:
/// `"enum" -("class") some_space name -(":" underlying_type)`.
pub fn enum_header(input: &str) -> IResult<&str, (EnumType, String, Option<Type>)> {
  let (input, _) = tag("enum")(input)?;
  let (input, is_scoped) = opt(preceded(some_space, tag("class")))(input)?;
  let (input, _) = some_space(input)?;
  let (input, name) = identifier(input)?;
  let (input, underlying) = opt(preceded(tuple((optionaly_space, char(':'), optionaly_space)), ty))(input)?;
  let enum_type = if is_scoped.is_some() { EnumType::EnumClass } else { EnumType::Enum };
  Ok((input, (enum_type, name.to_string(), underlying)))
}

/// A single enumerator name inside an enum body (`Value1, Value2 = 3`);
/// explicit discriminant values are parsed and discarded, matching the
/// reflection expander's needs (spec §4.4 only reflects names/ordinals).
pub fn enumerator(input: &str) -> IResult<&str, String> {
  let (input, name) = identifier(input)?;
  let (input, _) =
    opt(preceded(tuple((optionaly_space, char('='), optionaly_space)), crate::grammar::tokens::digits))(input)?;
  Ok((input, name.to_string()))
}

pub fn enumerator_list(input: &str) -> IResult<&str, Vec<String>> {
  separated_list1(arg_separator, enumerator)(input)
}

/// `for_loop` header, captured as raw text (the driver treats the body
/// as an ordinary scope).
pub fn for_loop_header(input: &str) -> IResult<&str, &str> {
  let (input, _) = tag("for")(input)?;
  let (input, _) = optionaly_space(input)?;
  recognize(tuple((
    char('('),
    nom::multi::many0(nom::branch::alt((
      recognize(crate::grammar::expr::expression),
      recognize(char(';')),
      recognize(char(':')),
    ))),
    char(')'),
  )))(input)
}

/// `if_expression` header: `"if" -("constexpr") ( -var expression )`.
pub fn if_expression_header(input: &str) -> IResult<&str, &str> {
  let (input, _) = tag("if")(input)?;
  let (input, _) = optionaly_space(input)?;
  let (input, _) = opt(tag("constexpr"))(input)?;
  let (input, _) = optionaly_space(input)?;
  recognize(tuple((char('('), expression, char(')'))))(input)
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn parses_var() {
    let (rest, v) = var("int x = 3;").unwrap();
    assert_eq!(rest, "");
    assert_eq!(v.name.as_deref(), Some("x"));
  }

  #[test]
  fn parses_function_signature() {
    let (rest, f) = function_signature("void foo(int a, const std::string &b)").unwrap();
    assert_eq!(rest, "");
    assert_eq!(f.name, "foo");
    assert_eq!(f.parameters.len(), 2);
  }

  #[test]
  fn parses_class_header_with_bases() {
    let (rest, (class_type, name, _, bases)) = class_header("class Bar : public Foo, private Baz").unwrap();
    assert_eq!(rest, "");
    assert_eq!(class_type, ClassType::Class);
    assert_eq!(name, "Bar");
    assert_eq!(bases.len(), 2);
  }

  #[test]
  fn parses_enum_class_header() {
    let (rest, (enum_type, name, underlying)) = enum_header("enum class E : std::uint8_t").unwrap();
    assert_eq!(rest, "");
    assert_eq!(enum_type, EnumType::EnumClass);
    assert_eq!(name, "E");
    assert!(underlying.is_some());
  }

  #[test]
  fn rejects_variadic_template_parameters() {
    assert!(reject_variadic("typename... Ts").is_err());
    assert!(reject_variadic("typename T").is_ok());
  }
}
