//! The standard-language parser plugin (spec §4.2, §4.3), grounded on
//! `include/std_parser.hpp`'s `StdParser`. Each `parse_inside_*`
//! routine tries the same grammar alternatives the original tries, in
//! the same order, advancing the source by exactly one matched unit
//! per call and echoing that span verbatim to the output (the std
//! parser never rewrites; only the reflection/meta-class plugins do).

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while};
use nom::character::complete::char;
use nom::combinator::opt;
use nom::sequence::delimited;
use nom::IResult;

use crate::driver::ParserPlugin;
use crate::grammar::decl::{
  class_access_modifier, class_header, constructor_or_destructor, enum_header, enumerator_list, for_loop_header,
  function_signature, if_expression_header, operator_signature, var,
};
use crate::grammar::tokens::{comment as comment_rule, optionaly_space, scope_begin, scope_end, statement_end};
use crate::types::ast::{AccessModifier, Class, Enumeration};
use crate::types::error::PpResult;
use crate::types::fragment::CodeFragment;
use crate::types::source::SourceView;
use crate::types::stack::ParserStack;

fn skip_line(input: &str) -> IResult<&str, &str> {
  take_while(|c| c != '\n')(input)
}

/// `include`: `optionaly_space # \s* "include" optionaly_space (<path> | "path")`.
fn include_directive(input: &str) -> IResult<&str, String> {
  let (input, _) = optionaly_space(input)?;
  let (input, _) = char('#')(input)?;
  let (input, _) = take_while(|c| c == ' ' || c == '\t')(input)?;
  let (input, _) = tag("include")(input)?;
  let (input, _) = optionaly_space(input)?;
  let (input, path) = alt((
    delimited(char('<'), take_while(|c| c != '>'), char('>')),
    delimited(char('"'), take_while(|c| c != '"'), char('"')),
  ))(input)?;
  Ok((input, path.to_string()))
}

/// Advances `source` by the span consumed between `input_before` and
/// `rest`, and returns that span for the caller to echo to output.
fn consume<'a>(source: &mut SourceView, input_before: &'a str, rest: &str) -> String {
  let consumed_len = input_before.len() - rest.len();
  source.advance(consumed_len);
  input_before[..consumed_len].to_string()
}

/// The standard-language parser. Holds no state of its own beyond an
/// id; everything mutable lives on `ParserStack`.
pub struct StdParser;

impl StdParser {
  pub fn new() -> Self {
    StdParser
  }

  fn try_comment_or_include(source: &mut SourceView, stack: &mut ParserStack, input: &str) -> Option<String> {
    if let Ok((rest, _)) = comment_rule(input) {
      return Some(consume(source, input, rest));
    }
    if let Ok((rest, path)) = include_directive(input) {
      stack.add_include(path);
      return Some(consume(source, input, rest));
    }
    None
  }

  fn parse_inside_namespace(&mut self, source: &mut SourceView, stack: &mut ParserStack) -> PpResult<Option<String>> {
    let input = source.remaining();

    if let Some(text) = Self::try_comment_or_include(source, stack, input) {
      return Ok(Some(text));
    }
    if let Ok((rest, _)) = nom::character::complete::multispace1::<_, nom::error::Error<&str>>(input) {
      return Ok(Some(consume(source, input, rest)));
    }
    if let Ok((rest, (class_type, name, template_parameters, bases))) = class_header(input) {
      if let Ok((rest2, _)) = scope_begin(rest) {
        let mut class = Class::new(class_type, name, template_parameters);
        for (modifier, ty) in bases {
          class.add_base(modifier.unwrap_or(AccessModifier::Unspecified), ty);
        }
        stack.push(CodeFragment::Class(class))?;
        return Ok(Some(consume(source, input, rest2)));
      }
      if let Ok((rest2, _)) = statement_end(rest) {
        // Forward declaration: nothing to track (no body follows).
        return Ok(Some(consume(source, input, rest2)));
      }
    }
    if let Ok((rest, f)) = function_signature(input) {
      if let Ok((rest2, _)) = scope_begin(rest) {
        stack.push(CodeFragment::Function(f))?;
        return Ok(Some(consume(source, input, rest2)));
      }
    }
    if let Ok((rest, f)) = operator_signature(input) {
      if let Ok((rest2, _)) = scope_begin(rest) {
        stack.push(CodeFragment::Function(f))?;
        return Ok(Some(consume(source, input, rest2)));
      }
    }
    if let Ok((rest, (enum_type, name, underlying))) = enum_header(input) {
      if let Ok((rest2, _)) = scope_begin(rest) {
        stack.push(CodeFragment::Enumeration(Enumeration::new(enum_type, name, underlying)))?;
        return Ok(Some(consume(source, input, rest2)));
      }
    }
    if let Ok((rest, name)) = namespace_begin(input) {
      stack.push(CodeFragment::Namespace(crate::types::ast::Namespace::new(name)))?;
      return Ok(Some(consume(source, input, rest)));
    }
    if let Ok((rest, _)) = scope_end(input) {
      stack.pop_and_merge()?;
      return Ok(Some(consume(source, input, rest)));
    }
    if let Ok((rest, v)) = var(input) {
      if let Some(ns) = stack.top_mut().and_then(|f| f.as_namespace_mut()) {
        ns.add_variable(v);
      }
      return Ok(Some(consume(source, input, rest)));
    }

    Ok(None)
  }

  fn parse_inside_class(&mut self, source: &mut SourceView, stack: &mut ParserStack) -> PpResult<Option<String>> {
    let input = source.remaining();
    let class_name = stack.top().and_then(|f| f.as_class()).map(|c| c.name.clone()).unwrap_or_default();

    if let Some(text) = Self::try_comment_or_include(source, stack, input) {
      return Ok(Some(text));
    }
    if let Ok((rest, _)) = nom::character::complete::multispace1::<_, nom::error::Error<&str>>(input) {
      return Ok(Some(consume(source, input, rest)));
    }
    if let Ok((rest, (class_type, name, template_parameters, bases))) = class_header(input) {
      if let Ok((rest2, _)) = scope_begin(rest) {
        let mut class = Class::new(class_type, name, template_parameters);
        for (modifier, ty) in bases {
          class.add_base(modifier.unwrap_or(AccessModifier::Unspecified), ty);
        }
        stack.push(CodeFragment::Class(class))?;
        return Ok(Some(consume(source, input, rest2)));
      }
      if let Ok((rest2, _)) = statement_end(rest) {
        return Ok(Some(consume(source, input, rest2)));
      }
    }
    if let Ok((rest, (enum_type, name, underlying))) = enum_header(input) {
      if let Ok((rest2, _)) = scope_begin(rest) {
        stack.push(CodeFragment::Enumeration(Enumeration::new(enum_type, name, underlying)))?;
        return Ok(Some(consume(source, input, rest2)));
      }
    }
    if let Ok((rest, f)) = constructor_or_destructor(input, &class_name) {
      if let Ok((rest2, _)) = scope_begin(rest) {
        stack.push(CodeFragment::Function(f))?;
        return Ok(Some(consume(source, input, rest2)));
      }
      if let Ok((rest2, _)) = statement_end(rest) {
        if let Some(class) = stack.top_mut().and_then(|f| f.as_class_mut()) {
          class.add_function(f);
        }
        return Ok(Some(consume(source, input, rest2)));
      }
    }
    if let Ok((rest, f)) = function_signature(input) {
      if let Ok((rest2, _)) = scope_begin(rest) {
        stack.push(CodeFragment::Function(f))?;
        return Ok(Some(consume(source, input, rest2)));
      }
      if let Ok((rest2, _)) = statement_end(rest) {
        if let Some(class) = stack.top_mut().and_then(|f| f.as_class_mut()) {
          class.add_function(f);
        }
        return Ok(Some(consume(source, input, rest2)));
      }
    }
    if let Ok((rest, f)) = operator_signature(input) {
      if let Ok((rest2, _)) = scope_begin(rest) {
        stack.push(CodeFragment::Function(f))?;
        return Ok(Some(consume(source, input, rest2)));
      }
      if let Ok((rest2, _)) = statement_end(rest) {
        if let Some(class) = stack.top_mut().and_then(|f| f.as_class_mut()) {
          class.add_function(f);
        }
        return Ok(Some(consume(source, input, rest2)));
      }
    }
    if let Ok((rest, _)) = scope_end(input) {
      self.close_current_class(stack)?;
      return Ok(Some(consume(source, input, rest)));
    }
    if let Ok((rest, modifier)) = class_access_modifier(input) {
      if let Some(class) = stack.top_mut().and_then(|f| f.as_class_mut()) {
        class.set_access_modifier(modifier);
      }
      return Ok(Some(consume(source, input, rest)));
    }
    if let Ok((rest, v)) = var(input) {
      if let Some(class) = stack.top_mut().and_then(|f| f.as_class_mut()) {
        class.add_variable(v);
      }
      return Ok(Some(consume(source, input, rest)));
    }

    Ok(None)
  }

  /// Functions and local scopes both only ever hold statements/nested
  /// scopes in this model (spec §3: builder fragments are consumed
  /// inline, never pushed — see `DESIGN.md`), so the two share an
  /// implementation, matching the original's near-identical
  /// `parse_inside_function`/`parse_inside_scope` bodies.
  fn parse_inside_statement_context(
    &mut self,
    source: &mut SourceView,
    stack: &mut ParserStack,
  ) -> PpResult<Option<String>> {
    let input = source.remaining();

    if let Some(text) = Self::try_comment_or_include(source, stack, input) {
      return Ok(Some(text));
    }
    if let Ok((rest, _)) = nom::character::complete::multispace1::<_, nom::error::Error<&str>>(input) {
      return Ok(Some(consume(source, input, rest)));
    }
    if let Ok((rest, (class_type, name, template_parameters, bases))) = class_header(input) {
      if let Ok((rest2, _)) = scope_begin(rest) {
        let mut class = Class::new(class_type, name, template_parameters);
        for (modifier, ty) in bases {
          class.add_base(modifier.unwrap_or(AccessModifier::Unspecified), ty);
        }
        stack.push(CodeFragment::Class(class))?;
        return Ok(Some(consume(source, input, rest2)));
      }
      if let Ok((rest2, _)) = statement_end(rest) {
        return Ok(Some(consume(source, input, rest2)));
      }
    }
    if let Ok((rest, _)) = scope_begin(input) {
      stack.push(CodeFragment::Scope(Default::default()))?;
      return Ok(Some(consume(source, input, rest)));
    }
    if let Ok((rest, _)) = scope_end(input) {
      stack.pop_and_merge()?;
      return Ok(Some(consume(source, input, rest)));
    }
    if let Ok((rest, _)) = for_loop_header(input) {
      return Ok(Some(consume(source, input, rest)));
    }
    if let Ok((rest, _)) = if_expression_header(input) {
      return Ok(Some(consume(source, input, rest)));
    }
    if let Ok((rest, _)) = crate::grammar::expr::statement(input) {
      return Ok(Some(consume(source, input, rest)));
    }
    if let Ok((rest, _v)) = var(input) {
      return Ok(Some(consume(source, input, rest)));
    }

    Ok(None)
  }

  /// An enum body: a comma-separated enumerator list up to the closing
  /// brace. Spec §4.3/§4.4 require full enum parsing and reflection;
  /// the original never wires this into its grammar (see `DESIGN.md`).
  fn parse_inside_enum(&mut self, source: &mut SourceView, stack: &mut ParserStack) -> PpResult<Option<String>> {
    let input = source.remaining();

    if let Some(text) = Self::try_comment_or_include(source, stack, input) {
      return Ok(Some(text));
    }
    if let Ok((rest, _)) = nom::character::complete::multispace1::<_, nom::error::Error<&str>>(input) {
      return Ok(Some(consume(source, input, rest)));
    }
    if let Ok((rest, names)) = enumerator_list(input) {
      if let Some(e) = stack.top_mut().and_then(|f| f.as_enum_mut()) {
        e.enumerators.extend(names);
      }
      return Ok(Some(consume(source, input, rest)));
    }
    if let Ok((rest, _)) = scope_end(input) {
      self.close_current_enum(stack)?;
      return Ok(Some(consume(source, input, rest)));
    }

    Ok(None)
  }

  /// Folds the top-of-stack class into its parent, as `add_class`
  /// (spec §4.2), matching `StdParser::close_current_class`.
  pub fn close_current_class(&mut self, stack: &mut ParserStack) -> PpResult<()> {
    stack.pop_and_merge()?;
    Ok(())
  }

  pub fn close_current_enum(&mut self, stack: &mut ParserStack) -> PpResult<()> {
    stack.pop_and_merge()?;
    Ok(())
  }

  /// `StdParser::get_current_nesting`: the top frame.
  pub fn get_current_nesting<'a>(&self, stack: &'a ParserStack) -> Option<&'a CodeFragment> {
    stack.top()
  }

  /// `StdParser::parse_function`: tries to match just a function
  /// signature followed by `{`, without committing it to the stack.
  /// Used by the meta-class driver to detect meta-function
  /// definitions before the std parser itself would consume them
  /// (spec §4.5).
  pub fn parse_function(input: &str) -> Option<(&str, crate::types::ast::Function)> {
    let (rest, f) = function_signature(input).ok()?;
    let (rest, _) = scope_begin(rest).ok()?;
    Some((rest, f))
  }

  /// `StdParser::parse_include`.
  pub fn parse_include(input: &str) -> Option<(&str, String)> {
    include_directive(input).ok()
  }

  /// `StdParser::get_includes`: scans the whole source for `#include`
  /// directives, skipping everything else a line at a time.
  pub fn get_includes(input: &str) -> PpResult<Vec<String>> {
    let mut includes = Vec::new();
    let mut rest = input;
    while !rest.is_empty() {
      if let Ok((r, _)) = nom::character::complete::multispace1::<_, nom::error::Error<&str>>(rest) {
        rest = r;
        continue;
      }
      if let Ok((r, path)) = include_directive(rest) {
        includes.push(path);
        rest = r;
        continue;
      }
      match skip_line(rest) {
        Ok((r, _)) if r.len() < rest.len() => rest = r,
        _ => {
          let (r, _) = opt(char('\n'))(rest).unwrap_or((rest, None));
          if r.len() == rest.len() {
            break;
          }
          rest = r;
        }
      }
    }
    Ok(includes)
  }
}

impl Default for StdParser {
  fn default() -> Self {
    Self::new()
  }
}

impl ParserPlugin for StdParser {
  fn id(&self) -> &'static str {
    "std"
  }

  fn try_parse(&mut self, source: &mut SourceView, stack: &mut ParserStack) -> PpResult<Option<String>> {
    match stack.top() {
      Some(CodeFragment::Namespace(_)) => self.parse_inside_namespace(source, stack),
      Some(CodeFragment::Class(_)) => self.parse_inside_class(source, stack),
      Some(CodeFragment::Function(_)) | Some(CodeFragment::Scope(_)) => {
        self.parse_inside_statement_context(source, stack)
      }
      Some(CodeFragment::Enumeration(_)) => self.parse_inside_enum(source, stack),
      _ => Ok(None),
    }
  }
}

/// `namespace_begin`: `"namespace" some_space name scope_begin`.
fn namespace_begin(input: &str) -> IResult<&str, &str> {
  let (input, _) = tag("namespace")(input)?;
  let (input, _) = nom::character::complete::multispace1(input)?;
  let (input, name) = crate::grammar::tokens::identifier(input)?;
  let (input, _) = scope_begin(input)?;
  Ok((input, name))
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::types::ast::Namespace;

  fn fresh_stack() -> ParserStack {
    let mut stack = ParserStack::new();
    stack.push(CodeFragment::Namespace(Namespace::new(""))).unwrap();
    stack
  }

  #[test]
  fn parses_top_level_var_and_include() {
    let mut stack = fresh_stack();
    let mut source = SourceView::new("#include <foo.h>\nint x = 1;\n".into(), "t.cpp");

    let mut core = crate::driver::Core::new(vec![Box::new(StdParser::new())]);
    let output = core.process(&mut source, &mut stack).unwrap();

    assert!(stack.includes().any(|i| i == "foo.h"));
    assert_eq!(output, "#include <foo.h>\nint x = 1;\n");
    let CodeFragment::Namespace(ns) = stack.top().unwrap() else { panic!() };
    assert!(ns.variables.contains_key("x"));
  }

  #[test]
  fn parses_nested_class_and_closes() {
    let mut stack = fresh_stack();
    let mut source = SourceView::new("class Foo { int a; };".into(), "t.cpp");
    let mut core = crate::driver::Core::new(vec![Box::new(StdParser::new())]);
    core.process(&mut source, &mut stack).unwrap();

    let CodeFragment::Namespace(ns) = stack.top().unwrap() else { panic!() };
    assert!(ns.classes.contains_key("Foo"));
    assert_eq!(ns.classes["Foo"].members.private.len(), 1);
  }

  #[test]
  fn parses_enum_class_body() {
    let mut stack = fresh_stack();
    let mut source = SourceView::new("enum class E { A, B, C };".into(), "t.cpp");
    let mut core = crate::driver::Core::new(vec![Box::new(StdParser::new())]);
    core.process(&mut source, &mut stack).unwrap();

    let CodeFragment::Namespace(ns) = stack.top().unwrap() else { panic!() };
    assert_eq!(ns.enums["E"].enumerators, vec!["A", "B", "C"]);
  }
}
