//! The static-reflection expander (spec §4.4), grounded on
//! `extern/static_reflection/static_reflection.hpp`'s `StaticReflexParser`.
//!
//! Races the std parser for every closing `};`: if the frame it closes
//! is a `Class` or `Enumeration`, it wins, replacing the literal `};`
//! with a generated `reflect::Reflect<T>` specialization and folding
//! the closed frame into its parent itself (it owns the close, the std
//! parser never gets a turn). Anything else — a bare `}` with no
//! trailing `;`, or a `};` closing a namespace/function/scope — falls
//! through, exactly like the original's `lit(';')`-gated `scope_end`.

use crate::driver::ParserPlugin;
use crate::grammar::tokens::scope_end_with_semicolon;
use crate::types::ast::{Class, ClassType, Enumeration};
use crate::types::error::PpResult;
use crate::types::fragment::CodeFragment;
use crate::types::source::SourceView;
use crate::types::stack::ParserStack;

pub struct StaticReflexParser;

impl StaticReflexParser {
  pub fn new() -> Self {
    StaticReflexParser
  }

  fn append_members(out: &mut String, data_members: &[crate::types::ast::Variable], class_name: &str, class_templates: &str) {
    let mut wrote_any = false;
    for member in data_members {
      let Some(name) = &member.name else { continue };
      out.push('&');
      out.push_str(class_name);
      out.push_str(class_templates);
      out.push_str("::");
      out.push_str(name);
      out.push(',');
      wrote_any = true;
    }
    if wrote_any {
      out.pop();
    }
  }

  fn append_names(out: &mut String, data_members: &[crate::types::ast::Variable]) {
    let mut wrote_any = false;
    for member in data_members {
      let Some(name) = &member.name else { continue };
      out.push('"');
      out.push_str(name);
      out.push('"');
      out.push(',');
      wrote_any = true;
    }
    if wrote_any {
      out.pop();
    }
  }

  fn append_types(out: &mut String, data_members: &[crate::types::ast::Variable], class_name: &str, class_templates: &str) {
    let mut wrote_any = false;
    for member in data_members {
      let Some(name) = &member.name else { continue };
      out.push_str("decltype(std::declval<");
      out.push_str(class_name);
      out.push_str(class_templates);
      out.push_str(">().");
      out.push_str(name);
      out.push(')');
      out.push(',');
      wrote_any = true;
    }
    if wrote_any {
      out.pop();
    }
  }

  /// Ports `generate_class_reflection(Class&)`.
  fn generate_class_reflection(c: &Class) -> String {
    let mut out = String::with_capacity(300);
    out.push_str("\nfriend reflect::Reflect<");
    out.push_str(&c.name);
    out.push_str(">;\n};\n");

    // Templated classes and the empty-tuple case both need tie-break
    // handling not present verbatim in the byte-for-byte original:
    // `SPEC_FULL.md` §4 keeps the original's `template <>` vs.
    // `template <Ts...>` split but always emits a (possibly empty)
    // `std::tuple` rather than omitting the `= {}` initializer, so
    // reflecting a class with zero data members still compiles.
    if c.is_templated() {
      out.push_str("template <");
      let parts: Vec<String> = c
        .template_parameters
        .params
        .iter()
        .map(|p| format!("{} {}", p.constraint.join("::"), p.name))
        .collect();
      out.push_str(&parts.join(","));
      out.push('>');
      out.push_str(" struct reflect::Reflect<");
    } else {
      out.push_str("template <> struct reflect::Reflect<");
    }
    out.push_str(&c.name);

    let class_templates = if c.is_templated() {
      let names: Vec<&str> = c.template_parameters.params.iter().map(|p| p.name.as_str()).collect();
      format!("<{}>", names.join(","))
    } else {
      String::new()
    };
    out.push_str(&class_templates);
    out.push_str("> {\n");

    out.push_str("constexpr inline static std::tuple public_data_members = {");
    Self::append_members(&mut out, &c.members.public, &c.name, &class_templates);
    out.push_str("};\n");

    out.push_str("constexpr inline static std::tuple public_data_member_names = {");
    Self::append_names(&mut out, &c.members.public);
    out.push_str("};\n");

    out.push_str("using public_data_member_types = std::tuple<");
    Self::append_types(&mut out, &c.members.public, &c.name, &class_templates);
    out.push_str(">;\n");

    let all_members = c.members.public_then_protected_then_private();
    let all_members: Vec<crate::types::ast::Variable> = all_members.into_iter().cloned().collect();

    out.push_str("constexpr inline static std::tuple data_members = {");
    Self::append_members(&mut out, &all_members, &c.name, &class_templates);
    out.push_str("};\n");

    out.push_str("constexpr inline static std::tuple data_member_names = {");
    Self::append_names(&mut out, &all_members);
    out.push_str("};\n");

    out.push_str("using data_member_types = std::tuple<");
    Self::append_types(&mut out, &all_members, &c.name, &class_templates);
    out.push_str(">;\n");

    out.push_str("using public_base_classes = std::tuple<");
    let public_bases: Vec<String> = c.bases.public.iter().map(|t| t.to_source()).collect();
    out.push_str(&public_bases.join(","));
    out.push_str(">;\n");

    let all_bases = c.bases.public_then_protected_then_private();
    out.push_str("using base_classes = std::tuple<");
    let all_bases: Vec<String> = all_bases.into_iter().map(|t| t.to_source()).collect();
    out.push_str(&all_bases.join(","));
    out.push_str(">;\n");

    out.push_str("constexpr static auto name = \"");
    out.push_str(&c.name);
    out.push_str("\";\n");

    out.push_str("static constexpr auto object_type = ");
    out.push_str(match c.class_type {
      ClassType::Class => "reflect::ObjectType::CLASS;",
      ClassType::Struct => "reflect::ObjectType::STRUCT;",
      ClassType::MetaClass => "reflect::ObjectType::CLASS;",
    });
    out.push('\n');

    out.push_str("};");
    out
  }

  /// Ports `generate_enum_reflection(Enumeration&)`.
  fn generate_enum_reflection(e: &Enumeration) -> String {
    let mut out = String::with_capacity(300);
    out.push_str("\n};\n template <> struct reflect::Reflect<");
    out.push_str(&e.name);
    out.push_str(">{\n");

    out.push_str("constexpr static auto name = \"");
    out.push_str(&e.name);
    out.push_str("\";\n");

    out.push_str("constexpr static std::tuple enumerator_names = {");
    let names: Vec<String> = e.enumerators.iter().map(|n| format!("\"{n}\"")).collect();
    out.push_str(&names.join(","));
    out.push_str("};\n");

    out.push_str("constexpr static std::tuple enumerator_constants = {");
    let constants: Vec<String> = e.enumerators.iter().map(|n| format!("{}::{}", e.name, n)).collect();
    out.push_str(&constants.join(","));
    out.push_str("};\n");

    out.push_str("static constexpr auto object_type = reflect::ObjectType::ENUM;\n");
    out.push_str("constexpr static bool is_scoped_enum = ");
    out.push_str(if e.is_scoped() { "true;\n" } else { "false;\n" });

    out.push_str("using underlying_type = ");
    out.push_str(&e.underlying_type.to_source());
    out.push_str(";\n};");
    out
  }
}

impl Default for StaticReflexParser {
  fn default() -> Self {
    Self::new()
  }
}

impl ParserPlugin for StaticReflexParser {
  fn id(&self) -> &'static str {
    "reflex"
  }

  fn prepend(&self) -> Option<String> {
    Some("namespace reflect { template<class T> struct Reflect;}\n".to_string())
  }

  fn try_parse(&mut self, source: &mut SourceView, stack: &mut ParserStack) -> PpResult<Option<String>> {
    let input = source.remaining();
    let Ok((rest, matched)) = scope_end_with_semicolon(input) else { return Ok(None) };

    let generated = match stack.top() {
      Some(CodeFragment::Class(c)) => Self::generate_class_reflection(c),
      Some(CodeFragment::Enumeration(e)) => Self::generate_enum_reflection(e),
      _ => return Ok(None),
    };

    // We own the close here (the std parser never gets a turn at this
    // span, matching the original's priority race).
    let _ = matched;
    stack.pop_and_merge()?;
    source.advance(input.len() - rest.len());
    Ok(Some(generated))
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::driver::{Core, StdParser};
  use crate::types::ast::Namespace;

  #[test]
  fn reflects_struct_bar() {
    let mut stack = ParserStack::new();
    stack.push(CodeFragment::Namespace(Namespace::new(""))).unwrap();
    let mut source = SourceView::new("struct Bar { int x; int y; };".into(), "t.cpp");
    let mut core = Core::new(vec![Box::new(StaticReflexParser::new()), Box::new(StdParser::new())]);
    let output = core.process(&mut source, &mut stack).unwrap();

    assert!(output.contains("reflect::Reflect<Bar"));
    assert!(output.contains("\"x\""));
    assert!(output.contains("\"y\""));
    let CodeFragment::Namespace(ns) = stack.top().unwrap() else { panic!() };
    assert!(ns.classes.contains_key("Bar"));
  }

  #[test]
  fn reflects_scoped_enum() {
    let mut stack = ParserStack::new();
    stack.push(CodeFragment::Namespace(Namespace::new(""))).unwrap();
    let mut source = SourceView::new("enum class E { A, B };".into(), "t.cpp");
    let mut core = Core::new(vec![Box::new(StaticReflexParser::new()), Box::new(StdParser::new())]);
    let output = core.process(&mut source, &mut stack).unwrap();

    assert!(output.contains("reflect::Reflect<E"));
    assert!(output.contains("is_scoped_enum = true"));
  }

  #[test]
  fn does_not_intercept_function_close() {
    let mut stack = ParserStack::new();
    stack.push(CodeFragment::Namespace(Namespace::new(""))).unwrap();
    let mut source = SourceView::new("void f() { }".into(), "t.cpp");
    let mut core = Core::new(vec![Box::new(StaticReflexParser::new()), Box::new(StdParser::new())]);
    let output = core.process(&mut source, &mut stack).unwrap();
    assert!(!output.contains("reflect::Reflect"));
  }
}
