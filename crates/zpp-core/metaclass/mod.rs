//! The meta-class driver (spec §4.5), grounded on
//! `extern/meta_classes/meta_classes.hpp`'s `MetaClassParser`.
//!
//! A `ParserPlugin` that gets first refusal at every position (see
//! `pipeline.rs` for the plugin ordering this relies on — it must run
//! ahead of the reflection expander and the std parser so its own
//! meta-function/meta-class/target-output forms aren't mistaken for
//! ordinary declarations or swallowed by the reflection expander's
//! class-close race).
//!
//! The original keeps `inside_meta_class_function`/`current_meta_class`
//! as ad hoc flags checked against a stack-wide scan
//! (`is_still_inside_constexpr_function`/`is_still_inside_meta_class`).
//! We track the same two states but close over the stack *depth* at
//! which the relevant frame was pushed, so "has it closed yet" is an
//! `O(1)` depth comparison instead of a scan.

pub mod gen;
pub mod proto;
pub mod rules;

use crate::driver::{ParserPlugin, StdParser};
use crate::grammar::decl::{class_inheritances, template_parameters};
use crate::grammar::tokens::{identifier, scope_begin, scope_end_with_semicolon, some_space};
use crate::types::ast::{AccessModifier, Class, ClassType, TemplateParameters};
use crate::types::error::{PpError, PpResult};
use crate::types::fragment::CodeFragment;
use crate::types::source::SourceView;
use crate::types::stack::ParserStack;

pub use proto::Evaluator;

/// Strips the first `constexpr` keyword out of a matched meta-function
/// signature (spec §4.5: "the driver strips the `constexpr` keyword
/// from the written-out copy of the function"), matching
/// `parse_constexpr_function`'s `std::search`-and-erase.
fn strip_first_constexpr(raw: &str) -> String {
  match raw.find("constexpr") {
    Some(idx) => {
      let mut out = String::with_capacity(raw.len());
      out.push_str(&raw[..idx]);
      out.push_str(&raw[idx + "constexpr".len()..]);
      out
    }
    None => raw.to_string(),
  }
}

pub struct MetaClassDriver {
  evaluator:               Option<Evaluator>,
  inside_meta_function:    bool,
  meta_function_depth:     usize,
  current_meta_class:      String,
  current_meta_class_name: String,
}

impl MetaClassDriver {
  /// Spawns the evaluator subprocess (if `exe` is given) but does not
  /// yet run the startup handshake — call `handshake` once the driver
  /// owns a `ParserStack` to seed into.
  pub fn new(exe: Option<&str>) -> PpResult<Self> {
    let evaluator = match exe {
      Some(path) if !path.is_empty() => Some(Evaluator::spawn(path)?),
      _ => None,
    };
    Ok(Self {
      evaluator,
      inside_meta_function: false,
      meta_function_depth: 0,
      current_meta_class: String::new(),
      current_meta_class_name: String::new(),
    })
  }

  /// Mode-1 startup handshake (spec §4.5): query the evaluator for its
  /// known meta-class names and seed the stack's registry.
  pub fn handshake(&mut self, stack: &mut ParserStack) -> PpResult<()> {
    if let Some(evaluator) = &mut self.evaluator {
      for name in evaluator.list_meta_classes()? {
        stack.register_meta_class(name);
      }
    }
    Ok(())
  }

  fn try_parse_meta_function(&mut self, source: &mut SourceView, stack: &mut ParserStack) -> PpResult<Option<String>> {
    let input = source.remaining();
    let Some((rest, function)) = StdParser::parse_function(input) else { return Ok(None) };
    if !function.is_meta_function() {
      return Ok(None);
    }

    stack.register_meta_class(function.name.clone());
    let consumed_len = input.len() - rest.len();
    let rewritten = strip_first_constexpr(&input[..consumed_len]);
    source.advance(consumed_len);

    stack.push(CodeFragment::Function(function))?;
    self.inside_meta_function = true;
    self.meta_function_depth = stack.depth();
    Ok(Some(rewritten))
  }

  fn try_parse_meta_class_header(&mut self, source: &mut SourceView, stack: &mut ParserStack) -> PpResult<Option<String>> {
    let input = source.remaining();

    let (rest, template_params) = match template_parameters(input) {
      Ok((rest, params)) => (rest, params),
      Err(_) => (input, TemplateParameters::default()),
    };
    let Ok((rest, meta_name)) = identifier(rest) else { return Ok(None) };
    if !stack.is_meta_class(meta_name) {
      return Ok(None);
    }
    let Ok((rest, _)) = some_space(rest) else { return Ok(None) };
    let Ok((rest, class_name)) = identifier(rest) else { return Ok(None) };

    let (rest, bases) = match class_inheritances(rest) {
      Ok((rest, bases)) => (rest, bases),
      Err(_) => (rest, Vec::new()),
    };
    let Ok((rest, _)) = scope_begin(rest) else { return Ok(None) };

    let mut class = Class::new(ClassType::MetaClass, class_name, template_params);
    for (modifier, ty) in bases {
      class.add_base(modifier.unwrap_or(AccessModifier::Unspecified), ty);
    }
    let meta_class_name = meta_name.to_string();
    let class_name = class_name.to_string();

    stack.push(CodeFragment::Class(class))?;
    self.current_meta_class = meta_class_name;
    self.current_meta_class_name = class_name;

    let consumed_len = input.len() - rest.len();
    let text = input[..consumed_len].to_string();
    source.advance(consumed_len);
    Ok(Some(text))
  }

  fn try_close_meta_class(&mut self, source: &mut SourceView, stack: &mut ParserStack) -> PpResult<Option<String>> {
    let input = source.remaining();
    let Ok((rest, _)) = scope_end_with_semicolon(input) else { return Ok(None) };
    let Some(CodeFragment::Class(class)) = stack.top() else { return Ok(None) };
    if class.name != self.current_meta_class_name {
      return Ok(None);
    }

    let evaluator = self
      .evaluator
      .as_mut()
      .ok_or_else(|| PpError::Evaluator("meta-class instantiation requires a configured evaluator".into()))?;
    let body = gen::serialize_class(class);
    let generated = evaluator.expand(&self.current_meta_class, &body)?;

    stack.pop_and_merge()?;
    source.advance(input.len() - rest.len());
    self.current_meta_class.clear();
    self.current_meta_class_name.clear();
    Ok(Some(generated))
  }
}

impl ParserPlugin for MetaClassDriver {
  fn id(&self) -> &'static str {
    "metaclass"
  }

  fn prepend(&self) -> Option<String> {
    Some("#include <meta.hpp>\n".to_string())
  }

  fn try_parse(&mut self, source: &mut SourceView, stack: &mut ParserStack) -> PpResult<Option<String>> {
    if self.inside_meta_function {
      if stack.depth() < self.meta_function_depth {
        self.inside_meta_function = false;
      } else {
        let input = source.remaining();
        if let Ok((rest, (target, body))) = rules::parse_target(input) {
          let consumed_len = input.len() - rest.len();
          source.advance(consumed_len);
          return Ok(Some(rules::render_target_append(&target, &body)));
        }
        return Ok(None);
      }
    }

    if !self.current_meta_class.is_empty() {
      return self.try_close_meta_class(source, stack);
    }

    if let Some(text) = self.try_parse_meta_function(source, stack)? {
      return Ok(Some(text));
    }
    self.try_parse_meta_class_header(source, stack)
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::driver::Core;
  use crate::types::ast::Namespace;

  fn fresh_stack() -> ParserStack {
    let mut stack = ParserStack::new();
    stack.push(CodeFragment::Namespace(Namespace::new(""))).unwrap();
    stack
  }

  #[test]
  fn recognizes_and_rewrites_meta_function() {
    let mut stack = fresh_stack();
    let mut source =
      SourceView::new("constexpr void interface(meta::type target, const meta::type source) { };".into(), "t.cpp");
    let mut core = Core::new(vec![Box::new(MetaClassDriver::new(None).unwrap()), Box::new(StdParser::new())]);
    let output = core.process(&mut source, &mut stack).unwrap();

    assert!(stack.is_meta_class("interface"));
    assert!(!output.contains("constexpr"));
    // the closed function frame is gone from the stack, folded back
    // into the namespace it opened in.
    let CodeFragment::Namespace(ns) = stack.top().unwrap() else { panic!() };
    assert!(ns.functions.contains_key("interface"));
  }

  #[test]
  fn rejects_meta_class_header_for_unknown_name() {
    let mut stack = fresh_stack();
    let mut source = SourceView::new("interface Shape { };".into(), "t.cpp");
    let mut core = Core::new(vec![Box::new(MetaClassDriver::new(None).unwrap()), Box::new(StdParser::new())]);
    // "interface" was never registered via a meta-function definition,
    // so this must fail as an ordinary unparsable declaration.
    assert!(core.process(&mut source, &mut stack).is_err());
  }

  #[test]
  fn meta_function_rewrite_strips_constexpr() {
    let raw = "constexpr void interface(meta::type target, const meta::type source) {";
    assert_eq!(strip_first_constexpr(raw), " void interface(meta::type target, const meta::type source) {");
  }
}
