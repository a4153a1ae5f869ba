//! `ParserStack` — the driver's nesting stack of in-progress
//! `CodeFragment` containers (spec §3, §4.2).

use std::collections::HashSet;

use indexmap::IndexSet;

use crate::types::ast::{ClassType, EnumType};
use crate::types::error::PpError;
use crate::types::fragment::CodeFragment;

/// Tracks which container kind may legally nest inside which (spec
/// §4.2's nesting invariants). A transition not covered here is an
/// impossible nesting transition: the original C++ implementation
/// silently swallows this case with a catch-all no-op arm, but spec §7
/// names "impossible nesting transition" as a distinct Structural error
/// kind, so we raise `PpError::Structural` instead of reproducing that
/// gap (see `DESIGN.md`).
fn may_nest(parent: &CodeFragment, child_kind: &'static str) -> bool {
  match parent {
    CodeFragment::Namespace(_) => matches!(child_kind, "namespace" | "class" | "function" | "enum"),
    CodeFragment::Class(_) => matches!(child_kind, "class" | "function" | "enum"),
    CodeFragment::Function(_) => matches!(child_kind, "scope"),
    CodeFragment::Scope(_) => matches!(child_kind, "scope" | "function"),
    CodeFragment::Enumeration(_) => false,
    _ => false,
  }
}

/// The driver's nesting stack, plus the includes set collected from
/// `#include` directives (spec §3: "Includes set").
pub struct ParserStack {
  frames:   Vec<CodeFragment>,
  includes: IndexSet<String>,
  /// Registry of meta-class names seen via `interface` meta-functions
  /// (spec §4.5). Order is irrelevant here, unlike every other
  /// name-keyed table in this crate, so it's a plain `HashSet`.
  meta_classes: HashSet<String>,
}

impl ParserStack {
  pub fn new() -> Self {
    Self { frames: Vec::new(), includes: IndexSet::new(), meta_classes: HashSet::new() }
  }

  pub fn depth(&self) -> usize {
    self.frames.len()
  }

  pub fn is_empty(&self) -> bool {
    self.frames.is_empty()
  }

  pub fn top(&self) -> Option<&CodeFragment> {
    self.frames.last()
  }

  pub fn top_mut(&mut self) -> Option<&mut CodeFragment> {
    self.frames.last_mut()
  }

  /// Pushes `child` onto the stack, enforcing the nesting invariant
  /// against the current top frame (the root level accepts any
  /// container).
  pub fn push(&mut self, child: CodeFragment) -> Result<(), PpError> {
    if !child.is_container() {
      return Err(PpError::Structural(format!("{} is not a valid stack container", child.kind_name())));
    }
    if let Some(parent) = self.frames.last() {
      if !may_nest(parent, child.kind_name()) {
        return Err(PpError::Structural(format!(
          "{} cannot nest inside {}",
          child.kind_name(),
          parent.kind_name()
        )));
      }
    }
    self.frames.push(child);
    Ok(())
  }

  /// Pops the top frame, folding it into its new parent (if any). The
  /// root frame at index 0 is never popped (spec §3, §4.2): an
  /// extraneous closing brace with nothing left above it is a
  /// Structural error (spec §7), not a successful pop of the root.
  pub fn pop_and_merge(&mut self) -> Result<CodeFragment, PpError> {
    if self.frames.len() <= 1 {
      return Err(PpError::Structural("extraneous closing brace".into()));
    }
    let finished = self.frames.pop().expect("checked len > 1 above");
    if let Some(parent) = self.frames.last_mut() {
      merge_into_parent(parent, finished.clone());
    }
    Ok(finished)
  }

  pub fn add_include(&mut self, path: impl Into<String>) -> bool {
    self.includes.insert(path.into())
  }

  pub fn includes(&self) -> impl Iterator<Item = &str> {
    self.includes.iter().map(String::as_str)
  }

  pub fn register_meta_class(&mut self, name: impl Into<String>) {
    self.meta_classes.insert(name.into());
  }

  pub fn is_meta_class(&self, name: &str) -> bool {
    self.meta_classes.contains(name)
  }
}

impl Default for ParserStack {
  fn default() -> Self {
    Self::new()
  }
}

fn merge_into_parent(parent: &mut CodeFragment, finished: CodeFragment) {
  match (parent, finished) {
    (CodeFragment::Namespace(ns), CodeFragment::Namespace(child)) => ns.add_namespace(child),
    (CodeFragment::Namespace(ns), CodeFragment::Class(child)) => ns.add_class(child),
    (CodeFragment::Namespace(ns), CodeFragment::Enumeration(child)) => ns.add_enum(child),
    (CodeFragment::Namespace(ns), CodeFragment::Function(child)) => ns.add_function(child),

    (CodeFragment::Class(parent_class), CodeFragment::Class(child)) => parent_class.add_class(child),
    (CodeFragment::Class(parent_class), CodeFragment::Enumeration(child)) => parent_class.add_enum(child),
    (CodeFragment::Class(parent_class), CodeFragment::Function(child)) => parent_class.add_function(child),

    // A finished function/scope has nothing further to fold upward;
    // its body is consumed as source text by the grammar, not tracked
    // fragment-by-fragment (see DESIGN.md on builder fragments).
    _ => {}
  }
}

/// True for a `ClassType`/`EnumType` pair that came from a `meta class`
/// declaration — used by the driver to decide whether to register the
/// name in the meta-class registry on close (spec §4.5).
pub fn is_meta_class_type(class_type: ClassType) -> bool {
  class_type == ClassType::MetaClass
}

#[allow(dead_code)]
fn _unused_enum_type_marker(_: EnumType) {}

#[cfg(test)]
mod test {
  use super::*;
  use crate::types::ast::{Class, Namespace, TemplateParameters};

  #[test]
  fn rejects_namespace_inside_class() {
    let mut stack = ParserStack::new();
    stack.push(CodeFragment::Class(Class::new(ClassType::Class, "C", TemplateParameters::default()))).unwrap();
    let err = stack.push(CodeFragment::Namespace(Namespace::new("inner"))).unwrap_err();
    assert!(matches!(err, PpError::Structural(_)));
  }

  #[test]
  fn merges_class_into_namespace_on_pop() {
    let mut stack = ParserStack::new();
    stack.push(CodeFragment::Namespace(Namespace::new(""))).unwrap();
    stack.push(CodeFragment::Namespace(Namespace::new("outer"))).unwrap();
    stack.push(CodeFragment::Class(Class::new(ClassType::Class, "Inner", TemplateParameters::default()))).unwrap();
    stack.pop_and_merge().unwrap();
    let CodeFragment::Namespace(ns) = stack.pop_and_merge().unwrap() else { panic!("expected namespace") };
    assert!(ns.classes.contains_key("Inner"));
  }

  #[test]
  fn extraneous_close_is_structural() {
    let mut stack = ParserStack::new();
    assert!(matches!(stack.pop_and_merge().unwrap_err(), PpError::Structural(_)));
  }

  #[test]
  fn root_frame_is_never_popped() {
    let mut stack = ParserStack::new();
    stack.push(CodeFragment::Namespace(Namespace::new(""))).unwrap();
    assert!(matches!(stack.pop_and_merge().unwrap_err(), PpError::Structural(_)));
    assert_eq!(stack.depth(), 1);
  }
}
