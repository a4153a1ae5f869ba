//! `CodeFragment` — the tagged variant that sits on the parser stack
//! (spec §3, §4.2).

use crate::types::ast::{Class, Enumeration, Function, Namespace, Scope, Variable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
  pub row: usize,
  pub col: usize,
}

/// Container fragments are the only ones the driver ever pushes onto
/// the stack (see `DESIGN.md`); builder fragments are fully modeled for
/// data-model fidelity with spec §3 but are produced and consumed
/// within a single grammar dispatch rather than persisted on the stack.
#[derive(Debug, Clone)]
pub enum CodeFragment {
  Namespace(Namespace),
  Class(Class),
  Function(Function),
  Scope(Scope),
  Enumeration(Enumeration),

  Statement { location: SourceLocation, text: String },
  Expression { location: SourceLocation, text: String },
  RoundExpression { location: SourceLocation, text: String },
  CurlyExpression { location: SourceLocation, text: String },
  Vars { location: SourceLocation, vars: Vec<Variable> },
  IfStatement { location: SourceLocation, condition: String },
  FunctionDeclaration { location: SourceLocation, function: Function },
}

impl CodeFragment {
  pub fn kind_name(&self) -> &'static str {
    match self {
      CodeFragment::Namespace(_) => "namespace",
      CodeFragment::Class(_) => "class",
      CodeFragment::Function(_) => "function",
      CodeFragment::Scope(_) => "scope",
      CodeFragment::Enumeration(_) => "enum",
      CodeFragment::Statement { .. } => "statement",
      CodeFragment::Expression { .. } => "expression",
      CodeFragment::RoundExpression { .. } => "round-expression",
      CodeFragment::CurlyExpression { .. } => "curly-expression",
      CodeFragment::Vars { .. } => "vars",
      CodeFragment::IfStatement { .. } => "if-statement",
      CodeFragment::FunctionDeclaration { .. } => "function-declaration",
    }
  }

  /// Only the five container kinds are legal nesting parents/children
  /// on the driver's stack (spec §4.2 nesting invariants).
  pub fn is_container(&self) -> bool {
    matches!(
      self,
      CodeFragment::Namespace(_)
        | CodeFragment::Class(_)
        | CodeFragment::Function(_)
        | CodeFragment::Scope(_)
        | CodeFragment::Enumeration(_)
    )
  }

  pub fn as_class(&self) -> Option<&Class> {
    match self {
      CodeFragment::Class(c) => Some(c),
      _ => None,
    }
  }

  pub fn as_class_mut(&mut self) -> Option<&mut Class> {
    match self {
      CodeFragment::Class(c) => Some(c),
      _ => None,
    }
  }

  pub fn as_enum_mut(&mut self) -> Option<&mut Enumeration> {
    match self {
      CodeFragment::Enumeration(e) => Some(e),
      _ => None,
    }
  }

  pub fn as_namespace_mut(&mut self) -> Option<&mut Namespace> {
    match self {
      CodeFragment::Namespace(n) => Some(n),
      _ => None,
    }
  }
}
