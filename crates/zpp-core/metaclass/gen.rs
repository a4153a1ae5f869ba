//! Serializes a `Class` into the evaluator's mode-2 request body (spec
//! §6), grounded on `extern/meta_classes/gen_utils.hpp`'s
//! `gen_meta_class`/`write_methods`/`write_variables`.
//!
//! The original pairs its four method/member buckets with the *wrong*
//! `AccessModifier` constants (`private_methods` is written tagged
//! `PROTECTED`, `protected_methods` tagged `PRIVATE` — see
//! `gen_utils.hpp`). `DESIGN.md` records this as a bug we do not carry
//! over: each bucket here is serialized with its own true modifier.
//!
//! Decision (`DESIGN.md`): a `Type` is serialized as its single
//! `to_source()` line rather than one line per sub-field — the
//! evaluator's own `Type` deserializer is outside this spec's scope
//! (§4.6 describes it only as an external collaborator), so there is
//! nothing on this side that needs the finer-grained shape.

use std::fmt::Write as _;

use crate::types::ast::{AccessModifier, Class, ConstructorKind, Function, RefQualifier, Variable};

fn access_code(modifier: AccessModifier) -> i32 {
  match modifier {
    AccessModifier::Public => 0,
    AccessModifier::Protected => 1,
    AccessModifier::Private => 2,
    AccessModifier::Unspecified => 3,
  }
}

fn constructor_code(kind: ConstructorKind) -> i32 {
  match kind {
    ConstructorKind::None => 0,
    ConstructorKind::Ctor => 1,
    ConstructorKind::Dtor => 2,
  }
}

fn ref_qualifier_code(q: Option<RefQualifier>) -> i32 {
  match q {
    None => 0,
    Some(RefQualifier::LValue) => 1,
    Some(RefQualifier::RValue) => 2,
  }
}

fn write_methods(out: &mut String, methods: &[Function], modifier: AccessModifier) {
  for m in methods {
    let return_type = m.return_type.as_ref().map(|t| t.to_source()).unwrap_or_default();
    writeln!(out, "{return_type}").unwrap();
    writeln!(out, "{}", m.is_virtual as i32).unwrap();
    writeln!(out, "{}", constructor_code(m.constructor_kind)).unwrap();
    writeln!(out, "{}", access_code(modifier)).unwrap();
    writeln!(out, "{}", m.name).unwrap();
    writeln!(out, "{}", m.parameters.len()).unwrap();
    for p in &m.parameters {
      writeln!(out, "{}", p.ty.to_source()).unwrap();
      writeln!(out, "{}", p.name.as_deref().unwrap_or("")).unwrap();
    }
    writeln!(out, "{}", m.is_const as i32).unwrap();
    writeln!(out, "{}", ref_qualifier_code(m.ref_qualifier)).unwrap();
    writeln!(out, "{}", m.is_override as i32).unwrap();
  }
}

fn write_variables(out: &mut String, variables: &[Variable], modifier: AccessModifier) {
  for v in variables {
    writeln!(out, "{}", v.ty.to_source()).unwrap();
    writeln!(out, "{}", access_code(modifier)).unwrap();
    writeln!(out, "{}", v.name.as_deref().unwrap_or("")).unwrap();
  }
}

/// Serializes `class` as the mode-2 request body that follows the
/// meta-class name line (spec §6): class name; total method count;
/// each method block; total variable count; each variable.
pub fn serialize_class(class: &Class) -> String {
  let mut out = String::new();
  writeln!(out, "{}", class.name).unwrap();

  let total_methods =
    class.methods.public.len() + class.methods.protected.len() + class.methods.private.len() + class.methods.unspecified.len();
  writeln!(out, "{total_methods}").unwrap();
  write_methods(&mut out, &class.methods.public, AccessModifier::Public);
  write_methods(&mut out, &class.methods.protected, AccessModifier::Protected);
  write_methods(&mut out, &class.methods.private, AccessModifier::Private);
  write_methods(&mut out, &class.methods.unspecified, AccessModifier::Unspecified);

  let total_vars =
    class.members.public.len() + class.members.protected.len() + class.members.private.len() + class.members.unspecified.len();
  writeln!(out, "{total_vars}").unwrap();
  write_variables(&mut out, &class.members.public, AccessModifier::Public);
  write_variables(&mut out, &class.members.protected, AccessModifier::Protected);
  write_variables(&mut out, &class.members.private, AccessModifier::Private);
  write_variables(&mut out, &class.members.unspecified, AccessModifier::Unspecified);

  out
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::types::ast::{ClassType, TemplateParameters, Type};

  #[test]
  fn serializes_method_and_member_counts() {
    let mut class = Class::new(ClassType::Class, "Shape", TemplateParameters::default());
    class.set_access_modifier(AccessModifier::Public);
    class.add_function(Function {
      template_parameters: TemplateParameters::default(),
      is_virtual: false,
      is_constexpr: false,
      constructor_kind: ConstructorKind::None,
      return_type: Some(Type::simple("int")),
      name: "get_area".into(),
      operator_token: None,
      parameters: vec![],
      is_const: false,
      ref_qualifier: None,
      is_override: false,
    });
    class.add_variable(Variable { ty: Type::simple("int"), name: Some("area".into()) });

    let wire = serialize_class(&class);
    let lines: Vec<&str> = wire.lines().collect();
    assert_eq!(lines[0], "Shape");
    assert_eq!(lines[1], "1");
    assert_eq!(lines[2], "int");
    assert!(wire.contains("get_area"));
    assert!(wire.contains("area"));
  }
}
