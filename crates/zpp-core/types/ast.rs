//! The data model of spec §3: `Type`, `Variable`, `Function`, `Class`,
//! `Enumeration`, `Namespace`, `Scope`.

use indexmap::IndexMap;

/// A left qualifier on a `Type` (`const`, `constexpr`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeftQualifier {
  Const,
  Constexpr,
}

/// A single link in a `Type`'s right-qualifier chain: `&`, `&&`, or one
/// `*` (optionally itself `const`-qualified).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RightQualifier {
  Ref,
  RValueRef,
  Pointer { is_const: bool },
}

/// A template argument: either a nested `Type` or a raw numeric literal
/// (spec §3: "each argument is itself a Type or a numeric literal").
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateArg {
  Type(Type),
  Number(String),
}

/// A qualified name: a scoped/dotted path of identifiers, plus optional
/// template arguments, plus left/right qualifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
  pub left_qualifiers:  Vec<LeftQualifier>,
  pub path:             Vec<String>,
  pub template_args:    Vec<TemplateArg>,
  pub right_qualifiers: Vec<RightQualifier>,
}

impl Type {
  pub fn simple(name: impl Into<String>) -> Self {
    Self { left_qualifiers: vec![], path: vec![name.into()], template_args: vec![], right_qualifiers: vec![] }
  }

  /// The full as-written source form, used by the reflection expander
  /// for base-class tuples and `decltype` member types (spec §4.4).
  pub fn to_source(&self) -> String {
    let mut out = String::new();
    for q in &self.left_qualifiers {
      out.push_str(match q {
        LeftQualifier::Const => "const ",
        LeftQualifier::Constexpr => "constexpr ",
      });
    }
    out.push_str(&self.path.join("::"));
    if !self.template_args.is_empty() {
      out.push('<');
      let parts: Vec<String> = self
        .template_args
        .iter()
        .map(|a| match a {
          TemplateArg::Type(t) => t.to_source(),
          TemplateArg::Number(n) => n.clone(),
        })
        .collect();
      out.push_str(&parts.join(","));
      out.push('>');
    }
    for q in &self.right_qualifiers {
      match q {
        RightQualifier::Ref => out.push('&'),
        RightQualifier::RValueRef => out.push_str("&&"),
        RightQualifier::Pointer { is_const } => {
          out.push('*');
          if *is_const {
            out.push_str(" const");
          }
        }
      }
    }
    out
  }

  pub fn is_exactly_const_qualified(&self) -> bool {
    self.left_qualifiers == [LeftQualifier::Const] && self.right_qualifiers.is_empty()
  }
}

/// A `(Type, name)` pair: data members, parameters, locals. Names are
/// optional for bare parameter declarations (spec §3).
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
  pub ty:   Type,
  pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateParameter {
  pub constraint: Vec<String>,
  pub name:       String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateParameters {
  pub params: Vec<TemplateParameter>,
}

impl TemplateParameters {
  pub fn is_empty(&self) -> bool {
    self.params.is_empty()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructorKind {
  None,
  Ctor,
  Dtor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefQualifier {
  LValue,
  RValue,
}

/// One record for {free function, method, constructor/destructor,
/// operator overload}; the discriminator is `constructor_kind` plus
/// `operator_token` (spec §3).
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
  pub template_parameters: TemplateParameters,
  pub is_virtual:          bool,
  pub is_constexpr:        bool,
  pub constructor_kind:    ConstructorKind,
  /// Absent for constructors/destructors.
  pub return_type:         Option<Type>,
  pub name:                String,
  pub operator_token:      Option<String>,
  pub parameters:          Vec<Variable>,
  pub is_const:            bool,
  pub ref_qualifier:       Option<RefQualifier>,
  pub is_override:         bool,
}

impl Function {
  /// spec §4.5: constexpr, exactly two `meta::type` parameters, the
  /// second exactly `const`-qualified with no reference/pointer chain.
  pub fn is_meta_function(&self) -> bool {
    if !self.is_constexpr || self.parameters.len() != 2 {
      return false;
    }
    let is_meta_type = |v: &Variable| v.ty.path == ["meta", "type"];
    let first_bare = |v: &Variable| v.ty.left_qualifiers.is_empty() && v.ty.right_qualifiers.is_empty();

    is_meta_type(&self.parameters[0])
      && first_bare(&self.parameters[0])
      && is_meta_type(&self.parameters[1])
      && self.parameters[1].ty.is_exactly_const_qualified()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassType {
  Class,
  Struct,
  MetaClass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessModifier {
  Public,
  Protected,
  Private,
  Unspecified,
}

#[derive(Debug, Clone, Default)]
pub struct AccessBuckets<T> {
  pub public:      Vec<T>,
  pub protected:   Vec<T>,
  pub private:     Vec<T>,
  pub unspecified: Vec<T>,
}

impl<T> AccessBuckets<T> {
  fn bucket_mut(&mut self, modifier: AccessModifier) -> &mut Vec<T> {
    match modifier {
      AccessModifier::Public => &mut self.public,
      AccessModifier::Protected => &mut self.protected,
      AccessModifier::Private => &mut self.private,
      AccessModifier::Unspecified => &mut self.unspecified,
    }
  }

  pub fn push(&mut self, modifier: AccessModifier, value: T) {
    self.bucket_mut(modifier).push(value);
  }

  /// Public, then protected, then private, in that partition order
  /// (spec §4.4's `data_members` ordering). Unspecified is not part of
  /// this union; callers that need it append separately.
  pub fn public_then_protected_then_private(&self) -> Vec<&T> {
    self.public.iter().chain(self.protected.iter()).chain(self.private.iter()).collect()
  }
}

#[derive(Debug, Clone)]
pub struct Class {
  pub class_type:          ClassType,
  pub name:                String,
  pub template_parameters: TemplateParameters,
  pub access_state:        AccessModifier,
  pub bases:               AccessBuckets<Type>,
  pub nested_classes:      IndexMap<String, Class>,
  pub nested_enums:        IndexMap<String, Enumeration>,
  pub methods:             AccessBuckets<Function>,
  pub members:             AccessBuckets<Variable>,
}

impl Class {
  pub fn new(class_type: ClassType, name: impl Into<String>, template_parameters: TemplateParameters) -> Self {
    let access_state = match class_type {
      ClassType::Class | ClassType::MetaClass => AccessModifier::Private,
      ClassType::Struct => AccessModifier::Public,
    };
    Self {
      class_type,
      name: name.into(),
      template_parameters,
      access_state,
      bases: Default::default(),
      nested_classes: IndexMap::new(),
      nested_enums: IndexMap::new(),
      methods: Default::default(),
      members: Default::default(),
    }
  }

  pub fn is_templated(&self) -> bool {
    !self.template_parameters.is_empty()
  }

  pub fn set_access_modifier(&mut self, modifier: AccessModifier) {
    self.access_state = modifier;
  }

  pub fn add_base(&mut self, modifier: AccessModifier, ty: Type) {
    // spec §3: unspecified-access bases are simply dropped (no bucket
    // exists for them; matches the original's `case UNSPECIFIED: break;`).
    if modifier != AccessModifier::Unspecified {
      self.bases.push(modifier, ty);
    }
  }

  pub fn add_function(&mut self, f: Function) {
    self.methods.push(self.access_state, f);
  }

  pub fn add_variable(&mut self, v: Variable) {
    self.members.push(self.access_state, v);
  }

  pub fn add_class(&mut self, c: Class) {
    self.nested_classes.insert(c.name.clone(), c);
  }

  pub fn add_enum(&mut self, e: Enumeration) {
    self.nested_enums.insert(e.name.clone(), e);
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumType {
  Enum,
  EnumClass,
}

#[derive(Debug, Clone)]
pub struct Enumeration {
  pub enum_type:      EnumType,
  pub name:           String,
  pub underlying_type: Type,
  pub enumerators:    Vec<String>,
}

impl Enumeration {
  pub fn new(enum_type: EnumType, name: impl Into<String>, underlying_type: Option<Type>) -> Self {
    Self {
      enum_type,
      name: name.into(),
      underlying_type: underlying_type.unwrap_or_else(|| Type::simple("int")),
      enumerators: vec![],
    }
  }

  pub fn is_scoped(&self) -> bool {
    self.enum_type == EnumType::EnumClass
  }
}

/// An anonymous local block: holds locally declared names for lookup
/// only (spec §3).
#[derive(Debug, Clone, Default)]
pub struct Scope {
  pub locals: Vec<Variable>,
}

impl Scope {
  pub fn add_variable(&mut self, v: Variable) {
    self.locals.push(v);
  }
}

#[derive(Debug, Clone)]
pub struct Namespace {
  pub name:              String,
  pub nested_namespaces: IndexMap<String, Namespace>,
  pub classes:           IndexMap<String, Class>,
  pub enums:              IndexMap<String, Enumeration>,
  pub functions:          IndexMap<String, Function>,
  pub variables:          IndexMap<String, Variable>,
}

impl Namespace {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      nested_namespaces: IndexMap::new(),
      classes: IndexMap::new(),
      enums: IndexMap::new(),
      functions: IndexMap::new(),
      variables: IndexMap::new(),
    }
  }

  pub fn add_namespace(&mut self, n: Namespace) {
    self.nested_namespaces.insert(n.name.clone(), n);
  }

  pub fn add_class(&mut self, c: Class) {
    self.classes.insert(c.name.clone(), c);
  }

  pub fn add_enum(&mut self, e: Enumeration) {
    self.enums.insert(e.name.clone(), e);
  }

  pub fn add_function(&mut self, f: Function) {
    self.functions.insert(f.name.clone(), f);
  }

  pub fn add_variable(&mut self, v: Variable) {
    if let Some(name) = v.name.clone() {
      self.variables.insert(name, v);
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn meta_function_detection() {
    let good = Function {
      template_parameters: Default::default(),
      is_virtual: false,
      is_constexpr: true,
      constructor_kind: ConstructorKind::None,
      return_type: Some(Type::simple("void")),
      name: "interface".into(),
      operator_token: None,
      parameters: vec![
        Variable { ty: Type::simple("meta::type").tap_path(&["meta", "type"]), name: Some("target".into()) },
        Variable {
          ty: Type { left_qualifiers: vec![LeftQualifier::Const], path: vec!["meta".into(), "type".into()], template_args: vec![], right_qualifiers: vec![] },
          name: Some("source".into()),
        },
      ],
      is_const: false,
      ref_qualifier: None,
      is_override: false,
    };
    assert!(good.is_meta_function());

    let mut not_constexpr = good.clone();
    not_constexpr.is_constexpr = false;
    assert!(!not_constexpr.is_meta_function());

    let mut one_param = good.clone();
    one_param.parameters.pop();
    assert!(!one_param.is_meta_function());
  }

  trait TapPath {
    fn tap_path(self, path: &[&str]) -> Self;
  }
  impl TapPath for Type {
    fn tap_path(mut self, path: &[&str]) -> Self {
      self.path = path.iter().map(|s| s.to_string()).collect();
      self
    }
  }
}
