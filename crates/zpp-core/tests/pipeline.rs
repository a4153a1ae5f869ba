//! Crate-root integration tests exercising the pipeline end to end
//! (spec §8's testable properties), as opposed to the colocated
//! `#[cfg(test)]` unit tests inside each module.

use std::fs;
use std::path::{Path, PathBuf};

use zpp_core::driver::{Core, StdParser};
use zpp_core::metaclass::MetaClassDriver;
use zpp_core::reflect::StaticReflexParser;
use zpp_core::types::ast::Namespace;
use zpp_core::types::error::PpError;
use zpp_core::types::fragment::CodeFragment;
use zpp_core::types::source::SourceView;
use zpp_core::types::stack::ParserStack;
use zpp_core::Pipeline;

fn fresh_stack() -> ParserStack {
  let mut stack = ParserStack::new();
  stack.push(CodeFragment::Namespace(Namespace::new(""))).unwrap();
  stack
}

fn full_core() -> Core {
  Core::new(vec![
    Box::new(MetaClassDriver::new(None).unwrap()),
    Box::new(StaticReflexParser::new()),
    Box::new(StdParser::new()),
  ])
}

fn write_source(dir: &Path, name: &str, contents: &str) -> PathBuf {
  let path = dir.join(name);
  fs::write(&path, contents).unwrap();
  path
}

/// "Reflection expansion example" (spec §8): `struct Bar { int bazz;
/// int foo; private: std::string s; };`.
#[test]
fn reflection_expansion_matches_spec_example() {
  let mut stack = fresh_stack();
  let mut source =
    SourceView::new("struct Bar { int bazz; int foo; private: std::string s; };".into(), "bar.cpp");
  let output = full_core().process(&mut source, &mut stack).unwrap();

  assert!(output.contains("template <> struct reflect::Reflect<Bar"));
  assert!(output.contains("&Bar::bazz,&Bar::foo"));
  assert!(output.contains("&Bar::bazz,&Bar::foo,&Bar::s"));
  assert!(output.contains("\"bazz\",\"foo\""));
  assert!(output.contains("\"bazz\",\"foo\",\"s\""));
  assert!(output.contains("decltype(std::declval<Bar>().bazz)"));
  assert!(output.contains("name = \"Bar\""));
  assert!(output.contains("object_type = reflect::ObjectType::STRUCT"));
}

/// "Enum expansion example" (spec §8): `enum class E { first, second };`.
#[test]
fn enum_expansion_matches_spec_example() {
  let mut stack = fresh_stack();
  let mut source = SourceView::new("enum class E { first, second };".into(), "e.cpp");
  let output = full_core().process(&mut source, &mut stack).unwrap();

  assert!(output.contains("name = \"E\""));
  assert!(output.contains("\"first\",\"second\""));
  assert!(output.contains("E::first,E::second"));
  assert!(output.contains("is_scoped_enum = true"));
  assert!(output.contains("using underlying_type = int"));
}

/// "Invariant: stack depth never goes below 1" (spec §8). A program
/// that nests a namespace, a class, and a function must leave the
/// stack holding only the root namespace at end of file.
#[test]
fn stack_depth_returns_to_root_at_eof() {
  let mut stack = fresh_stack();
  let mut source = SourceView::new(
    "namespace outer { class Widget { void tick() { } }; }".into(),
    "widget.cpp",
  );
  full_core().process(&mut source, &mut stack).unwrap();
  assert_eq!(stack.depth(), 1);
}

/// "Structural guard example" (spec §8): a bare `}` at file scope.
#[test]
fn structural_guard_rejects_bare_closing_brace() {
  let mut stack = fresh_stack();
  let mut source = SourceView::new("}".into(), "bad.cpp");
  let err = full_core().process(&mut source, &mut stack).unwrap_err();
  assert!(matches!(err, PpError::Structural(_)));
}

/// "Meta-function recognition" (spec §8): every accept/reject case
/// exercised through the real grammar (`function_signature`), not a
/// hand-built `Function` value — this is the path that was dead code
/// before `is_constexpr` got wired up to the parsed `constexpr`
/// qualifier.
#[test]
fn meta_function_recognition_end_to_end() {
  let cases = [
    ("constexpr void good(meta::type t, const meta::type s) { }", true),
    ("void bad_no_constexpr(meta::type t, const meta::type s) { }", false),
    ("constexpr void bad_one_param(meta::type t) { }", false),
    ("constexpr void bad_wrong_type(int t, const meta::type s) { }", false),
    ("constexpr void bad_second_not_const(meta::type t, meta::type s) { }", false),
    ("constexpr void bad_ref_qualifier(meta::type &t, const meta::type s) { }", false),
  ];

  for (src, expect_meta) in cases {
    let mut stack = fresh_stack();
    let mut source = SourceView::new(src.into(), "meta.cpp");
    full_core().process(&mut source, &mut stack).unwrap();

    let name = src.split("void ").nth(1).unwrap().split('(').next().unwrap();
    assert_eq!(stack.is_meta_class(name), expect_meta, "case: {src}");
  }
}

/// "Target-output rewrite example" (spec §8): inside a meta-function
/// body, `->(target){ ... }` rewrites into an append chain.
#[test]
fn target_output_rewrite_end_to_end() {
  let mut stack = fresh_stack();
  let mut source = SourceView::new(
    "constexpr void interface(meta::type target, const meta::type source) { ->(target){ virtual ~source.name()$() noexcept {} }; }"
      .into(),
    "rewrite.cpp",
  );
  let output = full_core().process(&mut source, &mut stack).unwrap();

  assert!(output.contains("target << \" virtual ~\""));
  assert!(output.contains("<< source.name()"));
  assert!(output.contains("<< \"() noexcept {}\""));
}

/// "Idempotence of expansion" (spec §8): a meta-function definition
/// that has already been rewritten once (its `constexpr` qualifier
/// stripped) is no longer recognized as a meta-function on a second
/// pass, so re-running the preprocessor on it is a no-op.
#[test]
fn meta_function_rewrite_is_idempotent() {
  let mut first_stack = fresh_stack();
  let mut first_source = SourceView::new(
    "constexpr void interface(meta::type target, const meta::type source) { }".into(),
    "idempotent.cpp",
  );
  let first_output = full_core().process(&mut first_source, &mut first_stack).unwrap();
  assert!(!first_output.contains("constexpr"));

  let mut second_stack = fresh_stack();
  let mut second_source = SourceView::new(first_output, "idempotent.cpp");
  full_core().process(&mut second_source, &mut second_stack).unwrap();
  assert!(!second_stack.is_meta_class("interface"));
}

/// "Meta-class interface example" (spec §8): drives the real wire
/// dialogue against a mock evaluator script, checking both the
/// request the evaluator received and the spliced-in reply.
#[test]
fn meta_class_interface_wire_dialogue() {
  let dir = tempfile::tempdir().unwrap();
  let log_path = dir.path().join("evaluator.log");

  let script = format!(
    r#"#!/bin/sh
while IFS= read -r mode; do
  case "$mode" in
    1)
      echo "MODE1" >> "{log}"
      echo 1
      echo interface
      ;;
    2)
      read -r meta_class
      read -r class_name
      echo "MODE2 $meta_class $class_name" >> "{log}"
      read -r method_count
      i=0
      while [ "$i" -lt "$method_count" ]; do
        read -r _r
        read -r _virt
        read -r _ctor
        read -r _acc
        read -r _name
        read -r paramcount
        j=0
        while [ "$j" -lt "$((2 * paramcount))" ]; do
          read -r _p
          j=$((j + 1))
        done
        read -r _const
        read -r _ref
        read -r _override
        i=$((i + 1))
      done
      read -r var_count
      k=0
      while [ "$k" -lt "$((3 * var_count))" ]; do
        read -r _v
        k=$((k + 1))
      done
      body="class ${{class_name}} {{ int get_area(); }};"
      len=$(printf '%s' "$body" | wc -c | tr -d ' ')
      printf '0\n%s\n%s' "$len" "$body"
      ;;
    3)
      exit 0
      ;;
  esac
done
"#,
    log = log_path.display()
  );

  let script_path = dir.path().join("mock_evaluator.sh");
  fs::write(&script_path, script).unwrap();
  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(&script_path, fs::Permissions::from_mode(0o755)).unwrap();
  }

  let input = write_source(
    dir.path(),
    "shape.cpp",
    "constexpr void interface(meta::type target, const meta::type source) { }\ninterface shape { int get_area(); };",
  );

  let pipeline = Pipeline::new(vec![dir.path().to_path_buf()], dir.path().join("out"), Some(script_path.to_string_lossy().into_owned()));
  let output = pipeline.process_source(&input).unwrap();

  assert!(output.contains("class shape { int get_area(); };"));

  let log = fs::read_to_string(&log_path).unwrap();
  assert!(log.contains("MODE1"));
  assert!(log.contains("MODE2 interface shape"));
}
