//! Assembles the driver, loader, and plugins into the end-to-end
//! pipeline (spec §2's top-level data flow; §3's dependency-discovery
//! supplement), grounded on `include/preprocessor.hpp`'s `Preprocessor`.
//!
//! The original splits `process_source` (drive to completion with a
//! writer) from `preprocess_source` (the same loop, but gated by each
//! parser's optional `preprocess` hook, std parser as fallback) plus a
//! separate `finish_preprocess` pass. `driver::Core::process` already
//! folds all of that into one loop — every plugin gets first refusal in
//! priority order, the std parser is simply last in the list — so
//! `Pipeline` only needs the one entry point (see `DESIGN.md`).

use std::collections::HashSet;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::driver::{Core, StdParser};
use crate::loader::{is_standard_include, SourceLoader};
use crate::metaclass::MetaClassDriver;
use crate::reflect::StaticReflexParser;
use crate::types::ast::Namespace;
use crate::types::error::PpResult;
use crate::types::fragment::CodeFragment;
use crate::types::stack::ParserStack;

/// The assembled pipeline: a `SourceLoader` plus the configuration
/// needed to spin up a fresh `Core` (and its own `MetaClassDriver`
/// evaluator subprocess) per input file, matching the original's
/// per-`process_source`-call driver lifetime.
pub struct Pipeline {
  loader:              SourceLoader,
  meta_evaluator_exe: Option<String>,
}

impl Pipeline {
  pub fn new(include_dirs: Vec<PathBuf>, out: PathBuf, meta_evaluator_exe: Option<String>) -> Self {
    Self { loader: SourceLoader::new(include_dirs, out), meta_evaluator_exe }
  }

  fn fresh_stack() -> ParserStack {
    let mut stack = ParserStack::new();
    stack.push(CodeFragment::Namespace(Namespace::new(""))).expect("root namespace always nests");
    stack
  }

  fn build_core(&self, stack: &mut ParserStack) -> PpResult<Core> {
    let mut metaclass = MetaClassDriver::new(self.meta_evaluator_exe.as_deref())?;
    metaclass.handshake(stack)?;
    Ok(Core::new(vec![Box::new(metaclass), Box::new(StaticReflexParser::new()), Box::new(StdParser::new())]))
  }

  /// Drives `input` to completion and returns the generated output
  /// text, prefixed by the combined plugin preamble (spec §6: "every
  /// output source file is prepended with an include of `meta.hpp`
  /// and/or a forward declaration for the reflection template").
  pub fn process_source(&self, input: &Path) -> PpResult<String> {
    let mut stack = Self::fresh_stack();
    let mut core = self.build_core(&mut stack)?;

    let mut source = self.loader.load_source(input)?;
    let preamble = core.preamble();
    let body = core.process(&mut source, &mut stack)?;
    Ok(format!("{preamble}{body}"))
  }

  /// `process_source`, written to the mirrored output path for `input`
  /// (spec §6 "File layout").
  pub fn preprocess_source(&self, input: &Path) -> PpResult<()> {
    let text = self.process_source(input)?;
    let rel = crate::loader::get_source_name(input);
    let mut file = self.loader.open_source(Path::new(&rel))?;
    file.write_all(text.as_bytes())?;
    Ok(())
  }

  /// Transitively walks `input`'s includes, resolving each against the
  /// search path, and returns every newly discovered `(resolved-source,
  /// mirrored-output)` pair exactly once (spec §3 supplement, grounded
  /// on `Preprocessor::get_dependencies`). Standard/system includes are
  /// skipped; an include that can't be resolved on the search path is
  /// logged and otherwise ignored, matching the original's own
  /// "file can't be found" diagnostic rather than failing the walk.
  pub fn dependencies_of(&self, input: &Path) -> PpResult<Vec<(PathBuf, PathBuf)>> {
    let mut seen = HashSet::new();
    let mut queue = vec![input.to_path_buf()];
    let mut found = Vec::new();

    while let Some(name) = queue.pop() {
      let source = self.loader.load_source(&name)?;
      let deps = StdParser::get_includes(source.remaining())?;

      for dep in deps {
        if is_standard_include(&dep) {
          continue;
        }
        let dep_path = Path::new(&dep);
        let Some(resolved) = self.loader.find_source(dep_path) else {
          log::warn!("file {dep} can't be found");
          continue;
        };
        if seen.insert(resolved.clone()) {
          let out_path = self.loader.get_out_path(dep_path);
          found.push((resolved.clone(), out_path));
          queue.push(resolved);
        }
      }
    }
    Ok(found)
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use std::fs;

  fn write_source(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
  }

  #[test]
  fn reflects_struct_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "bar.cpp", "struct Bar { int bazz; int foo; private: std::string s; };");

    let pipeline = Pipeline::new(vec![dir.path().to_path_buf()], dir.path().join("out"), None);
    let output = pipeline.process_source(&input).unwrap();

    assert!(output.contains("reflect::Reflect<Bar"));
    assert!(output.contains("\"bazz\""));
    assert!(output.contains("\"s\""));
  }

  #[test]
  fn meta_class_instantiation_without_evaluator_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(
      dir.path(),
      "shape.cpp",
      "constexpr void interface(meta::type target, const meta::type source) { }\ninterface shape { int get_area(); };",
    );

    let pipeline = Pipeline::new(vec![dir.path().to_path_buf()], dir.path().join("out"), None);
    let err = pipeline.process_source(&input).unwrap_err();
    assert!(matches!(err, crate::types::error::PpError::Evaluator(_)));
  }

  #[test]
  fn bare_closing_brace_is_a_structural_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "bad.cpp", "}");

    let pipeline = Pipeline::new(vec![dir.path().to_path_buf()], dir.path().join("out"), None);
    let err = pipeline.process_source(&input).unwrap_err();
    assert!(matches!(err, crate::types::error::PpError::Structural(_)));
  }

  #[test]
  fn includes_are_deduplicated_and_resolved_as_dependencies() {
    let dir = tempfile::tempdir().unwrap();
    write_source(dir.path(), "dep.hpp", "int x;");
    let input =
      write_source(dir.path(), "main.cpp", "#include \"dep.hpp\"\n#include \"dep.hpp\"\n#include <vector>\n");

    let pipeline = Pipeline::new(vec![dir.path().to_path_buf()], dir.path().join("out"), None);
    let deps = pipeline.dependencies_of(&input).unwrap();

    assert_eq!(deps.len(), 1);
    assert!(deps[0].0.ends_with("dep.hpp"));
  }
}
