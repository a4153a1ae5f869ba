//! The core driver (spec §4.2): the pluggable parser-combinator stack
//! and its main/preprocess loop, grounded on `include/std_parser.hpp`'s
//! `StdParser::parse` and `include/preprocessor.hpp`'s main loop.

pub mod std_parser;

use crate::types::error::{PpError, PpResult};
use crate::types::source::SourceView;
use crate::types::stack::ParserStack;

pub use std_parser::StdParser;

/// A single pluggable grammar collaborator (spec §4.2: "a stack of
/// parser plugins, tried in priority order"). The original's
/// `StaticReflexParser`/`MetaClassParser`/`StdParser` are each one of
/// these: every plugin gets first refusal on the remaining source
/// before the std parser's own rules run.
///
/// Each call both consumes source and produces the text that goes to
/// the *output* file for that span — for the std parser this is just
/// an echo of what it consumed, but the reflection expander and
/// meta-class driver both rewrite a closing `};` into a much larger
/// generated block (spec §4.4, §4.5), so the two are kept distinct.
pub trait ParserPlugin {
  /// A short identifier, used only for the uniqueness assertion and in
  /// error messages; mirrors `StdParser::id` (`'s'+'t'+'d'` in the
  /// original — we just use a string).
  fn id(&self) -> &'static str;

  /// Text to prepend once to the start of every output file (spec
  /// §4.4's reflection preamble, §4.5's meta-class-registry preamble).
  /// Most plugins have none.
  fn prepend(&self) -> Option<String> {
    None
  }

  /// Attempts to consume one grammar unit from the front of `source`
  /// given the current top of `stack`. Returns `Ok(Some(text))` if it
  /// matched, where `text` is what should be written to the output in
  /// place of the consumed span; `Ok(None)` if none of its rules
  /// matched (the driver falls through to the next plugin); `Err` on a
  /// non-recoverable parse failure.
  fn try_parse(&mut self, source: &mut SourceView, stack: &mut ParserStack) -> PpResult<Option<String>>;
}

/// The driver: an ordered list of `ParserPlugin`s and the loop that
/// repeatedly tries each one against the remaining source (spec §4.2).
pub struct Core {
  plugins: Vec<Box<dyn ParserPlugin>>,
}

impl Core {
  /// Builds a driver from `plugins`, asserting that every plugin `id`
  /// is unique (a driver with two plugins answering to the same id is
  /// a configuration bug, not a recoverable runtime condition).
  pub fn new(plugins: Vec<Box<dyn ParserPlugin>>) -> Self {
    let mut seen = std::collections::HashSet::new();
    for p in &plugins {
      assert!(seen.insert(p.id()), "duplicate parser plugin id: {}", p.id());
    }
    Self { plugins }
  }

  /// The combined preamble of every plugin that has one, in plugin
  /// priority order.
  pub fn preamble(&self) -> String {
    self.plugins.iter().filter_map(|p| p.prepend()).collect()
  }

  /// Runs the main loop over `source` until it is fully consumed,
  /// returning the generated output text. Each iteration tries every
  /// plugin in order; the first one that matches "wins" the iteration
  /// and its returned text is appended to the output.
  pub fn process(&mut self, source: &mut SourceView, stack: &mut ParserStack) -> PpResult<String> {
    let mut output = String::new();
    while !source.is_finished() {
      let before = source.remaining().len();
      let mut matched = false;

      for plugin in &mut self.plugins {
        if let Some(text) = plugin.try_parse(source, stack)? {
          output.push_str(&text);
          matched = true;
          break;
        }
      }

      if !matched {
        let (row, col) = source.row_col();
        return Err(PpError::ParseUnrecoverable {
          file: source.name().to_string(),
          row,
          col,
          context: source.context(30),
        });
      }

      let after = source.remaining().len();
      if after == before {
        // A plugin reported success but consumed zero bytes: a bug
        // guard against infinite preprocessing loops (spec §7).
        return Err(PpError::ZeroAdvance);
      }
    }
    Ok(output)
  }
}
