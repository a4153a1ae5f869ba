//! The diagnostic reporter (spec §7, external collaborator), grounded
//! on `include/error_reporter.hpp`'s `ErrorReporter`.
//!
//! The original is a `(file, message)` callback writing to `std::cerr`,
//! with its own `// TODO: make it a logger` left unaddressed. This is
//! that upgrade: `log::error!` in place of a raw stream write, matching
//! how the rest of this crate's ambient stack uses `log`.

use std::fmt;

use crate::types::error::PpError;

/// Routes a `(file, message)` diagnostic to the log stream (spec §7:
/// "errors are surfaced through a small reporter callback that
/// receives (file, message) and routes to the diagnostic stream").
pub fn report(file: &str, message: impl fmt::Display) {
  log::error!("{file}: {message}");
}

/// Reports a `PpError` against the file it was raised for. `Many` is
/// unwrapped and each inner error reported individually, matching the
/// dependency walker's "keep going after a single missing include"
/// behavior (spec §3 supplement).
pub fn report_error(file: &str, err: &PpError) {
  match err {
    PpError::Many(errors) => {
      for e in errors {
        report_error(file, e);
      }
    }
    other => report(file, other),
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn unwraps_many_into_individual_reports() {
    let err = PpError::Many(vec![PpError::Structural("a".into()), PpError::Structural("b".into())]);
    // Smoke test only: `log` has no captured-output API here, so this
    // just confirms the recursive unwrap doesn't panic or loop.
    report_error("f.cpp", &err);
  }
}
