//! The evaluator wire protocol (spec §4.6, §6), grounded on
//! `extern/meta_classes/meta_process.hpp` and `gen_utils.hpp`'s
//! `gen_meta_class`.
//!
//! Three request modes, each a single ASCII line:
//!   `1` — list known meta-function (meta-class) names.
//!   `2` — expand one meta-class instantiation against a class body.
//!   `3` — shut down.
//!
//! Decision (SPEC_FULL.md §4.2): the mode-2 reply body is read by an
//! exact byte count (`Read::read_exact`), not by re-joining lines —
//! the original's `std::getline` loop is a workaround for not tracking
//! exact byte boundaries and re-adds a trailing `'\n'` per line that a
//! byte-count read doesn't need.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use crate::types::error::{PpError, PpResult};

/// A running meta-evaluator subprocess and its two pipes.
pub struct Evaluator {
  child: Child,
  stdin: ChildStdin,
  stdout: BufReader<ChildStdout>,
}

impl Evaluator {
  /// Spawns `exe` with its stdin/stdout piped, matching
  /// `MetaProcess(std::string_view)`'s `bp::child` construction.
  pub fn spawn(exe: &str) -> PpResult<Self> {
    let mut child = Command::new(exe).stdin(Stdio::piped()).stdout(Stdio::piped()).spawn()?;
    let stdin = child.stdin.take().expect("piped stdin");
    let stdout = BufReader::new(child.stdout.take().expect("piped stdout"));
    Ok(Self { child, stdin, stdout })
  }

  /// Mode 1: returns the evaluator's declared meta-function names.
  pub fn list_meta_classes(&mut self) -> PpResult<Vec<String>> {
    writeln!(self.stdin, "1")?;
    let mut count_line = String::new();
    self.stdout.read_line(&mut count_line)?;
    let count: usize = count_line.trim().parse().map_err(|_| {
      PpError::Evaluator(format!("expected a meta-function count, got {count_line:?}"))
    })?;

    let mut names = Vec::with_capacity(count);
    for _ in 0..count {
      let mut line = String::new();
      self.stdout.read_line(&mut line)?;
      names.push(line.trim().to_string());
    }
    Ok(names)
  }

  /// Mode 2: sends a meta-class expansion request for `meta_class`
  /// applied to the already-serialized `body`, and returns the
  /// generated replacement text.
  pub fn expand(&mut self, meta_class: &str, body: &str) -> PpResult<String> {
    writeln!(self.stdin, "2")?;
    writeln!(self.stdin, "{meta_class}")?;
    self.stdin.write_all(body.as_bytes())?;
    self.stdin.flush()?;

    let mut status_line = String::new();
    self.stdout.read_line(&mut status_line)?;
    let status: i32 =
      status_line.trim().parse().map_err(|_| PpError::Evaluator(format!("bad status line {status_line:?}")))?;

    let mut size_line = String::new();
    self.stdout.read_line(&mut size_line)?;
    let size: usize =
      size_line.trim().parse().map_err(|_| PpError::Evaluator(format!("bad size line {size_line:?}")))?;

    let mut buf = vec![0u8; size];
    std::io::Read::read_exact(&mut self.stdout, &mut buf)?;
    let output = String::from_utf8_lossy(&buf).into_owned();

    if status != 0 {
      return Err(PpError::Evaluator(output));
    }
    Ok(output)
  }

  /// Mode 3: requests shutdown and waits for the child to exit,
  /// matching `~MetaClassParser`'s destructor.
  pub fn shutdown(&mut self) -> PpResult<()> {
    writeln!(self.stdin, "3")?;
    self.child.wait()?;
    Ok(())
  }
}

impl Drop for Evaluator {
  fn drop(&mut self) {
    let _ = writeln!(self.stdin, "3");
    let _ = self.child.wait();
  }
}
