/// A streamed window over an already-loaded UTF-8 buffer (spec §4.1).
///
/// No I/O happens here; `SourceView` is always constructed from a buffer
/// the loader already read off disk. `advance` marks bytes as processed;
/// it never inspects them, so the caller is responsible for only
/// advancing by a length it actually parsed.
#[derive(Debug, Clone)]
pub struct SourceView {
  buf:           String,
  name:          String,
  processed_till: usize,
}

impl SourceView {
  pub fn new(buf: String, name: impl Into<String>) -> Self {
    Self { buf, name: name.into(), processed_till: 0 }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// The unprocessed remainder of the source.
  pub fn remaining(&self) -> &str {
    &self.buf[self.processed_till..]
  }

  pub fn is_finished(&self) -> bool {
    self.processed_till == self.buf.len()
  }

  /// Marks `num_bytes` of `remaining()` as processed.
  pub fn advance(&mut self, num_bytes: usize) {
    self.processed_till += num_bytes;
  }

  /// 1-based (row, column) of the current position, computed from the
  /// processed prefix. Used for error context (spec §7) and builder
  /// fragment source-location metadata (spec §3).
  pub fn row_col(&self) -> (usize, usize) {
    let consumed = &self.buf[..self.processed_till];
    let row = 1 + consumed.bytes().filter(|&b| b == b'\n').count();
    let col = match consumed.rfind('\n') {
      Some(idx) => consumed[idx + 1..].chars().count() + 1,
      None => consumed.chars().count() + 1,
    };
    (row, col)
  }

  /// Up to `n` characters of context from the current position, for
  /// error messages (spec §7: "~30 characters of context").
  pub fn context(&self, n: usize) -> String {
    self.remaining().chars().take(n).collect()
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn advances_and_finishes() {
    let mut s = SourceView::new("abcdef".into(), "t.cpp");
    assert!(!s.is_finished());
    s.advance(3);
    assert_eq!(s.remaining(), "def");
    s.advance(3);
    assert!(s.is_finished());
  }

  #[test]
  fn tracks_row_col() {
    let mut s = SourceView::new("ab\ncd\nef".into(), "t.cpp");
    s.advance(4); // consumes "ab\nc"
    assert_eq!(s.row_col(), (2, 2));
  }
}
