use std::path::PathBuf;

/// Every error the driver, grammar, or evaluator collaborator can raise.
///
/// Mirrors the teacher's flat `HCError`/`RadlrResult` shape: one enum,
/// named variants per failure kind, `From` impls for the handful of
/// std error types that leak in at the loader/evaluator boundary.
#[derive(thiserror::Error, Debug)]
pub enum PpError {
  /// No parser in the stack could consume the next character. Carries
  /// a short window of the offending source for diagnostics (spec §7).
  #[error("unparsable source at {file}:{row}:{col}: {context:?}")]
  ParseUnrecoverable { file: String, row: usize, col: usize, context: String },

  /// A parser reported success but consumed zero bytes. Bug guard
  /// against infinite preprocessing loops (spec §7).
  #[error("error in one of the parsers")]
  ZeroAdvance,

  /// An impossible nesting transition, or an extraneous closing brace.
  #[error("structural error: {0}")]
  Structural(String),

  /// The meta-evaluator reported a nonzero status for a mode-2 request.
  #[error("meta-evaluator reported an error:\n{0}")]
  Evaluator(String),

  /// A required include could not be located or opened.
  #[error("could not load {path}: {message}")]
  Loader { path: PathBuf, message: String },

  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// Several errors collected together (used by the dependency walker,
  /// which keeps going after a single missing include).
  #[error("{} errors occurred", .0.len())]
  Many(Vec<PpError>),
}

pub type PpResult<T> = Result<T, PpError>;
