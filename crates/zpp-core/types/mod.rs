pub mod ast;
pub mod error;
pub mod fragment;
pub mod source;
pub mod stack;

pub use ast::*;
pub use error::{PpError, PpResult};
pub use fragment::{CodeFragment, SourceLocation};
pub use source::SourceView;
pub use stack::ParserStack;
