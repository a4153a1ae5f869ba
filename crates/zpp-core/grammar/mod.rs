pub mod decl;
pub mod expr;
pub mod tokens;
pub mod types;

pub use decl::*;
pub use expr::*;
pub use tokens::*;
pub use types::*;
