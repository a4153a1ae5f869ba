//! `zpp_core` — the zero-extension source-to-source preprocessing
//! pipeline: a pluggable parser-combinator stack, a static-reflection
//! expander, and a meta-class driver that delegates to an out-of-process
//! evaluator.
//!
//! The CLI front end, source loader's filesystem plumbing, and
//! diagnostic printer are thin adapters around [`Pipeline`]; this crate
//! carries no logic beyond what the wire/file-layout contracts require
//! of them.

pub mod driver;
pub mod grammar;
pub mod loader;
pub mod metaclass;
pub mod pipeline;
pub mod reflect;
pub mod report;
pub mod types;

pub use pipeline::Pipeline;
pub use types::error::{PpError, PpResult};
