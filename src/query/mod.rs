//! Compilation of query strings into executable pipelines.

mod error;
mod query;

pub use error::CompileError;
pub use query::Query;

pub(crate) use query::{Call, Expr, SelectorKind, Stage};
