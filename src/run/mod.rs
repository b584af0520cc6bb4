//! The CLI binary's working parts, kept in the library so they can be integration-tested
//! without spawning a process.

mod cli;
#[allow(clippy::module_inception)]
mod run;

pub use cli::{CliOptions, OutputFormat};
pub use run::{run, Error, Input, OsFacade};
