use std::fmt::{Display, Formatter};

/// Evaluation of a compiled query failed.
///
/// This covers everything that can only be discovered at traversal time: a builtin rejecting its
/// argument's type, a regex that fails to compile, or a registry lookup that no longer resolves.
/// Evaluation is atomic; when this error is returned, no partial result exists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeError {
    message: String,
}

impl RuntimeError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RuntimeError {}
