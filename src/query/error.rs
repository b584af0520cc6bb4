use crate::doc::DetachedSpan;
use crate::query::query::PestError;
use pest::error::ErrorVariant;
use pest::Span;
use std::fmt::{Display, Formatter};

/// A query failed to compile: syntax error, unknown function or selector, or wrong arity.
///
/// All of these are caught before any document tree is touched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileError {
    pub(crate) inner: InnerCompileError,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum InnerCompileError {
    Pest(Box<PestError>),
    Other(DetachedSpan, String),
}

impl CompileError {
    pub(crate) fn at(span: DetachedSpan, message: impl Into<String>) -> Self {
        Self {
            inner: InnerCompileError::Other(span, message.into()),
        }
    }

    /// Renders this error with the offending query span underlined, pest style.
    pub fn to_string_with(&self, query_text: &str) -> String {
        match &self.inner {
            InnerCompileError::Pest(e) => format!("{e}"),
            InnerCompileError::Other(span, message) => match Span::new(query_text, span.start, span.end) {
                None => message.to_string(),
                Some(span) => {
                    let pest_err: PestError = PestError::new_from_span(
                        ErrorVariant::CustomError {
                            message: message.to_string(),
                        },
                        span,
                    );
                    pest_err.to_string()
                }
            },
        }
    }
}

impl Display for CompileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            InnerCompileError::Pest(error) => Display::fmt(error, f),
            InnerCompileError::Other(_, message) => Display::fmt(message, f),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<PestError> for CompileError {
    fn from(err: PestError) -> Self {
        Self {
            inner: InnerCompileError::Pest(Box::new(err)),
        }
    }
}
