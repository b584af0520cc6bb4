//! Query, filter, and transform structured text documents.
//!
//! mq is a small query language over document trees: Markdown, MDX, HTML, or plain text is
//! parsed into a uniform node tree, a query is compiled into a pipeline of stages, and
//! evaluating the pipeline yields the matched nodes re-rendered as text, in document order.
//!
//! ```
//! let content = "# Hello World\n\n## Heading2\n\nText";
//! let result = mq::run(".h1", content, &mq::Options::default()).unwrap();
//! assert_eq!(result.values(), ["# Hello World"]);
//! ```
//!
//! Stages compose with pipes, jq style:
//!
//! ```
//! let content = "# Product\n\n## Features\n\nText\n\n## Installation\n\nMore text";
//! let result = mq::run(r#".h2 | select(contains("Feature"))"#, content, &mq::Options::default()).unwrap();
//! assert_eq!(result.values(), ["## Features"]);
//! ```
//!
//! A separate pipeline converts HTML straight to Markdown:
//!
//! ```
//! let markdown = mq::html_to_markdown("<h1>Hello</h1>", &mq::ConversionOptions::default());
//! assert_eq!(markdown.trim(), "# Hello");
//! ```

use derive_builder::Builder;
use std::fmt::{Display, Formatter};

pub mod doc;
mod dom;
mod eval;
mod html2md;
pub mod output;
pub mod query;
mod registry;
pub mod run;

pub use doc::{DetachedSpan, InputFormat, InvalidInput, Node, NodeKind};
pub use eval::{QueryResult, RuntimeError};
pub use html2md::{ConversionOptions, ConversionOptionsBuilder};
pub use output::{ListStyle, TitleSurroundStyle, UrlSurroundStyle};
pub use query::{CompileError, Query};

/// Options for [`run`].
///
/// Every field is optional. An absent `input_format` means Markdown; absent style fields mean
/// "preserve whatever the source had" (see [`output::RenderOptions`]).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Builder)]
#[builder(default)]
pub struct Options {
    pub input_format: Option<InputFormat>,
    pub list_style: Option<ListStyle>,
    pub link_title_style: Option<TitleSurroundStyle>,
    pub link_url_style: Option<UrlSurroundStyle>,
}

impl Options {
    fn render_options(&self) -> output::RenderOptions {
        output::RenderOptions {
            list_style: self.list_style,
            link_title_style: self.link_title_style,
            link_url_style: self.link_url_style,
        }
    }
}

/// Any failure out of [`run`]: the content didn't parse, the query didn't compile, or
/// evaluation failed.
#[derive(Debug)]
pub enum Error {
    Parse(InvalidInput),
    Compile(CompileError),
    Eval(RuntimeError),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Parse(e) => write!(f, "Error parsing input: {e}"),
            Error::Compile(e) => write!(f, "Error evaluating query: {e}"),
            Error::Eval(e) => write!(f, "Error evaluating query: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(e) => Some(e),
            Error::Compile(e) => Some(e),
            Error::Eval(e) => Some(e),
        }
    }
}

/// Compiles `query`, parses `content`, and evaluates the one against the other.
///
/// The query is compiled before any content is touched, so an invalid query fails the same way
/// regardless of input. Evaluation is atomic: on failure no partial [`QueryResult`] exists.
pub fn run(query: &str, content: &str, options: &Options) -> Result<QueryResult, Error> {
    let compiled = Query::compile(query).map_err(Error::Compile)?;
    let format = options.input_format.unwrap_or_default();
    let document = doc::parse(content, format).map_err(Error::Parse)?;
    eval::evaluate(&compiled, &document, &options.render_options()).map_err(Error::Eval)
}

/// Converts HTML to Markdown. Never fails: malformed HTML degrades rather than erroring.
pub fn html_to_markdown(content: &str, options: &ConversionOptions) -> String {
    html2md::convert(content, options)
}
