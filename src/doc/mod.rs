//! Parsing of documents into the uniform [`Node`] tree.
//!
//! One capability ("produce a [`Node`] tree from text") with a concrete parser per
//! [`InputFormat`], selected by [`parse`]. The evaluator and renderer never care which format a
//! tree came from.

mod html;
mod markdown;
mod text;
mod tree;

pub use tree::{Descendants, DetachedSpan, InputFormat, InvalidInput, Node, NodeKind};

/// Parses `content` in the given format into a [`Node`] tree.
///
/// Parsing is best-effort and tolerant wherever the format allows: HTML recovers from tag soup,
/// and Markdown constructs with no counterpart in the node model degrade to text. Only content
/// the format genuinely cannot make sense of (malformed MDX, mostly) produces an
/// [`InvalidInput`].
pub fn parse(content: &str, format: InputFormat) -> Result<Node, InvalidInput> {
    match format {
        InputFormat::Markdown => markdown::parse(content, false),
        InputFormat::Mdx => markdown::parse(content, true),
        InputFormat::Text => Ok(text::parse_text(content)),
        InputFormat::Html => Ok(html::parse(content)),
        InputFormat::Raw => Ok(text::parse_raw(content)),
        InputFormat::Null => Ok(text::parse_null()),
    }
}

pub(crate) use html::map_body;
