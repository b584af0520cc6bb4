//! Serialization of [`Node`](crate::doc::Node) trees back to Markdown text.

mod fmt_md;

pub use fmt_md::{ListStyle, RenderOptions, RenderOptionsBuilder, TitleSurroundStyle, UrlSurroundStyle};

pub(crate) use fmt_md::render;
