//! HTML to Markdown conversion.
//!
//! Parses HTML through the same tolerant DOM as the HTML input format, maps it onto the node
//! tree, and renders the blocks back out as Markdown. Malformed HTML never fails; unsupported
//! markup degrades to plain text.

use crate::doc::{self, Node, NodeKind};
use crate::dom::Dom;
use crate::output::{render, RenderOptions};
use derive_builder::Builder;

/// Options for [`convert`] (and [`html_to_markdown`](crate::html_to_markdown)).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Builder)]
#[builder(default)]
pub struct ConversionOptions {
    /// Turn `<script>` bodies into fenced code blocks instead of dropping them.
    pub extract_scripts_as_code_blocks: bool,
    /// Emit `<head>` metadata (title, `<meta name=…>` tags) as a leading front-matter block.
    pub generate_front_matter: bool,
    /// Emit the document `<title>` as a level-1 heading at the top of the body, whether or not
    /// the body already has one.
    pub use_title_as_h1: bool,
}

pub(crate) fn convert(html: &str, options: &ConversionOptions) -> String {
    let dom = Dom::parse(html);
    let mut blocks: Vec<Node> = Vec::new();

    let title = dom
        .find_first(dom.document(), "title")
        .map(|id| dom.text_content(id).trim().to_string())
        .filter(|title| !title.is_empty());

    if options.generate_front_matter {
        if let Some(front_matter) = front_matter(&dom, title.as_deref()) {
            blocks.push(front_matter);
        }
    }
    if options.use_title_as_h1 {
        if let Some(title) = &title {
            blocks.push(Node::with_children(
                NodeKind::Heading { level: 1 },
                vec![Node::new(NodeKind::Text {
                    value: title.clone(),
                })],
            ));
        }
    }

    blocks.extend(doc::map_body(&dom, options.extract_scripts_as_code_blocks));

    let render_options = RenderOptions::default();
    let mut out = String::new();
    let mut previous_was_item = false;
    for block in &blocks {
        let rendered = render(block, &render_options);
        if rendered.is_empty() {
            continue;
        }
        let is_item = matches!(block.kind, NodeKind::ListItem { .. });
        if !out.is_empty() {
            // items of the same list sit on adjacent lines; everything else gets a blank line
            out.push_str(if previous_was_item && is_item { "\n" } else { "\n\n" });
        }
        out.push_str(&rendered);
        previous_was_item = is_item;
    }
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Builds a front-matter node from whatever metadata the `<head>` holds. `None` when there is
/// nothing worth emitting.
fn front_matter(dom: &Dom, title: Option<&str>) -> Option<Node> {
    let mut lines: Vec<String> = Vec::new();
    if let Some(title) = title {
        lines.push(format!("title: {title}"));
    }
    if let Some(head) = dom.find_first(dom.document(), "head") {
        collect_meta(dom, head, &mut lines);
    }
    if lines.is_empty() {
        return None;
    }
    Some(Node::new(NodeKind::FrontMatter {
        value: lines.join("\n"),
    }))
}

fn collect_meta(dom: &Dom, parent: crate::dom::DomId, lines: &mut Vec<String>) {
    for child in dom.children(parent) {
        if dom.tag_name(child) == Some("meta") {
            if let (Some(name), Some(content)) = (dom.attr(child, "name"), dom.attr(child, "content")) {
                if !name.is_empty() && !content.is_empty() {
                    lines.push(format!("{name}: {content}"));
                }
            }
        }
        collect_meta(dom, child, lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert_default(html: &str) -> String {
        convert(html, &ConversionOptions::default())
    }

    #[test]
    fn heading_and_strong() {
        let markdown = convert_default("<h1>Hello World</h1><p>This is a <strong>test</strong>.</p>");
        assert_eq!(markdown.trim(), "# Hello World\n\nThis is a **test**.");
    }

    #[test]
    fn lists() {
        let markdown = convert_default("<ul><li>one</li><li>two</li></ul>");
        assert_eq!(markdown.trim(), "- one\n- two");
    }

    #[test]
    fn malformed_html_still_converts() {
        let markdown = convert_default("<h1>Unclosed<p>And <b>nested");
        assert!(markdown.contains("# Unclosed"), "got: {markdown:?}");
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(convert_default(""), "");
    }

    mod title_as_h1 {
        use super::*;

        #[test]
        fn injects_heading() {
            let html = "<html><head><title>Page Title</title></head><body><h1>Content</h1></body></html>";
            let options = ConversionOptions {
                use_title_as_h1: true,
                ..ConversionOptions::default()
            };
            let markdown = convert(html, &options);
            assert!(markdown.contains("# Page Title"), "got: {markdown:?}");
            assert!(markdown.contains("# Content"), "got: {markdown:?}");
            // the injected title comes first
            assert!(markdown.find("# Page Title") < markdown.find("# Content"));
        }

        #[test]
        fn off_by_default() {
            let html = "<html><head><title>Page Title</title></head><body><p>x</p></body></html>";
            let markdown = convert_default(html);
            assert!(!markdown.contains("Page Title"), "got: {markdown:?}");
        }
    }

    mod front_matter {
        use super::*;

        #[test]
        fn title_and_meta() {
            let html = concat!(
                "<html><head><title>Doc</title>",
                r#"<meta name="description" content="a page">"#,
                "</head><body><p>body</p></body></html>",
            );
            let options = ConversionOptions {
                generate_front_matter: true,
                ..ConversionOptions::default()
            };
            let markdown = convert(html, &options);
            assert!(markdown.starts_with("---\n"), "got: {markdown:?}");
            assert!(markdown.contains("title: Doc"), "got: {markdown:?}");
            assert!(markdown.contains("description: a page"), "got: {markdown:?}");
        }

        #[test]
        fn nothing_to_emit_means_no_block() {
            let options = ConversionOptions {
                generate_front_matter: true,
                ..ConversionOptions::default()
            };
            let markdown = convert("<p>plain</p>", &options);
            assert!(!markdown.contains("---"), "got: {markdown:?}");
        }
    }

    mod scripts {
        use super::*;

        #[test]
        fn dropped_by_default() {
            let markdown = convert_default("<p>text</p><script>alert(1)</script>");
            assert!(!markdown.contains("alert"), "got: {markdown:?}");
        }

        #[test]
        fn extracted_as_code_block() {
            let options = ConversionOptions {
                extract_scripts_as_code_blocks: true,
                ..ConversionOptions::default()
            };
            let markdown = convert("<p>text</p><script>alert(1)</script>", &options);
            assert!(markdown.contains("```javascript\nalert(1)\n```"), "got: {markdown:?}");
        }
    }
}
