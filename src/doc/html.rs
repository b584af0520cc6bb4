use crate::doc::tree::{Node, NodeKind};
use crate::dom::{Dom, DomData, DomId};

/// Parses HTML content into a [`Node`] tree.
///
/// The DOM parse is tag-soup tolerant and never fails; whatever structure can be recognized maps
/// onto the shared node kinds, and anything else degrades to plain text. Only the document body
/// contributes nodes.
pub(crate) fn parse(content: &str) -> Node {
    let dom = Dom::parse(content);
    Node::with_children(NodeKind::Document, map_body(&dom, false))
}

/// Maps the `<body>` of an already-parsed DOM onto block-level nodes.
///
/// `extract_scripts` turns `<script>` bodies into code blocks instead of dropping them.
pub(crate) fn map_body(dom: &Dom, extract_scripts: bool) -> Vec<Node> {
    let mut blocks = Vec::new();
    if let Some(body) = dom.find_first(dom.document(), "body") {
        map_blocks(dom, body, extract_scripts, &mut blocks);
    }
    blocks
}

/// Tags that only group content; their children are walked as if the tag were not there.
fn is_container(tag: &str) -> bool {
    matches!(
        tag,
        "div" | "section" | "article" | "main" | "header" | "footer" | "nav" | "aside" | "figure" | "details" | "blockquote" | "body"
    )
}

fn map_blocks(dom: &Dom, parent: DomId, extract_scripts: bool, out: &mut Vec<Node>) {
    for child in dom.children(parent) {
        match dom.data(child) {
            Some(DomData::Text(text)) => {
                let collapsed = collapse_whitespace(text);
                let trimmed = collapsed.trim();
                if !trimmed.is_empty() {
                    out.push(Node::new(NodeKind::Text {
                        value: trimmed.to_string(),
                    }));
                }
            }
            Some(DomData::Element { .. }) => {
                let tag = dom.tag_name(child).unwrap_or("");
                match tag {
                    "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                        let level = tag.as_bytes()[1] - b'0';
                        out.push(Node::with_children(
                            NodeKind::Heading { level },
                            map_inlines(dom, child),
                        ));
                    }
                    "p" => out.push(Node::with_children(NodeKind::Paragraph, map_inlines(dom, child))),
                    "ul" | "ol" => map_list(dom, child, tag == "ol", extract_scripts, out),
                    "pre" => out.push(map_pre(dom, child)),
                    "a" => out.push(map_link(dom, child)),
                    "img" => out.push(map_image(dom, child)),
                    "script" => {
                        if extract_scripts {
                            let value = dom.text_content(child).trim().to_string();
                            if !value.is_empty() {
                                out.push(Node::new(NodeKind::CodeBlock {
                                    language: Some(script_language(dom, child)),
                                    value,
                                }));
                            }
                        }
                    }
                    "style" | "template" | "head" | "title" | "meta" | "link" | "br" | "hr" => {}
                    tag if is_container(tag) => map_blocks(dom, child, extract_scripts, out),
                    _ => {
                        // unknown tag: degrade to its inner text
                        let text = collapse_whitespace(&dom.text_content(child));
                        let trimmed = text.trim();
                        if !trimmed.is_empty() {
                            out.push(Node::new(NodeKind::Text {
                                value: trimmed.to_string(),
                            }));
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

fn map_list(dom: &Dom, list: DomId, ordered: bool, extract_scripts: bool, out: &mut Vec<Node>) {
    for child in dom.children(list) {
        match dom.tag_name(child) {
            Some("li") => {
                let mut item_children = Vec::new();
                // an item may hold bare inline content, nested lists, or both
                let mut inline = Vec::new();
                for li_child in dom.children(child) {
                    match dom.tag_name(li_child) {
                        Some("ul") => {
                            flush_inline(&mut inline, &mut item_children);
                            map_list(dom, li_child, false, extract_scripts, &mut item_children);
                        }
                        Some("ol") => {
                            flush_inline(&mut inline, &mut item_children);
                            map_list(dom, li_child, true, extract_scripts, &mut item_children);
                        }
                        Some("p") => {
                            flush_inline(&mut inline, &mut item_children);
                            item_children.push(Node::with_children(NodeKind::Paragraph, map_inlines(dom, li_child)));
                        }
                        _ => map_inline_node(dom, li_child, &mut inline),
                    }
                }
                flush_inline(&mut inline, &mut item_children);
                out.push(Node::with_children(NodeKind::ListItem { ordered }, item_children));
            }
            Some("ul") => map_list(dom, child, false, extract_scripts, out),
            Some("ol") => map_list(dom, child, true, extract_scripts, out),
            _ => {}
        }
    }
}

fn flush_inline(inline: &mut Vec<Node>, out: &mut Vec<Node>) {
    trim_inline_run(inline);
    out.append(inline);
}

fn map_pre(dom: &Dom, pre: DomId) -> Node {
    let code = dom.children(pre).find(|&c| dom.tag_name(c) == Some("code"));
    let language = code.and_then(|c| code_language(dom, c));
    let value_source = code.unwrap_or(pre);
    let mut value = dom.text_content(value_source);
    if value.ends_with('\n') {
        value.pop();
    }
    Node::new(NodeKind::CodeBlock { language, value })
}

fn code_language(dom: &Dom, code: DomId) -> Option<String> {
    let class = dom.attr(code, "class")?;
    class.split_whitespace().find_map(|c| {
        c.strip_prefix("language-")
            .or_else(|| c.strip_prefix("lang-"))
            .map(str::to_string)
    })
}

fn script_language(dom: &Dom, script: DomId) -> String {
    match dom.attr(script, "type") {
        // "text/javascript", "application/json", "module", ...
        Some(mime) if mime.contains('/') => mime.rsplit('/').next().unwrap_or("javascript").to_string(),
        Some("module") | None => "javascript".to_string(),
        Some(other) => other.to_string(),
    }
}

fn map_link(dom: &Dom, a: DomId) -> Node {
    let url = dom.attr(a, "href").unwrap_or_default().to_string();
    let title = dom.attr(a, "title").map(str::to_string);
    let mut children = map_inlines(dom, a);
    if children.is_empty() {
        children.push(Node::new(NodeKind::Text {
            value: url.clone(),
        }));
    }
    Node::with_children(NodeKind::Link { url, title }, children)
}

fn map_image(dom: &Dom, img: DomId) -> Node {
    Node::new(NodeKind::Image {
        url: dom.attr(img, "src").unwrap_or_default().to_string(),
        alt: dom.attr(img, "alt").unwrap_or_default().to_string(),
    })
}

/// Maps an element's inline content: text runs with `strong`/`em`/`code`/`del` folded into
/// Markdown markup, plus links and images.
fn map_inlines(dom: &Dom, parent: DomId) -> Vec<Node> {
    let mut out = Vec::new();
    for child in dom.children(parent) {
        map_inline_node(dom, child, &mut out);
    }
    trim_inline_run(&mut out);
    out
}

fn map_inline_node(dom: &Dom, child: DomId, out: &mut Vec<Node>) {
    match dom.data(child) {
        Some(DomData::Text(text)) => push_text(out, &collapse_whitespace(text)),
        Some(DomData::Element { .. }) => {
            let tag = dom.tag_name(child).unwrap_or("");
            match tag {
                "strong" | "b" => push_wrapped(dom, child, out, "**"),
                "em" | "i" => push_wrapped(dom, child, out, "*"),
                "del" | "s" | "strike" => push_wrapped(dom, child, out, "~~"),
                "code" => {
                    let inner = dom.text_content(child);
                    push_text(out, &format!("`{}`", inner));
                }
                "br" => push_text(out, "\n"),
                "a" => out.push(map_link(dom, child)),
                "img" => out.push(map_image(dom, child)),
                "script" | "style" => {}
                _ => {
                    for grandchild in dom.children(child) {
                        map_inline_node(dom, grandchild, out);
                    }
                }
            }
        }
        _ => {}
    }
}

fn push_wrapped(dom: &Dom, element: DomId, out: &mut Vec<Node>, marker: &str) {
    let inner = collapse_whitespace(&dom.text_content(element));
    let inner = inner.trim();
    if inner.is_empty() {
        return;
    }
    push_text(out, &format!("{marker}{inner}{marker}"));
}

/// Appends text, merging with a trailing text node so adjacent runs render as one.
fn push_text(out: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Node {
        kind: NodeKind::Text { value },
        ..
    }) = out.last_mut()
    {
        value.push_str(text);
        return;
    }
    out.push(Node::new(NodeKind::Text {
        value: text.to_string(),
    }));
}

/// Trims leading whitespace off the first text node and trailing whitespace off the last, after a
/// block's inline run has been assembled.
fn trim_inline_run(nodes: &mut Vec<Node>) {
    if let Some(Node {
        kind: NodeKind::Text { value },
        ..
    }) = nodes.first_mut()
    {
        *value = value.trim_start().to_string();
    }
    if let Some(Node {
        kind: NodeKind::Text { value },
        ..
    }) = nodes.last_mut()
    {
        *value = value.trim_end().to_string();
    }
    nodes.retain(|node| !matches!(&node.kind, NodeKind::Text { value } if value.is_empty()));
}

/// HTML whitespace collapsing: any run of whitespace becomes a single space.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_whitespace = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push(' ');
            }
            in_whitespace = true;
        } else {
            out.push(ch);
            in_whitespace = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_and_paragraphs() {
        let doc = parse("<h1>Hello</h1><p>World</p>");
        assert_eq!(doc.children.len(), 2);
        assert!(matches!(doc.children[0].kind, NodeKind::Heading { level: 1 }));
        assert_eq!(doc.children[0].plain_text(), "Hello");
        assert!(matches!(doc.children[1].kind, NodeKind::Paragraph));
        assert_eq!(doc.children[1].plain_text(), "World");
    }

    #[test]
    fn strong_folds_into_markup() {
        let doc = parse("<p>This is a <strong>test</strong>.</p>");
        assert_eq!(doc.children[0].plain_text(), "This is a **test**.");
    }

    #[test]
    fn lists_flatten_to_items() {
        let doc = parse("<ul><li>one</li><li>two</li></ul>");
        assert_eq!(doc.children.len(), 2);
        assert!(matches!(doc.children[0].kind, NodeKind::ListItem { ordered: false }));
        assert_eq!(doc.children[1].plain_text(), "two");
    }

    #[test]
    fn pre_code_with_language() {
        let doc = parse(r#"<pre><code class="language-rust">fn main() {}</code></pre>"#);
        let NodeKind::CodeBlock { language, value } = &doc.children[0].kind else {
            panic!("expected code block, got {:?}", doc.children[0].kind);
        };
        assert_eq!(language.as_deref(), Some("rust"));
        assert_eq!(value, "fn main() {}");
    }

    #[test]
    fn unknown_tag_degrades_to_text() {
        let doc = parse("<marquee>old web</marquee>");
        assert_eq!(doc.children.len(), 1);
        assert!(matches!(doc.children[0].kind, NodeKind::Text { .. }));
        assert_eq!(doc.children[0].plain_text(), "old web");
    }

    #[test]
    fn containers_are_transparent() {
        let doc = parse("<div><section><h2>Inside</h2></section></div>");
        assert!(matches!(doc.children[0].kind, NodeKind::Heading { level: 2 }));
    }

    #[test]
    fn scripts_dropped_by_default() {
        let doc = parse("<p>text</p><script>alert(1)</script>");
        assert_eq!(doc.children.len(), 1);
    }

    #[test]
    fn whitespace_collapses() {
        let doc = parse("<p>a\n   b</p>");
        assert_eq!(doc.children[0].plain_text(), "a b");
    }
}
