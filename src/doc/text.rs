use crate::doc::tree::{DetachedSpan, Node, NodeKind};

/// Parses plain-text content: one [`NodeKind::Text`] leaf per line, in source order, with no
/// nested structure. Line terminators are not part of any node.
pub(crate) fn parse_text(content: &str) -> Node {
    let mut children = Vec::new();
    let bytes = content.as_bytes();
    let mut start = 0;
    while start <= bytes.len() {
        let end = match memchr::memchr(b'\n', &bytes[start..]) {
            Some(i) => start + i,
            None => bytes.len(),
        };
        if start == bytes.len() && start == end {
            // no trailing empty node after a final newline
            break;
        }
        let mut line_end = end;
        if line_end > start && bytes[line_end - 1] == b'\r' {
            line_end -= 1;
        }
        let line = &content[start..line_end];
        let mut node = Node::new(NodeKind::Text {
            value: line.to_string(),
        });
        node.span = Some(DetachedSpan {
            start,
            end: line_end,
        });
        node.verbatim = Some(line.to_string());
        children.push(node);
        if end == bytes.len() {
            break;
        }
        start = end + 1;
    }
    Node::with_children(NodeKind::Document, children)
}

/// Parses raw content: the entire input as a single opaque [`NodeKind::Text`] node.
pub(crate) fn parse_raw(content: &str) -> Node {
    let mut node = Node::new(NodeKind::Text {
        value: content.to_string(),
    });
    node.span = Some(DetachedSpan {
        start: 0,
        end: content.len(),
    });
    node.verbatim = Some(content.to_string());
    Node::with_children(NodeKind::Document, vec![node])
}

/// An empty tree, for queries that synthesize values without referencing input.
pub(crate) fn parse_null() -> Node {
    Node::new(NodeKind::Document)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(node: &Node) -> Vec<&str> {
        node.children
            .iter()
            .map(|n| n.verbatim().unwrap_or_default())
            .collect()
    }

    #[test]
    fn one_node_per_line() {
        let doc = parse_text("Line 1\nLine 2\nLine 3");
        assert_eq!(lines(&doc), vec!["Line 1", "Line 2", "Line 3"]);
    }

    #[test]
    fn trailing_newline_adds_no_node() {
        let doc = parse_text("a\nb\n");
        assert_eq!(lines(&doc), vec!["a", "b"]);
    }

    #[test]
    fn crlf() {
        let doc = parse_text("a\r\nb");
        assert_eq!(lines(&doc), vec!["a", "b"]);
    }

    #[test]
    fn empty_lines_kept() {
        let doc = parse_text("a\n\nb");
        assert_eq!(lines(&doc), vec!["a", "", "b"]);
    }

    #[test]
    fn empty_input_is_empty_document() {
        let doc = parse_text("");
        assert!(doc.children.is_empty());
    }

    #[test]
    fn raw_is_single_node() {
        let doc = parse_raw("# not\nparsed");
        assert_eq!(lines(&doc), vec!["# not\nparsed"]);
    }

    #[test]
    fn null_is_empty() {
        assert!(parse_null().children.is_empty());
    }
}
