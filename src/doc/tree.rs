use std::fmt::{Display, Formatter};

/// A byte range into the original source content.
///
/// Like a [`pest::Span`], but without a reference to the underlying `&str`, and thus cheaply
/// Copyable and usable across both query text and document content.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash)]
pub struct DetachedSpan {
    pub start: usize,
    pub end: usize,
}

impl From<pest::Span<'_>> for DetachedSpan {
    fn from(value: pest::Span) -> Self {
        Self {
            start: value.start(),
            end: value.end(),
        }
    }
}

/// The format of the content supplied to [`parse`](crate::doc::parse).
///
/// The discriminant values are fixed; they are part of the wire contract with host bindings and
/// must not be renumbered.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum InputFormat {
    #[default]
    Markdown = 0,
    Mdx = 1,
    Text = 2,
    Html = 3,
    Raw = 4,
    Null = 5,
}

impl InputFormat {
    /// Converts a wire value back to a format. Unknown values fall back to `Markdown`.
    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => InputFormat::Mdx,
            2 => InputFormat::Text,
            3 => InputFormat::Html,
            4 => InputFormat::Raw,
            5 => InputFormat::Null,
            _ => InputFormat::Markdown,
        }
    }
}

/// One syntactic unit of a parsed document.
///
/// A `Node` owns its children exclusively; the tree is finite and acyclic, and child order equals
/// source order. Nodes parsed from Markdown, MDX, Text, or Raw content carry the verbatim source
/// slice they were parsed from, which lets the renderer reproduce them byte-for-byte. Nodes
/// synthesized from other representations (notably HTML) have no verbatim form and are rendered
/// from structure instead.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<Node>,
    /// Where in the original content this node came from, if it came from anywhere.
    pub span: Option<DetachedSpan>,
    pub(crate) verbatim: Option<String>,
}

/// What kind of syntactic unit a [`Node`] is, along with the kind-specific payload.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// The root of every parsed tree. Exactly one per document.
    Document,
    /// `# Hello` through `###### Hello`; `level` is 1–6.
    Heading { level: u8 },
    Paragraph,
    /// One item of an ordered or unordered list. Lists themselves are flattened away; consecutive
    /// items appear as consecutive nodes.
    ListItem { ordered: bool },
    /// A fenced or indented code block. `value` is the code without fences.
    CodeBlock {
        language: Option<String>,
        value: String,
    },
    /// Plain inline text, or a whole line for [`InputFormat::Text`] content.
    Text { value: String },
    Link {
        url: String,
        title: Option<String>,
    },
    Image {
        url: String,
        alt: String,
    },
    /// A block of raw HTML embedded in a Markdown document.
    HtmlBlock { value: String },
    /// An opaque MDX component tag, `<Name … />` or a paired tag. The raw source is kept in the
    /// node's verbatim slice.
    MdxComponent { name: String },
    /// A `---`-fenced YAML (or TOML) metadata block at the top of a document. `value` is the
    /// content between the fences.
    FrontMatter { value: String },
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            span: None,
            verbatim: None,
        }
    }

    pub(crate) fn with_children(kind: NodeKind, children: Vec<Node>) -> Self {
        Self {
            kind,
            children,
            span: None,
            verbatim: None,
        }
    }

    /// The node's original source text, if it was parsed from source.
    pub fn verbatim(&self) -> Option<&str> {
        self.verbatim.as_deref()
    }

    /// All strict descendants of this node, in document (pre-)order.
    pub fn descendants(&self) -> Descendants<'_> {
        let mut stack: Vec<&Node> = Vec::with_capacity(self.children.len());
        stack.extend(self.children.iter().rev());
        Descendants { stack }
    }

    /// The plain-text content of this node: markup stripped, children concatenated.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.write_plain_text(&mut out);
        out
    }

    fn write_plain_text(&self, out: &mut String) {
        match &self.kind {
            NodeKind::Text { value } | NodeKind::CodeBlock { value, .. } | NodeKind::HtmlBlock { value } => {
                out.push_str(value);
            }
            NodeKind::FrontMatter { value } => out.push_str(value),
            NodeKind::Image { alt, .. } => out.push_str(alt),
            NodeKind::MdxComponent { .. } => {
                if let Some(verbatim) = &self.verbatim {
                    out.push_str(verbatim);
                }
            }
            NodeKind::Document
            | NodeKind::Heading { .. }
            | NodeKind::Paragraph
            | NodeKind::ListItem { .. }
            | NodeKind::Link { .. } => {}
        }
        for child in &self.children {
            child.write_plain_text(out);
        }
    }
}

/// Iterator over a node's strict descendants in document order. See [`Node::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Content could not be parsed in the requested [`InputFormat`].
///
/// Only formats that cannot recover surface this; the tolerant formats (HTML especially) degrade
/// structure instead of failing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidInput {
    pub position: Option<DetachedSpan>,
    pub(crate) message: String,
}

impl InvalidInput {
    pub(crate) fn new(position: Option<DetachedSpan>, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

impl Display for InvalidInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.position {
            Some(span) => write!(f, "{} (at byte {})", self.message, span.start),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for InvalidInput {}

#[cfg(test)]
mod tests {
    use super::*;

    mod input_format {
        use super::*;

        #[test]
        fn wire_values() {
            assert_eq!(InputFormat::Markdown as i32, 0);
            assert_eq!(InputFormat::Mdx as i32, 1);
            assert_eq!(InputFormat::Text as i32, 2);
            assert_eq!(InputFormat::Html as i32, 3);
            assert_eq!(InputFormat::Raw as i32, 4);
            assert_eq!(InputFormat::Null as i32, 5);
        }

        #[test]
        fn from_i32_round_trips() {
            for format in [
                InputFormat::Markdown,
                InputFormat::Mdx,
                InputFormat::Text,
                InputFormat::Html,
                InputFormat::Raw,
                InputFormat::Null,
            ] {
                assert_eq!(InputFormat::from_i32(format as i32), format);
            }
        }

        #[test]
        fn from_i32_unknown_defaults_to_markdown() {
            assert_eq!(InputFormat::from_i32(42), InputFormat::Markdown);
            assert_eq!(InputFormat::from_i32(-1), InputFormat::Markdown);
        }
    }

    mod descendants {
        use super::*;

        #[test]
        fn pre_order() {
            let tree = Node::with_children(
                NodeKind::Document,
                vec![
                    Node::with_children(
                        NodeKind::Heading { level: 1 },
                        vec![Node::new(NodeKind::Text {
                            value: "a".to_string(),
                        })],
                    ),
                    Node::new(NodeKind::Text {
                        value: "b".to_string(),
                    }),
                ],
            );
            let kinds: Vec<&NodeKind> = tree.descendants().map(|n| &n.kind).collect();
            assert_eq!(kinds.len(), 3);
            assert!(matches!(kinds[0], NodeKind::Heading { level: 1 }));
            assert!(matches!(kinds[1], NodeKind::Text { .. }));
            assert!(matches!(kinds[2], NodeKind::Text { .. }));
        }

        #[test]
        fn excludes_self() {
            let leaf = Node::new(NodeKind::Paragraph);
            assert_eq!(leaf.descendants().count(), 0);
        }
    }

    #[test]
    fn plain_text_concatenates_leaves() {
        let tree = Node::with_children(
            NodeKind::Paragraph,
            vec![
                Node::new(NodeKind::Text {
                    value: "hello ".to_string(),
                }),
                Node::with_children(
                    NodeKind::Link {
                        url: "https://example.com".to_string(),
                        title: None,
                    },
                    vec![Node::new(NodeKind::Text {
                        value: "world".to_string(),
                    })],
                ),
            ],
        );
        assert_eq!(tree.plain_text(), "hello world");
    }
}
