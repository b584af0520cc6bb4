use crate::doc::tree::{DetachedSpan, InvalidInput, Node, NodeKind};
use markdown::{mdast, unist};
use std::collections::HashMap;

/// Parses Markdown (or MDX, when `mdx` is set) into a [`Node`] tree.
///
/// Uses GFM constructs plus frontmatter. Every node that maps cleanly onto the tree keeps its
/// verbatim source slice, derived from mdast positions, so an unmodified node renders back
/// byte-for-byte. Constructs with no counterpart in the tree degrade to [`NodeKind::Text`]
/// carrying their raw source rather than failing.
pub(crate) fn parse(content: &str, mdx: bool) -> Result<Node, InvalidInput> {
    let ast = markdown::to_mdast(content, &parse_options(mdx)).map_err(invalid_input)?;

    let lookups = Lookups::collect(&ast);
    let converter = Converter {
        source: content,
        lookups,
    };
    let children = match ast {
        mdast::Node::Root(root) => converter.all(root.children),
        other => converter.all(vec![other]),
    };
    Ok(Node::with_children(NodeKind::Document, children))
}

fn parse_options(mdx: bool) -> markdown::ParseOptions {
    let base = if mdx {
        markdown::ParseOptions::mdx()
    } else {
        markdown::ParseOptions::gfm()
    };
    let constructs = if mdx {
        markdown::Constructs {
            frontmatter: true,
            ..markdown::Constructs::mdx()
        }
    } else {
        markdown::Constructs {
            frontmatter: true,
            ..markdown::Constructs::gfm()
        }
    };
    markdown::ParseOptions { constructs, ..base }
}

fn invalid_input(message: markdown::message::Message) -> InvalidInput {
    let position = message.place.as_deref().map(|place| match place {
        markdown::message::Place::Position(position) => DetachedSpan {
            start: position.start.offset,
            end: position.end.offset,
        },
        markdown::message::Place::Point(point) => DetachedSpan {
            start: point.offset,
            end: point.offset,
        },
    });
    InvalidInput::new(position, message.reason.clone())
}

/// Reference-style link and image definitions, gathered in one pass up front so that references
/// can be resolved wherever they appear.
struct Lookups {
    definitions: HashMap<String, (String, Option<String>)>,
}

impl Lookups {
    fn collect(ast: &mdast::Node) -> Self {
        let mut definitions = HashMap::new();
        Self::walk(ast, &mut definitions);
        Self { definitions }
    }

    fn walk(node: &mdast::Node, definitions: &mut HashMap<String, (String, Option<String>)>) {
        if let mdast::Node::Definition(definition) = node {
            // first definition wins
            definitions
                .entry(definition.identifier.clone())
                .or_insert_with(|| (definition.url.clone(), definition.title.clone()));
        }
        if let Some(children) = node.children() {
            for child in children {
                Self::walk(child, definitions);
            }
        }
    }

    fn resolve(&self, identifier: &str) -> Option<&(String, Option<String>)> {
        self.definitions.get(identifier)
    }
}

struct Converter<'s> {
    source: &'s str,
    lookups: Lookups,
}

impl Converter<'_> {
    fn all(&self, children: Vec<mdast::Node>) -> Vec<Node> {
        children.into_iter().flat_map(|child| self.convert(child)).collect()
    }

    /// Converts one mdast node into zero or more tree nodes. Containers with no counterpart in
    /// the tree (lists, block quotes) splice their children in place.
    fn convert(&self, node: mdast::Node) -> Vec<Node> {
        let (span, verbatim) = self.spans(&node);
        let converted = match node {
            mdast::Node::Root(root) => return self.all(root.children),
            mdast::Node::Blockquote(block_quote) => return self.all(block_quote.children),
            mdast::Node::List(list) => {
                let ordered = list.ordered;
                let mut items = Vec::with_capacity(list.children.len());
                for child in list.children {
                    let mdast::Node::ListItem(item) = child else {
                        // tolerated: the parser should never produce this
                        items.extend(self.convert(child));
                        continue;
                    };
                    let (item_span, item_verbatim) = (
                        item.position
                            .as_ref()
                            .map(|p| span_of(p))
                            .filter(|s| s.end <= self.source.len()),
                        self.slice(item.position.as_ref()),
                    );
                    let mut node = Node::with_children(NodeKind::ListItem { ordered }, self.all(item.children));
                    node.span = item_span;
                    node.verbatim = item_verbatim;
                    items.push(node);
                }
                return items;
            }
            mdast::Node::Heading(heading) => Node::with_children(
                NodeKind::Heading {
                    level: heading.depth.clamp(1, 6),
                },
                self.all(heading.children),
            ),
            mdast::Node::Paragraph(paragraph) => {
                Node::with_children(NodeKind::Paragraph, self.all(paragraph.children))
            }
            mdast::Node::Code(code) => Node::new(NodeKind::CodeBlock {
                language: code.lang,
                value: code.value,
            }),
            mdast::Node::Math(math) => Node::new(NodeKind::CodeBlock {
                language: Some("math".to_string()),
                value: math.value,
            }),
            mdast::Node::Text(text) => Node::new(NodeKind::Text { value: text.value }),
            mdast::Node::InlineCode(code) => Node::new(NodeKind::Text { value: code.value }),
            mdast::Node::InlineMath(math) => Node::new(NodeKind::Text { value: math.value }),
            mdast::Node::Break(_) => Node::new(NodeKind::Text {
                value: "\n".to_string(),
            }),
            mdast::Node::Strong(strong) => Node::new(NodeKind::Text {
                value: inline_text(&strong.children),
            }),
            mdast::Node::Emphasis(emphasis) => Node::new(NodeKind::Text {
                value: inline_text(&emphasis.children),
            }),
            mdast::Node::Delete(delete) => Node::new(NodeKind::Text {
                value: inline_text(&delete.children),
            }),
            mdast::Node::Link(link) => Node::with_children(
                NodeKind::Link {
                    url: link.url,
                    title: link.title,
                },
                self.all(link.children),
            ),
            mdast::Node::LinkReference(reference) => match self.lookups.resolve(&reference.identifier) {
                Some((url, title)) => Node::with_children(
                    NodeKind::Link {
                        url: url.clone(),
                        title: title.clone(),
                    },
                    self.all(reference.children),
                ),
                None => Node::new(NodeKind::Text {
                    value: verbatim.clone().unwrap_or_default(),
                }),
            },
            mdast::Node::Image(image) => Node::new(NodeKind::Image {
                url: image.url,
                alt: image.alt,
            }),
            mdast::Node::ImageReference(reference) => match self.lookups.resolve(&reference.identifier) {
                Some((url, _)) => Node::new(NodeKind::Image {
                    url: url.clone(),
                    alt: reference.alt,
                }),
                None => Node::new(NodeKind::Text {
                    value: verbatim.clone().unwrap_or_default(),
                }),
            },
            mdast::Node::Html(html) => Node::new(NodeKind::HtmlBlock { value: html.value }),
            mdast::Node::Yaml(yaml) => Node::new(NodeKind::FrontMatter { value: yaml.value }),
            mdast::Node::Toml(toml) => Node::new(NodeKind::FrontMatter { value: toml.value }),
            mdast::Node::MdxJsxFlowElement(element) => Node::new(NodeKind::MdxComponent {
                name: element.name.unwrap_or_default(),
            }),
            mdast::Node::MdxJsxTextElement(element) => Node::new(NodeKind::MdxComponent {
                name: element.name.unwrap_or_default(),
            }),
            // expression and ESM constructs carry code, not content
            mdast::Node::MdxFlowExpression(_) | mdast::Node::MdxTextExpression(_) | mdast::Node::MdxjsEsm(_) => {
                return Vec::new();
            }
            mdast::Node::Definition(_) => return Vec::new(),
            mdast::Node::FootnoteDefinition(_) => return Vec::new(),
            // everything else keeps its raw text so it can still be matched and re-rendered
            other => match self.slice(other.position()) {
                Some(raw) => Node::new(NodeKind::Text { value: raw }),
                None => return Vec::new(),
            },
        };
        let mut converted = converted;
        converted.span = span;
        converted.verbatim = verbatim;
        vec![converted]
    }

    fn spans(&self, node: &mdast::Node) -> (Option<DetachedSpan>, Option<String>) {
        let position = node.position();
        (
            position.map(span_of).filter(|s| s.end <= self.source.len()),
            self.slice(position),
        )
    }

    fn slice(&self, position: Option<&unist::Position>) -> Option<String> {
        let position = position?;
        let (start, end) = (position.start.offset, position.end.offset);
        self.source.get(start..end).map(str::to_string)
    }
}

fn span_of(position: &unist::Position) -> DetachedSpan {
    DetachedSpan {
        start: position.start.offset,
        end: position.end.offset,
    }
}

/// Concatenated literal text of a run of inline mdast nodes, markup dropped.
fn inline_text(children: &[mdast::Node]) -> String {
    let mut out = String::new();
    for child in children {
        match child {
            mdast::Node::Text(text) => out.push_str(&text.value),
            mdast::Node::InlineCode(code) => out.push_str(&code.value),
            mdast::Node::Break(_) => out.push('\n'),
            other => {
                if let Some(children) = other.children() {
                    out.push_str(&inline_text(children));
                }
            }
        }
    }
    out
}
