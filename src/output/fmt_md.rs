use crate::doc::{Node, NodeKind};
use derive_builder::Builder;

/// The bullet marker used for unordered list items.
///
/// Wire values are fixed, like [`InputFormat`](crate::doc::InputFormat)'s.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ListStyle {
    #[default]
    Dash = 0,
    Plus = 1,
    Star = 2,
}

impl ListStyle {
    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => ListStyle::Plus,
            2 => ListStyle::Star,
            _ => ListStyle::Dash,
        }
    }

    fn marker(&self) -> char {
        match self {
            ListStyle::Dash => '-',
            ListStyle::Plus => '+',
            ListStyle::Star => '*',
        }
    }
}

/// The quoting around a link title: `"…"`, `'…'`, or `(…)`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum TitleSurroundStyle {
    #[default]
    Double = 0,
    Single = 1,
    Paren = 2,
}

impl TitleSurroundStyle {
    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => TitleSurroundStyle::Single,
            2 => TitleSurroundStyle::Paren,
            _ => TitleSurroundStyle::Double,
        }
    }

    fn surround(&self, title: &str) -> String {
        match self {
            TitleSurroundStyle::Double => format!("\"{title}\""),
            TitleSurroundStyle::Single => format!("'{title}'"),
            TitleSurroundStyle::Paren => format!("({title})"),
        }
    }
}

/// Whether a link URL is wrapped in angle brackets or left bare.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum UrlSurroundStyle {
    #[default]
    Angle = 0,
    None = 1,
}

impl UrlSurroundStyle {
    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => UrlSurroundStyle::None,
            _ => UrlSurroundStyle::Angle,
        }
    }

    fn surround(&self, url: &str) -> String {
        match self {
            UrlSurroundStyle::Angle => format!("<{url}>"),
            UrlSurroundStyle::None => url.to_string(),
        }
    }
}

/// Style options for rendering.
///
/// Every field defaults to `None`, which means "preserve whatever the source had": nodes with a
/// verbatim source slice render byte-for-byte. Setting a field restyles that aspect, and is also
/// the style used for synthesized nodes with no original form (where unset fields fall back to
/// [`ListStyle::Dash`], [`TitleSurroundStyle::Double`], [`UrlSurroundStyle::Angle`]).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Builder)]
#[builder(default)]
pub struct RenderOptions {
    pub list_style: Option<ListStyle>,
    pub link_title_style: Option<TitleSurroundStyle>,
    pub link_url_style: Option<UrlSurroundStyle>,
}

/// Renders one node (and its subtree) to Markdown text.
pub(crate) fn render(node: &Node, options: &RenderOptions) -> String {
    match &node.kind {
        NodeKind::ListItem { .. } if options.list_style.is_some() => render_list_item(node, options),
        NodeKind::Link { .. } if options.link_title_style.is_some() || options.link_url_style.is_some() => {
            // restyling an already-parsed link re-renders it; unset aspects use the plain forms
            let url_style = options.link_url_style.unwrap_or(UrlSurroundStyle::None);
            render_link(node, options, url_style)
        }
        _ => match node.verbatim() {
            Some(verbatim) => verbatim.to_string(),
            None => synthesize(node, options),
        },
    }
}

fn synthesize(node: &Node, options: &RenderOptions) -> String {
    match &node.kind {
        NodeKind::Document => {
            let blocks: Vec<String> = node
                .children
                .iter()
                .map(|child| render(child, options))
                .filter(|block| !block.is_empty())
                .collect();
            blocks.join("\n\n")
        }
        NodeKind::Heading { level } => {
            let text = render_children(node, options);
            format!("{} {}", "#".repeat(usize::from(*level)), text).trim_end().to_string()
        }
        NodeKind::Paragraph => render_children(node, options),
        NodeKind::Text { value } => value.clone(),
        NodeKind::ListItem { .. } => render_list_item(node, options),
        NodeKind::CodeBlock { language, value } => {
            format!("```{}\n{value}\n```", language.as_deref().unwrap_or(""))
        }
        NodeKind::Link { .. } => render_link(node, options, options.link_url_style.unwrap_or_default()),
        NodeKind::Image { url, alt } => {
            let url_style = options.link_url_style.unwrap_or_default();
            format!("![{alt}]({})", url_style.surround(url))
        }
        NodeKind::HtmlBlock { value } => value.clone(),
        NodeKind::MdxComponent { name } => format!("<{name} />"),
        NodeKind::FrontMatter { value } => format!("---\n{value}\n---"),
    }
}

fn render_children(node: &Node, options: &RenderOptions) -> String {
    node.children.iter().map(|child| render(child, options)).collect()
}

fn render_list_item(node: &Node, options: &RenderOptions) -> String {
    let NodeKind::ListItem { ordered } = node.kind else {
        return String::new();
    };
    if let Some(verbatim) = node.verbatim() {
        // restyle the bullet in place; ordered items have no bullet to restyle
        let style = options.list_style.unwrap_or_default();
        return match ordered {
            true => verbatim.to_string(),
            false => restyle_bullet(verbatim, style.marker()),
        };
    }

    let marker = if ordered {
        "1.".to_string()
    } else {
        options.list_style.unwrap_or_default().marker().to_string()
    };
    let mut inline = String::new();
    let mut nested: Vec<String> = Vec::new();
    for child in &node.children {
        match &child.kind {
            NodeKind::ListItem { .. } => nested.push(render(child, options)),
            _ => {
                let rendered = render(child, options);
                if rendered.is_empty() {
                    continue;
                }
                if !inline.is_empty() {
                    inline.push(' ');
                }
                inline.push_str(&rendered);
            }
        }
    }
    let mut out = format!("{marker} {inline}").trim_end().to_string();
    for item in nested {
        for line in item.lines() {
            out.push_str("\n  ");
            out.push_str(line);
        }
    }
    out
}

fn restyle_bullet(verbatim: &str, marker: char) -> String {
    let Some(offset) = verbatim.find(|ch: char| !ch.is_whitespace()) else {
        return verbatim.to_string();
    };
    let current = &verbatim[offset..];
    if current.starts_with(['-', '+', '*']) {
        let mut out = String::with_capacity(verbatim.len());
        out.push_str(&verbatim[..offset]);
        out.push(marker);
        out.push_str(&current[1..]);
        out
    } else {
        verbatim.to_string()
    }
}

fn render_link(node: &Node, options: &RenderOptions, url_style: UrlSurroundStyle) -> String {
    let NodeKind::Link { url, title } = &node.kind else {
        return String::new();
    };
    let title_style = options.link_title_style.unwrap_or_default();
    let text = render_children(node, options);
    match title {
        Some(title) => format!("[{text}]({} {})", url_style.surround(url), title_style.surround(title)),
        None => format!("[{text}]({})", url_style.surround(url)),
    }
}
