use crate::doc::{DetachedSpan, NodeKind};
use crate::eval::Value;
use crate::query::CompileError;
use crate::registry;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "query/grammar.pest"] // relative to src
struct QueryParser;

pub(crate) type PestError = pest::error::Error<Rule>;

/// A compiled query: an immutable, ordered sequence of pipeline stages.
///
/// Compile once with [`Query::compile`], then evaluate any number of times against different
/// document trees. Compilation validates function names and arities against the builtin registry,
/// so an unknown function or a wrong argument count fails here, not mid-evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    pub(crate) stages: Vec<Stage>,
}

/// One step of a compiled query pipeline.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Stage {
    Select(SelectorKind),
    Call(Call),
    Literal(Value),
}

/// A validated call to a registered builtin.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Call {
    pub name: String,
    pub args: Vec<Expr>,
}

/// An argument expression: evaluated per context at run time.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Expr {
    Literal(Value),
    Select(SelectorKind),
    Call(Call),
}

/// The node-kind predicate of a dot-selector.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum SelectorKind {
    Heading(u8),
    ListItem,
    CodeBlock,
    Paragraph,
    Text,
    Link,
    Image,
    Html,
    Mdx,
    FrontMatter,
}

impl SelectorKind {
    fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "code" => SelectorKind::CodeBlock,
            "list" => SelectorKind::ListItem,
            "paragraph" => SelectorKind::Paragraph,
            "text" => SelectorKind::Text,
            "link" => SelectorKind::Link,
            "image" => SelectorKind::Image,
            "html" => SelectorKind::Html,
            "mdx" => SelectorKind::Mdx,
            "frontmatter" | "front_matter" => SelectorKind::FrontMatter,
            _ => {
                let level = name.strip_prefix('h')?;
                let level: u8 = level.parse().ok()?;
                if !(1..=6).contains(&level) {
                    return None;
                }
                SelectorKind::Heading(level)
            }
        };
        Some(kind)
    }

    pub(crate) fn matches(&self, kind: &NodeKind) -> bool {
        match (self, kind) {
            (SelectorKind::Heading(want), NodeKind::Heading { level }) => want == level,
            (SelectorKind::ListItem, NodeKind::ListItem { .. }) => true,
            (SelectorKind::CodeBlock, NodeKind::CodeBlock { .. }) => true,
            (SelectorKind::Paragraph, NodeKind::Paragraph) => true,
            (SelectorKind::Text, NodeKind::Text { .. }) => true,
            (SelectorKind::Link, NodeKind::Link { .. }) => true,
            (SelectorKind::Image, NodeKind::Image { .. }) => true,
            (SelectorKind::Html, NodeKind::HtmlBlock { .. }) => true,
            (SelectorKind::Mdx, NodeKind::MdxComponent { .. }) => true,
            (SelectorKind::FrontMatter, NodeKind::FrontMatter { .. }) => true,
            _ => false,
        }
    }
}

impl Query {
    /// Compiles a query string.
    pub fn compile(query_text: &str) -> Result<Self, CompileError> {
        let pairs = QueryParser::parse(Rule::query, query_text)?;
        let mut stages = Vec::new();
        for pair in pairs {
            if pair.as_rule() != Rule::query {
                continue;
            }
            for stage_pair in pair.into_inner() {
                if stage_pair.as_rule() == Rule::stage {
                    stages.push(compile_stage(stage_pair)?);
                }
            }
        }
        Ok(Self { stages })
    }
}

impl TryFrom<&'_ str> for Query {
    type Error = CompileError;

    fn try_from(value: &'_ str) -> Result<Self, Self::Error> {
        Query::compile(value)
    }
}

fn only_inner(pair: Pair<'_, Rule>) -> Result<Pair<'_, Rule>, CompileError> {
    let span = DetachedSpan::from(pair.as_span());
    pair.into_inner()
        .next()
        .ok_or_else(|| CompileError::at(span, "malformed query"))
}

fn compile_stage(pair: Pair<'_, Rule>) -> Result<Stage, CompileError> {
    let inner = only_inner(pair)?;
    match inner.as_rule() {
        Rule::selector => Ok(Stage::Select(compile_selector(inner)?)),
        Rule::call => Ok(Stage::Call(compile_call(inner)?)),
        Rule::literal => Ok(Stage::Literal(compile_literal(inner)?)),
        _ => Err(CompileError::at(DetachedSpan::from(inner.as_span()), "malformed query")),
    }
}

fn compile_selector(pair: Pair<'_, Rule>) -> Result<SelectorKind, CompileError> {
    let span = DetachedSpan::from(pair.as_span());
    let body = only_inner(pair)?;
    let target = only_inner(body)?;
    match target.as_rule() {
        Rule::list_marker => Ok(SelectorKind::ListItem),
        Rule::ident => {
            let name = target.as_str();
            SelectorKind::from_name(name).ok_or_else(|| CompileError::at(span, format!("unknown selector: .{name}")))
        }
        _ => Err(CompileError::at(span, "malformed selector")),
    }
}

fn compile_call(pair: Pair<'_, Rule>) -> Result<Call, CompileError> {
    let call_span = DetachedSpan::from(pair.as_span());
    let mut inner = pair.into_inner();
    let Some(name_pair) = inner.next() else {
        return Err(CompileError::at(call_span, "malformed call"));
    };
    let name_span = DetachedSpan::from(name_pair.as_span());
    let name = name_pair.as_str().to_string();

    let mut args = Vec::new();
    if let Some(args_pair) = inner.next() {
        for expr_pair in args_pair.into_inner() {
            args.push(compile_expr(expr_pair)?);
        }
    }

    let Some(builtin) = registry::lookup(&name) else {
        return Err(CompileError::at(name_span, format!("unknown function: {name}")));
    };
    if builtin.arity != args.len() {
        return Err(CompileError::at(
            call_span,
            format!("{name}() expects {} argument(s), got {}", builtin.arity, args.len()),
        ));
    }
    Ok(Call { name, args })
}

fn compile_expr(pair: Pair<'_, Rule>) -> Result<Expr, CompileError> {
    let inner = only_inner(pair)?;
    match inner.as_rule() {
        Rule::selector => Ok(Expr::Select(compile_selector(inner)?)),
        Rule::call => Ok(Expr::Call(compile_call(inner)?)),
        Rule::literal => Ok(Expr::Literal(compile_literal(inner)?)),
        _ => Err(CompileError::at(
            DetachedSpan::from(inner.as_span()),
            "malformed argument",
        )),
    }
}

fn compile_literal(pair: Pair<'_, Rule>) -> Result<Value, CompileError> {
    let span = DetachedSpan::from(pair.as_span());
    let inner = only_inner(pair)?;
    match inner.as_rule() {
        Rule::string => Ok(Value::String(unescape(inner)?)),
        Rule::number => {
            let text = inner.as_str();
            text.parse::<f64>()
                .map(Value::Number)
                .map_err(|_| CompileError::at(span, format!("invalid number: {text}")))
        }
        _ => Err(CompileError::at(span, "malformed literal")),
    }
}

fn unescape(string_pair: Pair<'_, Rule>) -> Result<String, CompileError> {
    let span = DetachedSpan::from(string_pair.as_span());
    let mut text = String::with_capacity(string_pair.as_str().len());
    for part in string_pair.into_inner() {
        match part.as_rule() {
            Rule::dq_chars | Rule::sq_chars => text.push_str(part.as_str()),
            Rule::escaped_char => {
                for esc in part.into_inner() {
                    match esc.as_rule() {
                        Rule::esc_symbol => {
                            let unescaped = match esc.as_str() {
                                "n" => '\n',
                                "r" => '\r',
                                "t" => '\t',
                                other => match other.chars().next() {
                                    Some(ch) => ch,
                                    None => continue,
                                },
                            };
                            text.push(unescaped);
                        }
                        Rule::unicode_seq => {
                            let seq = esc.as_str();
                            let decoded = u32::from_str_radix(seq, 16).ok().and_then(char::from_u32);
                            match decoded {
                                Some(ch) => text.push(ch),
                                None => {
                                    return Err(CompileError::at(span, format!("invalid unicode sequence: {seq}")));
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
    Ok(text)
}
