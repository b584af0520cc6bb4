use crate::doc::Node;
use crate::eval::{QueryResult, RuntimeError, Value};
use crate::output::{render, RenderOptions};
use crate::query::{Call, Expr, Query, SelectorKind, Stage};
use crate::registry::{self, Behavior, Builtin};

/// What a builtin sees when it is applied: the context's node and its current rendered value.
pub(crate) struct FnContext<'a> {
    pub node: &'a Node,
    pub rendered: &'a str,
}

/// One entry of the working sequence: a node and its current rendered value.
struct Context<'a> {
    node: &'a Node,
    rendered: String,
    /// Set only on the initial document-root context. A root that survives the whole pipeline
    /// (literal-only queries) becomes the sentinel value itself.
    is_root: bool,
}

impl<'a> Context<'a> {
    fn matched(node: &'a Node, options: &RenderOptions) -> Self {
        Self {
            node,
            rendered: render(node, options),
            is_root: false,
        }
    }
}

/// Evaluates a compiled query against a document tree.
///
/// The working sequence starts as the single root context. Selector stages scan each context's
/// subtree in document order and replace the sequence with the matches; a function call in the
/// leading position first distributes the root into one context per top-level node. Matches
/// therefore always come out in source order, no matter how many stages precede them.
///
/// Failure is atomic: the first stage error aborts the whole evaluation.
pub(crate) fn evaluate(query: &Query, doc: &Node, options: &RenderOptions) -> Result<QueryResult, RuntimeError> {
    let mut seq = vec![Context {
        node: doc,
        rendered: String::new(),
        is_root: true,
    }];

    for (position, stage) in query.stages.iter().enumerate() {
        match stage {
            Stage::Select(kind) => {
                let mut next = Vec::new();
                for context in &seq {
                    for descendant in context.node.descendants() {
                        if kind.matches(&descendant.kind) {
                            next.push(Context::matched(descendant, options));
                        }
                    }
                }
                seq = next;
            }
            Stage::Call(call) => {
                if position == 0 {
                    // a leading function operates per top-level node, not on the whole document
                    seq = doc.children.iter().map(|child| Context::matched(child, options)).collect();
                }
                seq = apply_call(call, seq)?;
            }
            Stage::Literal(value) => {
                let rendered = value.to_string();
                for context in &mut seq {
                    context.rendered.clone_from(&rendered);
                }
            }
        }
    }

    if seq.len() == 1 && seq[0].is_root {
        // the query operated on the whole document; the root's value is the sentinel
        let root = match seq.pop() {
            Some(root) => root,
            None => return Err(RuntimeError::new("empty evaluation sequence")),
        };
        return Ok(QueryResult::new(vec![root.rendered]));
    }
    let mut values = Vec::with_capacity(seq.len() + 1);
    values.push(String::new());
    values.extend(seq.into_iter().map(|context| context.rendered));
    Ok(QueryResult::new(values))
}

fn apply_call<'a>(call: &Call, seq: Vec<Context<'a>>) -> Result<Vec<Context<'a>>, RuntimeError> {
    let builtin = lookup(&call.name)?;
    let mut next = Vec::with_capacity(seq.len());
    for mut context in seq {
        let value = call_on(builtin, call, &context)?;
        match builtin.behavior {
            Behavior::Filter => {
                if value.is_truthy() {
                    next.push(context);
                }
            }
            Behavior::Map => {
                context.rendered = value.to_string();
                next.push(context);
            }
        }
    }
    Ok(next)
}

fn call_on(builtin: &Builtin, call: &Call, context: &Context<'_>) -> Result<Value, RuntimeError> {
    let args = call
        .args
        .iter()
        .map(|arg| eval_expr(arg, context))
        .collect::<Result<Vec<Value>, RuntimeError>>()?;
    let fn_context = FnContext {
        node: context.node,
        rendered: &context.rendered,
    };
    (builtin.apply)(&args, &fn_context)
}

fn eval_expr(expr: &Expr, context: &Context<'_>) -> Result<Value, RuntimeError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Select(kind) => Ok(Value::Bool(subtree_matches(kind, context.node))),
        Expr::Call(call) => {
            let builtin = lookup(&call.name)?;
            call_on(builtin, call, context)
        }
    }
}

/// A selector used as an argument is a predicate: does this context's node, or anything under
/// it, match?
fn subtree_matches(kind: &SelectorKind, node: &Node) -> bool {
    kind.matches(&node.kind) || node.descendants().any(|descendant| kind.matches(&descendant.kind))
}

fn lookup(name: &str) -> Result<&'static Builtin, RuntimeError> {
    // compile-time validation makes this unreachable in normal operation
    registry::lookup(name).ok_or_else(|| RuntimeError::new(format!("unknown function: {name}")))
}
