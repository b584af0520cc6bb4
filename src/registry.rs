//! The builtin function registry.
//!
//! A process-wide, read-only table mapping function name to arity, behavior, and implementation.
//! The compiler validates names and arities against it; the evaluator dispatches through it.
//! Adding a builtin means adding one entry here; neither the compiler nor the evaluator changes.

use crate::doc::NodeKind;
use crate::eval::{FnContext, RuntimeError, Value};
use lazy_static::lazy_static;
use std::collections::HashMap;

/// How a builtin's result feeds back into the stage pipeline.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Behavior {
    /// `select`-class: a truthy result keeps the context, a falsy one drops it. The rendered
    /// value is left untouched.
    Filter,
    /// The result's string form replaces the context's rendered value.
    Map,
}

pub(crate) struct Builtin {
    pub arity: usize,
    pub behavior: Behavior,
    pub apply: Apply,
}

type Apply = fn(&[Value], &FnContext) -> Result<Value, RuntimeError>;

lazy_static! {
    static ref REGISTRY: HashMap<&'static str, Builtin> = build_registry();
}

pub(crate) fn lookup(name: &str) -> Option<&'static Builtin> {
    REGISTRY.get(name)
}

fn build_registry() -> HashMap<&'static str, Builtin> {
    let mut table: HashMap<&'static str, Builtin> = HashMap::new();
    let mut add = |name: &'static str, arity: usize, behavior: Behavior, apply: Apply| {
        table.insert(name, Builtin { arity, behavior, apply });
    };

    add("select", 1, Behavior::Filter, |args, _| Ok(arg("select", args, 0)?.clone()));
    add("contains", 1, Behavior::Map, |args, ctx| {
        let needle = string_arg("contains", args, 0)?;
        Ok(Value::Bool(ctx.rendered.contains(needle)))
    });
    add("starts_with", 1, Behavior::Map, |args, ctx| {
        let prefix = string_arg("starts_with", args, 0)?;
        Ok(Value::Bool(ctx.rendered.starts_with(prefix)))
    });
    add("ends_with", 1, Behavior::Map, |args, ctx| {
        let suffix = string_arg("ends_with", args, 0)?;
        Ok(Value::Bool(ctx.rendered.ends_with(suffix)))
    });
    add("test", 1, Behavior::Map, |args, ctx| {
        let pattern = string_arg("test", args, 0)?;
        let regex = fancy_regex::Regex::new(pattern)
            .map_err(|e| RuntimeError::new(format!("test(): invalid pattern: {e}")))?;
        let matched = regex
            .is_match(ctx.rendered)
            .map_err(|e| RuntimeError::new(format!("test(): {e}")))?;
        Ok(Value::Bool(matched))
    });
    add("is_mdx", 0, Behavior::Map, |_, ctx| {
        Ok(Value::Bool(matches!(ctx.node.kind, NodeKind::MdxComponent { .. })))
    });
    add("upcase", 0, Behavior::Map, |_, ctx| {
        Ok(Value::String(ctx.rendered.to_uppercase()))
    });
    add("downcase", 0, Behavior::Map, |_, ctx| {
        Ok(Value::String(ctx.rendered.to_lowercase()))
    });
    add("trim", 0, Behavior::Map, |_, ctx| {
        Ok(Value::String(ctx.rendered.trim().to_string()))
    });
    add("to_text", 0, Behavior::Map, |_, ctx| Ok(Value::String(ctx.node.plain_text())));
    add("not", 1, Behavior::Map, |args, _| {
        Ok(Value::Bool(!arg("not", args, 0)?.is_truthy()))
    });

    table
}

fn arg<'a>(name: &str, args: &'a [Value], index: usize) -> Result<&'a Value, RuntimeError> {
    args.get(index)
        .ok_or_else(|| RuntimeError::new(format!("{name}(): missing argument {index}")))
}

fn string_arg<'a>(name: &str, args: &'a [Value], index: usize) -> Result<&'a str, RuntimeError> {
    let value = arg(name, args, index)?;
    value
        .as_str()
        .ok_or_else(|| RuntimeError::new(format!("{name}() expects a string argument, got {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::Node;

    fn ctx_with<'a>(node: &'a Node, rendered: &'a str) -> FnContext<'a> {
        FnContext { node, rendered }
    }

    #[test]
    fn minimum_builtins_are_registered() {
        for (name, arity) in [("select", 1), ("contains", 1), ("is_mdx", 0)] {
            let builtin = lookup(name).unwrap_or_else(|| panic!("{name} missing"));
            assert_eq!(builtin.arity, arity, "{name} arity");
        }
        assert_eq!(lookup("select").unwrap().behavior, Behavior::Filter);
    }

    #[test]
    fn unknown_name_is_none() {
        assert!(lookup("no_such_function").is_none());
    }

    #[test]
    fn contains_is_case_sensitive() {
        let node = Node::new(NodeKind::Paragraph);
        let ctx = ctx_with(&node, "Hello World");
        let builtin = lookup("contains").unwrap();
        let args = vec![Value::String("World".to_string())];
        assert_eq!((builtin.apply)(&args, &ctx).unwrap(), Value::Bool(true));
        let args = vec![Value::String("world".to_string())];
        assert_eq!((builtin.apply)(&args, &ctx).unwrap(), Value::Bool(false));
    }

    #[test]
    fn contains_rejects_non_string() {
        let node = Node::new(NodeKind::Paragraph);
        let ctx = ctx_with(&node, "x");
        let builtin = lookup("contains").unwrap();
        let err = (builtin.apply)(&[Value::Number(42.0)], &ctx).unwrap_err();
        assert!(err.to_string().contains("string"), "got: {err}");
    }

    #[test]
    fn is_mdx_checks_node_kind() {
        let component = Node::new(NodeKind::MdxComponent {
            name: "Component".to_string(),
        });
        let paragraph = Node::new(NodeKind::Paragraph);
        let builtin = lookup("is_mdx").unwrap();
        assert_eq!(
            (builtin.apply)(&[], &ctx_with(&component, "<Component />")).unwrap(),
            Value::Bool(true)
        );
        assert_eq!((builtin.apply)(&[], &ctx_with(&paragraph, "")).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_rejects_bad_pattern() {
        let node = Node::new(NodeKind::Paragraph);
        let ctx = ctx_with(&node, "x");
        let builtin = lookup("test").unwrap();
        let err = (builtin.apply)(&[Value::String("(unclosed".to_string())], &ctx).unwrap_err();
        assert!(err.to_string().contains("pattern"), "got: {err}");
    }

    #[test]
    fn string_transforms() {
        let node = Node::new(NodeKind::Paragraph);
        let ctx = ctx_with(&node, "  Mixed Case  ");
        let apply = |name: &str| (lookup(name).unwrap().apply)(&[], &ctx).unwrap();
        assert_eq!(apply("upcase"), Value::String("  MIXED CASE  ".to_string()));
        assert_eq!(apply("downcase"), Value::String("  mixed case  ".to_string()));
        assert_eq!(apply("trim"), Value::String("Mixed Case".to_string()));
    }
}
