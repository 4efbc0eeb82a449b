//! Signature introspection.
//!
//! A leaf's parameter list is assembled once, on first use, from its signature string
//! (if any) followed by parameters declared through the builder. The result is cached
//! inside the leaf, so every later introspection returns the same `Arc`.

use crate::error::{FireError, Result};
use crate::models::{CommandNode, Leaf, ParamDefault, ParameterSpec, RESERVED_FLAGS};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Returns the parameter list of a command node.
///
/// # Errors
///
/// Returns `FireError::NotFunction` if `node` is a branch.
pub fn introspect(node: &CommandNode) -> Result<Arc<[ParameterSpec]>> {
    match node {
        CommandNode::Leaf(leaf) => Ok(introspect_leaf(leaf)),
        CommandNode::Branch(branch) => Err(FireError::NotFunction(format!(
            "group [{}]",
            branch.exposed_names().join(", ")
        ))),
    }
}

/// Returns the (cached) parameter list of a leaf.
pub fn introspect_leaf(leaf: &Leaf) -> Arc<[ParameterSpec]> {
    let spec = leaf.spec_cache().get_or_init(|| {
        let mut params = leaf
            .signature_text()
            .map(parse_signature)
            .unwrap_or_default();
        params.extend(leaf.declared().iter().cloned());
        debug!(count = params.len(), "Introspected command signature");
        params.into()
    });
    Arc::clone(spec)
}

/// Parses a signature such as `(a, b = 5, name = "world")`.
///
/// Accepts an optional `async` marker, optional surrounding parentheses, a trailing
/// `=>` and `/* ... */` comments. Default expressions are evaluated as JSON literals
/// (single-quoted strings are accepted too); anything else becomes `ParamDefault::Deferred`.
pub fn parse_signature(signature: &str) -> Vec<ParameterSpec> {
    let cleaned = strip_block_comments(signature);
    let mut body = cleaned.trim();
    body = body.strip_prefix("async ").unwrap_or(body).trim();
    body = body.strip_suffix("=>").unwrap_or(body).trim();
    if let Some(inner) = body.strip_prefix('(').and_then(|b| b.strip_suffix(')')) {
        body = inner;
    }

    split_top_level(body)
        .into_iter()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| match token.split_once('=') {
            Some((name, expr)) => ParameterSpec {
                name: name.trim().to_string(),
                default: evaluate_literal(expr.trim()),
            },
            None => ParameterSpec::required(token),
        })
        .collect()
}

fn strip_block_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => {
                rest = "";
                break;
            },
        }
    }
    out.push_str(rest);
    out
}

/// Splits on commas that are not nested in brackets or quotes.
fn split_top_level(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in body.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '[' | '{' | '(' => depth += 1,
            ']' | '}' | ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            },
            _ => {},
        }
    }
    parts.push(&body[start..]);
    parts
}

fn evaluate_literal(expr: &str) -> ParamDefault {
    if let Ok(value) = serde_json::from_str::<Value>(expr) {
        return ParamDefault::Literal(value);
    }
    match expr.strip_prefix('\'').and_then(|e| e.strip_suffix('\'')) {
        Some(inner) if !inner.contains('\'') => ParamDefault::Literal(Value::String(inner.into())),
        _ => {
            debug!(expr, "Default is not a literal, deferring to the command");
            ParamDefault::Deferred
        },
    }
}

/// Checks that every leaf in the tree declares usable, unique parameter names.
///
/// # Errors
///
/// Returns `FireError::InvariantViolation` naming the first offending command.
pub fn validate_tree(node: &CommandNode) -> Result<()> {
    validate_node(node, &mut Vec::new())
}

fn validate_node(node: &CommandNode, path: &mut Vec<String>) -> Result<()> {
    match node {
        CommandNode::Leaf(leaf) => validate_params(&introspect_leaf(leaf)).map_err(|reason| {
            FireError::InvariantViolation(format!("command `{}`: {}", path.join(" "), reason))
        }),
        CommandNode::Branch(branch) => {
            for (name, child) in branch.children() {
                path.push(name.to_string());
                validate_node(child, path)?;
                path.pop();
            }
            Ok(())
        },
    }
}

fn validate_params(params: &[ParameterSpec]) -> std::result::Result<(), String> {
    let mut seen = HashSet::new();
    for param in params {
        let name = param.name.as_str();
        let well_formed = !name.is_empty()
            && !name.starts_with('-')
            && name
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '-');
        if !well_formed {
            return Err(format!("invalid parameter name `{}`", name));
        }
        if RESERVED_FLAGS.contains(&name) {
            return Err(format!("parameter name `{}` is reserved", name));
        }
        if !seen.insert(name) {
            return Err(format!("duplicate parameter `{}`", name));
        }
    }
    Ok(())
}
