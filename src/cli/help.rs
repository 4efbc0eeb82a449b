//! Help text rendering.
//!
//! Output is a pure function of the program name, the resolved path and the node,
//! so rendering the same node twice yields identical text.

use crate::engine::introspect_leaf;
use crate::models::{value_text, Branch, CommandNode, ParameterSpec, ResolutionPath};

/// Renders USAGE, DESCRIPTION (when present) and, for groups, COMMANDS.
pub fn render(program: &str, path: &ResolutionPath, node: &CommandNode) -> String {
    let mut out = usage(program, path, node);

    let description = node.description();
    if !description.is_empty() {
        out.push_str("\n\nDESCRIPTION:\n\t");
        out.push_str(description);
    }

    if let CommandNode::Branch(branch) = node {
        out.push_str("\n\nCOMMANDS:\n\n");
        out.push_str(&commands(branch, 1));
    }

    out
}

fn usage(program: &str, path: &ResolutionPath, node: &CommandNode) -> String {
    let mut line: Vec<String> = std::iter::once(program.to_string())
        .chain(path.segments().iter().cloned())
        .filter(|part| !part.is_empty())
        .collect();

    match node {
        CommandNode::Leaf(leaf) => {
            let flags = flags(&introspect_leaf(leaf));
            if !flags.is_empty() {
                line.push(flags);
            }
        },
        CommandNode::Branch(_) => line.push("<command>".to_string()),
    }

    format!("USAGE:\n\t{}", line.join(" "))
}

/// `--name=<name>` for parameters without a known default, `--name=default` otherwise.
pub fn flags(params: &[ParameterSpec]) -> String {
    params
        .iter()
        .map(|param| match param.known_default() {
            Some(value) => format!("--{}={}", param.name, value_text(value)),
            None => format!("--{0}=<{0}>", param.name),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One line per exposed child; groups are followed by their own, further indented, listing.
fn commands(branch: &Branch, depth: usize) -> String {
    let indent = "\t".repeat(depth);
    let mut out = String::new();

    for (name, node) in branch.exposed() {
        out.push_str(&indent);
        out.push_str(name);
        match node {
            CommandNode::Leaf(leaf) => {
                let flags = flags(&introspect_leaf(leaf));
                if !flags.is_empty() {
                    out.push(' ');
                    out.push_str(&flags);
                }
                out.push('\n');
            },
            CommandNode::Branch(child) => {
                out.push('\n');
                out.push_str(&commands(child, depth + 1));
            },
        }
    }

    out
}
