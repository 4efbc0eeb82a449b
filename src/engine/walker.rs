//! Command tree walking.
//!
//! Positionals are consumed left to right for as long as each one names an exposed
//! child of the current branch. The first token that does not match is left in place
//! for the binder (or for the error reporter, if resolution stopped at a branch).

use crate::models::{CommandNode, ResolutionPath};
use tracing::debug;

/// Where the walk ended.
#[derive(Debug)]
pub struct Resolution<'a> {
    pub path: ResolutionPath,
    pub node: &'a CommandNode,
    /// Number of positionals consumed as command names.
    pub consumed: usize,
}

impl Resolution<'_> {
    /// The first positional that was not consumed, if any.
    pub fn next_token<'p>(&self, positionals: &'p [String]) -> Option<&'p str> {
        positionals.get(self.consumed).map(String::as_str)
    }
}

/// Walks from the root of the tree.
pub fn walk<'a>(root: &'a CommandNode, positionals: &[String]) -> Resolution<'a> {
    walk_from(root, ResolutionPath::new(), positionals, 0)
}

/// Continues a walk from `node`, already reached through `path`, starting at positional `start`.
pub fn walk_from<'a>(
    node: &'a CommandNode,
    mut path: ResolutionPath,
    positionals: &[String],
    start: usize,
) -> Resolution<'a> {
    let mut current = node;
    let mut consumed = start;

    while let CommandNode::Branch(branch) = current {
        let Some(token) = positionals.get(consumed) else {
            break;
        };
        let Some(child) = branch.child(token) else {
            debug!(token = %token, path = %path, "No command matches token");
            break;
        };
        path.push(token.clone());
        consumed += 1;
        current = child;
    }

    debug!(path = %path, consumed, "Resolved command path");
    Resolution {
        path,
        node: current,
        consumed,
    }
}
