//! The resolution, binding and dispatch engine.
//!
//! Includes:
//! - `introspect`: parameter lists of commands, cached per command.
//! - `walker`: descends the tree by consuming positional tokens.
//! - `binder`: maps flags, positionals and defaults onto parameters.
//! - `dispatch`: the `Fire` facade tying it together.

pub mod binder;
mod dispatch;
pub mod introspect;
pub mod walker;

#[cfg(test)]
mod dispatch_test;

pub use dispatch::Fire;
pub use introspect::{introspect, introspect_leaf, parse_signature};
pub use walker::{walk, Resolution};
