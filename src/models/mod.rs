//! Defines the data structures shared by the dispatcher.
//!
//! This includes the command tree itself (`CommandNode`, `Leaf`, `Branch`),
//! declared parameter metadata, bound call arguments, and dispatch results.

mod command;
mod outcome;

pub use command::*;
pub use outcome::*;
