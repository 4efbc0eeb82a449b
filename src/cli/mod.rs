//! Handles the command-line facing side of dispatch.
//!
//! Includes lexing raw tokens, rendering help text, formatting diagnostics with
//! suggestions, and prompting the user in interactive mode.

mod argv;
pub mod help;
pub mod interactive;
mod report;

pub use argv::*;
pub use interactive::{Prompter, TerminalPrompter};
pub use report::*;
