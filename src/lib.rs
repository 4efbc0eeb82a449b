//! Turns a tree of named commands into a command-line interface.
//!
//! Build the tree out of [`Branch`]es and [`Leaf`]s, hand it to [`Fire`], and
//! dispatch the process arguments:
//!
//! ```no_run
//! use kindling::{Branch, Fire, Leaf};
//!
//! # async fn demo() -> kindling::Result<()> {
//! let tree = Branch::new()
//!     .command("double", Leaf::new(|args| Ok(args.parse::<f64>("number")? * 2.0)).param("number"))?
//!     .command("greet", Leaf::new(|args| Ok(format!("hi {}", args.str("name")?))).signature("(name = \"you\")"))?;
//!
//! let code = Fire::new(tree)?.run(std::env::args().skip(1)).await;
//! # let _ = code;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;

pub use cli::{ParsedArgv, Prompter, TerminalPrompter};
pub use config::{Config, LogFormat};
pub use engine::Fire;
pub use error::{FireError, Result};
pub use models::{
    Branch, CallArgs, CommandNode, DispatchOutcome, Leaf, ParamDefault, ParameterSpec,
    ResolutionPath,
};
