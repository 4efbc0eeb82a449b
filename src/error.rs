//! Defines the crate's primary error type `FireError` and a convenience `Result` alias.
//!
//! Uses the `thiserror` crate for ergonomic error definition and provides `From`
//! implementations to convert common external errors into `FireError` variants.
//! Errors that do not implement `Clone` are wrapped in `Arc` to allow `FireError` to be cloneable.

use std::sync::Arc;
use thiserror::Error;

/// The primary error enumeration for everything that can go wrong during a dispatch.
#[derive(Error, Debug, Clone)]
pub enum FireError {
    /// Introspection was asked for the signature of something that cannot be invoked.
    #[error("`{0}` is not a command and cannot be introspected")]
    NotFunction(String),

    /// The command tree (or one of its signatures) was built incorrectly.
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    /// A positional token did not name any command at the branch where resolution stalled.
    #[error("Command {} not found", .token.as_deref().unwrap_or("<none>"))]
    CommandNotFound {
        token: Option<String>,
        suggestion: Option<String>,
    },

    /// A flag was supplied that the target command does not declare.
    #[error("Flag `{flag}` not found")]
    FlagNotFound {
        flag: String,
        suggestion: Option<String>,
    },

    /// More positional arguments were supplied than the target command declares.
    #[error("Unexpected argument `{token}`")]
    ExtraArgument { token: String },

    /// Error returned by the invoked command itself. Propagated unmodified.
    #[error("{0:#}")]
    Callable(Arc<anyhow::Error>),

    /// Error originating from user interaction prompts (`dialoguer`).
    #[error("Dialoguer Error: {0}")]
    Prompt(Arc<dialoguer::Error>),

    /// Error related to standard I/O operations.
    #[error("I/O Error: {0}")]
    Io(Arc<std::io::Error>),

    /// Invalid configuration value.
    #[error("Config Error: {0}")]
    Config(String),
}

/// A specialized `Result` type using the crate's `FireError`.
pub type Result<T> = std::result::Result<T, FireError>;

// --- From implementations ---

impl From<anyhow::Error> for FireError {
    fn from(err: anyhow::Error) -> Self {
        FireError::Callable(Arc::new(err))
    }
}

impl From<std::io::Error> for FireError {
    fn from(err: std::io::Error) -> Self {
        FireError::Io(Arc::new(err))
    }
}

impl From<dialoguer::Error> for FireError {
    fn from(err: dialoguer::Error) -> Self {
        FireError::Prompt(Arc::new(err))
    }
}
