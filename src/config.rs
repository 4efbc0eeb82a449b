//! Runtime configuration for the dispatcher.
//!
//! Values come from the process environment (after loading an optional `.env` file):
//!
//! - `KINDLING_PROGRAM_NAME`: program name shown on the USAGE line.
//! - `KINDLING_SUGGESTION_THRESHOLD`: minimum similarity (0..=1) for "did you mean" hints.
//! - `KINDLING_LOG_FORMAT`: `text` or `json`.
//! - `KINDLING_LOG_FILE`: write logs to this file instead of stderr.

use crate::cli::DEFAULT_SUGGESTION_THRESHOLD;
use crate::error::{FireError, Result};
use clap::ValueEnum;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const PROGRAM_NAME_VAR: &str = "KINDLING_PROGRAM_NAME";
pub const SUGGESTION_THRESHOLD_VAR: &str = "KINDLING_SUGGESTION_THRESHOLD";
pub const LOG_FORMAT_VAR: &str = "KINDLING_LOG_FORMAT";
pub const LOG_FILE_VAR: &str = "KINDLING_LOG_FILE";

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Dispatcher settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Name printed at the start of every USAGE line.
    pub program_name: String,
    /// Suggestions are only offered when the best match scores above this.
    pub suggestion_threshold: f64,
    pub log_format: LogFormat,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            program_name: default_program_name(),
            suggestion_threshold: DEFAULT_SUGGESTION_THRESHOLD,
            log_format: LogFormat::default(),
            log_file: None,
        }
    }
}

impl Config {
    /// Loads the configuration from the environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup. Unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(name) = lookup(PROGRAM_NAME_VAR).filter(|n| !n.trim().is_empty()) {
            config.program_name = name.trim().to_string();
        }

        if let Some(raw) = lookup(SUGGESTION_THRESHOLD_VAR) {
            config.suggestion_threshold = parse_threshold(&raw)?;
        }

        if let Some(raw) = lookup(LOG_FORMAT_VAR) {
            config.log_format = LogFormat::from_str(raw.trim(), true).map_err(|_| {
                FireError::Config(format!(
                    "{} must be `text` or `json`, got `{}`",
                    LOG_FORMAT_VAR, raw
                ))
            })?;
        }

        config.log_file = lookup(LOG_FILE_VAR)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        debug!(?config, "Loaded configuration");
        Ok(config)
    }

    /// Overrides the program name shown in usage text.
    pub fn with_program_name(mut self, name: impl Into<String>) -> Self {
        self.program_name = name.into();
        self
    }
}

fn parse_threshold(raw: &str) -> Result<f64> {
    let value: f64 = raw.trim().parse().map_err(|_| {
        FireError::Config(format!(
            "{} must be a number, got `{}`",
            SUGGESTION_THRESHOLD_VAR, raw
        ))
    })?;

    if !(0.0..=1.0).contains(&value) {
        return Err(FireError::Config(format!(
            "{} must be between 0 and 1, got {}",
            SUGGESTION_THRESHOLD_VAR, value
        )));
    }

    Ok(value)
}

/// File name of the running executable, falling back to the crate name.
fn default_program_name() -> String {
    env::args_os()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}
