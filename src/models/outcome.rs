//! Results of resolving and running a command.

use serde_json::Value;
use std::fmt;

/// Names consumed while descending the command tree, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionPath {
    segments: Vec<String>,
}

impl ResolutionPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }
}

impl fmt::Display for ResolutionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join(" "))
    }
}

impl<S: Into<String>> FromIterator<S> for ResolutionPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// How a single dispatch ended.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The command ran and returned this value (`Null` when it returned nothing).
    Result(Value),
    /// Help text was requested.
    Help(String),
    /// Resolution stalled at a group. Carries the formatted diagnostic.
    CommandNotFound(String),
    /// An undeclared flag was supplied. Carries the formatted diagnostic.
    FlagNotFound(String),
    /// More positionals than the command declares. Carries the formatted diagnostic.
    ExtraArgument(String),
    /// The user aborted an interactive prompt.
    Cancelled,
}

impl DispatchOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            DispatchOutcome::Result(_) | DispatchOutcome::Help(_) => 0,
            _ => 1,
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code() == 0
    }

    /// Text to print on stdout, if any.
    pub fn render(&self) -> Option<String> {
        match self {
            DispatchOutcome::Result(Value::Null) => None,
            DispatchOutcome::Result(value) => Some(display_value(value).trim().to_string()),
            DispatchOutcome::Help(text)
            | DispatchOutcome::CommandNotFound(text)
            | DispatchOutcome::FlagNotFound(text)
            | DispatchOutcome::ExtraArgument(text) => Some(text.clone()),
            DispatchOutcome::Cancelled => Some("Cancelled.".to_string()),
        }
    }
}

/// Strings print raw, whole floats print without a fractional part.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}
