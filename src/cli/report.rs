//! User-facing diagnostics with "did you mean" suggestions.

use crate::error::FireError;
use colored::*;

/// Best match must score above this to be suggested.
pub const DEFAULT_SUGGESTION_THRESHOLD: f64 = 0.4;

/// Sørensen–Dice similarity of the two strings' bigrams, in `0.0..=1.0`.
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::sorensen_dice(a, b)
}

/// Picks the candidate most similar to `token`, if it scores above `threshold`.
/// Ties go to the earliest candidate.
pub fn suggest<'a, I>(token: &str, candidates: I, threshold: f64) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&str, f64)> = None;
    for candidate in candidates {
        let score = similarity(token, candidate);
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((candidate, score));
        }
    }

    best.filter(|(_, score)| *score > threshold)
        .map(|(name, _)| name.to_string())
}

/// Header, then the suggestion on its own line when there is one, then the help text.
fn with_suggestion(header: ColoredString, suggestion: Option<&str>, help: &str) -> String {
    match suggestion {
        Some(s) => format!(
            "{}\n{}\n\n{}",
            header,
            format!("Did you mean: {} ?", s.underline()).yellow(),
            help
        ),
        None => format!("{}\n\n{}", header, help),
    }
}

/// Diagnostic for a token that named no command. `help` is the stalled group's help text.
pub fn command_not_found(token: Option<&str>, suggestion: Option<&str>, help: &str) -> String {
    let header = match token {
        Some(token) => format!("Error: Command {} not found", token.underline()).red(),
        None => "Error: Command not found".red(),
    };
    with_suggestion(header, suggestion, help)
}

/// Diagnostic for an undeclared flag. `help` is the command's help text.
pub fn flag_not_found(flag: &str, suggestion: Option<&str>, help: &str) -> String {
    let header = format!("Error: Flag {} not found", flag.underline()).red();
    with_suggestion(header, suggestion, help)
}

/// Diagnostic for a positional beyond the command's last parameter.
pub fn extra_argument(token: &str, help: &str) -> String {
    let header = format!("Error: Unexpected argument {}", token.underline()).red();
    format!("{}\n\n{}", header, help)
}

/// Message printed when a dispatch fails outright.
pub fn failure(err: &FireError) -> String {
    format!("Error: {}", err).red().to_string()
}
