//! Splits raw command-line tokens into positionals and flags.

use std::collections::BTreeMap;

/// Lexed command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgv {
    pub positionals: Vec<String>,
    /// Named values, keyed by flag name without dashes.
    pub flags: BTreeMap<String, String>,
    /// `--help` / `-h`
    pub help: bool,
    /// `--interactive` / `-i`
    pub interactive: bool,
}

impl ParsedArgv {
    /// Lexes `tokens` (without the program name).
    ///
    /// - `--name=value` and `--name value` set a flag; a bare `--name` is `"true"`.
    /// - `-n`, `-n value` and `-n=value` work the same way for short names.
    /// - `--help`/`-h` and `--interactive`/`-i` never take a value.
    /// - Everything after `--` is positional, as are `-` and negative numbers.
    pub fn parse<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut argv = Self::default();
        let mut tokens = tokens.into_iter().map(Into::into).peekable();

        while let Some(token) = tokens.next() {
            if token == "--" {
                argv.positionals.extend(tokens);
                break;
            }

            let Some(body) = flag_body(&token) else {
                argv.positionals.push(token);
                continue;
            };

            let (name, inline) = match body.split_once('=') {
                Some((name, value)) => (name.to_string(), Some(value.to_string())),
                None => (body.to_string(), None),
            };

            if argv.set_reserved(&name, inline.as_deref()) {
                continue;
            }

            let value = inline
                .or_else(|| tokens.next_if(|next| next != "--" && flag_body(next).is_none()))
                .unwrap_or_else(|| "true".to_string());
            argv.flags.insert(name, value);
        }

        argv
    }

    pub fn flag(&self, name: &str) -> Option<&str> {
        self.flags.get(name).map(String::as_str)
    }

    fn set_reserved(&mut self, name: &str, inline: Option<&str>) -> bool {
        let enabled = !matches!(inline, Some("false") | Some("0"));
        match name {
            "help" | "h" => self.help = enabled,
            "interactive" | "i" => self.interactive = enabled,
            _ => return false,
        }
        true
    }
}

/// The name part of a flag token, or `None` for a positional.
fn flag_body(token: &str) -> Option<&str> {
    if let Some(long) = token.strip_prefix("--") {
        return (!long.is_empty()).then_some(long);
    }
    let short = token.strip_prefix('-')?;
    short
        .chars()
        .next()
        .filter(|c| c.is_alphabetic())
        .map(|_| short)
}
