//! Interactive command selection and argument entry.
//!
//! Prompts are issued one at a time. Any prompt returning `None` means the user
//! aborted, and the caller must abandon the whole dispatch.

use crate::cli::help::flags;
use crate::error::Result;
use crate::models::{value_text, Branch, ParameterSpec};
use dialoguer::{theme::ColorfulTheme, FuzzySelect, Input};
use serde_json::Value;
use std::io::{self, ErrorKind, IsTerminal};
use tracing::{debug, info, warn};

/// Source of interactive answers.
pub trait Prompter: Send + Sync {
    /// Lets the user pick one of `items`. Returns the chosen index, or `None` if aborted.
    fn select(&self, prompt: &str, items: &[String]) -> Result<Option<usize>>;

    /// Asks for a line of text, pre-filled with `initial`. Returns `None` if aborted.
    fn input(&self, prompt: &str, initial: Option<&str>) -> Result<Option<String>>;
}

/// Prompts on the terminal using `dialoguer`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn select(&self, prompt: &str, items: &[String]) -> Result<Option<usize>> {
        require_terminal(attached_to_terminal())?;
        let choice = FuzzySelect::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact_opt(); // Esc / q cancels
        treat_interrupt_as_cancel(choice.map_err(Into::into))
            .map(Option::flatten)
    }

    fn input(&self, prompt: &str, initial: Option<&str>) -> Result<Option<String>> {
        require_terminal(attached_to_terminal())?;
        let theme = ColorfulTheme::default();
        let mut input = Input::<String>::with_theme(&theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(initial) = initial {
            input = input.with_initial_text(initial);
        }
        treat_interrupt_as_cancel(input.interact_text().map_err(Into::into))
    }
}

/// dialoguer reads keys from stdin and draws on stderr.
fn attached_to_terminal() -> bool {
    io::stdin().is_terminal() && io::stderr().is_terminal()
}

/// `FuzzySelect` never returns when there is no terminal to read keys from.
fn require_terminal(attached: bool) -> Result<()> {
    if attached {
        return Ok(());
    }
    warn!("Interactive mode requested without a terminal");
    let err = io::Error::new(ErrorKind::Unsupported, "not a terminal");
    Err(dialoguer::Error::IO(err).into())
}

/// Ctrl+C while a prompt is active surfaces as an interrupted read.
fn treat_interrupt_as_cancel<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(crate::error::FireError::Prompt(err))
            if matches!(&*err, dialoguer::Error::IO(io) if io.kind() == ErrorKind::Interrupted) =>
        {
            Ok(None)
        },
        Err(err) => Err(err),
    }
}

/// Asks the user to pick an exposed child of `branch`. Returns its name.
pub fn select_command(prompter: &dyn Prompter, branch: &Branch) -> Result<Option<String>> {
    let names = branch.exposed_names();
    let labels: Vec<String> = branch
        .exposed()
        .map(|(name, node)| match node.description() {
            "" => name.to_string(),
            description => format!("{} - {}", name, description),
        })
        .collect();

    let choice = prompter.select("Select a command", &labels)?;
    let selected = choice.and_then(|index| names.get(index)).map(|name| name.to_string());
    match &selected {
        Some(name) => debug!(command = %name, "Command selected interactively"),
        None => info!("Command selection cancelled"),
    }
    Ok(selected)
}

/// Prompts for every parameter in declaration order.
///
/// An empty answer, or one equal to the pre-filled default, binds the literal default.
pub fn collect_arguments(
    prompter: &dyn Prompter,
    params: &[ParameterSpec],
) -> Result<Option<Vec<Option<Value>>>> {
    let mut values = Vec::with_capacity(params.len());

    for param in params {
        let initial = param.known_default().map(value_text);
        let prompt = flags(std::slice::from_ref(param));
        let Some(answer) = prompter.input(&prompt, initial.as_deref())? else {
            info!(param = %param.name, "Argument entry cancelled");
            return Ok(None);
        };

        let value = if answer.is_empty() || Some(&answer) == initial.as_ref() {
            param.known_default().cloned()
        } else {
            Some(Value::String(answer))
        };
        values.push(value);
    }

    Ok(Some(values))
}
