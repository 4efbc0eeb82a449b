//! The dispatcher: resolves a command line against the tree, binds, invokes, reports.

use crate::cli::{self, help, interactive, ParsedArgv, Prompter, TerminalPrompter};
use crate::config::Config;
use crate::engine::{binder, introspect, walker};
use crate::error::{FireError, Result};
use crate::models::{CallArgs, CommandNode, DispatchOutcome, Leaf, ParameterSpec, ResolutionPath};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Owns a command tree and dispatches command lines against it.
pub struct Fire {
    root: CommandNode,
    config: Config,
    prompter: Box<dyn Prompter>,
}

impl Fire {
    /// Takes ownership of the tree, using the default configuration.
    ///
    /// # Errors
    ///
    /// Returns `FireError::InvariantViolation` if any command declares an
    /// invalid, reserved or duplicate parameter name.
    pub fn new(root: impl Into<CommandNode>) -> Result<Self> {
        Self::with_config(root, Config::default())
    }

    pub fn with_config(root: impl Into<CommandNode>, config: Config) -> Result<Self> {
        let root = root.into();
        introspect::validate_tree(&root)?;
        Ok(Self {
            root,
            config,
            prompter: Box::new(TerminalPrompter),
        })
    }

    /// Replaces the terminal prompter used in interactive mode.
    pub fn with_prompter(mut self, prompter: impl Prompter + 'static) -> Self {
        self.prompter = Box::new(prompter);
        self
    }

    pub fn root(&self) -> &CommandNode {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parameters of the command at `path`.
    ///
    /// # Errors
    ///
    /// - `FireError::CommandNotFound` if the path does not resolve completely.
    /// - `FireError::NotFunction` if it resolves to a group.
    pub fn signature(&self, path: &[&str]) -> Result<Arc<[ParameterSpec]>> {
        let tokens: Vec<String> = path.iter().map(|s| s.to_string()).collect();
        let resolution = walker::walk(&self.root, &tokens);
        if let Some(token) = resolution.next_token(&tokens) {
            return Err(FireError::CommandNotFound {
                token: Some(token.to_string()),
                suggestion: None,
            });
        }
        introspect::introspect(resolution.node)
    }

    /// Resolves and runs one command line.
    ///
    /// Not-found diagnostics, help and cancellation come back as `Ok` outcomes;
    /// errors from the invoked command come back as `FireError::Callable`.
    pub async fn dispatch(&self, argv: &ParsedArgv) -> Result<DispatchOutcome> {
        debug!(?argv, "Dispatching");
        let mut resolution = walker::walk(&self.root, &argv.positionals);

        loop {
            let branch = match resolution.node {
                CommandNode::Leaf(leaf) => {
                    return self
                        .dispatch_leaf(leaf, resolution.node, &resolution.path, resolution.consumed, argv)
                        .await;
                },
                CommandNode::Branch(branch) => branch,
            };

            if argv.help {
                return Ok(DispatchOutcome::Help(self.help(&resolution.path, resolution.node)));
            }

            if argv.interactive && resolution.node.is_exposed() {
                let Some(name) = interactive::select_command(self.prompter.as_ref(), branch)? else {
                    return Ok(DispatchOutcome::Cancelled);
                };
                let Some(child) = branch.child(&name) else {
                    return Err(FireError::InvariantViolation(format!(
                        "selected command `{}` does not exist",
                        name
                    )));
                };
                let mut path = resolution.path.clone();
                path.push(name);
                resolution = walker::walk_from(child, path, &argv.positionals, resolution.consumed);
                continue;
            }

            let token = resolution.next_token(&argv.positionals);
            let suggestion = token.and_then(|token| {
                cli::suggest(token, branch.exposed_names(), self.config.suggestion_threshold)
            });
            info!(token = ?token, suggestion = ?suggestion, path = %resolution.path, "Command not found");
            let help = self.help(&resolution.path, resolution.node);
            return Ok(DispatchOutcome::CommandNotFound(cli::command_not_found(
                token,
                suggestion.as_deref(),
                &help,
            )));
        }
    }

    async fn dispatch_leaf(
        &self,
        leaf: &Leaf,
        node: &CommandNode,
        path: &ResolutionPath,
        offset: usize,
        argv: &ParsedArgv,
    ) -> Result<DispatchOutcome> {
        if argv.help {
            return Ok(DispatchOutcome::Help(self.help(path, node)));
        }

        let params = introspect::introspect_leaf(leaf);
        let args = if argv.interactive {
            match interactive::collect_arguments(self.prompter.as_ref(), &params)? {
                Some(values) => CallArgs::new(params, values),
                None => return Ok(DispatchOutcome::Cancelled),
            }
        } else {
            match binder::bind(&params, argv, offset, self.config.suggestion_threshold) {
                Ok(args) => args,
                Err(FireError::FlagNotFound { flag, suggestion }) => {
                    info!(flag = %flag, suggestion = ?suggestion, path = %path, "Flag not found");
                    return Ok(DispatchOutcome::FlagNotFound(cli::flag_not_found(
                        &flag,
                        suggestion.as_deref(),
                        &self.help(path, node),
                    )));
                },
                Err(FireError::ExtraArgument { token }) => {
                    info!(token = %token, path = %path, "Unexpected argument");
                    return Ok(DispatchOutcome::ExtraArgument(cli::extra_argument(
                        &token,
                        &self.help(path, node),
                    )));
                },
                Err(err) => return Err(err),
            }
        };

        info!(path = %path, "Invoking command");
        let value = leaf.call(args).await.map_err(|err| {
            error!(path = %path, error = %err, "Command failed");
            FireError::from(err)
        })?;
        Ok(DispatchOutcome::Result(value))
    }

    /// Lexes `tokens`, dispatches, prints the outcome and maps it to an exit code.
    pub async fn run<I, S>(&self, tokens: I) -> ExitCode
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv = ParsedArgv::parse(tokens);
        match self.dispatch(&argv).await {
            Ok(outcome) => {
                if let Some(text) = outcome.render() {
                    println!("{}", text);
                }
                ExitCode::from(outcome.exit_code())
            },
            Err(err) => {
                println!("{}", cli::failure(&err));
                ExitCode::FAILURE
            },
        }
    }

    fn help(&self, path: &ResolutionPath, node: &CommandNode) -> String {
        help::render(&self.config.program_name, path, node)
    }
}
