//! Data structures describing a command tree.
//!
//! - `CommandNode`: either an invocable `Leaf` or a `Branch` of named children.
//! - `ParameterSpec` / `ParamDefault`: declared parameters of a leaf.
//! - `CallArgs`: the bound argument values handed to a leaf when it runs.

use crate::error::{FireError, Result};
use futures::future::{self, BoxFuture, FutureExt};
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

/// Flag names the lexer always claims for itself.
pub const RESERVED_FLAGS: [&str; 4] = ["help", "h", "interactive", "i"];

/// Children whose name starts with this prefix are never exposed.
pub const PRIVATE_PREFIX: char = '_';

/// The default declared for a parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ParamDefault {
    /// No default; the value must come from a flag or positional.
    Required,
    /// A literal default applied by the binder.
    Literal(Value),
    /// The command applies its own default; the binder passes a missing value.
    Deferred,
}

/// Metadata for one declared parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSpec {
    pub name: String,
    pub default: ParamDefault,
}

impl ParameterSpec {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: ParamDefault::Required,
        }
    }

    pub fn with_default(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            default: ParamDefault::Literal(value.into()),
        }
    }

    pub fn deferred(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: ParamDefault::Deferred,
        }
    }

    pub fn has_default(&self) -> bool {
        !matches!(self.default, ParamDefault::Required)
    }

    /// The literal default, if one is known.
    pub fn known_default(&self) -> Option<&Value> {
        match &self.default {
            ParamDefault::Literal(value) => Some(value),
            _ => None,
        }
    }
}

type Handler = dyn Fn(CallArgs) -> BoxFuture<'static, anyhow::Result<Value>> + Send + Sync;

/// An invocable command.
///
/// Parameters are declared explicitly, either with the `param*` builder methods or
/// with a signature string such as `"(a, b = 5)"`. Signature parameters come first.
pub struct Leaf {
    handler: Arc<Handler>,
    signature: Option<String>,
    declared: Vec<ParameterSpec>,
    description: Option<String>,
    spec: OnceLock<Arc<[ParameterSpec]>>,
}

impl Leaf {
    /// Wraps a synchronous command. Its return value is serialized into a JSON value.
    pub fn new<F, T>(command: F) -> Self
    where
        F: Fn(CallArgs) -> anyhow::Result<T> + Send + Sync + 'static,
        T: Serialize + 'static,
    {
        let handler = move |args: CallArgs| -> BoxFuture<'static, anyhow::Result<Value>> {
            let outcome = command(args).and_then(result_value);
            future::ready(outcome).boxed()
        };
        Self::from_handler(Arc::new(handler))
    }

    /// Wraps an asynchronous command. The dispatcher awaits it exactly once.
    pub fn new_async<F, Fut, T>(command: F) -> Self
    where
        F: Fn(CallArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        let handler = move |args: CallArgs| -> BoxFuture<'static, anyhow::Result<Value>> {
            let pending = command(args);
            async move {
                result_value(pending.await?)
            }
            .boxed()
        };
        Self::from_handler(Arc::new(handler))
    }

    fn from_handler(handler: Arc<Handler>) -> Self {
        Self {
            handler,
            signature: None,
            declared: Vec::new(),
            description: None,
            spec: OnceLock::new(),
        }
    }

    /// Declares a parameter without a default.
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.declared.push(ParameterSpec::required(name));
        self
    }

    /// Declares a parameter with a literal default.
    pub fn param_default(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.declared.push(ParameterSpec::with_default(name, value));
        self
    }

    /// Declares a parameter whose default the command computes itself.
    pub fn param_deferred(mut self, name: impl Into<String>) -> Self {
        self.declared.push(ParameterSpec::deferred(name));
        self
    }

    /// Declares parameters from a signature string, e.g. `"(name = \"world\", count)"`.
    pub fn signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub(crate) fn signature_text(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    pub(crate) fn declared(&self) -> &[ParameterSpec] {
        &self.declared
    }

    pub(crate) fn spec_cache(&self) -> &OnceLock<Arc<[ParameterSpec]>> {
        &self.spec
    }

    pub(crate) fn call(&self, args: CallArgs) -> BoxFuture<'static, anyhow::Result<Value>> {
        (self.handler)(args)
    }
}

impl fmt::Debug for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Leaf")
            .field("signature", &self.signature)
            .field("declared", &self.declared)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// A named collection of child commands. Children are kept sorted by name.
#[derive(Debug, Default)]
pub struct Branch {
    children: BTreeMap<String, CommandNode>,
    description: Option<String>,
}

impl Branch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// Builder form of [`Branch::insert`].
    pub fn command(mut self, name: impl Into<String>, node: impl Into<CommandNode>) -> Result<Self> {
        self.insert(name, node)?;
        Ok(self)
    }

    /// Adds a direct child.
    ///
    /// # Errors
    ///
    /// Returns `FireError::InvariantViolation` if the name is invalid or already taken.
    pub fn insert(&mut self, name: impl Into<String>, node: impl Into<CommandNode>) -> Result<()> {
        let name = name.into();
        validate_command_name(&name)?;
        if self.children.contains_key(&name) {
            return Err(FireError::InvariantViolation(format!(
                "duplicate command name `{}`",
                name
            )));
        }
        self.children.insert(name, node.into());
        Ok(())
    }

    /// Inserts a node at a dotted path such as `"misc.info.greeting"`,
    /// creating intermediate branches as needed.
    pub fn insert_path(&mut self, path: &str, node: impl Into<CommandNode>) -> Result<()> {
        let segments: Vec<&str> = path.split('.').collect();
        let Some((last, parents)) = segments.split_last() else {
            return Err(FireError::InvariantViolation("empty command path".into()));
        };

        let mut current = self;
        for segment in parents {
            validate_command_name(segment)?;
            let child = current
                .children
                .entry(segment.to_string())
                .or_insert_with(|| CommandNode::Branch(Branch::new()));
            current = match child {
                CommandNode::Branch(branch) => branch,
                CommandNode::Leaf(_) => {
                    return Err(FireError::InvariantViolation(format!(
                        "`{}` in `{}` is a command, not a group",
                        segment, path
                    )))
                },
            };
        }

        current.insert(*last, node)
    }

    /// Every child, exposed or not, in name order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &CommandNode)> {
        self.children.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Children visible to users: public names that lead to at least one leaf, in name order.
    pub fn exposed(&self) -> impl Iterator<Item = (&str, &CommandNode)> {
        self.children()
            .filter(|(name, node)| !name.starts_with(PRIVATE_PREFIX) && node.is_exposed())
    }

    pub fn exposed_names(&self) -> Vec<&str> {
        self.exposed().map(|(name, _)| name).collect()
    }

    /// Looks up an exposed child by exact name.
    pub fn child(&self, name: &str) -> Option<&CommandNode> {
        if name.starts_with(PRIVATE_PREFIX) {
            return None;
        }
        self.children.get(name).filter(|node| node.is_exposed())
    }
}

/// Converts a command's return value for printing.
///
/// JSON has no infinities or NaN, so a top-level non-finite float is kept as its text.
fn result_value<T: Serialize + 'static>(value: T) -> anyhow::Result<Value> {
    let any = &value as &dyn Any;
    let float = any
        .downcast_ref::<f64>()
        .copied()
        .or_else(|| any.downcast_ref::<f32>().map(|f| f64::from(*f)));
    if let Some(f) = float.filter(|f| !f.is_finite()) {
        return Ok(Value::String(f.to_string()));
    }
    Ok(serde_json::to_value(value)?)
}

fn validate_command_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(FireError::InvariantViolation("empty command name".into()));
    }
    if name.starts_with('-') || name.chars().any(char::is_whitespace) || name.contains('.') {
        return Err(FireError::InvariantViolation(format!(
            "invalid command name `{}`",
            name
        )));
    }
    if RESERVED_FLAGS.contains(&name) {
        return Err(FireError::InvariantViolation(format!(
            "command name `{}` is reserved",
            name
        )));
    }
    Ok(())
}

/// A node of the command tree.
#[derive(Debug)]
pub enum CommandNode {
    Leaf(Leaf),
    Branch(Branch),
}

impl CommandNode {
    pub fn description(&self) -> &str {
        match self {
            CommandNode::Leaf(leaf) => leaf.description(),
            CommandNode::Branch(branch) => branch.description(),
        }
    }

    /// A leaf is always exposed; a branch only if it transitively contains a leaf.
    pub fn is_exposed(&self) -> bool {
        match self {
            CommandNode::Leaf(_) => true,
            CommandNode::Branch(branch) => branch.exposed().next().is_some(),
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            CommandNode::Leaf(leaf) => Some(leaf),
            CommandNode::Branch(_) => None,
        }
    }

    pub fn as_branch(&self) -> Option<&Branch> {
        match self {
            CommandNode::Branch(branch) => Some(branch),
            CommandNode::Leaf(_) => None,
        }
    }
}

impl From<Leaf> for CommandNode {
    fn from(leaf: Leaf) -> Self {
        CommandNode::Leaf(leaf)
    }
}

impl From<Branch> for CommandNode {
    fn from(branch: Branch) -> Self {
        CommandNode::Branch(branch)
    }
}

/// Argument values bound to a leaf's parameters, in declaration order.
///
/// A `None` value means nothing was supplied and no literal default exists.
#[derive(Debug, Clone)]
pub struct CallArgs {
    params: Arc<[ParameterSpec]>,
    values: Vec<Option<Value>>,
}

impl CallArgs {
    pub(crate) fn new(params: Arc<[ParameterSpec]>, values: Vec<Option<Value>>) -> Self {
        Self { params, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn params(&self) -> &[ParameterSpec] {
        &self.params
    }

    pub fn values(&self) -> &[Option<Value>] {
        &self.values
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }

    /// Value bound to `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.index_of(name)
            .and_then(|i| self.values.get(i))
            .and_then(Option::as_ref)
    }

    /// Value bound to the parameter at `index`, if any.
    pub fn at(&self, index: usize) -> Option<&Value> {
        self.values.get(index).and_then(Option::as_ref)
    }

    pub fn is_missing(&self, name: &str) -> bool {
        self.get(name).is_none()
    }

    /// Text form of the value bound to `name`. Strings are returned without quotes.
    pub fn str(&self, name: &str) -> anyhow::Result<String> {
        self.get(name)
            .map(value_text)
            .ok_or_else(|| anyhow::anyhow!("missing value for `{}`", name))
    }

    /// Parses the value bound to `name`.
    pub fn parse<T>(&self, name: &str) -> anyhow::Result<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let text = self.str(name)?;
        text.parse()
            .map_err(|e| anyhow::anyhow!("invalid value `{}` for `{}`: {}", text, name, e))
    }

    /// Like [`CallArgs::parse`], but returns `fallback` when nothing was bound.
    pub fn parse_or<T>(&self, name: &str, fallback: T) -> anyhow::Result<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        if self.is_missing(name) {
            Ok(fallback)
        } else {
            self.parse(name)
        }
    }
}

/// Text form of a JSON value, without quotes around strings.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
