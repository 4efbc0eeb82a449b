//! Argument binding.
//!
//! For each declared parameter, in order:
//! 1. a flag with the same name wins;
//! 2. otherwise the positional at `offset + index`;
//! 3. otherwise the literal default, or a missing value.

use crate::cli::{suggest, ParsedArgv};
use crate::error::{FireError, Result};
use crate::models::{CallArgs, ParameterSpec, RESERVED_FLAGS};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Binds `argv` onto `params`. `offset` is the number of positionals consumed as command names.
///
/// # Errors
///
/// - `FireError::FlagNotFound` for a flag that matches no parameter.
/// - `FireError::ExtraArgument` when positionals remain beyond the last parameter.
pub fn bind(
    params: &Arc<[ParameterSpec]>,
    argv: &ParsedArgv,
    offset: usize,
    threshold: f64,
) -> Result<CallArgs> {
    validate_flags(params, argv, threshold)?;

    if let Some(token) = argv.positionals.get(offset + params.len()) {
        return Err(FireError::ExtraArgument {
            token: token.clone(),
        });
    }

    let values = params
        .iter()
        .enumerate()
        .map(|(index, param)| {
            if let Some(flag) = argv.flags.get(&param.name) {
                return Some(Value::String(flag.clone()));
            }
            if let Some(positional) = argv.positionals.get(offset + index) {
                return Some(Value::String(positional.clone()));
            }
            param.known_default().cloned()
        })
        .collect::<Vec<_>>();

    debug!(
        bound = values.iter().filter(|v| v.is_some()).count(),
        declared = params.len(),
        "Bound arguments"
    );
    Ok(CallArgs::new(Arc::clone(params), values))
}

/// Every supplied flag must name a declared parameter.
pub fn validate_flags(params: &[ParameterSpec], argv: &ParsedArgv, threshold: f64) -> Result<()> {
    let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();

    for flag in argv.flags.keys() {
        if RESERVED_FLAGS.contains(&flag.as_str()) || names.contains(&flag.as_str()) {
            continue;
        }
        return Err(FireError::FlagNotFound {
            flag: flag.clone(),
            suggestion: suggest(flag, names.iter().copied(), threshold),
        });
    }
    Ok(())
}
