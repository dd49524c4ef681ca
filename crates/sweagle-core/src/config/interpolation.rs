//! `${VAR}` expansion against the build environment
//!
//! Step parameters usually reference build variables (`${BUILD_NUMBER}`,
//! `${GIT_BRANCH}`). Values come from the environment map handed over by the
//! CI host, never from the process environment directly.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{
    Captures,
    Regex,
};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InterpolationError {
    #[error("Build variable not found: {0}")]
    VarNotFound(String),
}

pub type InterpolationResult<T> = Result<T, InterpolationError>;

static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").expect("Invalid regex pattern")
});

/// Expands every `${VAR}` and `${VAR:-default}` in `input` in a single pass.
/// Defaults are literal text; expanded values are not expanded again.
pub fn interpolate(input: &str, env: &HashMap<String, String>) -> InterpolationResult<String> {
    let mut failure = None;
    let expanded = VAR_PATTERN.replace_all(input, |cap: &Captures<'_>| {
        let name = &cap[1];
        match (env.get(name), cap.get(2)) {
            (Some(value), _) => value.clone(),
            (None, Some(default)) => default.as_str().to_string(),
            (None, None) => {
                failure.get_or_insert(InterpolationError::VarNotFound(name.to_string()));
                String::new()
            }
        }
    });

    match failure {
        Some(e) => Err(e),
        None => Ok(expanded.into_owned()),
    }
}

/// Expands variables in every string of a TOML document, in place
pub fn interpolate_toml(
    value: &mut toml::Value, env: &HashMap<String, String>,
) -> InterpolationResult<()> {
    match value {
        toml::Value::String(s) => {
            *s = interpolate(s, env)?;
        }
        toml::Value::Array(items) => {
            for item in items {
                interpolate_toml(item, env)?;
            }
        }
        toml::Value::Table(table) => {
            for (_, v) in table.iter_mut() {
                interpolate_toml(v, env)?;
            }
        }
        _ => {}
    }
    Ok(())
}

pub fn referenced_variables(input: &str) -> Vec<String> {
    VAR_PATTERN
        .captures_iter(input)
        .map(|cap| cap[1].to_string())
        .collect()
}
