//! Parameter parsing helpers shared by command handlers

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::{CommandError, CommandResult, ErrorCode};
use crate::vault::normalize_path;

/// Deserialize handler params
///
/// Missing required fields map to `E_MISSING_PARAM`, anything else that
/// does not fit the shape to `E_INVALID_PARAM`.
///
/// # Errors
///
/// Returns a command error describing the first offending field
pub fn parse<T: DeserializeOwned>(params: Value) -> CommandResult<T> {
    serde_json::from_value(params).map_err(|e| {
        let message = e.to_string();
        match message
            .strip_prefix("missing field `")
            .and_then(|rest| rest.split('`').next())
        {
            Some(field) => CommandError::missing(field),
            None => CommandError::new(ErrorCode::InvalidParam, message),
        }
    })
}

/// Require a non-blank string
///
/// # Errors
///
/// Returns `E_MISSING_PARAM` when absent or blank
pub fn require<'a>(value: Option<&'a str>, name: &str) -> CommandResult<&'a str> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| CommandError::missing(name))
}

/// Require and normalize a vault path
///
/// # Errors
///
/// Returns `E_MISSING_PARAM` when blank, `E_INVALID_PARAM` when the path
/// is absolute or escapes the vault
pub fn require_path(value: Option<&str>, name: &str) -> CommandResult<String> {
    let raw = require(value, name)?;
    let path = normalize_path(raw)?;
    if path.is_empty() {
        return Err(CommandError::missing(name));
    }
    Ok(path)
}

/// Normalize an optional path prefix (`""` when absent)
///
/// # Errors
///
/// Returns `E_INVALID_PARAM` when the prefix escapes the vault
pub fn optional_prefix(value: Option<&str>) -> CommandResult<String> {
    value.map_or_else(|| Ok(String::new()), |v| Ok(normalize_path(v)?))
}

/// Apply a default and clamp into `1..=ceiling`
#[must_use]
pub fn clamp_limit(requested: Option<usize>, default: usize, ceiling: usize) -> usize {
    requested.unwrap_or(default).clamp(1, ceiling.max(1))
}

/// Reject text whose UTF-8 size exceeds `max`
///
/// # Errors
///
/// Returns `E_TOO_LARGE`
pub fn check_size(text: &str, max: usize, name: &str) -> CommandResult<()> {
    if text.len() > max {
        return Err(CommandError::new(
            ErrorCode::TooLarge,
            format!("{name} is {} bytes, limit is {max}", text.len()),
        ));
    }
    Ok(())
}
