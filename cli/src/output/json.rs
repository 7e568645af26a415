//! JSON output helpers.
//!
//! Every `--json` code path prints exactly one pretty-printed document on
//! stdout: the command's payload on success, the error object on failure.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::AdminError;

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Stable error code for the JSON error object.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    match err.downcast_ref::<AdminError>() {
        Some(AdminError::ServiceNotFound(_)) => "service_not_found",
        Some(AdminError::UnsupportedCapability { .. }) => "unsupported_capability",
        Some(AdminError::Timeout { .. }) => "timeout",
        Some(AdminError::ConnectionLost) => "connection_lost",
        Some(AdminError::InvalidName(_)) => "invalid_name",
        Some(AdminError::ParseFailure { .. }) => "parse_failure",
        Some(AdminError::NonZeroExit { .. }) => "command_failed",
        None => "error",
    }
}

/// Print `value` as a pretty-printed JSON document.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
    println!("{out}");
    Ok(())
}
