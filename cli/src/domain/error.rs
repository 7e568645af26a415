//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Administration errors ─────────────────────────────────────────────────────

/// Named failure taxonomy for remote administration.
///
/// `ServiceNotFound` and `UnsupportedCapability` are structural: they abort
/// the section load that raised them. The remaining variants describe soft
/// failures and normally end up as a message on the application state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdminError {
    #[error("No backend is available for application '{0}'.")]
    ServiceNotFound(String),

    #[error("Connection to the remote host was lost.")]
    ConnectionLost,

    #[error("Remote command timed out after {secs}s.")]
    Timeout { secs: u64 },

    #[error("Remote command exited with status {code}: {output}")]
    NonZeroExit { code: i32, output: String },

    #[error("Could not parse {what}.")]
    ParseFailure { what: String },

    #[error("Application '{app}' does not support {capability}.")]
    UnsupportedCapability { app: String, capability: String },

    #[error("Invalid name '{0}': use letters, digits, '_' or '-' (max 63 characters).")]
    InvalidName(String),
}

impl AdminError {
    /// Structural errors abort the load that raised them; the rest are
    /// reported on the state as a message.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            AdminError::ServiceNotFound(_) | AdminError::UnsupportedCapability { .. }
        )
    }
}

// ── Command failures ──────────────────────────────────────────────────────────

/// Classification of a single failed `CommandResult`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandFailure {
    #[error("connection lost")]
    ConnectionLost,

    #[error("timed out")]
    Timeout,

    #[error("exit status {code}")]
    NonZeroExit { code: i32, output: String },
}

impl CommandFailure {
    /// Convert into the administration taxonomy. `timeout_secs` is the
    /// deadline the command was issued with.
    #[must_use]
    pub fn into_admin_error(self, timeout_secs: u64) -> AdminError {
        match self {
            CommandFailure::ConnectionLost => AdminError::ConnectionLost,
            CommandFailure::Timeout => AdminError::Timeout { secs: timeout_secs },
            CommandFailure::NonZeroExit { code, output } => AdminError::NonZeroExit { code, output },
        }
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\n{hint}")]
    InvalidValue {
        key: String,
        value: String,
        hint: String,
    },

    #[error("Invalid host name '{0}': must match ^[A-Za-z0-9][A-Za-z0-9._-]{{0,62}}$")]
    InvalidHostName(String),

    #[error("Unknown host '{0}'. Add it under `hosts:` in the config file or pass an address.")]
    UnknownHost(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_failure_keeps_deadline() {
        let err = CommandFailure::Timeout.into_admin_error(30);
        assert_eq!(err, AdminError::Timeout { secs: 30 });
        assert!(err.to_string().contains("30s"));
    }

    #[test]
    fn non_zero_exit_carries_output() {
        let err = CommandFailure::NonZeroExit {
            code: 2,
            output: "permission denied".to_string(),
        }
        .into_admin_error(30);
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn service_not_found_names_app() {
        let err = AdminError::ServiceNotFound("files".to_string());
        assert!(err.to_string().contains("'files'"));
    }

    #[test]
    fn only_registry_errors_are_structural() {
        assert!(AdminError::ServiceNotFound("x".to_string()).is_structural());
        assert!(!AdminError::ConnectionLost.is_structural());
        assert!(!AdminError::Timeout { secs: 1 }.is_structural());
    }
}
