//! Remote command results and the predicates that interpret them.
//!
//! Pure functions only. Every substring heuristic used to decide whether a
//! remote tool succeeded lives in [`predicates`] so it can be tested against
//! captured output.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::domain::error::{AdminError, CommandFailure};
use crate::domain::sanitize::sanitize_output;

/// Exit code reported when a command exceeded its deadline (`timeout(1)`).
pub const EXIT_TIMEOUT: i32 = 124;

/// Exit code reported when the transport failed (`ssh(1)` uses 255).
pub const EXIT_CONNECTION_LOST: i32 = 255;

/// Captured result of one executor call. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Combined stdout followed by stderr.
    pub output: String,
    pub exit_code: i32,
    pub elapsed: Duration,
}

impl CommandResult {
    #[must_use]
    pub fn new(output: impl Into<String>, exit_code: i32, elapsed: Duration) -> Self {
        Self {
            output: output.into(),
            exit_code,
            elapsed,
        }
    }

    /// Result for a command killed at its deadline.
    #[must_use]
    pub fn timed_out(partial_output: impl Into<String>, elapsed: Duration) -> Self {
        Self::new(partial_output, EXIT_TIMEOUT, elapsed)
    }

    /// Result for a command that never reached the remote host.
    #[must_use]
    pub fn connection_lost(message: impl Into<String>, elapsed: Duration) -> Self {
        Self::new(message, EXIT_CONNECTION_LOST, elapsed)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// Output with escape sequences and surrounding whitespace removed.
    #[must_use]
    pub fn clean_output(&self) -> String {
        sanitize_output(&self.output)
    }

    /// Classify a failed result. Returns `None` when the exit code is 0.
    #[must_use]
    pub fn failure(&self) -> Option<CommandFailure> {
        match self.exit_code {
            0 => None,
            EXIT_TIMEOUT => Some(CommandFailure::Timeout),
            EXIT_CONNECTION_LOST => Some(CommandFailure::ConnectionLost),
            code => Some(CommandFailure::NonZeroExit {
                code,
                output: self.output.trim().to_string(),
            }),
        }
    }
}

/// Quote `value` for a POSIX shell: wrap in single quotes, `'` becomes `'\''`.
#[must_use]
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[allow(clippy::expect_used)] // Pattern is a compile-time constant
static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_-]{0,62}$").expect("valid regex"));

/// Check a database, user or site name before it is spliced into SQL or a
/// path. Quoting alone is not enough for identifiers.
///
/// # Errors
///
/// Returns `AdminError::InvalidName` when the name contains anything but
/// letters, digits, `_` or `-`.
pub fn validate_identifier(name: &str) -> Result<(), AdminError> {
    if IDENTIFIER_RE.is_match(name) {
        Ok(())
    } else {
        Err(AdminError::InvalidName(name.to_string()))
    }
}

/// Named interpretations of tool output.
pub mod predicates {
    use super::CommandResult;

    /// Redis replies `OK` to successful `CONFIG SET` / `ACL SETUSER` calls.
    #[must_use]
    pub fn redis_reply_ok(result: &CommandResult) -> bool {
        result.is_success() && result.clean_output().lines().any(|l| l.trim() == "OK")
    }

    /// `redis-cli` prints `(error) ...` or `ERR ...` with a zero exit status.
    #[must_use]
    pub fn redis_reply_error(result: &CommandResult) -> bool {
        let out = result.clean_output();
        out.starts_with("(error)") || out.starts_with("ERR") || out.contains("NOAUTH")
    }

    /// MySQL refused the credentials of the calling account.
    #[must_use]
    pub fn mysql_access_denied(result: &CommandResult) -> bool {
        result.output.contains("ERROR 1045") || result.output.contains("Access denied")
    }

    /// `psql` reports a role that does not exist.
    #[must_use]
    pub fn psql_role_missing(result: &CommandResult) -> bool {
        result.output.contains("role") && result.output.contains("does not exist")
    }

    /// Generic "object already exists" message from MySQL or PostgreSQL.
    #[must_use]
    pub fn already_exists(result: &CommandResult) -> bool {
        let lower = result.output.to_ascii_lowercase();
        lower.contains("already exists") || lower.contains("database exists")
    }

    /// `nginx -t` prints `syntax is ok` and `test is successful` on stderr.
    #[must_use]
    pub fn nginx_config_ok(result: &CommandResult) -> bool {
        result.is_success() && result.output.contains("test is successful")
    }

    /// `apachectl configtest` prints `Syntax OK`.
    #[must_use]
    pub fn apache_config_ok(result: &CommandResult) -> bool {
        result.is_success() && result.output.contains("Syntax OK")
    }

    /// `test -e path && echo yes` style probes.
    #[must_use]
    pub fn echoed_yes(result: &CommandResult) -> bool {
        result.clean_output() == "yes"
    }

    /// The user running the command lacks privileges (`sudo` prompt or denial).
    #[must_use]
    pub fn sudo_denied(result: &CommandResult) -> bool {
        result.output.contains("a password is required")
            || result.output.contains("is not in the sudoers file")
    }
}
