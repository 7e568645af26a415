//! Application service — systemd unit control over the executor.
//!
//! Every comparison against `systemctl` output goes through
//! [`sanitize_output`] first; remote shells frequently colour their output.

use crate::application::ports::Executor;
use crate::application::session::Session;
use crate::domain::sanitize::sanitize_output;
use crate::domain::systemd;
use crate::domain::{AdminError, CommandResult, ServiceAction};

/// Run `sudo systemctl <action> <unit>` and return the raw result.
pub async fn run_action(
    session: &Session<impl Executor>,
    action: ServiceAction,
    unit: &str,
) -> CommandResult {
    session.run(&systemd::action_command(action, unit)).await
}

/// Success is exit status 0; the output of start/stop carries no signal.
pub async fn execute_action(
    session: &Session<impl Executor>,
    action: ServiceAction,
    unit: &str,
) -> bool {
    run_action(session, action, unit).await.is_success()
}

/// True iff the sanitized output of `systemctl is-active` is exactly `active`.
pub async fn is_active(session: &Session<impl Executor>, unit: &str) -> bool {
    let result = session.run(&systemd::is_active_command(unit)).await;
    sanitize_output(&result.output) == "active"
}

/// True iff the sanitized output of `systemctl is-enabled` is exactly `enabled`.
pub async fn is_enabled(session: &Session<impl Executor>, unit: &str) -> bool {
    let result = session.run(&systemd::is_enabled_command(unit)).await;
    sanitize_output(&result.output) == "enabled"
}

/// A unit exists if it is loaded or if a unit file is known for it.
pub async fn service_exists(session: &Session<impl Executor>, unit: &str) -> bool {
    let loaded = session.run(&systemd::loaded_unit_command(unit)).await;
    if !sanitize_output(&loaded.output).is_empty() {
        return true;
    }
    let files = session.run(&systemd::unit_file_command(unit)).await;
    !sanitize_output(&files.output).is_empty()
}

/// Last `lines` journal entries of `unit`.
///
/// # Errors
///
/// Returns the classified failure when `journalctl` cannot be run.
pub async fn journal(
    session: &Session<impl Executor>,
    unit: &str,
    lines: u32,
) -> Result<String, AdminError> {
    session
        .query(&systemd::journal_command(unit, lines))
        .await
        .map(|out| sanitize_output(&out))
}
