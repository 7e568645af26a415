//! `systemctl` / `journalctl` command builders.

use serde::{Deserialize, Serialize};

use crate::domain::command::shell_quote;

/// State-changing `systemctl` verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
    Reload,
    Enable,
    Disable,
}

impl ServiceAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceAction::Start => "start",
            ServiceAction::Stop => "stop",
            ServiceAction::Restart => "restart",
            ServiceAction::Reload => "reload",
            ServiceAction::Enable => "enable",
            ServiceAction::Disable => "disable",
        }
    }

    /// Past tense used in success messages.
    #[must_use]
    pub fn past_tense(self) -> &'static str {
        match self {
            ServiceAction::Start => "started",
            ServiceAction::Stop => "stopped",
            ServiceAction::Restart => "restarted",
            ServiceAction::Reload => "reloaded",
            ServiceAction::Enable => "enabled",
            ServiceAction::Disable => "disabled",
        }
    }
}

impl std::fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[must_use]
pub fn action_command(action: ServiceAction, unit: &str) -> String {
    format!("sudo systemctl {} {}", action.as_str(), shell_quote(unit))
}

#[must_use]
pub fn is_active_command(unit: &str) -> String {
    format!("systemctl is-active {} 2>/dev/null", shell_quote(unit))
}

#[must_use]
pub fn is_enabled_command(unit: &str) -> String {
    format!("systemctl is-enabled {} 2>/dev/null", shell_quote(unit))
}

/// Units currently loaded, including inactive ones.
#[must_use]
pub fn loaded_unit_command(unit: &str) -> String {
    format!(
        "systemctl list-units --full -all 2>/dev/null | grep -F {}",
        shell_quote(&format!("{unit}.service"))
    )
}

/// Unit files known to systemd, loaded or not.
#[must_use]
pub fn unit_file_command(unit: &str) -> String {
    format!(
        "systemctl list-unit-files 2>/dev/null | grep -F {}",
        shell_quote(&format!("{unit}.service"))
    )
}

#[must_use]
pub fn journal_command(unit: &str, lines: u32) -> String {
    format!(
        "sudo journalctl -u {} -n {lines} --no-pager 2>&1",
        shell_quote(unit)
    )
}

/// Whole-system journal, newest `lines` entries.
#[must_use]
pub fn system_journal_command(lines: u32) -> String {
    format!("sudo journalctl -n {lines} --no-pager 2>&1")
}

/// Last `lines` lines of a plain log file.
#[must_use]
pub fn tail_command(path: &str, lines: u32) -> String {
    format!("sudo tail -n {lines} {} 2>/dev/null", shell_quote(path))
}
