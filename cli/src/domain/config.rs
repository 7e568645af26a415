//! Domain types and validators for hostkit configuration.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use std::collections::BTreeMap;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "timeouts.command_secs",
    "timeouts.install_secs",
    "timeouts.settle_secs",
];

/// Upper bound accepted for any timeout setting (one hour).
pub const MAX_TIMEOUT_SECS: u64 = 3600;

#[allow(clippy::expect_used)] // Pattern is a compile-time constant
pub static HOST_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]{0,62}$").expect("valid regex"));

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.hostkit/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct HostkitConfig {
    pub timeouts: TimeoutConfig,
    /// Named hosts usable with `--host <name>`.
    pub hosts: BTreeMap<String, HostEntry>,
}

/// Deadlines applied to remote commands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Probes and queries.
    pub command_secs: u64,
    /// Package installs and removals.
    pub install_secs: u64,
    /// Pause after mutating a service before re-probing it.
    pub settle_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            command_secs: 30,
            install_secs: 600,
            settle_secs: 2,
        }
    }
}

impl TimeoutConfig {
    #[must_use]
    pub fn command(&self) -> Duration {
        Duration::from_secs(self.command_secs)
    }

    #[must_use]
    pub fn install(&self) -> Duration {
        Duration::from_secs(self.install_secs)
    }

    #[must_use]
    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }
}

/// SSH destination for a named host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostEntry {
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_file: Option<String>,
}

impl HostkitConfig {
    /// Resolve `--host` to an SSH destination. Names from the config win;
    /// anything else is treated as `[user@]address`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is neither a configured name nor a
    /// syntactically valid address.
    pub fn resolve_host(&self, name_or_addr: &str) -> Result<HostEntry> {
        if let Some(entry) = self.hosts.get(name_or_addr) {
            return Ok(entry.clone());
        }
        let (user, host) = match name_or_addr.split_once('@') {
            Some((user, host)) => (Some(user.to_string()), host),
            None => (None, name_or_addr),
        };
        if !HOST_NAME_RE.is_match(host) {
            return Err(ConfigError::UnknownHost(name_or_addr.to_string()).into());
        }
        Ok(HostEntry {
            host: host.to_string(),
            user,
            port: None,
            identity_file: None,
        })
    }

    /// Read a whitelisted key as a display string.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not in the whitelist.
    pub fn get(&self, key: &str) -> Result<String> {
        validate_config_key(key)?;
        let value = match key {
            "timeouts.command_secs" => self.timeouts.command_secs,
            "timeouts.install_secs" => self.timeouts.install_secs,
            _ => self.timeouts.settle_secs,
        };
        Ok(value.to_string())
    }

    /// Validate and apply a whitelisted key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key or value is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        let secs = validate_config_value(key, value)?;
        match key {
            "timeouts.command_secs" => self.timeouts.command_secs = secs,
            "timeouts.install_secs" => self.timeouts.install_secs = secs,
            _ => self.timeouts.settle_secs = secs,
        }
        Ok(())
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a timeout value and returns it in seconds.
///
/// `settle_secs` may be 0; the other timeouts must be at least 1.
///
/// # Errors
///
/// Returns an error if the value is not an integer in range.
pub fn validate_config_value(key: &str, value: &str) -> Result<u64> {
    let min = u64::from(key != "timeouts.settle_secs");
    match value.trim().parse::<u64>() {
        Ok(secs) if (min..=MAX_TIMEOUT_SECS).contains(&secs) => Ok(secs),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            hint: format!("Expected whole seconds between {min} and {MAX_TIMEOUT_SECS}."),
        }
        .into()),
    }
}

/// Validates a host alias used as a key under `hosts:`.
///
/// # Errors
///
/// Returns an error if the name does not match the allowed pattern.
pub fn validate_host_name(name: &str) -> Result<()> {
    if !HOST_NAME_RE.is_match(name) {
        return Err(ConfigError::InvalidHostName(name.to_string()).into());
    }
    Ok(())
}
