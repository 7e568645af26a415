//! Per-session application state read by renderers.
//!
//! Every field belongs to exactly one [`StateField`]. Section loads write into
//! a scratch copy and only the fields owned by that section are merged back,
//! see [`ApplicationState::merge_from`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    ConfigEntry, ConfigFile, ConfigTest, DatabaseInfo, FileEntry, Metric, ServiceStatus, SiteInfo,
    SystemStats, UserInfo,
};

/// Named state fields, used as the ownership table for section providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateField {
    Status,
    Version,
    ServiceName,
    Flavor,
    InstalledVersions,
    ConfigEntries,
    ConfigFile,
    ConfigTest,
    Databases,
    Users,
    LogText,
    Sites,
    Metrics,
    SystemStats,
    Files,
}

impl StateField {
    pub const ALL: [StateField; 15] = [
        StateField::Status,
        StateField::Version,
        StateField::ServiceName,
        StateField::Flavor,
        StateField::InstalledVersions,
        StateField::ConfigEntries,
        StateField::ConfigFile,
        StateField::ConfigTest,
        StateField::Databases,
        StateField::Users,
        StateField::LogText,
        StateField::Sites,
        StateField::Metrics,
        StateField::SystemStats,
        StateField::Files,
    ];
}

/// Mutable result bag for one open administration view
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ApplicationState {
    pub status: ServiceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Resolved systemd unit, e.g. `mariadb` for a MariaDB host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    /// Alternate flavor name (`MariaDB`, `Valkey`) when detected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
    #[serde(default)]
    pub installed_versions: Vec<String>,
    #[serde(default)]
    pub config_entries: Vec<ConfigEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_file: Option<ConfigFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_test: Option<ConfigTest>,
    #[serde(default)]
    pub databases: Vec<DatabaseInfo>,
    #[serde(default)]
    pub users: Vec<UserInfo>,
    #[serde(default)]
    pub log_text: String,
    #[serde(default)]
    pub sites: Vec<SiteInfo>,
    #[serde(default)]
    pub metrics: Vec<Metric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_stats: Option<SystemStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_path: Option<String>,
    #[serde(default)]
    pub files: Vec<FileEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_message: Option<String>,

    /// Section id of the last committed load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_section: Option<String>,
    /// Generation token of the last committed load.
    #[serde(default)]
    pub generation: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<DateTime<Utc>>,
}

impl ApplicationState {
    /// Return every field to its default. The state object itself is reused.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Clear both message fields before a new load or action.
    pub fn clear_messages(&mut self) {
        self.error_message = None;
        self.success_message = None;
    }

    /// Record a soft failure for the renderer's error banner.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.success_message = None;
        self.error_message = Some(message.into());
    }

    /// Record a successful action for the renderer's banner.
    pub fn set_success(&mut self, message: impl Into<String>) {
        self.error_message = None;
        self.success_message = Some(message.into());
    }

    /// Move `fields` out of `scratch` into `self`, together with the message
    /// fields. Fields not listed keep their current value.
    pub fn merge_from(&mut self, mut scratch: ApplicationState, fields: &[StateField]) {
        for field in fields {
            self.take_field(&mut scratch, *field);
        }
        self.error_message = scratch.error_message.take();
        self.success_message = scratch.success_message.take();
    }

    fn take_field(&mut self, from: &mut ApplicationState, field: StateField) {
        use std::mem::take;
        match field {
            StateField::Status => self.status = from.status,
            StateField::Version => self.version = take(&mut from.version),
            StateField::ServiceName => self.service_name = take(&mut from.service_name),
            StateField::Flavor => self.flavor = take(&mut from.flavor),
            StateField::InstalledVersions => {
                self.installed_versions = take(&mut from.installed_versions);
            }
            StateField::ConfigEntries => self.config_entries = take(&mut from.config_entries),
            StateField::ConfigFile => self.config_file = take(&mut from.config_file),
            StateField::ConfigTest => self.config_test = take(&mut from.config_test),
            StateField::Databases => self.databases = take(&mut from.databases),
            StateField::Users => self.users = take(&mut from.users),
            StateField::LogText => self.log_text = take(&mut from.log_text),
            StateField::Sites => self.sites = take(&mut from.sites),
            StateField::Metrics => self.metrics = take(&mut from.metrics),
            StateField::SystemStats => self.system_stats = take(&mut from.system_stats),
            StateField::Files => {
                self.files = take(&mut from.files);
                self.current_path = take(&mut from.current_path);
            }
        }
    }
}
