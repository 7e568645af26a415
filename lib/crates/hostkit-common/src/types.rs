use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tri-state service status shown by the overview section
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    #[default]
    NotInstalled,
    Running,
    Stopped,
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ServiceStatus::NotInstalled => "not installed",
            ServiceStatus::Running => "running",
            ServiceStatus::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// One configuration key/value pair (Redis `CONFIG GET`, MySQL variables, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
}

impl ConfigEntry {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Raw configuration file loaded from the remote host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigFile {
    pub path: String,
    pub content: String,
}

/// Result of a syntax check such as `nginx -t`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigTest {
    pub ok: bool,
    pub output: String,
}

/// A database (or Redis keyspace) row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DatabaseInfo {
    pub name: String,
    /// On-disk size, when the engine reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    /// Key count (Redis keyspace only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<u64>,
    /// Keys with a TTL (Redis keyspace only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<u64>,
    /// Built-in schema such as `mysql` or `template0`.
    #[serde(default)]
    pub is_system: bool,
}

/// A database or ACL user row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct UserInfo {
    pub name: String,
    /// Host part of a MySQL account (`'user'@'host'`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Engine specific flags: `superuser`, `login`, Redis ACL rules, ...
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
}

/// A web server virtual host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteInfo {
    pub name: String,
    pub enabled: bool,
}

/// Named status metric (`uptime_in_seconds`, `connected_clients`, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Metric {
    pub name: String,
    pub value: String,
}

impl Metric {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Mounted filesystem usage from `df -P`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiskUsage {
    pub filesystem: String,
    pub mount_point: String,
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub available_bytes: u64,
}

/// Host-wide resource usage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SystemStats {
    pub load_average: [f64; 3],
    pub cpu_count: u32,
    pub memory_total_bytes: u64,
    pub memory_used_bytes: u64,
    pub memory_available_bytes: u64,
    pub swap_total_bytes: u64,
    pub swap_used_bytes: u64,
    pub uptime_seconds: u64,
    pub disks: Vec<DiskUsage>,
}

/// Kind of a directory entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Directory,
    Symlink,
    Other,
}

/// One directory entry from a remote listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub kind: FileKind,
    pub size_bytes: u64,
    pub permissions: String,
    pub owner: String,
    pub group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_target: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_status_serializes_snake_case() {
        let json = serde_json::to_string(&ServiceStatus::NotInstalled).unwrap();
        assert_eq!(json, "\"not_installed\"");
    }

    #[test]
    fn service_status_display() {
        assert_eq!(ServiceStatus::Running.to_string(), "running");
        assert_eq!(ServiceStatus::NotInstalled.to_string(), "not installed");
    }

    #[test]
    fn database_info_omits_absent_counters() {
        let db = DatabaseInfo {
            name: "shop".to_string(),
            ..DatabaseInfo::default()
        };
        let json = serde_json::to_string(&db).unwrap();
        assert!(!json.contains("keys"), "unexpected keys field: {json}");
        assert!(!json.contains("size_bytes"), "unexpected size field: {json}");
    }
}
