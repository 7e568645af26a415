//! MySQL / MariaDB client output (`mysql -N -B`), tab separated.

use hostkit_common::{ConfigEntry, DatabaseInfo, UserInfo};

use super::content_lines;

/// Schemas created by the server itself.
pub const SYSTEM_SCHEMAS: &[&str] = &["information_schema", "mysql", "performance_schema", "sys"];

/// Parse `name` or `name\tsize_bytes` rows.
#[must_use]
pub fn parse_databases(text: &str) -> Vec<DatabaseInfo> {
    content_lines(text)
        .filter_map(|line| {
            let mut cols = line.split('\t');
            let name = cols.next()?.trim();
            if name.is_empty() || name == "Database" {
                return None;
            }
            let size_bytes = cols.next().and_then(|s| s.trim().parse::<u64>().ok());
            Some(DatabaseInfo {
                name: name.to_string(),
                size_bytes,
                is_system: SYSTEM_SCHEMAS.contains(&name),
                ..DatabaseInfo::default()
            })
        })
        .collect()
}

/// Parse `User\tHost` rows. A header row is skipped; rows without a host
/// column are ignored.
#[must_use]
pub fn parse_users(text: &str) -> Vec<UserInfo> {
    content_lines(text)
        .filter_map(|line| {
            let (user, host) = line.split_once('\t')?;
            if user == "User" && host == "Host" {
                return None;
            }
            Some(UserInfo {
                name: user.to_string(),
                host: Some(host.trim().to_string()),
                attributes: Vec::new(),
            })
        })
        .collect()
}

/// Parse `SHOW GLOBAL VARIABLES` rows (`name\tvalue`, value may be empty).
#[must_use]
pub fn parse_variables(text: &str) -> Vec<ConfigEntry> {
    content_lines(text)
        .filter_map(|line| {
            let (key, value) = line.split_once('\t').unwrap_or((line, ""));
            let key = key.trim();
            if key.is_empty() || key == "Variable_name" {
                return None;
            }
            Some(ConfigEntry::new(key, value))
        })
        .collect()
}
