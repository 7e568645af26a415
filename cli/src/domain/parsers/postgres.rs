//! `psql -A -t -F '|'` output.

use hostkit_common::{ConfigEntry, DatabaseInfo, UserInfo};
use semver::Version;

use super::content_lines;

/// Template databases created by `initdb`.
pub const SYSTEM_DATABASES: &[&str] = &["template0", "template1"];

/// Parse `datname|size_bytes` rows.
#[must_use]
pub fn parse_databases(text: &str) -> Vec<DatabaseInfo> {
    content_lines(text)
        .filter_map(|line| {
            let mut cols = line.split('|');
            let name = cols.next()?.trim();
            if name.is_empty() {
                return None;
            }
            Some(DatabaseInfo {
                name: name.to_string(),
                size_bytes: cols.next().and_then(|s| s.trim().parse().ok()),
                is_system: SYSTEM_DATABASES.contains(&name),
                ..DatabaseInfo::default()
            })
        })
        .collect()
}

/// Parse `rolname|rolsuper|rolcanlogin|rolcreatedb` rows (`t`/`f` flags).
#[must_use]
pub fn parse_roles(text: &str) -> Vec<UserInfo> {
    const FLAGS: [&str; 3] = ["superuser", "login", "createdb"];
    content_lines(text)
        .filter_map(|line| {
            let cols: Vec<&str> = line.split('|').map(str::trim).collect();
            let name = *cols.first()?;
            if name.is_empty() || cols.len() < 2 {
                return None;
            }
            let attributes = cols[1..]
                .iter()
                .zip(FLAGS)
                .filter(|(value, _)| **value == "t")
                .map(|(_, flag)| flag.to_string())
                .collect();
            Some(UserInfo {
                name: name.to_string(),
                host: None,
                attributes,
            })
        })
        .collect()
}

/// Parse `name|setting` rows from `pg_settings`.
#[must_use]
pub fn parse_settings(text: &str) -> Vec<ConfigEntry> {
    content_lines(text)
        .filter_map(|line| {
            let (key, value) = line.split_once('|')?;
            let key = key.trim();
            (!key.is_empty()).then(|| ConfigEntry::new(key, value.trim()))
        })
        .collect()
}

/// Extract installed major versions from directory listings such as
/// `/usr/lib/postgresql/16` or `/usr/pgsql-15`. Sorted ascending, deduplicated.
#[must_use]
pub fn parse_installed_versions(text: &str) -> Vec<String> {
    let mut versions: Vec<(Version, String)> = content_lines(text)
        .filter_map(|line| {
            let leaf = line.trim().trim_end_matches('/').rsplit('/').next()?;
            let raw = leaf.trim_start_matches("pgsql-");
            lenient_version(raw).map(|v| (v, raw.to_string()))
        })
        .collect();
    versions.sort_by(|a, b| a.0.cmp(&b.0));
    versions.dedup_by(|a, b| a.0 == b.0);
    versions.into_iter().map(|(_, raw)| raw).collect()
}

/// `16` → 16.0.0, `9.6` → 9.6.0.
fn lenient_version(raw: &str) -> Option<Version> {
    let mut parts = raw.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next().map_or(Some(0), |p| p.parse().ok())?;
    let patch = parts.next().map_or(Some(0), |p| p.parse().ok())?;
    Some(Version::new(major, minor, patch))
}
