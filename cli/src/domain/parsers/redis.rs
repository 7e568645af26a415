//! `redis-cli` raw output.

use hostkit_common::{ConfigEntry, DatabaseInfo, Metric, UserInfo};

use super::content_lines;

/// Parse `INFO keyspace` lines: `db0:keys=12,expires=3,avg_ttl=0`.
#[must_use]
pub fn parse_keyspace(text: &str) -> Vec<DatabaseInfo> {
    content_lines(text)
        .filter_map(|line| {
            let (name, stats) = line.trim().split_once(':')?;
            if !name.starts_with("db") || name[2..].parse::<u32>().is_err() {
                return None;
            }
            let mut db = DatabaseInfo {
                name: name.to_string(),
                ..DatabaseInfo::default()
            };
            for pair in stats.split(',') {
                match pair.split_once('=') {
                    Some(("keys", v)) => db.keys = v.trim().parse().ok(),
                    Some(("expires", v)) => db.expires = v.trim().parse().ok(),
                    _ => {}
                }
            }
            Some(db)
        })
        .collect()
}

/// Parse `CONFIG GET` output: alternating key and value lines.
///
/// Empty values are printed as empty lines, so blank lines are kept. A
/// trailing key without a value is dropped.
#[must_use]
pub fn parse_config_get(text: &str) -> Vec<ConfigEntry> {
    let lines: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();
    lines
        .chunks_exact(2)
        .filter(|pair| !pair[0].trim().is_empty())
        .map(|pair| ConfigEntry::new(pair[0].trim(), pair[1]))
        .collect()
}

/// Parse `ACL LIST` rules: `user <name> <rules...>`.
#[must_use]
pub fn parse_acl_list(text: &str) -> Vec<UserInfo> {
    content_lines(text)
        .filter_map(|line| {
            let mut tokens = line.split_whitespace();
            if tokens.next()? != "user" {
                return None;
            }
            let name = tokens.next()?.to_string();
            Some(UserInfo {
                name,
                host: None,
                attributes: tokens.map(str::to_string).collect(),
            })
        })
        .collect()
}

/// Parse `INFO` sections into `key:value` metrics, skipping `# Section`
/// headers.
#[must_use]
pub fn parse_info(text: &str) -> Vec<Metric> {
    content_lines(text)
        .filter(|l| !l.starts_with('#'))
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            Some(Metric::new(key.trim(), value.trim()))
        })
        .collect()
}
