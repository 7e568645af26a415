//! Section renderers — one arm per provider type.
//!
//! [`render_section`] matches [`SectionProviderType`] exhaustively, so a new
//! provider does not compile until it can be displayed. Renderers only read
//! the fields their provider owns, plus the message banner.

use hostkit_common::{
    ApplicationState, ConfigTest, DatabaseInfo, FileEntry, FileKind, ServiceStatus, SystemStats,
};
use owo_colors::OwoColorize as _;

use crate::domain::SectionProviderType;
use crate::output::Styles;

/// Render the success or error banner, if any.
#[must_use]
pub fn render_banner(styles: &Styles, state: &ApplicationState) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(error) = &state.error_message {
        lines.push(format!("{} {error}", "✗".style(styles.error)));
    }
    if let Some(success) = &state.success_message {
        lines.push(format!("{} {success}", "✓".style(styles.success)));
    }
    lines
}

/// Render the body of one section.
#[must_use]
pub fn render_section(
    styles: &Styles,
    provider: SectionProviderType,
    state: &ApplicationState,
) -> Vec<String> {
    match provider {
        SectionProviderType::Overview => overview(styles, state),
        SectionProviderType::Configuration => key_values(
            styles,
            state.config_entries.iter().map(|e| (e.key.as_str(), e.value.as_str())),
            "No settings reported.",
        ),
        SectionProviderType::ConfigFile => config_file(styles, state),
        SectionProviderType::Databases => databases(styles, &state.databases),
        SectionProviderType::Users => users(styles, state),
        SectionProviderType::Logs => logs(state),
        SectionProviderType::Sites => sites(styles, state),
        SectionProviderType::Versions => versions(state),
        SectionProviderType::SystemStats => match &state.system_stats {
            Some(stats) => system_stats(styles, stats),
            None => vec!["No resource data.".to_string()],
        },
        SectionProviderType::Files => files(styles, state),
    }
}

fn overview(styles: &Styles, state: &ApplicationState) -> Vec<String> {
    let status = match state.status {
        ServiceStatus::Running => state.status.style(styles.success).to_string(),
        ServiceStatus::Stopped => state.status.style(styles.warning).to_string(),
        ServiceStatus::NotInstalled => state.status.style(styles.dim).to_string(),
    };
    let mut rows = vec![("Status".to_string(), status)];
    if let Some(flavor) = &state.flavor {
        rows.push(("Flavor".to_string(), flavor.clone()));
    }
    if let Some(version) = &state.version {
        rows.push(("Version".to_string(), version.clone()));
    }
    if let Some(unit) = &state.service_name {
        rows.push(("Service".to_string(), unit.clone()));
    }
    for metric in &state.metrics {
        rows.push((metric.name.clone(), metric.value.clone()));
    }
    let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    rows.into_iter()
        .map(|(k, v)| format!("{}  {v}", format!("{k:<width$}").style(styles.dim)))
        .collect()
}

fn key_values<'a>(
    styles: &Styles,
    entries: impl Iterator<Item = (&'a str, &'a str)>,
    empty: &str,
) -> Vec<String> {
    let entries: Vec<_> = entries.collect();
    if entries.is_empty() {
        return vec![empty.to_string()];
    }
    let width = entries.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    entries
        .into_iter()
        .map(|(k, v)| format!("{}  {v}", format!("{k:<width$}").style(styles.dim)))
        .collect()
}

fn config_file(styles: &Styles, state: &ApplicationState) -> Vec<String> {
    let mut lines = Vec::new();
    match &state.config_test {
        Some(ConfigTest { ok: true, .. }) => {
            lines.push(format!("{} Syntax OK", "✓".style(styles.success)));
        }
        Some(ConfigTest { ok: false, output }) => {
            lines.push(format!("{} Syntax check failed", "✗".style(styles.error)));
            lines.extend(output.lines().map(|l| format!("  {l}")));
        }
        None => {}
    }
    match &state.config_file {
        Some(file) => {
            lines.push(file.path.style(styles.bold).to_string());
            lines.extend(file.content.lines().map(str::to_string));
        }
        None => lines.push("No configuration file found.".to_string()),
    }
    lines
}

fn databases(styles: &Styles, databases: &[DatabaseInfo]) -> Vec<String> {
    if databases.is_empty() {
        return vec!["No databases.".to_string()];
    }
    let keyspace = databases.iter().any(|d| d.keys.is_some());
    let rows: Vec<Vec<String>> = databases
        .iter()
        .map(|db| {
            let mut name = db.name.clone();
            if db.is_system {
                name.push_str(" (system)");
            }
            if keyspace {
                vec![
                    name,
                    db.keys.map(|k| k.to_string()).unwrap_or_default(),
                    db.expires.map(|e| e.to_string()).unwrap_or_default(),
                ]
            } else {
                vec![name, db.size_bytes.map(format_bytes).unwrap_or_default()]
            }
        })
        .collect();
    if keyspace {
        table(styles, &["DATABASE", "KEYS", "EXPIRES"], &rows)
    } else {
        table(styles, &["DATABASE", "SIZE"], &rows)
    }
}

fn users(styles: &Styles, state: &ApplicationState) -> Vec<String> {
    if state.users.is_empty() {
        return vec!["No users.".to_string()];
    }
    let rows: Vec<Vec<String>> = state
        .users
        .iter()
        .map(|u| {
            vec![
                u.name.clone(),
                u.host.clone().unwrap_or_default(),
                u.attributes.join(" "),
            ]
        })
        .collect();
    table(styles, &["USER", "HOST", "ATTRIBUTES"], &rows)
}

fn logs(state: &ApplicationState) -> Vec<String> {
    if state.log_text.trim().is_empty() {
        return vec!["No log entries.".to_string()];
    }
    state.log_text.lines().map(str::to_string).collect()
}

fn sites(styles: &Styles, state: &ApplicationState) -> Vec<String> {
    if state.sites.is_empty() {
        return vec!["No sites configured.".to_string()];
    }
    let width = state.sites.iter().map(|s| s.name.len()).max().unwrap_or(0);
    state
        .sites
        .iter()
        .map(|site| {
            let marker = if site.enabled {
                "enabled".style(styles.success).to_string()
            } else {
                "disabled".style(styles.dim).to_string()
            };
            format!("{:<width$}  {marker}", site.name)
        })
        .collect()
}

fn versions(state: &ApplicationState) -> Vec<String> {
    if state.installed_versions.is_empty() {
        return vec!["No installed versions found.".to_string()];
    }
    state.installed_versions.iter().map(|v| format!("• {v}")).collect()
}

fn system_stats(styles: &Styles, stats: &SystemStats) -> Vec<String> {
    let [one, five, fifteen] = stats.load_average;
    let mut lines = key_values(
        styles,
        [
            ("Load", format!("{one:.2} {five:.2} {fifteen:.2}").as_str()),
            ("CPUs", stats.cpu_count.to_string().as_str()),
            (
                "Memory",
                usage(stats.memory_used_bytes, stats.memory_total_bytes).as_str(),
            ),
            (
                "Swap",
                usage(stats.swap_used_bytes, stats.swap_total_bytes).as_str(),
            ),
            ("Uptime", format_uptime(stats.uptime_seconds).as_str()),
        ]
        .iter()
        .map(|(k, v)| (*k, *v)),
        "",
    );
    if !stats.disks.is_empty() {
        lines.push(String::new());
        let rows: Vec<Vec<String>> = stats
            .disks
            .iter()
            .map(|d| {
                vec![
                    d.mount_point.clone(),
                    d.filesystem.clone(),
                    usage(d.used_bytes, d.total_bytes),
                    format_bytes(d.available_bytes),
                ]
            })
            .collect();
        lines.extend(table(styles, &["MOUNT", "FILESYSTEM", "USED", "FREE"], &rows));
    }
    lines
}

fn files(styles: &Styles, state: &ApplicationState) -> Vec<String> {
    let mut lines = vec![
        state
            .current_path
            .as_deref()
            .unwrap_or("/")
            .style(styles.bold)
            .to_string(),
    ];
    if state.files.is_empty() {
        lines.push("Empty directory.".to_string());
        return lines;
    }
    let rows: Vec<Vec<String>> = state.files.iter().map(file_row).collect();
    lines.extend(table(
        styles,
        &["MODE", "OWNER", "GROUP", "SIZE", "MODIFIED", "NAME"],
        &rows,
    ));
    lines
}

fn file_row(entry: &FileEntry) -> Vec<String> {
    let name = match (&entry.kind, &entry.link_target) {
        (FileKind::Directory, _) => format!("{}/", entry.name),
        (FileKind::Symlink, Some(target)) => format!("{} -> {target}", entry.name),
        _ => entry.name.clone(),
    };
    vec![
        entry.permissions.clone(),
        entry.owner.clone(),
        entry.group.clone(),
        format_bytes(entry.size_bytes),
        entry
            .modified
            .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default(),
        name,
    ]
}

/// Left-aligned table with a styled heading row.
fn table(styles: &Styles, headers: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    let render = |cells: Vec<String>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };
    let mut lines = vec![
        render(headers.iter().map(ToString::to_string).collect())
            .style(styles.column)
            .to_string(),
    ];
    lines.extend(rows.iter().map(|row| render(row.clone())));
    lines
}

fn usage(used: u64, total: u64) -> String {
    if total == 0 {
        return "n/a".to_string();
    }
    #[allow(clippy::cast_precision_loss)]
    let percent = used as f64 / total as f64 * 100.0;
    format!("{} / {} ({percent:.0}%)", format_bytes(used), format_bytes(total))
}

// ── Display helpers ───────────────────────────────────────────────────────────

#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[must_use]
pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3600;
    let minutes = (seconds % 3600) / 60;
    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use hostkit_common::{ConfigEntry, ConfigFile, Metric, SiteInfo, UserInfo};

    use super::*;

    fn plain() -> Styles {
        Styles::default()
    }

    #[test]
    fn every_provider_renders_an_empty_state() {
        let state = ApplicationState::default();
        for provider in SectionProviderType::ALL {
            let lines = render_section(&plain(), provider, &state);
            assert!(!lines.is_empty(), "{provider} rendered nothing");
        }
    }

    #[test]
    fn overview_lists_flavor_and_metrics() {
        let state = ApplicationState {
            status: ServiceStatus::Running,
            flavor: Some("MariaDB".to_string()),
            version: Some("10.11.6".to_string()),
            metrics: vec![Metric::new("detected_by", "binary")],
            ..ApplicationState::default()
        };
        let lines = render_section(&plain(), SectionProviderType::Overview, &state);
        assert_eq!(lines[0], "Status       running");
        assert!(lines.iter().any(|l| l.ends_with("MariaDB")));
        assert!(lines.iter().any(|l| l.starts_with("detected_by") && l.ends_with("binary")));
    }

    #[test]
    fn configuration_aligns_keys() {
        let state = ApplicationState {
            config_entries: vec![
                ConfigEntry::new("maxmemory", "0"),
                ConfigEntry::new("appendonly", "no"),
            ],
            ..ApplicationState::default()
        };
        let lines = render_section(&plain(), SectionProviderType::Configuration, &state);
        assert_eq!(lines, vec!["maxmemory   0", "appendonly  no"]);
    }

    #[test]
    fn failed_syntax_check_is_shown_before_content() {
        let state = ApplicationState {
            config_file: Some(ConfigFile {
                path: "/etc/nginx/nginx.conf".to_string(),
                content: "events {}".to_string(),
            }),
            config_test: Some(ConfigTest {
                ok: false,
                output: "unexpected \"}\"".to_string(),
            }),
            ..ApplicationState::default()
        };
        let lines = render_section(&plain(), SectionProviderType::ConfigFile, &state);
        assert!(lines[0].contains("Syntax check failed"));
        assert_eq!(lines.last().map(String::as_str), Some("events {}"));
    }

    #[test]
    fn keyspace_uses_key_columns() {
        let state = ApplicationState {
            databases: vec![DatabaseInfo {
                name: "db0".to_string(),
                keys: Some(12),
                expires: Some(3),
                ..DatabaseInfo::default()
            }],
            ..ApplicationState::default()
        };
        let lines = render_section(&plain(), SectionProviderType::Databases, &state);
        assert_eq!(lines[0], "DATABASE  KEYS  EXPIRES");
        assert_eq!(lines[1], "db0       12    3");
    }

    #[test]
    fn users_show_host_and_attributes() {
        let state = ApplicationState {
            users: vec![UserInfo {
                name: "app".to_string(),
                host: Some("localhost".to_string()),
                attributes: vec!["login".to_string()],
            }],
            ..ApplicationState::default()
        };
        let lines = render_section(&plain(), SectionProviderType::Users, &state);
        assert_eq!(lines[1], "app   localhost  login");
    }

    #[test]
    fn sites_mark_enabled() {
        let state = ApplicationState {
            sites: vec![
                SiteInfo {
                    name: "default".to_string(),
                    enabled: true,
                },
                SiteInfo {
                    name: "shop".to_string(),
                    enabled: false,
                },
            ],
            ..ApplicationState::default()
        };
        let lines = render_section(&plain(), SectionProviderType::Sites, &state);
        assert_eq!(lines, vec!["default  enabled", "shop     disabled"]);
    }

    #[test]
    fn banner_shows_latest_message() {
        let mut state = ApplicationState::default();
        assert!(render_banner(&plain(), &state).is_empty());
        state.set_error("Nginx is not running.");
        assert_eq!(render_banner(&plain(), &state), vec!["✗ Nginx is not running."]);
    }

    #[test]
    fn bytes_are_humanized() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KiB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0 GiB");
    }

    #[test]
    fn uptime_formats() {
        assert_eq!(format_uptime(300), "5m");
        assert_eq!(format_uptime(9240), "2h 34m");
        assert_eq!(format_uptime(90_000), "1d 1h 0m");
    }
}
