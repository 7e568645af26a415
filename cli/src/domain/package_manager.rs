//! Package-manager detection and non-interactive command building.
//!
//! Pure functions only — no I/O, no async. Every generated command must run
//! unattended: no prompts, no pagers.

use serde::{Deserialize, Serialize};

use crate::domain::command::shell_quote;

/// Package manager families supported on remote hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManagerKind {
    Apt,
    Dnf,
    Yum,
    Pacman,
    Zypper,
}

impl PackageManagerKind {
    pub const ALL: [PackageManagerKind; 5] = [
        PackageManagerKind::Apt,
        PackageManagerKind::Dnf,
        PackageManagerKind::Yum,
        PackageManagerKind::Pacman,
        PackageManagerKind::Zypper,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PackageManagerKind::Apt => "apt",
            PackageManagerKind::Dnf => "dnf",
            PackageManagerKind::Yum => "yum",
            PackageManagerKind::Pacman => "pacman",
            PackageManagerKind::Zypper => "zypper",
        }
    }
}

impl std::fmt::Display for PackageManagerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distribution ids and the package manager each one uses.
///
/// The short ids come from the product table; the longer spellings are what
/// `/etc/os-release` actually reports for the same distributions.
const DISTRO_TABLE: &[(&str, PackageManagerKind)] = &[
    ("ubuntu", PackageManagerKind::Apt),
    ("debian", PackageManagerKind::Apt),
    ("mint", PackageManagerKind::Apt),
    ("linuxmint", PackageManagerKind::Apt),
    ("pop", PackageManagerKind::Apt),
    ("kali", PackageManagerKind::Apt),
    ("raspbian", PackageManagerKind::Apt),
    ("elementary", PackageManagerKind::Apt),
    ("fedora", PackageManagerKind::Dnf),
    ("rhel", PackageManagerKind::Dnf),
    ("alma", PackageManagerKind::Dnf),
    ("almalinux", PackageManagerKind::Dnf),
    ("rocky", PackageManagerKind::Dnf),
    ("centos", PackageManagerKind::Yum),
    ("arch", PackageManagerKind::Pacman),
    ("manjaro", PackageManagerKind::Pacman),
    ("sles", PackageManagerKind::Zypper),
];

/// Map an os-release `ID` to its package manager.
///
/// Matching is case-insensitive. Any `opensuse*` id maps to zypper.
/// Unrecognized ids fall back to apt; callers that care should check
/// [`is_known_distro`] and warn.
#[must_use]
pub fn detect(os_id: &str) -> PackageManagerKind {
    lookup(os_id).unwrap_or(PackageManagerKind::Apt)
}

/// Whether `os_id` appears in the distribution table.
#[must_use]
pub fn is_known_distro(os_id: &str) -> bool {
    lookup(os_id).is_some()
}

fn lookup(os_id: &str) -> Option<PackageManagerKind> {
    let id = os_id.trim().to_ascii_lowercase();
    if id.starts_with("opensuse") {
        return Some(PackageManagerKind::Zypper);
    }
    DISTRO_TABLE
        .iter()
        .find(|(name, _)| *name == id)
        .map(|(_, kind)| *kind)
}

/// Install `packages` without prompting.
///
/// With `with_update`, apt and dnf/yum first refresh their metadata; the
/// refresh is joined with `|| true` so a flaky mirror does not abort the
/// install. Returns an empty string when `packages` is empty.
#[must_use]
pub fn install_command(packages: &[&str], kind: PackageManagerKind, with_update: bool) -> String {
    if packages.is_empty() {
        return String::new();
    }
    let pkgs = packages.join(" ");
    match kind {
        PackageManagerKind::Apt => {
            let prefix = if with_update {
                "sudo apt-get update || true && "
            } else {
                ""
            };
            format!("{prefix}sudo apt-get install -y {pkgs}")
        }
        PackageManagerKind::Dnf | PackageManagerKind::Yum => {
            let tool = kind.as_str();
            let prefix = if with_update {
                format!("sudo {tool} makecache -q || true && ")
            } else {
                String::new()
            };
            format!("{prefix}sudo {tool} install -y -q {pkgs}")
        }
        PackageManagerKind::Pacman => format!("sudo pacman -S --noconfirm --needed {pkgs}"),
        PackageManagerKind::Zypper => format!("sudo zypper --non-interactive install {pkgs}"),
    }
}

/// Refresh the package index.
#[must_use]
pub fn update_command(kind: PackageManagerKind) -> String {
    match kind {
        PackageManagerKind::Apt => "sudo apt-get update".to_string(),
        PackageManagerKind::Dnf | PackageManagerKind::Yum => {
            format!("sudo {} makecache -q", kind.as_str())
        }
        PackageManagerKind::Pacman => "sudo pacman -Sy --noconfirm".to_string(),
        PackageManagerKind::Zypper => "sudo zypper --non-interactive refresh".to_string(),
    }
}

/// Remove `packages`. `purge` also deletes configuration where the package
/// manager distinguishes (apt `purge`, pacman `-Rns`). Returns an empty
/// string when `packages` is empty.
#[must_use]
pub fn remove_command(packages: &[&str], kind: PackageManagerKind, purge: bool) -> String {
    if packages.is_empty() {
        return String::new();
    }
    let pkgs = packages.join(" ");
    match kind {
        PackageManagerKind::Apt => {
            let verb = if purge { "purge" } else { "remove" };
            format!("sudo apt-get {verb} -y {pkgs}")
        }
        PackageManagerKind::Dnf | PackageManagerKind::Yum => {
            format!("sudo {} remove -y -q {pkgs}", kind.as_str())
        }
        PackageManagerKind::Pacman => {
            let flags = if purge { "-Rns" } else { "-R" };
            format!("sudo pacman {flags} --noconfirm {pkgs}")
        }
        PackageManagerKind::Zypper => format!("sudo zypper --non-interactive remove {pkgs}"),
    }
}

/// Query the local package database for installed packages whose name
/// matches the extended regex `pattern`. Non-empty output means a match.
#[must_use]
pub fn package_query_command(kind: PackageManagerKind, pattern: &str) -> String {
    match kind {
        PackageManagerKind::Apt => format!(
            "dpkg -l 2>/dev/null | grep -E {}",
            shell_quote(&format!("^ii[[:space:]]+({pattern})"))
        ),
        PackageManagerKind::Dnf | PackageManagerKind::Yum | PackageManagerKind::Zypper => format!(
            "rpm -qa 2>/dev/null | grep -E {}",
            shell_quote(&format!("^({pattern})"))
        ),
        PackageManagerKind::Pacman => format!(
            "pacman -Q 2>/dev/null | grep -E {}",
            shell_quote(&format!("^({pattern}) "))
        ),
    }
}

// ── /etc/os-release ──────────────────────────────────────────────────────────

/// Command that prints the host's os-release file.
pub const OS_RELEASE_COMMAND: &str = "cat /etc/os-release 2>/dev/null";

/// Parsed subset of `/etc/os-release`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OsRelease {
    pub id: String,
    pub id_like: Vec<String>,
    pub version_id: Option<String>,
    pub pretty_name: Option<String>,
}

/// Parse `KEY=value` lines, stripping optional single or double quotes.
#[must_use]
pub fn parse_os_release(text: &str) -> OsRelease {
    let mut release = OsRelease::default();
    for line in text.lines() {
        let Some((key, raw)) = line.trim().split_once('=') else {
            continue;
        };
        let value = raw.trim().trim_matches('"').trim_matches('\'').to_string();
        match key.trim() {
            "ID" => release.id = value.to_ascii_lowercase(),
            "ID_LIKE" => {
                release.id_like = value
                    .split_whitespace()
                    .map(str::to_ascii_lowercase)
                    .collect();
            }
            "VERSION_ID" => release.version_id = Some(value),
            "PRETTY_NAME" => release.pretty_name = Some(value),
            _ => {}
        }
    }
    release
}
