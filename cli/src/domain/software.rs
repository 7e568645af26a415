//! Static knowledge about the software hostkit can administer.
//!
//! Binaries, unit names, well-known paths and package names differ between
//! distributions; each [`SoftwareSpec`] lists every candidate, most common
//! first.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::package_manager::PackageManagerKind;

/// Software with a dedicated detector and service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoftwareId {
    Mysql,
    Postgresql,
    Redis,
    Nginx,
    Apache,
}

impl SoftwareId {
    pub const ALL: [SoftwareId; 5] = [
        SoftwareId::Mysql,
        SoftwareId::Postgresql,
        SoftwareId::Redis,
        SoftwareId::Nginx,
        SoftwareId::Apache,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SoftwareId::Mysql => "mysql",
            SoftwareId::Postgresql => "postgresql",
            SoftwareId::Redis => "redis",
            SoftwareId::Nginx => "nginx",
            SoftwareId::Apache => "apache",
        }
    }

    #[must_use]
    pub fn spec(self) -> &'static SoftwareSpec {
        match self {
            SoftwareId::Mysql => &MYSQL,
            SoftwareId::Postgresql => &POSTGRESQL,
            SoftwareId::Redis => &REDIS,
            SoftwareId::Nginx => &NGINX,
            SoftwareId::Apache => &APACHE,
        }
    }

    /// Distribution package names to install for this software.
    #[must_use]
    pub fn packages(self, kind: PackageManagerKind) -> &'static [&'static str] {
        use PackageManagerKind::{Apt, Dnf, Pacman, Yum, Zypper};
        match (self, kind) {
            (SoftwareId::Mysql, Apt) => &["mysql-server"],
            (SoftwareId::Mysql, Dnf | Yum) => &["mysql-server"],
            (SoftwareId::Mysql, Pacman | Zypper) => &["mariadb"],
            (SoftwareId::Postgresql, Apt) => &["postgresql", "postgresql-contrib"],
            (SoftwareId::Postgresql, Dnf | Yum) => &["postgresql-server", "postgresql-contrib"],
            (SoftwareId::Postgresql, Pacman) => &["postgresql"],
            (SoftwareId::Postgresql, Zypper) => &["postgresql-server"],
            (SoftwareId::Redis, Apt) => &["redis-server"],
            (SoftwareId::Redis, Dnf | Yum | Pacman | Zypper) => &["redis"],
            (SoftwareId::Nginx, _) => &["nginx"],
            (SoftwareId::Apache, Apt | Zypper) => &["apache2"],
            (SoftwareId::Apache, Dnf | Yum) => &["httpd"],
            (SoftwareId::Apache, Pacman) => &["apache"],
        }
    }

    /// Extra commands needed after the package install before the service
    /// can start.
    #[must_use]
    pub fn post_install_commands(self, kind: PackageManagerKind) -> Vec<String> {
        match (self, kind) {
            (SoftwareId::Postgresql, PackageManagerKind::Dnf | PackageManagerKind::Yum) => {
                vec!["sudo postgresql-setup --initdb".to_string()]
            }
            (SoftwareId::Postgresql, PackageManagerKind::Pacman) => vec![
                "sudo -u postgres initdb -D /var/lib/postgres/data".to_string(),
            ],
            (SoftwareId::Mysql, PackageManagerKind::Pacman) => vec![
                "sudo mariadb-install-db --user=mysql --basedir=/usr --datadir=/var/lib/mysql"
                    .to_string(),
            ],
            _ => Vec::new(),
        }
    }
}

impl std::fmt::Display for SoftwareId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SoftwareId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SoftwareId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown software '{s}'"))
    }
}

/// A drop-in replacement distributed under a different name.
#[derive(Debug)]
pub struct AlternateFlavor {
    /// Case-insensitive substring of the version output identifying it.
    pub marker: &'static str,
    pub name: &'static str,
}

/// Probe and control metadata for one piece of software.
#[derive(Debug)]
pub struct SoftwareSpec {
    pub id: SoftwareId,
    pub display_name: &'static str,
    pub binaries: &'static [&'static str],
    /// Candidate systemd units, probed in order.
    pub units: &'static [&'static str],
    /// Well-known paths whose existence implies an install.
    pub paths: &'static [&'static str],
    /// Extended regex alternation matched against package database entries.
    pub package_pattern: &'static str,
    pub version_command: &'static str,
    pub alternate_flavor: Option<AlternateFlavor>,
    /// Main configuration file candidates.
    pub config_paths: &'static [&'static str],
}

static MYSQL: SoftwareSpec = SoftwareSpec {
    id: SoftwareId::Mysql,
    display_name: "MySQL",
    binaries: &["mysqld", "mysql", "mariadb"],
    units: &["mysql", "mariadb", "mysqld"],
    paths: &["/etc/mysql/my.cnf", "/etc/my.cnf", "/var/lib/mysql"],
    package_pattern: "mysql-server|mariadb-server|mariadb",
    version_command: "mysql --version 2>/dev/null || mariadb --version 2>/dev/null",
    alternate_flavor: Some(AlternateFlavor {
        marker: "mariadb",
        name: "MariaDB",
    }),
    config_paths: &["/etc/mysql/my.cnf", "/etc/my.cnf"],
};

static POSTGRESQL: SoftwareSpec = SoftwareSpec {
    id: SoftwareId::Postgresql,
    display_name: "PostgreSQL",
    binaries: &["psql", "postgres"],
    units: &["postgresql"],
    paths: &["/etc/postgresql", "/var/lib/pgsql", "/var/lib/postgres"],
    package_pattern: "postgresql|postgresql-server",
    version_command: "psql --version 2>/dev/null",
    alternate_flavor: None,
    config_paths: &[
        "/etc/postgresql/*/main/postgresql.conf",
        "/var/lib/pgsql/data/postgresql.conf",
        "/var/lib/postgres/data/postgresql.conf",
    ],
};

static REDIS: SoftwareSpec = SoftwareSpec {
    id: SoftwareId::Redis,
    display_name: "Redis",
    binaries: &["redis-server", "redis-cli"],
    units: &["redis-server", "redis", "valkey"],
    paths: &["/etc/redis/redis.conf", "/etc/redis.conf"],
    package_pattern: "redis-server|redis|valkey",
    version_command: "redis-server --version 2>/dev/null",
    alternate_flavor: Some(AlternateFlavor {
        marker: "valkey",
        name: "Valkey",
    }),
    config_paths: &["/etc/redis/redis.conf", "/etc/redis.conf"],
};

static NGINX: SoftwareSpec = SoftwareSpec {
    id: SoftwareId::Nginx,
    display_name: "Nginx",
    binaries: &["nginx"],
    units: &["nginx"],
    paths: &["/etc/nginx/nginx.conf"],
    package_pattern: "nginx",
    version_command: "nginx -v 2>&1",
    alternate_flavor: None,
    config_paths: &["/etc/nginx/nginx.conf"],
};

static APACHE: SoftwareSpec = SoftwareSpec {
    id: SoftwareId::Apache,
    display_name: "Apache",
    binaries: &["apache2", "httpd"],
    units: &["apache2", "httpd"],
    paths: &["/etc/apache2/apache2.conf", "/etc/httpd/conf/httpd.conf"],
    package_pattern: "apache2|httpd|apache",
    version_command: "apache2 -v 2>/dev/null || httpd -v 2>/dev/null",
    alternate_flavor: None,
    config_paths: &["/etc/apache2/apache2.conf", "/etc/httpd/conf/httpd.conf"],
};

/// Canonical unit and flavor resolved for one software on one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDescriptor {
    pub canonical_name: String,
    pub is_alternate_flavor: bool,
}

impl SoftwareSpec {
    /// Whether `version_output` identifies the alternate flavor.
    #[must_use]
    pub fn is_alternate_flavor(&self, version_output: &str) -> bool {
        self.alternate_flavor.as_ref().is_some_and(|flavor| {
            version_output
                .to_ascii_lowercase()
                .contains(&flavor.marker.to_ascii_lowercase())
        })
    }

    /// Descriptor used when no candidate unit could be confirmed.
    #[must_use]
    pub fn fallback_descriptor(&self, is_alternate_flavor: bool) -> ServiceDescriptor {
        ServiceDescriptor {
            canonical_name: self.units[0].to_string(),
            is_alternate_flavor,
        }
    }

    /// Human name, taking the resolved flavor into account.
    #[must_use]
    pub fn flavor_name(&self, descriptor: &ServiceDescriptor) -> &'static str {
        match (&self.alternate_flavor, descriptor.is_alternate_flavor) {
            (Some(flavor), true) => flavor.name,
            _ => self.display_name,
        }
    }
}

#[allow(clippy::expect_used)] // Patterns are compile-time constants
static DISTRIB_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Distrib\s+(\d+\.\d+(?:\.\d+)?)").expect("valid regex"));

#[allow(clippy::expect_used)]
static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+(?:\.\d+)?)").expect("valid regex"));

/// Pull the first dotted version number out of a `--version` banner.
///
/// MariaDB's client reports its own protocol version before `Distrib`, so a
/// `Distrib` version wins when present.
#[must_use]
pub fn extract_version(output: &str) -> Option<String> {
    DISTRIB_VERSION_RE
        .captures(output)
        .or_else(|| VERSION_RE.captures(output))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
