//! Capability registry metadata: application and section definitions.
//!
//! The catalog is static configuration embedded in the binary and parsed
//! once at startup. Definitions are immutable afterwards; identity is by id.

use std::collections::{BTreeSet, HashSet};

use anyhow::{Context, Result};
use hostkit_common::StateField;
use serde::{Deserialize, Serialize};

use crate::domain::error::AdminError;
use crate::domain::software::SoftwareId;

/// Embedded application catalog.
pub const BUILTIN_CATALOG: &str = include_str!("../../catalog/applications.yaml");

// ── Capabilities ──────────────────────────────────────────────────────────────

/// Feature flags gating which sections and actions an application offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Controllable,
    Configurable,
    HasDatabases,
    HasUsers,
    MultiVersion,
    HasLogs,
    HasSites,
    Browsable,
}

impl Capability {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Controllable => "controllable",
            Capability::Configurable => "configurable",
            Capability::HasDatabases => "has_databases",
            Capability::HasUsers => "has_users",
            Capability::MultiVersion => "multi_version",
            Capability::HasLogs => "has_logs",
            Capability::HasSites => "has_sites",
            Capability::Browsable => "browsable",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Section provider types ────────────────────────────────────────────────────

/// Closed set of section providers.
///
/// Adding a section takes three coordinated changes: a variant here, a
/// provider arm in `application::sections::SectionRegistry::load`, and a
/// renderer arm in `output::sections::render_section`. All three matches are
/// exhaustive so the compiler flags a missing piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionProviderType {
    Overview,
    Configuration,
    ConfigFile,
    Databases,
    Users,
    Logs,
    Sites,
    Versions,
    SystemStats,
    Files,
}

impl SectionProviderType {
    pub const ALL: [SectionProviderType; 10] = [
        SectionProviderType::Overview,
        SectionProviderType::Configuration,
        SectionProviderType::ConfigFile,
        SectionProviderType::Databases,
        SectionProviderType::Users,
        SectionProviderType::Logs,
        SectionProviderType::Sites,
        SectionProviderType::Versions,
        SectionProviderType::SystemStats,
        SectionProviderType::Files,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SectionProviderType::Overview => "overview",
            SectionProviderType::Configuration => "configuration",
            SectionProviderType::ConfigFile => "config_file",
            SectionProviderType::Databases => "databases",
            SectionProviderType::Users => "users",
            SectionProviderType::Logs => "logs",
            SectionProviderType::Sites => "sites",
            SectionProviderType::Versions => "versions",
            SectionProviderType::SystemStats => "system_stats",
            SectionProviderType::Files => "files",
        }
    }

    /// Capability an application must declare to carry this section.
    #[must_use]
    pub fn required_capability(self) -> Option<Capability> {
        match self {
            SectionProviderType::Overview | SectionProviderType::SystemStats => None,
            SectionProviderType::Configuration | SectionProviderType::ConfigFile => {
                Some(Capability::Configurable)
            }
            SectionProviderType::Databases => Some(Capability::HasDatabases),
            SectionProviderType::Users => Some(Capability::HasUsers),
            SectionProviderType::Logs => Some(Capability::HasLogs),
            SectionProviderType::Sites => Some(Capability::HasSites),
            SectionProviderType::Versions => Some(Capability::MultiVersion),
            SectionProviderType::Files => Some(Capability::Browsable),
        }
    }

    /// State fields this provider is allowed to write.
    #[must_use]
    pub fn owned_fields(self) -> &'static [StateField] {
        match self {
            SectionProviderType::Overview => &[
                StateField::Status,
                StateField::Version,
                StateField::ServiceName,
                StateField::Flavor,
                StateField::Metrics,
            ],
            SectionProviderType::Configuration => &[StateField::ConfigEntries],
            SectionProviderType::ConfigFile => &[StateField::ConfigFile, StateField::ConfigTest],
            SectionProviderType::Databases => &[StateField::Databases],
            SectionProviderType::Users => &[StateField::Users],
            SectionProviderType::Logs => &[StateField::LogText],
            SectionProviderType::Sites => &[StateField::Sites],
            SectionProviderType::Versions => &[StateField::InstalledVersions],
            SectionProviderType::SystemStats => &[StateField::SystemStats],
            SectionProviderType::Files => &[StateField::Files],
        }
    }
}

impl std::fmt::Display for SectionProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Definitions ───────────────────────────────────────────────────────────────

/// One administrative section of an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDefinition {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub provider_type: SectionProviderType,
    #[serde(default)]
    pub is_default: bool,
    /// Skip the load with a message when the service is not running.
    #[serde(default)]
    pub requires_running: bool,
    pub order: i32,
}

/// Application grouping used by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Database,
    WebServer,
    System,
}

/// Backend wiring for an application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Detected and controlled software, if the application manages one.
    #[serde(default)]
    pub software: Option<SoftwareId>,
    /// Log files to tail when the journal is empty.
    #[serde(default)]
    pub log_paths: Vec<String>,
    /// Starting directory for browsable applications.
    #[serde(default)]
    pub default_path: Option<String>,
}

/// Static description of one administrable application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDefinition {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub theme_color: String,
    pub sections: Vec<SectionDefinition>,
    #[serde(default)]
    pub service_config: ServiceConfig,
    #[serde(default)]
    pub capabilities: BTreeSet<Capability>,
}

impl ApplicationDefinition {
    /// Sections by non-decreasing `order`; ties keep declaration order.
    #[must_use]
    pub fn sorted_sections(&self) -> Vec<&SectionDefinition> {
        let mut sections: Vec<&SectionDefinition> = self.sections.iter().collect();
        sections.sort_by_key(|s| s.order);
        sections
    }

    /// First section marked default, else the first declared section.
    #[must_use]
    pub fn default_section(&self) -> Option<&SectionDefinition> {
        self.sections
            .iter()
            .find(|s| s.is_default)
            .or_else(|| self.sections.first())
    }

    #[must_use]
    pub fn section(&self, id: &str) -> Option<&SectionDefinition> {
        self.sections.iter().find(|s| s.id == id)
    }

    #[must_use]
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Fail with `UnsupportedCapability` unless the application declares it.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::UnsupportedCapability` when the flag is missing.
    pub fn require(&self, capability: Capability) -> Result<(), AdminError> {
        if self.has(capability) {
            Ok(())
        } else {
            Err(AdminError::UnsupportedCapability {
                app: self.id.clone(),
                capability: capability.to_string(),
            })
        }
    }
}

// ── Catalog ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CatalogFile {
    applications: Vec<ApplicationDefinition>,
}

/// All application definitions known to this build.
#[derive(Debug, Clone)]
pub struct Catalog {
    applications: Vec<ApplicationDefinition>,
}

impl Catalog {
    /// Parse and validate the embedded catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded YAML is malformed or inconsistent.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_CATALOG).context("invalid built-in application catalog")
    }

    /// Parse and validate a catalog document.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML cannot be parsed or fails validation.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let file: CatalogFile = serde_yaml::from_str(yaml).context("parsing catalog YAML")?;
        let catalog = Self {
            applications: file.applications,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    #[must_use]
    pub fn applications(&self) -> &[ApplicationDefinition] {
        &self.applications
    }

    /// Look up an application by id.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::ServiceNotFound` for unknown ids.
    pub fn app(&self, id: &str) -> Result<&ApplicationDefinition, AdminError> {
        self.applications
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| AdminError::ServiceNotFound(id.to_string()))
    }

    fn validate(&self) -> Result<()> {
        let mut app_ids = HashSet::new();
        for app in &self.applications {
            anyhow::ensure!(app_ids.insert(&app.id), "duplicate application id '{}'", app.id);
            anyhow::ensure!(!app.sections.is_empty(), "application '{}' has no sections", app.id);

            let mut section_ids = HashSet::new();
            for section in &app.sections {
                anyhow::ensure!(
                    section_ids.insert(&section.id),
                    "duplicate section id '{}' in application '{}'",
                    section.id,
                    app.id
                );
                if let Some(capability) = section.provider_type.required_capability() {
                    app.require(capability).with_context(|| {
                        format!("section '{}' of application '{}'", section.id, app.id)
                    })?;
                }
            }
        }
        Ok(())
    }
}
