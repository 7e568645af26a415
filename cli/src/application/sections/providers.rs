//! One provider per [`SectionProviderType`](crate::domain::SectionProviderType).

use hostkit_common::{ApplicationState, Metric, ServiceStatus};

use super::SectionProvider;
use crate::application::ports::Executor;
use crate::application::services::service_control;
use crate::application::services::software::mysql::MysqlService;
use crate::application::services::software::postgres::PostgresService;
use crate::application::services::software::redis::RedisService;
use crate::application::services::software::web::WebServerService;
use crate::application::services::software::{SoftwareService, system};
use crate::application::session::Session;
use crate::domain::sanitize::sanitize_output;
use crate::domain::systemd;
use crate::domain::{AdminError, ApplicationDefinition, SoftwareId};

/// Journal and log-file lines shown by the logs section.
pub const LOG_LINES: u32 = 200;

/// `INFO` fields surfaced on the Redis overview.
const REDIS_OVERVIEW_METRICS: &[&str] = &[
    "redis_version",
    "valkey_version",
    "role",
    "uptime_in_seconds",
    "connected_clients",
    "used_memory_human",
    "total_commands_processed",
];

/// Software backing `app`, or `ServiceNotFound` for applications without
/// one.
///
/// # Errors
///
/// Returns `AdminError::ServiceNotFound` carrying the application id.
pub fn backend(app: &ApplicationDefinition) -> Result<SoftwareId, AdminError> {
    app.service_config
        .software
        .ok_or_else(|| AdminError::ServiceNotFound(app.id.clone()))
}

pub(crate) fn unsupported(app: &ApplicationDefinition, what: &str) -> AdminError {
    AdminError::UnsupportedCapability {
        app: app.id.clone(),
        capability: what.to_string(),
    }
}

// ── Overview ──────────────────────────────────────────────────────────────────

pub struct OverviewProvider;

impl SectionProvider for OverviewProvider {
    async fn load<E: Executor>(
        &self,
        app: &ApplicationDefinition,
        state: &mut ApplicationState,
        session: &Session<E>,
    ) -> Result<(), AdminError> {
        let id = backend(app)?;
        let service = SoftwareService::new(session, id);
        let detected = service.detected().await;
        let installed = detected.detection.is_installed();

        state.status = service.get_status().await;
        state.version = detected.version.clone();
        state.service_name = installed.then(|| detected.descriptor.canonical_name.clone());
        state.flavor = detected
            .descriptor
            .is_alternate_flavor
            .then(|| service.spec().flavor_name(&detected.descriptor).to_string());

        let mut metrics = vec![Metric::new(
            "package_manager",
            session.package_manager().await.as_str(),
        )];
        if let Some(stage) = detected.detection.matched_stage {
            metrics.push(Metric::new("detected_by", stage.as_str()));
        }
        if installed {
            let enabled =
                service_control::is_enabled(session, &detected.descriptor.canonical_name).await;
            metrics.push(Metric::new("enabled_at_boot", if enabled { "yes" } else { "no" }));
        }
        state.metrics = metrics;

        if id == SoftwareId::Redis && state.status == ServiceStatus::Running {
            let info = RedisService::new(session).server_info().await?;
            state.metrics.extend(
                info.into_iter()
                    .filter(|m| REDIS_OVERVIEW_METRICS.contains(&m.name.as_str())),
            );
        }
        Ok(())
    }
}

// ── Configuration entries ─────────────────────────────────────────────────────

pub struct ConfigurationProvider;

impl SectionProvider for ConfigurationProvider {
    async fn load<E: Executor>(
        &self,
        app: &ApplicationDefinition,
        state: &mut ApplicationState,
        session: &Session<E>,
    ) -> Result<(), AdminError> {
        state.config_entries = match backend(app)? {
            SoftwareId::Mysql => MysqlService::new(session).fetch_variables().await?,
            SoftwareId::Postgresql => PostgresService::new(session).fetch_settings().await?,
            SoftwareId::Redis => RedisService::new(session).config_get("*").await?,
            SoftwareId::Nginx | SoftwareId::Apache => {
                return Err(unsupported(app, "configuration entries"));
            }
        };
        Ok(())
    }
}

// ── Configuration file ────────────────────────────────────────────────────────

pub struct ConfigFileProvider;

impl SectionProvider for ConfigFileProvider {
    async fn load<E: Executor>(
        &self,
        app: &ApplicationDefinition,
        state: &mut ApplicationState,
        session: &Session<E>,
    ) -> Result<(), AdminError> {
        let web = WebServerService::new(session, backend(app)?)
            .ok_or_else(|| unsupported(app, "configuration file"))?;
        state.config_file = web.config_file().await;
        state.config_test = Some(web.test_config().await);
        Ok(())
    }
}

// ── Databases ─────────────────────────────────────────────────────────────────

pub struct DatabasesProvider;

impl SectionProvider for DatabasesProvider {
    async fn load<E: Executor>(
        &self,
        app: &ApplicationDefinition,
        state: &mut ApplicationState,
        session: &Session<E>,
    ) -> Result<(), AdminError> {
        state.databases = match backend(app)? {
            SoftwareId::Mysql => MysqlService::new(session).fetch_databases().await?,
            SoftwareId::Postgresql => PostgresService::new(session).fetch_databases().await?,
            SoftwareId::Redis => RedisService::new(session).fetch_databases().await?,
            SoftwareId::Nginx | SoftwareId::Apache => return Err(unsupported(app, "databases")),
        };
        Ok(())
    }
}

// ── Users ─────────────────────────────────────────────────────────────────────

pub struct UsersProvider;

impl SectionProvider for UsersProvider {
    async fn load<E: Executor>(
        &self,
        app: &ApplicationDefinition,
        state: &mut ApplicationState,
        session: &Session<E>,
    ) -> Result<(), AdminError> {
        state.users = match backend(app)? {
            SoftwareId::Mysql => MysqlService::new(session).list_users().await?,
            SoftwareId::Postgresql => PostgresService::new(session).list_users().await?,
            SoftwareId::Redis => RedisService::new(session).list_users().await?,
            SoftwareId::Nginx | SoftwareId::Apache => return Err(unsupported(app, "users")),
        };
        Ok(())
    }
}

// ── Logs ──────────────────────────────────────────────────────────────────────

/// Unit journal first; when it has nothing, the first readable log file
/// from the catalog. Applications without software read the system journal.
pub struct LogsProvider;

fn journal_is_empty(text: &str) -> bool {
    let text = text.trim();
    text.is_empty() || text == "-- No entries --"
}

impl SectionProvider for LogsProvider {
    async fn load<E: Executor>(
        &self,
        app: &ApplicationDefinition,
        state: &mut ApplicationState,
        session: &Session<E>,
    ) -> Result<(), AdminError> {
        let journal = match app.service_config.software {
            Some(id) => {
                let unit = SoftwareService::new(session, id).unit().await;
                service_control::journal(session, &unit, LOG_LINES).await?
            }
            None => session
                .query(&systemd::system_journal_command(LOG_LINES))
                .await
                .map(|out| sanitize_output(&out))?,
        };
        if !journal_is_empty(&journal) {
            state.log_text = journal;
            return Ok(());
        }

        for path in &app.service_config.log_paths {
            let result = session.run(&systemd::tail_command(path, LOG_LINES)).await;
            if result.is_success() && !result.output.trim().is_empty() {
                state.log_text = sanitize_output(&result.output);
                return Ok(());
            }
        }
        state.log_text = String::new();
        Ok(())
    }
}

// ── Sites ─────────────────────────────────────────────────────────────────────

pub struct SitesProvider;

impl SectionProvider for SitesProvider {
    async fn load<E: Executor>(
        &self,
        app: &ApplicationDefinition,
        state: &mut ApplicationState,
        session: &Session<E>,
    ) -> Result<(), AdminError> {
        let web = WebServerService::new(session, backend(app)?)
            .ok_or_else(|| unsupported(app, "sites"))?;
        state.sites = web.list_sites().await;
        Ok(())
    }
}

// ── Installed versions ────────────────────────────────────────────────────────

pub struct VersionsProvider;

impl SectionProvider for VersionsProvider {
    async fn load<E: Executor>(
        &self,
        app: &ApplicationDefinition,
        state: &mut ApplicationState,
        session: &Session<E>,
    ) -> Result<(), AdminError> {
        match backend(app)? {
            SoftwareId::Postgresql => {
                state.installed_versions = PostgresService::new(session).installed_versions().await;
                Ok(())
            }
            _ => Err(unsupported(app, "installed versions")),
        }
    }
}

// ── System ────────────────────────────────────────────────────────────────────

pub struct SystemStatsProvider;

impl SectionProvider for SystemStatsProvider {
    async fn load<E: Executor>(
        &self,
        _app: &ApplicationDefinition,
        state: &mut ApplicationState,
        session: &Session<E>,
    ) -> Result<(), AdminError> {
        state.system_stats = Some(system::stats(session).await?);
        Ok(())
    }
}

/// Lists `current_path`, falling back to the catalog's default path.
pub struct FilesProvider;

impl SectionProvider for FilesProvider {
    async fn load<E: Executor>(
        &self,
        app: &ApplicationDefinition,
        state: &mut ApplicationState,
        session: &Session<E>,
    ) -> Result<(), AdminError> {
        let path = state
            .current_path
            .clone()
            .or_else(|| app.service_config.default_path.clone())
            .unwrap_or_else(|| "/".to_string());
        state.files = system::list_directory(session, &path).await?;
        state.current_path = Some(path);
        Ok(())
    }
}
