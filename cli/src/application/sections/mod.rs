//! Capability registry dispatch — section definitions to providers.
//!
//! [`SectionRegistry::load`] matches the provider type exhaustively. Each
//! provider writes only the fields listed in
//! [`SectionProviderType::owned_fields`]; the state store enforces that on
//! commit.
//!
//! Errors follow two channels. Structural errors (no backend for the
//! application, capability not declared) are returned. Everything else is
//! written to `error_message` and the load still commits.

pub mod providers;

use hostkit_common::ApplicationState;
use tracing::warn;

use crate::application::ports::Executor;
use crate::application::services::software::SoftwareService;
use crate::application::session::Session;
use crate::domain::{AdminError, ApplicationDefinition, SectionDefinition, SectionProviderType};

use providers::{
    ConfigFileProvider, ConfigurationProvider, DatabasesProvider, FilesProvider, LogsProvider,
    OverviewProvider, SitesProvider, SystemStatsProvider, UsersProvider, VersionsProvider,
};

/// Loads one section's data into the application state.
#[allow(async_fn_in_trait)]
pub trait SectionProvider {
    /// # Errors
    ///
    /// Returns `AdminError`; the registry decides which channel it takes.
    async fn load<E: Executor>(
        &self,
        app: &ApplicationDefinition,
        state: &mut ApplicationState,
        session: &Session<E>,
    ) -> Result<(), AdminError>;
}

pub struct SectionRegistry;

impl SectionRegistry {
    /// Resolve and run the provider for `section`.
    ///
    /// # Errors
    ///
    /// Returns only structural errors (`ServiceNotFound`,
    /// `UnsupportedCapability`). Soft failures end up in
    /// `state.error_message`.
    pub async fn load<E: Executor>(
        app: &ApplicationDefinition,
        section: &SectionDefinition,
        state: &mut ApplicationState,
        session: &Session<E>,
    ) -> Result<(), AdminError> {
        if let Some(capability) = section.provider_type.required_capability() {
            app.require(capability)?;
        }

        if section.requires_running
            && let Some(id) = app.service_config.software
        {
            let service = SoftwareService::new(session, id);
            if !service.is_running().await {
                let name = service.flavor_name().await;
                state.set_error(format!(
                    "{name} is not running. Start the service to load {}.",
                    section.name
                ));
                return Ok(());
            }
        }

        let result = match section.provider_type {
            SectionProviderType::Overview => OverviewProvider.load(app, state, session).await,
            SectionProviderType::Configuration => {
                ConfigurationProvider.load(app, state, session).await
            }
            SectionProviderType::ConfigFile => ConfigFileProvider.load(app, state, session).await,
            SectionProviderType::Databases => DatabasesProvider.load(app, state, session).await,
            SectionProviderType::Users => UsersProvider.load(app, state, session).await,
            SectionProviderType::Logs => LogsProvider.load(app, state, session).await,
            SectionProviderType::Sites => SitesProvider.load(app, state, session).await,
            SectionProviderType::Versions => VersionsProvider.load(app, state, session).await,
            SectionProviderType::SystemStats => {
                SystemStatsProvider.load(app, state, session).await
            }
            SectionProviderType::Files => FilesProvider.load(app, state, session).await,
        };

        match result {
            Err(err) if !err.is_structural() => {
                warn!(app = %app.id, section = %section.id, error = %err, "section load failed");
                state.set_error(format!("{}: {err}", section.name));
                Ok(())
            }
            other => other,
        }
    }
}
