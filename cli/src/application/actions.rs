//! Mutating administration actions.
//!
//! Every action ends with a message on the application state: the success
//! banner, or the error banner for soft failures. Only structural errors
//! (capability missing, no backend) are returned to the caller.

use anyhow::Result;

use crate::application::ports::{Executor, ProgressReporter};
use crate::application::sections::providers::{backend, unsupported};
use crate::application::services::software::mysql::MysqlService;
use crate::application::services::software::postgres::PostgresService;
use crate::application::services::software::redis::RedisService;
use crate::application::services::software::web::WebServerService;
use crate::application::services::software::{SoftwareService, refresh_package_index};
use crate::application::session::Session;
use crate::application::state_store::StateStore;
use crate::domain::{AdminError, ApplicationDefinition, Capability, ServiceAction, SoftwareId};

/// MySQL account host used when none is given.
pub const DEFAULT_ACCOUNT_HOST: &str = "localhost";

pub struct AdminActions<'a, E: Executor> {
    session: &'a Session<E>,
    store: &'a StateStore,
}

/// Redis databases are addressed as `dbN` or plain `N`.
fn redis_index(name: &str) -> Result<u32, AdminError> {
    name.strip_prefix("db")
        .unwrap_or(name)
        .parse()
        .map_err(|_| AdminError::InvalidName(name.to_string()))
}

impl<'a, E: Executor> AdminActions<'a, E> {
    pub fn new(session: &'a Session<E>, store: &'a StateStore) -> Self {
        Self { session, store }
    }

    /// Publish the outcome. Returns whether the action succeeded.
    async fn report(&self, outcome: Result<String, AdminError>) -> Result<bool> {
        match outcome {
            Ok(message) => {
                self.store.notify(Ok(message)).await?;
                Ok(true)
            }
            Err(err) if err.is_structural() => Err(err.into()),
            Err(err) => {
                self.store.notify(Err(err.to_string())).await?;
                Ok(false)
            }
        }
    }

    /// # Errors
    ///
    /// Returns structural errors only; see the module docs.
    pub async fn service_action(
        &self,
        app: &ApplicationDefinition,
        action: ServiceAction,
    ) -> Result<bool> {
        let outcome = async {
            app.require(Capability::Controllable)?;
            let service = SoftwareService::new(self.session, backend(app)?);
            service.control(action).await?;
            Ok::<_, AdminError>(format!(
                "{} {}.",
                service.flavor_name().await,
                action.past_tense()
            ))
        }
        .await;
        self.report(outcome).await
    }

    /// # Errors
    ///
    /// Returns structural errors only; see the module docs.
    pub async fn install(
        &self,
        app: &ApplicationDefinition,
        reporter: &impl ProgressReporter,
    ) -> Result<bool> {
        let outcome = async {
            app.require(Capability::Controllable)?;
            let service = SoftwareService::new(self.session, backend(app)?);
            service.install(reporter).await?;
            Ok::<_, AdminError>(format!("{} installed and started.", app.name))
        }
        .await;
        self.report(outcome).await
    }

    /// # Errors
    ///
    /// Returns structural errors only; see the module docs.
    pub async fn uninstall(
        &self,
        app: &ApplicationDefinition,
        purge: bool,
        reporter: &impl ProgressReporter,
    ) -> Result<bool> {
        let outcome = async {
            app.require(Capability::Controllable)?;
            let service = SoftwareService::new(self.session, backend(app)?);
            service.uninstall(purge, reporter).await?;
            Ok::<_, AdminError>(format!("{} removed.", app.name))
        }
        .await;
        self.report(outcome).await
    }

    /// # Errors
    ///
    /// Returns structural errors only; see the module docs.
    pub async fn create_database(&self, app: &ApplicationDefinition, name: &str) -> Result<bool> {
        let outcome = async {
            app.require(Capability::HasDatabases)?;
            match backend(app)? {
                SoftwareId::Mysql => MysqlService::new(self.session).create_database(name).await?,
                SoftwareId::Postgresql => {
                    PostgresService::new(self.session).create_database(name).await?;
                }
                _ => return Err(unsupported(app, "creating databases")),
            }
            Ok::<_, AdminError>(format!("Database '{name}' created."))
        }
        .await;
        self.report(outcome).await
    }

    /// Drop a database. For Redis this flushes the numbered database.
    ///
    /// # Errors
    ///
    /// Returns structural errors only; see the module docs.
    pub async fn delete_database(&self, app: &ApplicationDefinition, name: &str) -> Result<bool> {
        let outcome = async {
            app.require(Capability::HasDatabases)?;
            match backend(app)? {
                SoftwareId::Mysql => MysqlService::new(self.session).delete_database(name).await?,
                SoftwareId::Postgresql => {
                    PostgresService::new(self.session).delete_database(name).await?;
                }
                SoftwareId::Redis => {
                    let index = redis_index(name)?;
                    RedisService::new(self.session).flush_database(index).await?;
                    return Ok(format!("Database db{index} flushed."));
                }
                _ => return Err(unsupported(app, "deleting databases")),
            }
            Ok::<_, AdminError>(format!("Database '{name}' deleted."))
        }
        .await;
        self.report(outcome).await
    }

    /// `host` only applies to MySQL accounts and defaults to `localhost`.
    ///
    /// # Errors
    ///
    /// Returns structural errors only; see the module docs.
    pub async fn create_user(
        &self,
        app: &ApplicationDefinition,
        name: &str,
        password: &str,
        host: Option<&str>,
    ) -> Result<bool> {
        let outcome = async {
            app.require(Capability::HasUsers)?;
            match backend(app)? {
                SoftwareId::Mysql => {
                    let host = host.unwrap_or(DEFAULT_ACCOUNT_HOST);
                    MysqlService::new(self.session)
                        .create_user(name, host, password)
                        .await?;
                }
                SoftwareId::Postgresql => {
                    PostgresService::new(self.session)
                        .create_user(name, password)
                        .await?;
                }
                SoftwareId::Redis => {
                    RedisService::new(self.session).create_user(name, password).await?;
                }
                _ => return Err(unsupported(app, "creating users")),
            }
            Ok::<_, AdminError>(format!("User '{name}' created."))
        }
        .await;
        self.report(outcome).await
    }

    /// # Errors
    ///
    /// Returns structural errors only; see the module docs.
    pub async fn delete_user(
        &self,
        app: &ApplicationDefinition,
        name: &str,
        host: Option<&str>,
    ) -> Result<bool> {
        let outcome = async {
            app.require(Capability::HasUsers)?;
            match backend(app)? {
                SoftwareId::Mysql => {
                    let host = host.unwrap_or(DEFAULT_ACCOUNT_HOST);
                    MysqlService::new(self.session).drop_user(name, host).await?;
                }
                SoftwareId::Postgresql => PostgresService::new(self.session).drop_user(name).await?,
                SoftwareId::Redis => RedisService::new(self.session).delete_user(name).await?,
                _ => return Err(unsupported(app, "deleting users")),
            }
            Ok::<_, AdminError>(format!("User '{name}' deleted."))
        }
        .await;
        self.report(outcome).await
    }

    /// Change a live server setting (Redis `CONFIG SET`).
    ///
    /// # Errors
    ///
    /// Returns structural errors only; see the module docs.
    pub async fn set_config(
        &self,
        app: &ApplicationDefinition,
        key: &str,
        value: &str,
    ) -> Result<bool> {
        let outcome = async {
            app.require(Capability::Configurable)?;
            match backend(app)? {
                SoftwareId::Redis => RedisService::new(self.session).config_set(key, value).await?,
                _ => return Err(unsupported(app, "changing settings")),
            }
            Ok::<_, AdminError>(format!("{key} set to '{value}'."))
        }
        .await;
        self.report(outcome).await
    }

    /// # Errors
    ///
    /// Returns structural errors only; see the module docs.
    pub async fn set_site_enabled(
        &self,
        app: &ApplicationDefinition,
        name: &str,
        enabled: bool,
    ) -> Result<bool> {
        let outcome = async {
            app.require(Capability::HasSites)?;
            let web = WebServerService::new(self.session, backend(app)?)
                .ok_or_else(|| unsupported(app, "sites"))?;
            if enabled {
                web.enable_site(name).await?;
                Ok::<_, AdminError>(format!("Site '{name}' enabled. Reload {} to apply.", app.name))
            } else {
                web.disable_site(name).await?;
                Ok::<_, AdminError>(format!("Site '{name}' disabled. Reload {} to apply.", app.name))
            }
        }
        .await;
        self.report(outcome).await
    }

    /// Refresh the host's package metadata.
    ///
    /// # Errors
    ///
    /// Returns an error only if the state task has stopped.
    pub async fn refresh_packages(&self) -> Result<bool> {
        let outcome = refresh_package_index(self.session)
            .await
            .map(|()| "Package index refreshed.".to_string());
        self.report(outcome).await
    }
}
