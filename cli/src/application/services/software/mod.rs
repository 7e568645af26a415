//! Application service — uniform lifecycle surface for detected software.
//!
//! [`SoftwareService`] composes the detector, the package command builder
//! and the systemd helper. Engine-specific operations live in the sibling
//! modules and borrow the same session.

pub mod mysql;
pub mod postgres;
pub mod redis;
pub mod system;
pub mod web;

use hostkit_common::ServiceStatus;
use tracing::{info, warn};

use crate::application::ports::{Executor, ProgressReporter};
use crate::application::services::{detector, service_control};
use crate::application::session::{DetectedSoftware, Session};
use crate::domain::package_manager::{install_command, remove_command, update_command};
use crate::domain::{AdminError, ServiceAction, SoftwareId, SoftwareSpec};

pub struct SoftwareService<'a, E: Executor> {
    session: &'a Session<E>,
    id: SoftwareId,
}

impl<'a, E: Executor> SoftwareService<'a, E> {
    pub fn new(session: &'a Session<E>, id: SoftwareId) -> Self {
        Self { session, id }
    }

    pub fn id(&self) -> SoftwareId {
        self.id
    }

    pub fn spec(&self) -> &'static SoftwareSpec {
        self.id.spec()
    }

    pub async fn detected(&self) -> DetectedSoftware {
        detector::detect(self.session, self.id).await
    }

    pub async fn is_installed(&self) -> bool {
        self.detected().await.detection.is_installed()
    }

    pub async fn get_version(&self) -> Option<String> {
        self.detected().await.version
    }

    /// Canonical systemd unit, e.g. `mariadb` on a MariaDB host.
    pub async fn unit(&self) -> String {
        self.detected().await.descriptor.canonical_name
    }

    /// Display name respecting the detected flavor (`MariaDB`, `Valkey`).
    pub async fn flavor_name(&self) -> &'static str {
        let detected = self.detected().await;
        self.spec().flavor_name(&detected.descriptor)
    }

    pub async fn is_running(&self) -> bool {
        let detected = self.detected().await;
        detected.detection.is_installed()
            && service_control::is_active(self.session, &detected.descriptor.canonical_name).await
    }

    pub async fn get_status(&self) -> ServiceStatus {
        let detected = self.detected().await;
        if !detected.detection.is_installed() {
            return ServiceStatus::NotInstalled;
        }
        if service_control::is_active(self.session, &detected.descriptor.canonical_name).await {
            ServiceStatus::Running
        } else {
            ServiceStatus::Stopped
        }
    }

    /// Apply a systemd action to the canonical unit.
    ///
    /// # Errors
    ///
    /// Returns the classified failure when `systemctl` exits non-zero.
    pub async fn control(&self, action: ServiceAction) -> Result<(), AdminError> {
        let unit = self.unit().await;
        let result = service_control::run_action(self.session, action, &unit).await;
        match result.failure() {
            None => {
                info!(software = %self.id, %unit, action = %action, "service action applied");
                Ok(())
            }
            Some(failure) => Err(failure.into_admin_error(self.session.timeouts().command_secs)),
        }
    }

    /// # Errors
    ///
    /// See [`SoftwareService::control`].
    pub async fn start(&self) -> Result<(), AdminError> {
        self.control(ServiceAction::Start).await
    }

    /// # Errors
    ///
    /// See [`SoftwareService::control`].
    pub async fn stop(&self) -> Result<(), AdminError> {
        self.control(ServiceAction::Stop).await
    }

    /// # Errors
    ///
    /// See [`SoftwareService::control`].
    pub async fn restart(&self) -> Result<(), AdminError> {
        self.control(ServiceAction::Restart).await
    }

    /// # Errors
    ///
    /// See [`SoftwareService::control`].
    pub async fn reload(&self) -> Result<(), AdminError> {
        self.control(ServiceAction::Reload).await
    }

    /// # Errors
    ///
    /// See [`SoftwareService::control`].
    pub async fn enable(&self) -> Result<(), AdminError> {
        self.control(ServiceAction::Enable).await
    }

    /// # Errors
    ///
    /// See [`SoftwareService::control`].
    pub async fn disable(&self) -> Result<(), AdminError> {
        self.control(ServiceAction::Disable).await
    }

    /// Install the distribution packages, run post-install setup, then
    /// enable and start the service.
    ///
    /// A failed step leaves whatever the previous steps changed on the host.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the package install or of the
    /// enable/start step.
    pub async fn install(&self, reporter: &impl ProgressReporter) -> Result<(), AdminError> {
        let kind = self.session.package_manager().await;
        let packages = self.id.packages(kind);
        reporter.step(&format!(
            "installing {} with {kind}...",
            packages.join(", ")
        ));
        self.session
            .query_long(&install_command(packages, kind, true))
            .await?;

        for command in self.id.post_install_commands(kind) {
            reporter.step(&format!("running {command}..."));
            if let Err(err) = self.session.query_long(&command).await {
                // initdb refuses to run twice; a reinstall must not abort here.
                warn!(software = %self.id, %command, error = %err, "post-install step failed");
                reporter.warn(&format!("post-install step failed: {err}"));
            }
        }

        self.session.invalidate(self.id);
        tokio::time::sleep(self.session.timeouts().settle()).await;

        reporter.step("enabling and starting service...");
        self.enable().await?;
        self.start().await?;
        tokio::time::sleep(self.session.timeouts().settle()).await;
        self.session.invalidate(self.id);

        reporter.success(&format!("{} installed", self.spec().display_name));
        Ok(())
    }

    /// Stop the service and remove its packages (`purge` also deletes
    /// configuration where the package manager supports it).
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the package removal.
    pub async fn uninstall(
        &self,
        purge: bool,
        reporter: &impl ProgressReporter,
    ) -> Result<(), AdminError> {
        if self.is_running().await {
            reporter.step("stopping service...");
            if let Err(err) = self.stop().await {
                reporter.warn(&format!("could not stop service: {err}"));
            }
        }

        let kind = self.session.package_manager().await;
        let packages = self.id.packages(kind);
        reporter.step(&format!("removing {} with {kind}...", packages.join(", ")));
        let result = self
            .session
            .query_long(&remove_command(packages, kind, purge))
            .await;
        self.session.invalidate(self.id);
        result?;

        reporter.success(&format!("{} removed", self.spec().display_name));
        Ok(())
    }
}

/// Refresh the host's package metadata.
///
/// # Errors
///
/// Returns the classified failure of the refresh command.
pub async fn refresh_package_index(session: &Session<impl Executor>) -> Result<(), AdminError> {
    let kind = session.package_manager().await;
    session.query_long(&update_command(kind)).await.map(|_| ())
}
