//! One administration session against one host.
//!
//! The session owns the executor and everything learned about the host while
//! it is open: the OS release, the package manager and the per-software
//! detection cache. Nothing here is global; the session is constructed once
//! and passed by reference to every service.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::application::ports::Executor;
use crate::domain::command::predicates;
use crate::domain::package_manager::{self, OS_RELEASE_COMMAND, OsRelease, parse_os_release};
use crate::domain::{
    AdminError, CommandResult, Detection, PackageManagerKind, ServiceDescriptor, SoftwareId,
    TimeoutConfig,
};

/// OS facts resolved once per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub release: OsRelease,
    pub package_manager: PackageManagerKind,
    /// False when the package manager is the apt fallback for an unknown id.
    pub recognized: bool,
}

/// Cached detector outcome for one software.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedSoftware {
    pub detection: Detection,
    pub descriptor: ServiceDescriptor,
    pub version: Option<String>,
}

pub struct Session<E: Executor> {
    executor: E,
    timeouts: TimeoutConfig,
    platform: OnceCell<Platform>,
    detections: Mutex<HashMap<SoftwareId, DetectedSoftware>>,
}

impl<E: Executor> Session<E> {
    pub fn new(executor: E, timeouts: TimeoutConfig) -> Self {
        Self {
            executor,
            timeouts,
            platform: OnceCell::new(),
            detections: Mutex::new(HashMap::new()),
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn timeouts(&self) -> &TimeoutConfig {
        &self.timeouts
    }

    /// Run a probe or query with the default command deadline.
    pub async fn run(&self, command: &str) -> CommandResult {
        self.run_with_timeout(command, self.timeouts.command()).await
    }

    /// Run a long operation (install, remove) with the install deadline.
    pub async fn run_long(&self, command: &str) -> CommandResult {
        self.run_with_timeout(command, self.timeouts.install()).await
    }

    pub async fn run_with_timeout(&self, command: &str, timeout: Duration) -> CommandResult {
        self.execute_logged(command, command, timeout).await
    }

    /// Run a command that carries a credential. `shown` is the same command
    /// with the credential masked; only it reaches the log.
    pub async fn run_redacted(&self, command: &str, shown: &str) -> CommandResult {
        self.execute_logged(command, shown, self.timeouts.command())
            .await
    }

    async fn execute_logged(&self, command: &str, shown: &str, timeout: Duration) -> CommandResult {
        let result = self.executor.execute(command, timeout).await;
        debug!(
            host = %self.executor.target(),
            command = shown,
            exit_code = result.exit_code,
            elapsed_ms = u64::try_from(result.elapsed.as_millis()).unwrap_or(u64::MAX),
            "remote command finished"
        );
        result
    }

    /// Run a query and return its raw output, or the classified failure.
    ///
    /// # Errors
    ///
    /// Returns the soft failure taxonomy (`ConnectionLost`, `Timeout`,
    /// `NonZeroExit`) when the command did not exit 0.
    pub async fn query(&self, command: &str) -> Result<String, AdminError> {
        classify(self.run(command).await, self.timeouts.command_secs)
    }

    /// Like [`Session::query`] but with the install deadline.
    ///
    /// # Errors
    ///
    /// Returns the classified failure when the command did not exit 0.
    pub async fn query_long(&self, command: &str) -> Result<String, AdminError> {
        classify(self.run_long(command).await, self.timeouts.install_secs)
    }

    /// OS release and package manager, read from `/etc/os-release` on first
    /// use. An unreadable file or unknown id falls back to apt.
    pub async fn platform(&self) -> &Platform {
        self.platform
            .get_or_init(|| async {
                let result = self.run(OS_RELEASE_COMMAND).await;
                let release = parse_os_release(&result.output);
                resolve_platform(release)
            })
            .await
    }

    pub async fn package_manager(&self) -> PackageManagerKind {
        self.platform().await.package_manager
    }

    /// Package manager if it is already known, without probing.
    pub fn known_package_manager(&self) -> Option<PackageManagerKind> {
        self.platform.get().map(|p| p.package_manager)
    }

    pub fn cached(&self, id: SoftwareId) -> Option<DetectedSoftware> {
        self.lock_detections().get(&id).cloned()
    }

    pub fn store(&self, id: SoftwareId, detected: DetectedSoftware) {
        self.lock_detections().insert(id, detected);
    }

    /// Forget the cached detection for `id` (after install or removal).
    pub fn invalidate(&self, id: SoftwareId) {
        if self.lock_detections().remove(&id).is_some() {
            debug!(software = %id, "detection cache invalidated");
        }
    }

    fn lock_detections(&self) -> std::sync::MutexGuard<'_, HashMap<SoftwareId, DetectedSoftware>> {
        self.detections
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Stand-in for a credential in logged command lines.
pub const REDACTED: &str = "********";

const SUDO_HINT: &str =
    "sudo asked for a password; hostkit needs passwordless sudo for the login user";

/// Output of a successful command, or its classified failure.
///
/// # Errors
///
/// Returns the `AdminError` matching the failure; sudo password prompts are
/// reported with a hint instead of the raw prompt.
pub fn classify(result: CommandResult, timeout_secs: u64) -> Result<String, AdminError> {
    match result.failure() {
        None => Ok(result.output),
        Some(_) if predicates::sudo_denied(&result) => Err(AdminError::NonZeroExit {
            code: result.exit_code,
            output: SUDO_HINT.to_string(),
        }),
        Some(failure) => Err(failure.into_admin_error(timeout_secs)),
    }
}

/// Pick a package manager from `ID`, then each `ID_LIKE` entry, then apt.
fn resolve_platform(release: OsRelease) -> Platform {
    let known = std::iter::once(release.id.as_str())
        .chain(release.id_like.iter().map(String::as_str))
        .find(|id| package_manager::is_known_distro(id));

    match known {
        Some(id) => Platform {
            package_manager: package_manager::detect(id),
            recognized: true,
            release,
        },
        None => {
            warn!(
                os_id = %release.id,
                "unrecognized distribution, assuming apt"
            );
            Platform {
                package_manager: package_manager::detect(&release.id),
                recognized: false,
                release,
            }
        }
    }
}
