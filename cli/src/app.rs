//! Application context — unified state passed to every command handler.
//!
//! `AppContext` owns the output context, the config store, the catalog and
//! the target selection. Commands that talk to a host ask it for a
//! [`Session`]; commands that only read local state never open one.

use anyhow::{Result, bail};
use tracing::debug;

use crate::application::Session;
use crate::application::services::config_service;
use crate::domain::Catalog;
use crate::infra::config::YamlConfigStore;
use crate::infra::executor::{HostExecutor, LocalExecutor, SshExecutor};
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Behaviour flags.
pub struct BehaviourFlags {
    /// Skip interactive prompts (also set by `CI` / `HOSTKIT_YES` env vars).
    pub yes: bool,
}

/// Which host commands run against.
#[derive(Debug, Clone, Default)]
pub struct TargetFlags {
    /// Configured host name or `[user@]address`.
    pub host: Option<String>,
    /// Administer this machine instead of a remote one.
    pub local: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    pub output: OutputFlags,
    pub behaviour: BehaviourFlags,
    pub target: TargetFlags,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Persistent configuration in `~/.hostkit/config.yaml`.
    pub config_store: YamlConfigStore,
    /// Applications this build can administer.
    pub catalog: Catalog,
    /// Target selected on the command line.
    pub target: TargetFlags,
    /// When `true`, skip interactive prompts and use defaults.
    ///
    /// Set when `--yes` / `-y` is passed, or when the `CI` or `HOSTKIT_YES`
    /// environment variables are present.
    pub non_interactive: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in catalog fails validation.
    pub fn new(flags: AppFlags) -> Result<Self> {
        let ci_env = std::env::var("CI").is_ok() || std::env::var("HOSTKIT_YES").is_ok();
        let non_interactive = flags.behaviour.yes || ci_env;

        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };

        Ok(Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            mode,
            config_store: YamlConfigStore,
            catalog: Catalog::builtin()?,
            target: flags.target,
            non_interactive,
        })
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    /// Progress spinners are drawn only for interactive human output.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        !self.is_json() && self.output.show_progress()
    }

    /// Open a session against the selected target.
    ///
    /// # Errors
    ///
    /// Returns an error if no target was selected, the host cannot be
    /// resolved, or the config file is invalid.
    pub fn session(&self) -> Result<Session<HostExecutor>> {
        let (config, executor) = match (&self.target.host, self.target.local) {
            (Some(_), true) => bail!("--host and --local cannot be combined"),
            (None, true) => (
                config_service::load_config(&self.config_store)?,
                HostExecutor::Local(LocalExecutor::new()),
            ),
            (Some(name), false) => {
                let (config, entry) = config_service::resolve_host(&self.config_store, name)?;
                (config, HostExecutor::Ssh(SshExecutor::new(entry)))
            }
            (None, false) => {
                bail!("No target host. Pass --host <name|user@address> or --local.")
            }
        };
        debug!(
            local = self.target.local,
            timeout_secs = config.timeouts.command_secs,
            "session opened"
        );
        Ok(Session::new(executor, config.timeouts))
    }

    /// Ask the user for confirmation.
    ///
    /// When `non_interactive` is `true` (CI, `--yes` flag, or `HOSTKIT_YES`
    /// env), returns `default` immediately without prompting.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails (e.g. no TTY available).
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.non_interactive {
            return Ok(default);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }

    /// Read a secret from the terminal, asking twice.
    ///
    /// # Errors
    ///
    /// Returns an error in non-interactive mode or if the prompt fails.
    pub fn password(&self, prompt: &str) -> Result<String> {
        if self.non_interactive {
            bail!("A password is required; pass --password in non-interactive mode.");
        }
        let password = dialoguer::Password::new()
            .with_prompt(prompt)
            .with_confirmation("Repeat password", "Passwords do not match")
            .interact()?;
        Ok(password)
    }
}
