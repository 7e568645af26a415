//! `hostkit config` — show and change local configuration.

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::application::services::config_service;
use crate::domain::HostEntry;

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Print one setting
    Get {
        /// Configuration key, e.g. `timeouts.command_secs`
        key: String,
    },
    /// Set configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },
    /// Print the configuration file location
    Path,
    /// Save a named host for `--host <name>`
    AddHost {
        /// Alias used with `--host`
        name: String,
        /// Address or DNS name
        address: String,
        /// SSH user
        #[arg(long)]
        user: Option<String>,
        /// SSH port
        #[arg(long)]
        port: Option<u16>,
        /// Private key passed to `ssh -i`
        #[arg(long)]
        identity_file: Option<String>,
    },
    /// Forget a named host
    RemoveHost {
        /// Alias to remove
        name: String,
    },
}

/// Run the config command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be read, validated or saved.
pub fn run(app: &AppContext, cmd: ConfigCommand) -> Result<ExitCode> {
    match cmd {
        ConfigCommand::Show => {
            let config = config_service::load_config(&app.config_store)?;
            let path = app.config_store.path()?;
            app.renderer().render_config(&config, &path)?;
        }
        ConfigCommand::Get { key } => {
            let config = config_service::load_config(&app.config_store)?;
            println!("{}", config.get(&key)?);
        }
        ConfigCommand::Set { key, value } => {
            config_service::set_value(&app.config_store, &key, &value)?;
            app.output.success(&format!("Set {key} = {value}"));
        }
        ConfigCommand::Path => {
            println!("{}", app.config_store.path()?.display());
        }
        ConfigCommand::AddHost {
            name,
            address,
            user,
            port,
            identity_file,
        } => {
            let entry = HostEntry {
                host: address,
                user,
                port,
                identity_file,
            };
            config_service::add_host(&app.config_store, &name, entry)?;
            app.output.success(&format!("Saved host '{name}'"));
        }
        ConfigCommand::RemoveHost { name } => {
            if config_service::remove_host(&app.config_store, &name)? {
                app.output.success(&format!("Removed host '{name}'"));
            } else {
                app.output.warn(&format!("No host named '{name}'"));
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
