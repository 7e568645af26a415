//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags, TargetFlags};
use crate::commands;

/// Administer MySQL, PostgreSQL, Redis, Nginx and Apache on remote hosts over SSH
#[derive(Parser)]
#[command(
    name = "hostkit",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Log remote commands and detection steps to stderr
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Answer yes to confirmation prompts
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Target host: a name from the config file or `[user@]address`
    #[arg(long, global = true, env = "HOSTKIT_HOST", conflicts_with = "local")]
    pub host: Option<String>,

    /// Administer this machine instead of a remote host
    #[arg(long, global = true)]
    pub local: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List administrable applications and their sections
    Apps,

    /// Detect installed software on the target
    Detect,

    /// Load and display one section of an application
    Show(commands::show::ShowArgs),

    /// Start, stop, restart, reload, enable or disable a service
    Service(commands::service::ServiceArgs),

    /// Install an application's packages and start it
    Install(commands::packages::InstallArgs),

    /// Stop and uninstall an application
    Remove(commands::packages::RemoveArgs),

    /// Refresh the target's package index
    Refresh,

    /// Manage databases
    #[command(subcommand)]
    Db(commands::db::DbCommand),

    /// Manage users
    #[command(subcommand)]
    User(commands::user::UserCommand),

    /// Manage web server sites
    #[command(subcommand)]
    Site(commands::site::SiteCommand),

    /// Change a live server setting
    Set(commands::set::SetArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            verbose: _,
            yes,
            host,
            local,
            command,
        } = self;
        let app = AppContext::new(AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            behaviour: BehaviourFlags { yes },
            target: TargetFlags { host, local },
        })?;

        match command {
            Command::Apps => commands::apps::run(&app),
            Command::Detect => commands::detect::run(&app).await,
            Command::Show(args) => commands::show::run(&app, args).await,
            Command::Service(args) => commands::service::run(&app, args).await,
            Command::Install(args) => commands::packages::install(&app, args).await,
            Command::Remove(args) => commands::packages::remove(&app, args).await,
            Command::Refresh => commands::packages::refresh(&app).await,
            Command::Db(cmd) => commands::db::run(&app, cmd).await,
            Command::User(cmd) => commands::user::run(&app, cmd).await,
            Command::Site(cmd) => commands::site::run(&app, cmd).await,
            Command::Set(args) => commands::set::run(&app, args).await,
            Command::Config(cmd) => commands::config::run(&app, cmd),
            Command::Version => commands::version::run(&app),
        }
    }
}
