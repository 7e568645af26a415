//! `hostkit site` — enable and disable web server sites.

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::application::{AdminActions, StateStore};

/// Site subcommands.
#[derive(Subcommand)]
pub enum SiteCommand {
    /// Enable a site
    Enable {
        /// Application id (nginx, apache)
        app: String,
        /// Site name
        name: String,
    },
    /// Disable a site
    Disable {
        /// Application id (nginx, apache)
        app: String,
        /// Site name
        name: String,
    },
}

/// # Errors
///
/// Returns an error for unknown applications, applications without sites,
/// or when no target is selected.
pub async fn run(app: &AppContext, cmd: SiteCommand) -> Result<ExitCode> {
    let (id, name, enabled) = match cmd {
        SiteCommand::Enable { app, name } => (app, name, true),
        SiteCommand::Disable { app, name } => (app, name, false),
    };
    let definition = super::application(app, &id)?;
    let session = app.session()?;
    let store = StateStore::spawn();
    AdminActions::new(&session, &store)
        .set_site_enabled(definition, &name, enabled)
        .await?;
    super::finish_action(app, &store).await
}
