//! `hostkit db` — create and delete databases.

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::application::{AdminActions, StateStore};

/// Database subcommands.
#[derive(Subcommand)]
pub enum DbCommand {
    /// Create a database
    Create {
        /// Application id (mysql, postgresql)
        app: String,
        /// Database name
        name: String,
    },
    /// Drop a database (Redis: flush `dbN`)
    Delete {
        /// Application id
        app: String,
        /// Database name, or `dbN` for Redis
        name: String,
    },
}

/// # Errors
///
/// Returns an error for unknown applications, applications without
/// databases, or when no target is selected.
pub async fn run(app: &AppContext, cmd: DbCommand) -> Result<ExitCode> {
    match cmd {
        DbCommand::Create { app: id, name } => {
            let definition = super::application(app, &id)?;
            let session = app.session()?;
            let store = StateStore::spawn();
            AdminActions::new(&session, &store)
                .create_database(definition, &name)
                .await?;
            super::finish_action(app, &store).await
        }
        DbCommand::Delete { app: id, name } => {
            let definition = super::application(app, &id)?;
            let prompt = format!("Delete database '{name}' on {}?", definition.name);
            if !app.non_interactive && !app.confirm(&prompt, false)? {
                app.output.info("Aborted.");
                return Ok(ExitCode::SUCCESS);
            }
            let session = app.session()?;
            let store = StateStore::spawn();
            AdminActions::new(&session, &store)
                .delete_database(definition, &name)
                .await?;
            super::finish_action(app, &store).await
        }
    }
}
