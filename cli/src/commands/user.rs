//! `hostkit user` — create and delete database and ACL users.

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::application::{AdminActions, StateStore};

/// User subcommands.
#[derive(Subcommand)]
pub enum UserCommand {
    /// Create a user
    Create {
        /// Application id (mysql, postgresql, redis)
        app: String,
        /// User name
        name: String,
        /// Password; prompted for when omitted
        #[arg(long, env = "HOSTKIT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// MySQL account host, e.g. `localhost` or `%`
        #[arg(long, value_name = "HOST")]
        account_host: Option<String>,
    },
    /// Delete a user
    Delete {
        /// Application id
        app: String,
        /// User name
        name: String,
        /// MySQL account host, e.g. `localhost` or `%`
        #[arg(long, value_name = "HOST")]
        account_host: Option<String>,
    },
}

/// # Errors
///
/// Returns an error for unknown applications, applications without users,
/// or when no target is selected.
pub async fn run(app: &AppContext, cmd: UserCommand) -> Result<ExitCode> {
    match cmd {
        UserCommand::Create {
            app: id,
            name,
            password,
            account_host,
        } => {
            let definition = super::application(app, &id)?;
            let password = match password {
                Some(password) => password,
                None => app.password(&format!("Password for '{name}'"))?,
            };
            let session = app.session()?;
            let store = StateStore::spawn();
            AdminActions::new(&session, &store)
                .create_user(definition, &name, &password, account_host.as_deref())
                .await?;
            super::finish_action(app, &store).await
        }
        UserCommand::Delete {
            app: id,
            name,
            account_host,
        } => {
            let definition = super::application(app, &id)?;
            let prompt = format!("Delete user '{name}' on {}?", definition.name);
            if !app.non_interactive && !app.confirm(&prompt, false)? {
                app.output.info("Aborted.");
                return Ok(ExitCode::SUCCESS);
            }
            let session = app.session()?;
            let store = StateStore::spawn();
            AdminActions::new(&session, &store)
                .delete_user(definition, &name, account_host.as_deref())
                .await?;
            super::finish_action(app, &store).await
        }
    }
}
