//! `hostkit install`, `hostkit remove` and `hostkit refresh`.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::{AdminActions, StateStore};
use crate::output::progress;
use crate::output::reporter::{LogReporter, TerminalReporter};

/// Arguments for `hostkit install`.
#[derive(Args)]
pub struct InstallArgs {
    /// Application id
    pub app: String,
}

/// Arguments for `hostkit remove`.
#[derive(Args)]
pub struct RemoveArgs {
    /// Application id
    pub app: String,

    /// Also delete configuration and data files
    #[arg(long)]
    pub purge: bool,
}

/// # Errors
///
/// Returns an error for unknown or uncontrollable applications, or when no
/// target is selected.
pub async fn install(app: &AppContext, args: InstallArgs) -> Result<ExitCode> {
    let definition = super::application(app, &args.app)?;
    let session = app.session()?;
    let store = StateStore::spawn();
    let actions = AdminActions::new(&session, &store);

    if app.is_json() {
        actions.install(definition, &LogReporter).await?;
    } else {
        actions
            .install(definition, &TerminalReporter::new(&app.output))
            .await?;
    }
    super::finish_action(app, &store).await
}

/// # Errors
///
/// Returns an error for unknown or uncontrollable applications, or when no
/// target is selected.
pub async fn remove(app: &AppContext, args: RemoveArgs) -> Result<ExitCode> {
    let definition = super::application(app, &args.app)?;
    let prompt = if args.purge {
        format!("Remove {} and delete its data?", definition.name)
    } else {
        format!("Remove {}?", definition.name)
    };
    if !app.non_interactive && !app.confirm(&prompt, false)? {
        app.output.info("Aborted.");
        return Ok(ExitCode::SUCCESS);
    }

    let session = app.session()?;
    let store = StateStore::spawn();
    let actions = AdminActions::new(&session, &store);

    if app.is_json() {
        actions.uninstall(definition, args.purge, &LogReporter).await?;
    } else {
        actions
            .uninstall(definition, args.purge, &TerminalReporter::new(&app.output))
            .await?;
    }
    super::finish_action(app, &store).await
}

/// # Errors
///
/// Returns an error when no target is selected.
pub async fn refresh(app: &AppContext) -> Result<ExitCode> {
    let session = app.session()?;
    let store = StateStore::spawn();

    let pb = progress::maybe_spinner(app.show_progress(), "Refreshing package index...");
    AdminActions::new(&session, &store).refresh_packages().await?;
    progress::finish_clear(&pb);

    super::finish_action(app, &store).await
}
