//! `hostkit service` — start, stop, restart, reload, enable or disable.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::{AdminActions, StateStore};
use crate::domain::ServiceAction;
use crate::output::progress;

/// Arguments for `hostkit service`.
#[derive(Args)]
pub struct ServiceArgs {
    /// Application id
    pub app: String,

    /// Action to perform
    #[arg(value_enum)]
    pub action: ServiceAction,
}

/// # Errors
///
/// Returns an error for unknown applications, applications without a
/// controllable service, or when no target is selected.
pub async fn run(app: &AppContext, args: ServiceArgs) -> Result<ExitCode> {
    let definition = super::application(app, &args.app)?;
    let session = app.session()?;
    let store = StateStore::spawn();

    let pb = progress::maybe_spinner(
        app.show_progress(),
        &format!("Running {} on {}...", args.action, definition.name),
    );
    AdminActions::new(&session, &store)
        .service_action(definition, args.action)
        .await?;
    progress::finish_clear(&pb);

    super::finish_action(app, &store).await
}
