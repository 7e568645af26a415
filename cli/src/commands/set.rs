//! `hostkit set` — change a live server setting.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::{AdminActions, StateStore};

/// Arguments for `hostkit set`.
#[derive(Args)]
pub struct SetArgs {
    /// Application id (redis)
    pub app: String,
    /// Setting name
    pub key: String,
    /// New value
    pub value: String,
}

/// # Errors
///
/// Returns an error for unknown applications, applications that cannot be
/// reconfigured live, or when no target is selected.
pub async fn run(app: &AppContext, args: SetArgs) -> Result<ExitCode> {
    let definition = super::application(app, &args.app)?;
    let session = app.session()?;
    let store = StateStore::spawn();
    AdminActions::new(&session, &store)
        .set_config(definition, &args.key, &args.value)
        .await?;
    super::finish_action(app, &store).await
}
