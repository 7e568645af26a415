//! Command implementations

pub mod apps;
pub mod config;
pub mod db;
pub mod detect;
pub mod packages;
pub mod service;
pub mod set;
pub mod show;
pub mod site;
pub mod user;
pub mod version;

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::StateStore;
use crate::domain::ApplicationDefinition;

/// Look up an application id from the command line.
///
/// # Errors
///
/// Returns `AdminError::ServiceNotFound` for ids missing from the catalog.
pub fn application<'a>(app: &'a AppContext, id: &str) -> Result<&'a ApplicationDefinition> {
    Ok(app.catalog.app(id)?)
}

/// Render the banner an action left on the state and map it to an exit code.
///
/// # Errors
///
/// Returns an error if the state task stopped or JSON rendering fails.
pub async fn finish_action(app: &AppContext, store: &StateStore) -> Result<ExitCode> {
    let state = store.snapshot().await?;
    app.renderer().render_action(&state)?;
    Ok(if state.error_message.is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
