//! `hostkit apps` — list the applications hostkit can administer.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;

/// # Errors
///
/// Returns an error if JSON rendering fails.
pub fn run(app: &AppContext) -> Result<ExitCode> {
    app.renderer().render_apps(app.catalog.applications())?;
    Ok(ExitCode::SUCCESS)
}
