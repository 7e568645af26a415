//! `hostkit version`

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;

/// Target triple recorded by the build script.
pub const BUILD_TARGET: &str = env!("HOSTKIT_BUILD_TARGET");

/// Run the version command.
///
/// # Errors
///
/// Returns an error if JSON rendering fails.
pub fn run(app: &AppContext) -> Result<ExitCode> {
    app.renderer()
        .render_version(env!("CARGO_PKG_VERSION"), BUILD_TARGET)?;
    Ok(ExitCode::SUCCESS)
}
