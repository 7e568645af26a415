//! `hostkit detect` — probe the target for every known software.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::Executor;
use crate::application::services::detector;
use crate::output::progress;

/// # Errors
///
/// Returns an error if no target is selected or rendering fails.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let session = app.session()?;
    let target = session.executor().target();

    let pb = progress::maybe_spinner(app.show_progress(), &format!("Probing {target}..."));
    let detected = detector::detect_all(&session).await;
    let platform = session.platform().await.clone();
    progress::finish_clear(&pb);

    app.renderer().render_detect(&target, &platform, &detected)?;
    Ok(ExitCode::SUCCESS)
}
