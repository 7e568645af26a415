//! `hostkit show` — load one section of an application and render it.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::Executor;
use crate::application::{LoadOutcome, Session, StateStore, load_section};
use crate::domain::{ApplicationDefinition, SectionDefinition};
use crate::output::progress;

/// Arguments for `hostkit show`.
#[derive(Args)]
pub struct ShowArgs {
    /// Application id (see `hostkit apps`)
    pub app: String,

    /// Section id; defaults to the application's default section
    pub section: Option<String>,

    /// Directory to list (file browser sections)
    #[arg(long)]
    pub path: Option<String>,

    /// Reload every N seconds until interrupted
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub watch: Option<u64>,
}

/// # Errors
///
/// Returns an error for unknown applications or sections, missing
/// capabilities, or when no target is selected.
pub async fn run(app: &AppContext, args: ShowArgs) -> Result<ExitCode> {
    let definition = super::application(app, &args.app)?;
    let section = resolve_section(definition, args.section.as_deref())?;
    let session = app.session()?;
    let store = StateStore::spawn();

    let Some(secs) = args.watch else {
        return load_and_render(app, &store, &session, definition, section, args.path).await;
    };

    let mut ticker = tokio::time::interval(Duration::from_secs(secs));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                load_and_render(app, &store, &session, definition, section, args.path.clone()).await?;
            }
            _ = tokio::signal::ctrl_c() => return Ok(ExitCode::SUCCESS),
        }
    }
}

/// Pick the requested section, or the application's default.
///
/// # Errors
///
/// Returns an error naming the valid section ids when `requested` is unknown.
pub fn resolve_section<'a>(
    app: &'a ApplicationDefinition,
    requested: Option<&str>,
) -> Result<&'a SectionDefinition> {
    match requested {
        Some(id) => app.section(id).with_context(|| {
            let ids: Vec<&str> = app.sorted_sections().iter().map(|s| s.id.as_str()).collect();
            format!(
                "Unknown section '{id}' for {}. Available: {}",
                app.id,
                ids.join(", ")
            )
        }),
        None => app
            .default_section()
            .with_context(|| format!("{} has no sections", app.id)),
    }
}

async fn load_and_render(
    app: &AppContext,
    store: &StateStore,
    session: &Session<impl Executor>,
    definition: &ApplicationDefinition,
    section: &SectionDefinition,
    path: Option<String>,
) -> Result<ExitCode> {
    let pb = progress::maybe_spinner(
        app.show_progress(),
        &format!("Loading {} › {}...", definition.name, section.name),
    );
    let outcome = load_section(store, session, definition, section, path).await?;
    progress::finish_clear(&pb);

    match outcome {
        LoadOutcome::Committed(_) => {
            let state = store.snapshot().await?;
            app.renderer().render_section(definition, section, &state)?;
            Ok(if state.error_message.is_some() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        LoadOutcome::Superseded => Ok(ExitCode::SUCCESS),
        LoadOutcome::Failed(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Catalog;

    #[test]
    fn default_section_when_none_requested() {
        let catalog = Catalog::builtin().expect("catalog");
        let redis = catalog.app("redis").expect("redis");
        assert_eq!(resolve_section(redis, None).expect("section").id, "overview");
    }

    #[test]
    fn unknown_section_lists_alternatives() {
        let catalog = Catalog::builtin().expect("catalog");
        let nginx = catalog.app("nginx").expect("nginx");
        let err = resolve_section(nginx, Some("databases")).expect_err("unknown");
        let msg = err.to_string();
        assert!(msg.contains("Unknown section 'databases'"));
        assert!(msg.contains("overview, sites, config, logs"));
    }
}
