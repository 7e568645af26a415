//! Renderers for command results.
//!
//! [`Renderer`] picks between the human terminal view and the `--json`
//! document. Commands hand it domain data and never print directly, except
//! through `OutputContext` helpers for progress and hints.

use std::path::Path;

use anyhow::Result;
use hostkit_common::ApplicationState;
use owo_colors::OwoColorize as _;
use serde_json::json;

use crate::application::session::{DetectedSoftware, Platform};
use crate::domain::{ApplicationDefinition, HostkitConfig, SectionDefinition, SoftwareId};
use crate::output::sections::{render_banner, render_section};
use crate::output::{OutputContext, json};

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    pub fn render_version(&self, version: &str, target: &str) {
        if self.ctx.quiet {
            return;
        }
        println!("hostkit {version} ({target})");
    }

    /// Render the application catalog.
    pub fn render_apps(&self, apps: &[ApplicationDefinition]) {
        let width = apps.iter().map(|a| a.id.len()).max().unwrap_or(0);
        for app in apps {
            let sections: Vec<&str> = app
                .sorted_sections()
                .into_iter()
                .map(|s| s.id.as_str())
                .collect();
            println!(
                "  {}  {:<22} {}",
                format!("{:<width$}", app.id).style(self.ctx.styles.bold),
                app.name,
                sections.join(", ").style(self.ctx.styles.dim),
            );
        }
    }

    /// Render the detection summary for one host.
    pub fn render_detect(
        &self,
        target: &str,
        platform: &Platform,
        detected: &[(SoftwareId, DetectedSoftware)],
    ) {
        self.ctx.header(&format!("Software on {target}"));
        let os = platform
            .release
            .pretty_name
            .clone()
            .unwrap_or_else(|| platform.release.id.clone());
        self.ctx.kv("OS:", &os);
        self.ctx.kv("Packages:", platform.package_manager.as_str());
        if !platform.recognized {
            self.ctx
                .warn("Unrecognized distribution; package commands assume apt.");
        }
        println!();
        for (id, software) in detected {
            let spec = id.spec();
            if software.detection.is_installed() {
                let stage = software
                    .detection
                    .matched_stage
                    .map_or("", |stage| stage.as_str());
                let version = software.version.as_deref().unwrap_or("unknown version");
                println!(
                    "  {} {:<12} {:<16} {}",
                    "✓".style(self.ctx.styles.success),
                    spec.flavor_name(&software.descriptor),
                    version,
                    format!("unit {} · via {stage}", software.descriptor.canonical_name)
                        .style(self.ctx.styles.dim),
                );
            } else {
                println!(
                    "  {} {:<12} {}",
                    "·".style(self.ctx.styles.dim),
                    spec.display_name,
                    "not installed".style(self.ctx.styles.dim),
                );
            }
        }
    }

    /// Render one loaded section: title, banner, body.
    pub fn render_section(
        &self,
        app: &ApplicationDefinition,
        section: &SectionDefinition,
        state: &ApplicationState,
    ) {
        self.ctx.header(&format!("{} › {}", app.name, section.name));
        for line in render_banner(&self.ctx.styles, state) {
            println!("  {line}");
        }
        println!();
        self.ctx
            .lines(&render_section(&self.ctx.styles, section.provider_type, state));
    }

    /// Render the outcome of an action. Errors go to stderr.
    pub fn render_action(&self, state: &ApplicationState) {
        if let Some(error) = &state.error_message {
            self.ctx.error(error);
        }
        if let Some(success) = &state.success_message {
            self.ctx.success(success);
        }
    }

    /// Render the current hostkit configuration.
    pub fn render_config(&self, config: &HostkitConfig, path: &Path) {
        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.header)
        );
        println!();
        println!("  {:<24} {}", "timeouts.command_secs:", config.timeouts.command_secs);
        println!("  {:<24} {}", "timeouts.install_secs:", config.timeouts.install_secs);
        println!("  {:<24} {}", "timeouts.settle_secs:", config.timeouts.settle_secs);
        if !config.hosts.is_empty() {
            println!();
            println!("  {}", "Hosts:".style(self.ctx.styles.bold));
            for (name, entry) in &config.hosts {
                let mut dest = match &entry.user {
                    Some(user) => format!("{user}@{}", entry.host),
                    None => entry.host.clone(),
                };
                if let Some(port) = entry.port {
                    dest.push_str(&format!(":{port}"));
                }
                println!("    {name:<18} {dest}");
            }
        }
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.bold));
        for var in ["HOSTKIT_CONFIG", "NO_COLOR", "RUST_LOG"] {
            println!(
                "    {:<18} {}",
                format!("{var}:"),
                std::env::var(var).unwrap_or_else(|_| "(not set)".to_string())
            );
        }
        println!();
    }
}

/// Renders the same data as single JSON documents on stdout.
pub struct JsonRenderer;

impl JsonRenderer {
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_version(version: &str, target: &str) -> Result<()> {
        json::print(&json!({ "version": version, "target": target }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_apps(apps: &[ApplicationDefinition]) -> Result<()> {
        json::print(apps)
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_detect(
        target: &str,
        platform: &Platform,
        detected: &[(SoftwareId, DetectedSoftware)],
    ) -> Result<()> {
        let software: Vec<_> = detected
            .iter()
            .map(|(id, d)| {
                json!({
                    "id": id,
                    "name": id.spec().flavor_name(&d.descriptor),
                    "installed": d.detection.is_installed(),
                    "detection": d.detection,
                    "service": d.descriptor,
                    "version": d.version,
                })
            })
            .collect();
        json::print(&json!({
            "target": target,
            "os": {
                "id": platform.release.id,
                "id_like": platform.release.id_like,
                "version_id": platform.release.version_id,
                "pretty_name": platform.release.pretty_name,
            },
            "package_manager": platform.package_manager.as_str(),
            "package_manager_recognized": platform.recognized,
            "software": software,
        }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_section(
        app: &ApplicationDefinition,
        section: &SectionDefinition,
        state: &ApplicationState,
    ) -> Result<()> {
        json::print(&json!({
            "app": app.id,
            "section": section.id,
            "provider": section.provider_type,
            "state": state,
        }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_action(state: &ApplicationState) -> Result<()> {
        json::print(&json!({
            "ok": state.error_message.is_none(),
            "message": state.error_message.as_ref().or(state.success_message.as_ref()),
        }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_config(config: &HostkitConfig, path: &Path) -> Result<()> {
        json::print(&json!({ "path": path, "config": config }))
    }
}

/// Output-mode dispatch used by every command.
pub enum Renderer<'a> {
    Human(HumanRenderer<'a>),
    Json(JsonRenderer),
}

impl Renderer<'_> {
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_version(&self, version: &str, target: &str) -> Result<()> {
        match self {
            Renderer::Human(r) => {
                r.render_version(version, target);
                Ok(())
            }
            Renderer::Json(_) => JsonRenderer::render_version(version, target),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_apps(&self, apps: &[ApplicationDefinition]) -> Result<()> {
        match self {
            Renderer::Human(r) => {
                r.render_apps(apps);
                Ok(())
            }
            Renderer::Json(_) => JsonRenderer::render_apps(apps),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_detect(
        &self,
        target: &str,
        platform: &Platform,
        detected: &[(SoftwareId, DetectedSoftware)],
    ) -> Result<()> {
        match self {
            Renderer::Human(r) => {
                r.render_detect(target, platform, detected);
                Ok(())
            }
            Renderer::Json(_) => JsonRenderer::render_detect(target, platform, detected),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_section(
        &self,
        app: &ApplicationDefinition,
        section: &SectionDefinition,
        state: &ApplicationState,
    ) -> Result<()> {
        match self {
            Renderer::Human(r) => {
                r.render_section(app, section, state);
                Ok(())
            }
            Renderer::Json(_) => JsonRenderer::render_section(app, section, state),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_action(&self, state: &ApplicationState) -> Result<()> {
        match self {
            Renderer::Human(r) => {
                r.render_action(state);
                Ok(())
            }
            Renderer::Json(_) => JsonRenderer::render_action(state),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_config(&self, config: &HostkitConfig, path: &Path) -> Result<()> {
        match self {
            Renderer::Human(r) => {
                r.render_config(config, path);
                Ok(())
            }
            Renderer::Json(_) => JsonRenderer::render_config(config, path),
        }
    }
}
