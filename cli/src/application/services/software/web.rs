//! Nginx and Apache: configuration, syntax check and site toggling.

use hostkit_common::{ConfigFile, ConfigTest, SiteInfo};

use crate::application::ports::Executor;
use crate::application::session::{Session, classify};
use crate::domain::command::predicates;
use crate::domain::parsers::web as parse;
use crate::domain::sanitize::sanitize_output;
use crate::domain::{AdminError, CommandResult, SoftwareId, shell_quote};

/// Directory layout used for virtual hosts.
struct SiteLayout {
    available: &'static str,
    enabled: &'static str,
    /// Single include directory on RPM-based distributions.
    conf_d: &'static str,
}

const NGINX_LAYOUT: SiteLayout = SiteLayout {
    available: "/etc/nginx/sites-available",
    enabled: "/etc/nginx/sites-enabled",
    conf_d: "/etc/nginx/conf.d",
};

const APACHE_LAYOUT: SiteLayout = SiteLayout {
    available: "/etc/apache2/sites-available",
    enabled: "/etc/apache2/sites-enabled",
    conf_d: "/etc/httpd/conf.d",
};

/// Site names are file names: letters, digits, `.`, `_` and `-`, not
/// starting with a dot.
fn validate_site_name(name: &str) -> Result<(), AdminError> {
    let valid = !name.is_empty()
        && name.len() <= 255
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(AdminError::InvalidName(name.to_string()))
    }
}

fn list_command(dir: &str) -> String {
    format!("ls -1 {} 2>/dev/null", shell_quote(dir))
}

pub struct WebServerService<'a, E: Executor> {
    session: &'a Session<E>,
    id: SoftwareId,
}

impl<'a, E: Executor> WebServerService<'a, E> {
    /// Returns `None` for software that is not a web server.
    pub fn new(session: &'a Session<E>, id: SoftwareId) -> Option<Self> {
        matches!(id, SoftwareId::Nginx | SoftwareId::Apache).then_some(Self { session, id })
    }

    fn layout(&self) -> &'static SiteLayout {
        match self.id {
            SoftwareId::Apache => &APACHE_LAYOUT,
            _ => &NGINX_LAYOUT,
        }
    }

    async fn mutate(&self, command: &str) -> Result<(), AdminError> {
        classify(
            self.session.run(command).await,
            self.session.timeouts().command_secs,
        )
        .map(|_| ())
    }

    /// First readable main configuration file, if any.
    pub async fn config_file(&self) -> Option<ConfigFile> {
        for path in self.id.spec().config_paths {
            let result = self
                .session
                .run(&format!("sudo cat {} 2>/dev/null", shell_quote(path)))
                .await;
            if result.is_success() && !result.output.trim().is_empty() {
                return Some(ConfigFile {
                    path: (*path).to_string(),
                    content: result.output,
                });
            }
        }
        None
    }

    /// Syntax-check the configuration without reloading.
    pub async fn test_config(&self) -> ConfigTest {
        let (command, ok): (&str, fn(&CommandResult) -> bool) = match self.id {
            SoftwareId::Apache => (
                "sudo apachectl configtest 2>&1",
                predicates::apache_config_ok,
            ),
            _ => ("sudo nginx -t 2>&1", predicates::nginx_config_ok),
        };
        let result = self.session.run(command).await;
        ConfigTest {
            ok: ok(&result),
            output: sanitize_output(&result.output),
        }
    }

    /// Sites from `sites-available`/`sites-enabled`, or from `conf.d` when
    /// the split layout is absent.
    pub async fn list_sites(&self) -> Vec<SiteInfo> {
        let layout = self.layout();
        let available = self.session.run(&list_command(layout.available)).await;
        if available.is_success() {
            let enabled = self.session.run(&list_command(layout.enabled)).await;
            return parse::parse_sites(&available.output, &enabled.output);
        }
        let conf_d = self.session.run(&list_command(layout.conf_d)).await;
        parse::parse_conf_d(&conf_d.output)
    }

    /// # Errors
    ///
    /// Returns `InvalidName` for unsafe names or the classified failure.
    pub async fn enable_site(&self, name: &str) -> Result<(), AdminError> {
        validate_site_name(name)?;
        let command = match self.id {
            SoftwareId::Apache => format!("sudo a2ensite {}", shell_quote(name)),
            _ => {
                let layout = self.layout();
                format!(
                    "sudo ln -sfn {} {}",
                    shell_quote(&format!("{}/{name}", layout.available)),
                    shell_quote(&format!("{}/{name}", layout.enabled))
                )
            }
        };
        self.mutate(&command).await
    }

    /// # Errors
    ///
    /// Returns `InvalidName` for unsafe names or the classified failure.
    pub async fn disable_site(&self, name: &str) -> Result<(), AdminError> {
        validate_site_name(name)?;
        let command = match self.id {
            SoftwareId::Apache => format!("sudo a2dissite {}", shell_quote(name)),
            _ => format!(
                "sudo rm -f {}",
                shell_quote(&format!("{}/{name}", self.layout().enabled))
            ),
        };
        self.mutate(&command).await
    }
}
