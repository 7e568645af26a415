//! Application service — configuration use-cases.

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::config::{HostEntry, HostkitConfig, validate_host_name};

/// Load configuration and check every host alias.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a host alias is invalid.
pub fn load_config(store: &impl ConfigStore) -> Result<HostkitConfig> {
    let config = store.load()?;
    for name in config.hosts.keys() {
        validate_host_name(name).context("invalid entry under `hosts:`")?;
    }
    Ok(config)
}

/// Save configuration.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_config(store: &impl ConfigStore, config: &HostkitConfig) -> Result<()> {
    store.save(config)
}

/// Validate `key=value`, apply it and persist the result.
///
/// # Errors
///
/// Returns an error if the key or value is invalid or the save fails.
pub fn set_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<HostkitConfig> {
    let mut config = load_config(store)?;
    config.set(key, value)?;
    save_config(store, &config)?;
    Ok(config)
}

/// Resolve `--host` against the configured aliases.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or the host is unknown.
pub fn resolve_host(store: &impl ConfigStore, name_or_addr: &str) -> Result<(HostkitConfig, HostEntry)> {
    let config = load_config(store)?;
    let entry = config.resolve_host(name_or_addr)?;
    Ok((config, entry))
}

/// Add or replace a named host.
///
/// # Errors
///
/// Returns an error if the alias or address is invalid or the save fails.
pub fn add_host(store: &impl ConfigStore, name: &str, entry: HostEntry) -> Result<HostkitConfig> {
    validate_host_name(name)?;
    // The address itself must survive the same check `--host` applies.
    let probe = HostkitConfig::default().resolve_host(&entry.host)?;
    anyhow::ensure!(
        probe.user.is_none(),
        "put the user in --user, not in the address"
    );
    let mut config = load_config(store)?;
    config.hosts.insert(name.to_string(), entry);
    save_config(store, &config)?;
    Ok(config)
}

/// Remove a named host. Returns whether it existed.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or saved.
pub fn remove_host(store: &impl ConfigStore, name: &str) -> Result<bool> {
    let mut config = load_config(store)?;
    let existed = config.hosts.remove(name).is_some();
    if existed {
        save_config(store, &config)?;
    }
    Ok(existed)
}
