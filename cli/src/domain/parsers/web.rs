//! Web server site listings.

use std::collections::HashSet;

use hostkit_common::SiteInfo;

use super::content_lines;

/// Combine `ls -1` of the available and enabled site directories.
///
/// Sites present only in the enabled directory (hand-made symlinks or
/// files) are reported too.
#[must_use]
pub fn parse_sites(available: &str, enabled: &str) -> Vec<SiteInfo> {
    let enabled: Vec<&str> = content_lines(enabled).map(str::trim).collect();
    let enabled_set: HashSet<&str> = enabled.iter().copied().collect();

    let mut seen = HashSet::new();
    let mut sites: Vec<SiteInfo> = content_lines(available)
        .map(str::trim)
        .filter(|name| seen.insert(*name))
        .map(|name| SiteInfo {
            name: name.to_string(),
            enabled: enabled_set.contains(name),
        })
        .collect();

    for name in enabled {
        if seen.insert(name) {
            sites.push(SiteInfo {
                name: name.to_string(),
                enabled: true,
            });
        }
    }
    sites
}

/// Sites from a single include directory where every file is active
/// (`conf.d` layouts on RPM distributions). Only `*.conf` files count.
#[must_use]
pub fn parse_conf_d(listing: &str) -> Vec<SiteInfo> {
    content_lines(listing)
        .map(str::trim)
        .filter(|name| name.ends_with(".conf"))
        .map(|name| SiteInfo {
            name: name.to_string(),
            enabled: true,
        })
        .collect()
}
