//! Host resource output: `/proc/loadavg`, `free -b`, `df -P -B1`, `/proc/uptime`.

use hostkit_common::DiskUsage;

use super::content_lines;

/// First three fields of `/proc/loadavg`.
#[must_use]
pub fn parse_loadavg(text: &str) -> Option<[f64; 3]> {
    let mut fields = text.split_whitespace().map(str::parse::<f64>);
    Some([
        fields.next()?.ok()?,
        fields.next()?.ok()?,
        fields.next()?.ok()?,
    ])
}

/// Whole seconds from `/proc/uptime`.
#[must_use]
pub fn parse_uptime(text: &str) -> Option<u64> {
    let secs: f64 = text.split_whitespace().next()?.parse().ok()?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(secs.max(0.0) as u64)
}

/// Memory totals from `free -b`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryUsage {
    pub total: u64,
    pub used: u64,
    pub available: u64,
    pub swap_total: u64,
    pub swap_used: u64,
}

/// Parse the `Mem:` and `Swap:` rows of `free -b`. Older procps without an
/// `available` column report `free` in its place.
#[must_use]
pub fn parse_free(text: &str) -> Option<MemoryUsage> {
    let mut usage = MemoryUsage::default();
    let mut saw_mem = false;
    for line in content_lines(text) {
        let cols: Vec<u64> = line
            .split_whitespace()
            .skip(1)
            .filter_map(|c| c.parse().ok())
            .collect();
        if line.starts_with("Mem:") && cols.len() >= 3 {
            usage.total = cols[0];
            usage.used = cols[1];
            usage.available = cols.get(5).copied().unwrap_or(cols[2]);
            saw_mem = true;
        } else if line.starts_with("Swap:") && cols.len() >= 2 {
            usage.swap_total = cols[0];
            usage.swap_used = cols[1];
        }
    }
    saw_mem.then_some(usage)
}

/// Parse `df -P -B1` rows. Mount points may contain spaces.
#[must_use]
pub fn parse_df(text: &str) -> Vec<DiskUsage> {
    content_lines(text)
        .skip_while(|l| l.starts_with("Filesystem"))
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() < 6 {
                return None;
            }
            Some(DiskUsage {
                filesystem: cols[0].to_string(),
                total_bytes: cols[1].parse().ok()?,
                used_bytes: cols[2].parse().ok()?,
                available_bytes: cols[3].parse().ok()?,
                mount_point: cols[5..].join(" "),
            })
        })
        .collect()
}
