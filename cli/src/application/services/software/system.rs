//! Host resources and file system browsing.

use hostkit_common::{FileEntry, FileKind, SystemStats};

use crate::application::ports::Executor;
use crate::application::session::Session;
use crate::domain::parsers::{files, system as parse};
use crate::domain::{AdminError, shell_quote};

const LOADAVG_COMMAND: &str = "cat /proc/loadavg";
const UPTIME_COMMAND: &str = "cat /proc/uptime";
const NPROC_COMMAND: &str = "nproc";
const FREE_COMMAND: &str = "free -b";
const DF_COMMAND: &str = "df -P -B1 -x tmpfs -x devtmpfs -x squashfs -x overlay 2>/dev/null";

/// Resource snapshot. The five probes run concurrently.
///
/// # Errors
///
/// Returns `ParseFailure` when `/proc/loadavg` or `free` output cannot be
/// read; missing disk or uptime data is left empty.
pub async fn stats(session: &Session<impl Executor>) -> Result<SystemStats, AdminError> {
    let (loadavg, uptime, nproc, free, df) = tokio::join!(
        session.run(LOADAVG_COMMAND),
        session.run(UPTIME_COMMAND),
        session.run(NPROC_COMMAND),
        session.run(FREE_COMMAND),
        session.run(DF_COMMAND),
    );

    if let Some(failure) = loadavg.failure() {
        return Err(failure.into_admin_error(session.timeouts().command_secs));
    }
    let load_average = parse::parse_loadavg(&loadavg.output).ok_or_else(|| {
        AdminError::ParseFailure {
            what: "/proc/loadavg".to_string(),
        }
    })?;
    let memory = parse::parse_free(&free.output).ok_or_else(|| AdminError::ParseFailure {
        what: "free output".to_string(),
    })?;

    Ok(SystemStats {
        load_average,
        cpu_count: nproc.clean_output().parse().unwrap_or(0),
        memory_total_bytes: memory.total,
        memory_used_bytes: memory.used,
        memory_available_bytes: memory.available,
        swap_total_bytes: memory.swap_total,
        swap_used_bytes: memory.swap_used,
        uptime_seconds: parse::parse_uptime(&uptime.output).unwrap_or(0),
        disks: parse::parse_df(&df.output),
    })
}

/// Entries of `path`, directories first, then by name.
///
/// # Errors
///
/// Returns `InvalidName` for relative paths, or the classified failure
/// (`ls` exits 2 for a missing directory).
pub async fn list_directory(
    session: &Session<impl Executor>,
    path: &str,
) -> Result<Vec<FileEntry>, AdminError> {
    if !path.starts_with('/') {
        return Err(AdminError::InvalidName(path.to_string()));
    }
    let out = session
        .query(&format!(
            "ls -lA --time-style=+%s -- {} 2>&1",
            shell_quote(path)
        ))
        .await?;
    let mut entries = files::parse_listing(&out);
    entries.sort_by(|a, b| {
        let rank = |e: &FileEntry| u8::from(e.kind != FileKind::Directory);
        rank(a).cmp(&rank(b)).then_with(|| a.name.cmp(&b.name))
    });
    Ok(entries)
}
