//! Pure parsers from raw tool output to structured rows.
//!
//! Each parser takes the captured text of one remote command and returns
//! rows for the application state. Parsers never fail: unparseable lines
//! are skipped, so garbage input yields an empty result.

pub mod files;
pub mod mysql;
pub mod postgres;
pub mod redis;
pub mod system;
pub mod web;

/// Lines with trailing `\r` removed; blank lines dropped.
fn content_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.trim().is_empty())
}
