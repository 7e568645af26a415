//! Terminal output sanitization.
//!
//! Remote tools may colorize their output even when not attached to a TTY
//! (`systemctl` with `SYSTEMD_COLORS`, aliases forcing `--color`). Any string
//! comparison against remote output goes through [`sanitize_output`].

use std::sync::LazyLock;

use regex::Regex;

/// CSI sequences (`ESC [ ... letter`), OSC sequences terminated by BEL or
/// `ESC \`, and charset switches (`ESC ( B`).
#[allow(clippy::expect_used)] // Pattern is a compile-time constant
static ANSI_ESCAPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1B(?:\[[0-?]*[ -/]*[@-~]|\][^\x07\x1B]*(?:\x07|\x1B\\)|[()][A-Za-z0-9])")
        .expect("valid regex")
});

/// Remove ANSI escape sequences and any stray `ESC` characters.
#[must_use]
pub fn strip_ansi(raw: &str) -> String {
    ANSI_ESCAPE_RE.replace_all(raw, "").replace('\x1B', "")
}

/// Strip escapes, drop non-whitespace control characters and trim.
#[must_use]
pub fn sanitize_output(raw: &str) -> String {
    strip_ansi(raw)
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}
