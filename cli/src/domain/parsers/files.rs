//! `ls -lA --time-style=+%s` directory listings.

use chrono::DateTime;
use hostkit_common::{FileEntry, FileKind};

use super::content_lines;

/// Split off the first `n` whitespace-separated fields and return them with
/// the untouched remainder of the line (file names may contain spaces).
fn split_fields(line: &str, n: usize) -> Option<(Vec<&str>, &str)> {
    let mut fields = Vec::with_capacity(n);
    let mut rest = line.trim_start();
    for _ in 0..n {
        let end = rest.find(char::is_whitespace)?;
        fields.push(&rest[..end]);
        rest = rest[end..].trim_start();
    }
    Some((fields, rest))
}

fn kind_from_mode(mode: &str) -> FileKind {
    match mode.chars().next() {
        Some('-') => FileKind::File,
        Some('d') => FileKind::Directory,
        Some('l') => FileKind::Symlink,
        _ => FileKind::Other,
    }
}

/// Parse one listing. The `total` line and unparseable rows are skipped.
///
/// Device nodes print `major, minor` in the size column; their size is
/// reported as 0.
#[must_use]
pub fn parse_listing(text: &str) -> Vec<FileEntry> {
    content_lines(text)
        .filter(|l| !l.starts_with("total "))
        .filter_map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Option<FileEntry> {
    let (head, _) = split_fields(line, 5)?;
    let is_device = head[4].ends_with(',');
    let field_count = if is_device { 7 } else { 6 };
    let (fields, name_part) = split_fields(line, field_count)?;

    let permissions = fields[0];
    let size_bytes = if is_device {
        0
    } else {
        fields[4].parse().ok()?
    };
    let epoch: i64 = fields[field_count - 1].parse().ok()?;
    let kind = kind_from_mode(permissions);

    let (name, link_target) = match (kind, name_part.split_once(" -> ")) {
        (FileKind::Symlink, Some((name, target))) => (name, Some(target.to_string())),
        _ => (name_part, None),
    };
    if name.is_empty() {
        return None;
    }

    Some(FileEntry {
        name: name.to_string(),
        kind,
        size_bytes,
        permissions: permissions.to_string(),
        owner: fields[2].to_string(),
        group: fields[3].to_string(),
        modified: DateTime::from_timestamp(epoch, 0),
        link_target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "total 24\n\
        drwxr-xr-x  2 root root     4096 1700000000 bin\n\
        lrwxrwxrwx  1 root root        7 1700000100 lib -> usr/lib\n\
        -rw-r--r--  1 www  www       220 1700000200 notes from ops.txt\n\
        crw-rw-rw-  1 root root     1, 3 1700000300 null\n";

    #[test]
    fn parses_every_kind() {
        let entries = parse_listing(LISTING);
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].kind, FileKind::Directory);
        assert_eq!(entries[1].kind, FileKind::Symlink);
        assert_eq!(entries[2].kind, FileKind::File);
        assert_eq!(entries[3].kind, FileKind::Other);
    }

    #[test]
    fn symlink_target_split() {
        let entries = parse_listing(LISTING);
        assert_eq!(entries[1].name, "lib");
        assert_eq!(entries[1].link_target.as_deref(), Some("usr/lib"));
    }

    #[test]
    fn names_keep_spaces() {
        let entries = parse_listing(LISTING);
        assert_eq!(entries[2].name, "notes from ops.txt");
        assert_eq!(entries[2].owner, "www");
        assert_eq!(entries[2].size_bytes, 220);
    }

    #[test]
    fn device_nodes_have_zero_size() {
        let entries = parse_listing(LISTING);
        assert_eq!(entries[3].name, "null");
        assert_eq!(entries[3].size_bytes, 0);
    }

    #[test]
    fn modified_from_epoch() {
        let entries = parse_listing(LISTING);
        let modified = entries[0].modified.expect("timestamp");
        assert_eq!(modified.timestamp(), 1_700_000_000);
    }

    #[test]
    fn error_output_yields_nothing() {
        assert!(parse_listing("ls: cannot access '/nope': No such file or directory").is_empty());
    }
}
