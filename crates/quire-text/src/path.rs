#![forbid(unsafe_code)]

//! Path-string helpers.
//!
//! Paths arrive from the native side as plain strings in either Unix or
//! Windows form; these helpers split on both `/` and `\`.

use chrono::{DateTime, Utc};

/// Name shown for a document that has never been saved.
pub const DEFAULT_FILE_NAME: &str = "Untitled";

const TEXT_EXTENSIONS: [&str; 6] = ["txt", "html", "htm", "json", "xml", "csv"];

/// Last path segment, split on either separator.
#[must_use]
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Lowercased extension of the file name, or `""` when there is none.
#[must_use]
pub fn file_extension(path: &str) -> String {
    let name = file_name(path);
    match name.rfind('.') {
        Some(idx) => name[idx + 1..].to_lowercase(),
        None => String::new(),
    }
}

/// File name without its extension. Leading-dot names keep their dot.
#[must_use]
pub fn file_stem(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

/// Display name for a path: its file name, or [`DEFAULT_FILE_NAME`].
#[must_use]
pub fn display_name(path: &str) -> String {
    let name = file_name(path);
    if name.is_empty() {
        DEFAULT_FILE_NAME.to_string()
    } else {
        name.to_string()
    }
}

/// Whether the extension is one of the text formats the editor can show.
#[must_use]
pub fn is_text_file(path: &str) -> bool {
    let ext = file_extension(path);
    TEXT_EXTENSIONS.contains(&ext.as_str())
}

/// Whether `path` appears in `recent`.
#[must_use]
pub fn is_recent_file<S: AsRef<str>>(path: &str, recent: &[S]) -> bool {
    recent.iter().any(|p| p.as_ref() == path)
}

/// Backup file name: `<stem>_backup_<timestamp>.<ext>`.
///
/// The timestamp is the ISO-8601 instant with `:` and `.` replaced by `-`
/// so the result is a valid file name on every platform.
#[must_use]
pub fn backup_file_name(path: &str, now: DateTime<Utc>) -> String {
    let stem = file_stem(path);
    let ext = file_extension(path);
    let stamp = now
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
        .replace([':', '.'], "-");
    if ext.is_empty() {
        format!("{stem}_backup_{stamp}")
    } else {
        format!("{stem}_backup_{stamp}.{ext}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn file_name_handles_both_separators() {
        assert_eq!(file_name("/home/me/notes/a.html"), "a.html");
        assert_eq!(file_name(r"C:\Users\me\b.txt"), "b.txt");
        assert_eq!(file_name("plain"), "plain");
        assert_eq!(file_name("/trailing/"), "");
    }

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(file_extension("/a/B.HTML"), "html");
        assert_eq!(file_extension("/a/archive.tar.gz"), "gz");
        assert_eq!(file_extension("/a/noext"), "");
    }

    #[test]
    fn stem_drops_last_extension_only() {
        assert_eq!(file_stem("/a/archive.tar.gz"), "archive.tar");
        assert_eq!(file_stem("/a/.profile"), ".profile");
        assert_eq!(file_stem("/a/noext"), "noext");
    }

    #[test]
    fn display_name_defaults_to_untitled() {
        assert_eq!(display_name(""), "Untitled");
        assert_eq!(display_name("/d/n.html"), "n.html");
    }

    #[test]
    fn text_file_detection() {
        assert!(is_text_file("/a/b.CSV"));
        assert!(is_text_file("/a/b.htm"));
        assert!(!is_text_file("/a/b.png"));
        assert!(!is_text_file("/a/b"));
    }

    #[test]
    fn recent_membership() {
        let recent = vec!["/a.txt".to_string(), "/b.txt".to_string()];
        assert!(is_recent_file("/b.txt", &recent));
        assert!(!is_recent_file("/c.txt", &recent));
    }

    #[test]
    fn backup_name_embeds_sanitized_timestamp() {
        let now = Utc.with_ymd_and_hms(2025, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            backup_file_name("/notes/todo.txt", now),
            "todo_backup_2025-03-09T14-05-07-000Z.txt"
        );
        assert_eq!(
            backup_file_name("/notes/README", now),
            "README_backup_2025-03-09T14-05-07-000Z"
        );
    }
}
