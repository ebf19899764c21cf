#![forbid(unsafe_code)]

//! File-name validation, sanitization and generation.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use crate::file_type::FileType;

const INVALID_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
const MAX_TITLE_CHARS: usize = 50;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// A name is valid when it is not blank and has no reserved characters.
#[must_use]
pub fn validate_file_name(name: &str) -> bool {
    !name.trim().is_empty() && !name.contains(INVALID_CHARS)
}

/// Drop reserved characters, turn whitespace runs into `_`, then trim.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let kept: String = name.chars().filter(|c| !INVALID_CHARS.contains(c)).collect();
    WHITESPACE_RUN.replace_all(&kept, "_").trim().to_string()
}

/// Suggest a file name for `content`.
///
/// The first non-blank line (tags stripped, at most 50 chars) becomes a
/// lowercase, sanitized title. Without one, a `note_YYYY-MM-DD_HH-MM`
/// timestamp taken from `now` is used. The type's default extension is
/// appended.
#[must_use]
pub fn generate_file_name(content: &str, file_type: FileType, now: NaiveDateTime) -> String {
    let title = content
        .lines()
        .find(|line| !line.trim().is_empty())
        .map(|line| {
            let stripped = TAG.replace_all(line, "");
            let clipped: String = stripped.trim().chars().take(MAX_TITLE_CHARS).collect();
            sanitize_file_name(&clipped).to_lowercase()
        })
        .unwrap_or_default();

    let title = if title.is_empty() {
        format!("note_{}", now.format("%Y-%m-%d_%H-%M"))
    } else {
        title
    };
    format!("{title}.{}", file_type.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, 4)
            .and_then(|d| d.and_hms_opt(12, 30, 0))
            .unwrap()
    }

    #[test]
    fn rejects_blank_and_reserved() {
        assert!(validate_file_name("notes.html"));
        assert!(!validate_file_name("   "));
        assert!(!validate_file_name("a/b"));
        assert!(!validate_file_name("what?"));
    }

    #[test]
    fn sanitize_strips_and_underscores() {
        assert_eq!(sanitize_file_name("my <draft>: v2"), "my_draft_v2");
        assert_eq!(sanitize_file_name("a   b\tc"), "a_b_c");
    }

    #[test]
    fn title_comes_from_first_line_without_tags() {
        let content = "\n<h1>Shopping List</h1>\n<p>eggs</p>";
        assert_eq!(
            generate_file_name(content, FileType::Html, noon()),
            "shopping_list.html"
        );
    }

    #[test]
    fn long_titles_are_clipped() {
        let content = "x".repeat(80);
        let name = generate_file_name(&content, FileType::Txt, noon());
        assert_eq!(name, format!("{}.txt", "x".repeat(50)));
    }

    #[test]
    fn falls_back_to_timestamp() {
        assert_eq!(
            generate_file_name("   \n<br>", FileType::Txt, noon()),
            "note_2024-07-04_12-30.txt"
        );
    }
}
