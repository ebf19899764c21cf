#![forbid(unsafe_code)]

//! HTML <-> plain text conversion.
//!
//! Used by the native side when a document is written as `.txt` (HTML is
//! flattened) or a `.txt` file is opened into the editor (text is wrapped in
//! paragraphs). The conversion is lossy by nature and only understands the
//! markup the editor itself produces.

use std::sync::LazyLock;

use regex::{Captures, Regex};

fn pattern(src: &str) -> Regex {
    Regex::new(src).expect("valid regex")
}

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| pattern(r"<[^>]*>"));
static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)<br\s*/?>"));
static SPACE_RUN: LazyLock<Regex> = LazyLock::new(|| pattern(r"[ \t]+"));
static NEWLINE_RUN: LazyLock<Regex> = LazyLock::new(|| pattern(r"\n{3,}"));

static DIV: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)</?div[^>]*>"));
static PARAGRAPH: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?is)<p[^>]*>(.*?)</p>"));
static PARAGRAPH_CLOSE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)</p>"));
static RULE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)<hr[^>]*>"));
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?is)<h([1-6])[^>]*>(.*?)</h[1-6]>"));

static UNORDERED: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?is)<ul[^>]*>(.*?)</ul>"));
static ORDERED: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?is)<ol[^>]*>(.*?)</ol>"));
static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?is)<li[^>]*>(.*?)</li>"));

/// Flatten editor HTML into readable plain text.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    let text = lists_to_text(html);
    let text = HEADING.replace_all(&text, "$2\n\n");
    let text = PARAGRAPH.replace_all(&text, "$1\n\n");
    let text = PARAGRAPH_CLOSE.replace_all(&text, "\n\n");
    let text = DIV.replace_all(&text, "\n");
    let text = LINE_BREAK.replace_all(&text, "\n");
    let text = RULE.replace_all(&text, "\n---\n");
    let text = HTML_TAG.replace_all(&text, "");
    let text = html_escape::decode_html_entities(&text);
    let text = SPACE_RUN.replace_all(&text, " ");
    let text = NEWLINE_RUN.replace_all(&text, "\n\n");

    text.lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn lists_to_text(html: &str) -> String {
    let text = UNORDERED.replace_all(html, |caps: &Captures<'_>| {
        let items: String = list_items(&caps[1])
            .map(|item| format!("• {item}\n"))
            .collect();
        format!("\n{}\n", items.trim_end())
    });
    ORDERED
        .replace_all(&text, |caps: &Captures<'_>| {
            let items: String = list_items(&caps[1])
                .enumerate()
                .map(|(idx, item)| format!("{}. {item}\n", idx + 1))
                .collect();
            format!("\n{}\n", items.trim_end())
        })
        .into_owned()
}

fn list_items(list: &str) -> impl Iterator<Item = &str> {
    LIST_ITEM
        .captures_iter(list)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim()))
        .filter(|item| !item.is_empty())
}

/// Wrap plain text into editor HTML.
///
/// Text is escaped; blank-line separated chunks become `<p>` elements and
/// single newlines inside a chunk become `<br>`.
#[must_use]
pub fn text_to_html(text: &str) -> String {
    let escaped = html_escape::encode_text(text);
    let paragraphs: Vec<&str> = escaped.split("\n\n").collect();

    if paragraphs.len() > 1 {
        paragraphs
            .iter()
            .filter(|p| !p.trim().is_empty())
            .map(|p| format!("<p>{}</p>", p.replace('\n', "<br>")))
            .collect()
    } else {
        format!("<p>{}</p>", escaped.replace('\n', "<br>"))
    }
}
