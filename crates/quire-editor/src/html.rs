#![forbid(unsafe_code)]

//! HTML codec for [`Document`].
//!
//! [`to_html`] writes the markup the editing surface stores on disk.
//! [`from_html`] reads that subset back: unknown tags are dropped while
//! their text is kept, entities are decoded and nested lists are flattened.
//! Whitespace at the start of a block is source indentation when it holds a
//! line break or tab, and content otherwise.

use std::fmt::Write as _;
use std::sync::LazyLock;

use html_escape::{decode_html_entities, encode_double_quoted_attribute, encode_text};
use regex::Regex;

use crate::model::{Alignment, Block, BlockKind, Document, Inline, InlineStyle, Mark, TextRun};

const TABLE_OPEN: &str = r#"<table border="1" style="border-collapse: collapse; width: 100%;">"#;
const CELL_OPEN: &str = r#"<td style="padding: 8px; border: 1px solid #ccc;">"#;

fn pattern(src: &str) -> Regex {
    Regex::new(src).expect("valid regex")
}

static TAG: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"<(/?)([a-zA-Z][a-zA-Z0-9]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#));
static ATTR: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r#"([a-zA-Z][a-zA-Z0-9_:-]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
});

// ============================================================================
// Serialization
// ============================================================================

/// Serialize a document. The blank document serializes to `""`.
#[must_use]
pub fn to_html(doc: &Document) -> String {
    if doc.is_blank() {
        return String::new();
    }

    let mut out = String::new();
    let mut open_list: Option<bool> = None;
    for block in doc.blocks() {
        let list = match block.kind {
            BlockKind::ListItem { ordered } => Some(ordered),
            _ => None,
        };
        if open_list != list {
            if let Some(ordered) = open_list {
                out.push_str(if ordered { "</ol>" } else { "</ul>" });
            }
            if let Some(ordered) = list {
                out.push_str(if ordered { "<ol>" } else { "<ul>" });
            }
            open_list = list;
        }
        write_block(&mut out, block);
    }
    if let Some(ordered) = open_list {
        out.push_str(if ordered { "</ol>" } else { "</ul>" });
    }
    out
}

fn write_block(out: &mut String, block: &Block) {
    match &block.kind {
        BlockKind::Paragraph => write_text_block(out, "p", block),
        BlockKind::Heading(level) => write_text_block(out, heading_tag(*level), block),
        BlockKind::ListItem { .. } => write_text_block(out, "li", block),
        BlockKind::HorizontalRule => out.push_str("<hr>"),
        BlockKind::Image { src, alt } => {
            let _ = write!(
                out,
                r#"<img src="{}" alt="{}" style="max-width: 100%;">"#,
                encode_double_quoted_attribute(src),
                encode_double_quoted_attribute(alt),
            );
        }
        BlockKind::Table { rows } => {
            out.push_str(TABLE_OPEN);
            for row in rows {
                out.push_str("<tr>");
                for cell in row {
                    out.push_str(CELL_OPEN);
                    if cell.is_empty() {
                        out.push_str("&nbsp;");
                    } else {
                        out.push_str(&encode_text(cell));
                    }
                    out.push_str("</td>");
                }
                out.push_str("</tr>");
            }
            out.push_str("</table>");
        }
    }
}

fn heading_tag(level: u8) -> &'static str {
    if level <= 1 { "h1" } else { "h2" }
}

fn write_text_block(out: &mut String, tag: &str, block: &Block) {
    out.push('<');
    out.push_str(tag);
    if block.align != Alignment::Left {
        let _ = write!(out, r#" style="text-align: {};""#, block.align.css());
    }
    out.push('>');
    for inline in &block.inlines {
        match inline {
            Inline::Text(run) => write_run(out, run),
            Inline::LineBreak => out.push_str("<br>"),
        }
    }
    let _ = write!(out, "</{tag}>");
}

fn write_run(out: &mut String, run: &TextRun) {
    let style = &run.style;
    if let Some(href) = &style.link {
        let _ = write!(out, r#"<a href="{}">"#, encode_double_quoted_attribute(href));
    }
    let marks = [(style.bold, "b"), (style.italic, "i"), (style.underline, "u")];
    for (_, tag) in marks.iter().filter(|(on, _)| *on) {
        let _ = write!(out, "<{tag}>");
    }
    out.push_str(&encode_text(&run.text));
    for (_, tag) in marks.iter().rev().filter(|(on, _)| *on) {
        let _ = write!(out, "</{tag}>");
    }
    if style.link.is_some() {
        out.push_str("</a>");
    }
}

// ============================================================================
// Parsing
// ============================================================================

type Attrs = Vec<(String, String)>;

fn parse_attrs(raw: &str) -> Attrs {
    ATTR.captures_iter(raw)
        .map(|caps| {
            let value = (2..=4)
                .find_map(|i| caps.get(i))
                .map_or("", |m| m.as_str());
            (
                caps[1].to_ascii_lowercase(),
                decode_html_entities(value).into_owned(),
            )
        })
        .collect()
}

fn attr<'a>(attrs: &'a Attrs, key: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn parse_alignment(attrs: &Attrs) -> Alignment {
    let from_style = attr(attrs, "style").and_then(|style| {
        style.split(';').find_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let is_align = prop.trim().eq_ignore_ascii_case("text-align");
            is_align.then(|| value.trim().to_ascii_lowercase())
        })
    });
    let value = from_style.or_else(|| attr(attrs, "align").map(str::to_ascii_lowercase));
    match value.as_deref() {
        Some("center") => Alignment::Center,
        Some("right") => Alignment::Right,
        _ => Alignment::Left,
    }
}

fn style_tag(name: &str) -> Option<Option<Mark>> {
    match name {
        "b" | "strong" => Some(Some(Mark::Bold)),
        "i" | "em" => Some(Some(Mark::Italic)),
        "u" => Some(Some(Mark::Underline)),
        "a" => Some(None),
        _ => None,
    }
}

/// Cells of a table being read.
#[derive(Default)]
struct TableBuilder {
    rows: Vec<Vec<String>>,
    row: Option<Vec<String>>,
    cell: Option<String>,
}

impl TableBuilder {
    fn finish_cell(&mut self) {
        if let Some(cell) = self.cell.take() {
            self.row.get_or_insert_with(Vec::new).push(cell.trim().to_string());
        }
    }

    fn finish_row(&mut self) {
        self.finish_cell();
        if let Some(row) = self.row.take() {
            self.rows.push(row);
        }
    }

    fn into_block(mut self) -> Block {
        self.finish_row();
        Block::new(BlockKind::Table { rows: self.rows })
    }
}

#[derive(Default)]
struct Builder {
    blocks: Vec<Block>,
    current: Option<Block>,
    /// Open style tags; `None` marks a link carrying its href.
    styles: Vec<(Option<Mark>, Option<String>)>,
    lists: Vec<bool>,
    in_item: bool,
    table: Option<TableBuilder>,
}

impl Builder {
    fn style(&self) -> InlineStyle {
        let mut style = InlineStyle::default();
        for (mark, href) in &self.styles {
            match mark {
                Some(mark) => style.set(*mark, true),
                None => style.link.clone_from(href),
            }
        }
        style
    }

    fn close_block(&mut self) {
        if let Some(mut block) = self.current.take() {
            block.normalize();
            self.blocks.push(block);
        }
    }

    fn open_block(&mut self, kind: BlockKind, attrs: &Attrs) {
        self.close_block();
        self.current = Some(Block::new(kind).with_align(parse_alignment(attrs)));
    }

    fn push_inline(&mut self, inline: Inline) {
        self.current
            .get_or_insert_with(Block::paragraph)
            .inlines
            .push(inline);
    }

    fn text(&mut self, raw: &str) {
        if let Some(table) = &mut self.table {
            if let Some(cell) = &mut table.cell {
                cell.push_str(raw);
            }
            return;
        }
        let mut text = raw;
        if self.current.as_ref().is_none_or(|b| b.inlines.is_empty()) {
            let body = raw.trim_start();
            let indent = &raw[..raw.len() - body.len()];
            if self.current.is_none() || indent.contains(['\n', '\r', '\t']) {
                text = body;
            }
        }
        if text.is_empty() {
            return;
        }
        let run = TextRun::new(text.replace(['\n', '\r', '\t'], " "), self.style());
        self.push_inline(Inline::Text(run));
    }

    fn start(&mut self, name: &str, attrs: &Attrs) {
        if let Some(table) = &mut self.table {
            match name {
                "tr" => {
                    table.finish_row();
                    table.row = Some(Vec::new());
                }
                "td" | "th" => {
                    table.finish_cell();
                    table.cell = Some(String::new());
                }
                _ => {}
            }
            return;
        }
        if let Some(mark) = style_tag(name) {
            let href = mark.is_none().then(|| attr(attrs, "href").map(str::to_string));
            self.styles.push((mark, href.flatten()));
            return;
        }

        match name {
            "p" | "div" if self.in_item => {}
            "p" | "div" => self.open_block(BlockKind::Paragraph, attrs),
            "h1" => self.open_block(BlockKind::Heading(1), attrs),
            "h2" => self.open_block(BlockKind::Heading(2), attrs),
            "ul" | "ol" => {
                self.close_block();
                self.in_item = false;
                self.lists.push(name == "ol");
            }
            "li" => {
                let ordered = self.lists.last().copied().unwrap_or(false);
                self.open_block(BlockKind::ListItem { ordered }, attrs);
                self.in_item = true;
            }
            "br" => self.push_inline(Inline::LineBreak),
            "hr" => {
                self.close_block();
                self.blocks.push(Block::rule());
            }
            "img" => {
                self.close_block();
                let src = attr(attrs, "src").unwrap_or_default();
                let alt = attr(attrs, "alt").unwrap_or_default();
                self.blocks.push(Block::image(src, alt));
            }
            "table" => {
                self.close_block();
                self.table = Some(TableBuilder::default());
            }
            _ => {}
        }
    }

    fn end(&mut self, name: &str) {
        if let Some(table) = &mut self.table {
            match name {
                "td" | "th" => table.finish_cell(),
                "tr" => table.finish_row(),
                "table" => {
                    if let Some(table) = self.table.take() {
                        self.blocks.push(table.into_block());
                    }
                }
                _ => {}
            }
            return;
        }
        if let Some(mark) = style_tag(name) {
            if let Some(idx) = self.styles.iter().rposition(|(m, _)| *m == mark) {
                self.styles.truncate(idx);
            }
            return;
        }

        match name {
            "p" | "div" if self.in_item => {}
            "p" | "div" | "h1" | "h2" => self.close_block(),
            "li" | "ul" | "ol" => {
                self.close_block();
                self.in_item = false;
                if name != "li" {
                    self.lists.pop();
                }
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Document {
        if let Some(table) = self.table.take() {
            self.blocks.push(table.into_block());
        }
        self.close_block();
        Document::from_blocks(self.blocks)
    }
}

/// Parse editor HTML into a document.
///
/// Never fails; input without any block yields the blank document.
#[must_use]
pub fn from_html(html: &str) -> Document {
    let mut builder = Builder::default();
    let mut last = 0;
    for caps in TAG.captures_iter(html) {
        let Some(tag) = caps.get(0) else { continue };
        builder.text(&decode_html_entities(&html[last..tag.start()]));
        last = tag.end();
        let name = caps[2].to_ascii_lowercase();
        if caps[1].is_empty() {
            builder.start(&name, &parse_attrs(&caps[3]));
        } else {
            builder.end(&name);
        }
    }
    builder.text(&decode_html_entities(&html[last..]));
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bold(text: &str) -> Inline {
        Inline::Text(TextRun::new(
            text,
            InlineStyle {
                bold: true,
                ..InlineStyle::default()
            },
        ))
    }

    #[test]
    fn blank_document_is_empty_string() {
        assert_eq!(to_html(&Document::new()), "");
        assert_eq!(from_html(""), Document::new());
    }

    #[test]
    fn serializes_blocks() {
        let doc = Document::from_blocks(vec![
            Block::text("Title").with_kind(BlockKind::Heading(1)),
            Block::text("centered").with_align(Alignment::Center),
            Block::rule(),
            Block::image("a.png", "pic"),
        ]);
        assert_eq!(
            to_html(&doc),
            concat!(
                "<h1>Title</h1>",
                r#"<p style="text-align: center;">centered</p>"#,
                "<hr>",
                r#"<img src="a.png" alt="pic" style="max-width: 100%;">"#,
            )
        );
    }

    #[test]
    fn groups_list_items() {
        let item = |t: &str, ordered| Block::text(t).with_kind(BlockKind::ListItem { ordered });
        let doc = Document::from_blocks(vec![
            item("a", false),
            item("b", false),
            item("c", true),
            Block::text("d"),
        ]);
        assert_eq!(
            to_html(&doc),
            "<ul><li>a</li><li>b</li></ul><ol><li>c</li></ol><p>d</p>"
        );
    }

    #[test]
    fn serializes_table_with_placeholder_cells() {
        let doc = Document::from_blocks(vec![Block::table(1, 2)]);
        let html = to_html(&doc);
        assert!(html.starts_with(TABLE_OPEN));
        assert_eq!(html.matches("&nbsp;").count(), 2);
        assert_eq!(from_html(&html), doc);
    }

    #[test]
    fn serializes_nested_inline_styles() {
        let run = TextRun::new(
            "x<y",
            InlineStyle {
                bold: true,
                italic: true,
                underline: true,
                link: Some("https://a.b/?q=\"1\"".into()),
            },
        );
        let doc = Document::from_blocks(vec![
            Block::paragraph().with_inlines(vec![Inline::Text(run), Inline::LineBreak]),
        ]);
        let html = to_html(&doc);
        assert_eq!(
            html,
            r#"<p><a href="https://a.b/?q=&quot;1&quot;"><b><i><u>x&lt;y</u></i></b></a><br></p>"#
        );
        assert_eq!(from_html(&html), doc);
    }

    #[test]
    fn parses_browser_markup() {
        let html = "<div>Hello <strong>big</strong>\n world</div>\
                    <ul>\n  <li><p>one</p></li>\n  <li>two<ul><li>nested</li></ul></li>\n</ul>";
        let doc = from_html(html);
        let blocks = doc.blocks();
        assert_eq!(blocks.len(), 4);
        assert_eq!(
            blocks[0].inlines,
            vec![
                Inline::Text(TextRun::plain("Hello ")),
                bold("big"),
                Inline::Text(TextRun::plain("  world")),
            ]
        );
        assert_eq!(blocks[1].inline_text(), "one");
        assert_eq!(blocks[2].inline_text(), "two");
        assert_eq!(blocks[3].inline_text(), "nested");
        assert!(
            blocks[1..]
                .iter()
                .all(|b| b.kind == BlockKind::ListItem { ordered: false })
        );
    }

    #[test]
    fn unknown_tags_keep_text_and_entities_decode() {
        let doc = from_html("<section><span class=x>a &amp; b</span></section>");
        assert_eq!(doc.blocks(), &[Block::text("a & b")]);
        let doc = from_html("<h3>deep</h3>");
        assert_eq!(doc.blocks(), &[Block::text("deep")]);
    }

    #[test]
    fn stray_angle_bracket_is_text() {
        assert_eq!(from_html("<p>1 < 2</p>").plain_text(), "1 < 2");
    }

    #[test]
    fn typed_leading_space_survives_indentation_does_not() {
        let doc = Document::from_blocks(vec![Block::text("x"), Block::text(" ")]);
        let html = to_html(&doc);
        assert_eq!(html, "<p>x</p><p> </p>");
        assert_eq!(from_html(&html), doc);
        assert_eq!(from_html("<p>\n    x</p>").blocks(), &[Block::text("x")]);
        assert_eq!(from_html("<p>a</p> <p>b</p>").blocks().len(), 2);
    }

    #[test]
    fn alignment_from_attribute_or_style() {
        let doc = from_html(r#"<p align="right">r</p><h2 style="color: red; TEXT-ALIGN: Center">c</h2>"#);
        assert_eq!(doc.blocks()[0].align, Alignment::Right);
        assert_eq!(doc.blocks()[1].align, Alignment::Center);
        assert_eq!(doc.blocks()[1].kind, BlockKind::Heading(2));
    }

    #[test]
    fn inline_image_splits_paragraph() {
        let doc = from_html(r#"<p>before<img src='x.png'>after</p>"#);
        assert_eq!(
            doc.blocks(),
            &[Block::text("before"), Block::image("x.png", ""), Block::text("after")]
        );
    }

    #[test]
    fn unterminated_table_is_kept() {
        let doc = from_html("<table><tr><td> a </td><td>b");
        assert_eq!(
            doc.blocks(),
            &[Block::new(BlockKind::Table {
                rows: vec![vec!["a".into(), "b".into()]]
            })]
        );
    }
}
