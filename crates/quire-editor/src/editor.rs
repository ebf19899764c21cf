#![forbid(unsafe_code)]

//! Editing surface: a document plus a selection and the formatting commands
//! bound to the toolbar and menus.

use tracing::trace;

use crate::html::{from_html, to_html};
use crate::model::{Alignment, Block, BlockKind, Document, Mark, Position, Selection};
use crate::ops::{self, Edit};

/// Table size used by the toolbar button.
pub const DEFAULT_TABLE_SIZE: (usize, usize) = (3, 3);

/// Stateful editor over a [`Document`].
#[derive(Debug, Clone, Default)]
pub struct Editor {
    document: Document,
    selection: Selection,
    focused: bool,
}

impl Editor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Editor loaded with `html`, caret at the start.
    #[must_use]
    pub fn with_content(html: &str) -> Self {
        let mut editor = Self::new();
        editor.set_content(html);
        editor
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub fn selection(&self) -> Selection {
        self.selection
    }

    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    fn apply(&mut self, command: &'static str, edit: Edit) {
        trace!(command, blocks = edit.document.blocks().len(), "editor command");
        self.document = edit.document;
        self.selection = edit.selection;
    }

    // ------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------

    /// Replace the document with parsed `html`; the caret moves to the start.
    pub fn set_content(&mut self, html: &str) {
        self.document = from_html(html);
        self.selection = Selection::default();
        trace!(bytes = html.len(), "editor content replaced");
    }

    /// Current document as HTML.
    #[must_use]
    pub fn content(&self) -> String {
        to_html(&self.document)
    }

    pub fn clear(&mut self) {
        self.document = Document::new();
        self.selection = Selection::default();
        trace!("editor cleared");
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }

    #[must_use]
    pub fn plain_text(&self) -> String {
        self.document.plain_text()
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Set the selection, clamped into the document.
    pub fn select(&mut self, selection: Selection) {
        self.selection = Selection::new(
            self.document.clamp(selection.anchor),
            self.document.clamp(selection.head),
        );
    }

    pub fn select_all(&mut self) {
        self.selection = Selection::new(Position::default(), self.document.end());
    }

    #[must_use]
    pub fn selected_text(&self) -> String {
        ops::selected_text(&self.document, self.selection)
    }

    /// Replace the selection with `text`; the caret lands after it.
    pub fn replace_selected_text(&mut self, text: &str) {
        let edit = ops::insert_text(&self.document, self.selection, text);
        self.apply("replace_selected_text", edit);
    }

    pub fn insert_text(&mut self, text: &str) {
        let edit = ops::insert_text(&self.document, self.selection, text);
        self.apply("insert_text", edit);
    }

    // ------------------------------------------------------------------
    // Formatting
    // ------------------------------------------------------------------

    pub fn bold(&mut self) {
        let edit = ops::toggle_mark(&self.document, self.selection, Mark::Bold);
        self.apply("bold", edit);
    }

    pub fn italic(&mut self) {
        let edit = ops::toggle_mark(&self.document, self.selection, Mark::Italic);
        self.apply("italic", edit);
    }

    pub fn underline(&mut self) {
        let edit = ops::toggle_mark(&self.document, self.selection, Mark::Underline);
        self.apply("underline", edit);
    }

    pub fn make_title(&mut self) {
        let edit = ops::set_block_kind(&self.document, self.selection, &BlockKind::Heading(1));
        self.apply("make_title", edit);
    }

    pub fn make_subtitle(&mut self) {
        let edit = ops::set_block_kind(&self.document, self.selection, &BlockKind::Heading(2));
        self.apply("make_subtitle", edit);
    }

    pub fn make_normal_text(&mut self) {
        let edit = ops::set_block_kind(&self.document, self.selection, &BlockKind::Paragraph);
        self.apply("make_normal_text", edit);
    }

    pub fn align_left(&mut self) {
        let edit = ops::set_alignment(&self.document, self.selection, Alignment::Left);
        self.apply("align_left", edit);
    }

    pub fn align_center(&mut self) {
        let edit = ops::set_alignment(&self.document, self.selection, Alignment::Center);
        self.apply("align_center", edit);
    }

    pub fn align_right(&mut self) {
        let edit = ops::set_alignment(&self.document, self.selection, Alignment::Right);
        self.apply("align_right", edit);
    }

    /// Toggle a bulleted (`ordered = false`) or numbered list.
    pub fn insert_list(&mut self, ordered: bool) {
        let edit = ops::toggle_list(&self.document, self.selection, ordered);
        self.apply("insert_list", edit);
    }

    // ------------------------------------------------------------------
    // Insertion
    // ------------------------------------------------------------------

    /// Insert an empty `rows` x `cols` table. Zero dimensions are ignored.
    pub fn insert_table(&mut self, rows: usize, cols: usize) {
        if rows == 0 || cols == 0 {
            trace!(rows, cols, "empty table ignored");
            return;
        }
        let edit = ops::insert_blocks(&self.document, self.selection, vec![Block::table(rows, cols)]);
        self.apply("insert_table", edit);
    }

    /// Link the selection to `url`, or insert the URL as a link at the caret.
    /// A blank URL does nothing.
    pub fn create_link(&mut self, url: &str) {
        let url = url.trim();
        if url.is_empty() {
            return;
        }
        let edit = ops::set_link(&self.document, self.selection, url);
        self.apply("create_link", edit);
    }

    /// Insert an image block. A blank URL does nothing.
    pub fn insert_image(&mut self, url: &str) {
        let url = url.trim();
        if url.is_empty() {
            return;
        }
        let edit = ops::insert_blocks(&self.document, self.selection, vec![Block::image(url, "")]);
        self.apply("insert_image", edit);
    }

    pub fn insert_horizontal_line(&mut self) {
        let edit = ops::insert_blocks(&self.document, self.selection, vec![Block::rule()]);
        self.apply("insert_horizontal_line", edit);
    }

    /// Insert an HTML fragment at the selection.
    ///
    /// A fragment that parses to a single left-aligned paragraph is merged
    /// into the current block; anything else is inserted as blocks.
    pub fn insert_html(&mut self, html: &str) {
        let fragment = from_html(html);
        if fragment.is_blank() {
            return;
        }
        let edit = match fragment.blocks() {
            [only] if only.kind == BlockKind::Paragraph && only.align == Alignment::Left => {
                ops::insert_inlines(&self.document, self.selection, only.inlines.clone())
            }
            blocks => ops::insert_blocks(&self.document, self.selection, blocks.to_vec()),
        };
        self.apply("insert_html", edit);
    }
}
