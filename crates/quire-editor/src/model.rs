#![forbid(unsafe_code)]

//! Rich-text document model.
//!
//! A [`Document`] is a flat sequence of [`Block`]s. Text-bearing blocks
//! (paragraphs, headings, list items) hold a run list of [`Inline`]s; the
//! remaining kinds (rules, images, tables) are atomic and have no caret
//! positions inside them.
//!
//! # Invariants
//!
//! - A document always has at least one block.
//! - After [`Block::normalize`], adjacent text runs never share a style and
//!   no run is empty.
//! - Offsets count `char`s; a [`Inline::LineBreak`] counts as one.

/// Character-level marks toggled by the bold/italic/underline commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    Bold,
    Italic,
    Underline,
}

/// Style of a text run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InlineStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Target URL when the run is part of a link.
    pub link: Option<String>,
}

impl InlineStyle {
    #[must_use]
    pub fn has(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
        }
    }

    pub fn set(&mut self, mark: Mark, on: bool) {
        match mark {
            Mark::Bold => self.bold = on,
            Mark::Italic => self.italic = on,
            Mark::Underline => self.underline = on,
        }
    }
}

/// A styled span of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub style: InlineStyle,
}

impl TextRun {
    #[must_use]
    pub fn new(text: impl Into<String>, style: InlineStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, InlineStyle::default())
    }
}

/// Inline content of a text block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(TextRun),
    LineBreak,
}

impl Inline {
    /// Length in caret positions.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(run) => run.text.chars().count(),
            Self::LineBreak => 1,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Horizontal alignment of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    /// CSS `text-align` keyword.
    #[must_use]
    pub const fn css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// What a block is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    /// Heading level: 1 for titles, 2 for subtitles.
    Heading(u8),
    ListItem {
        ordered: bool,
    },
    HorizontalRule,
    Image {
        src: String,
        alt: String,
    },
    /// Grid of plain-text cells.
    Table {
        rows: Vec<Vec<String>>,
    },
}

impl BlockKind {
    /// Whether the block carries inline text and caret positions.
    #[must_use]
    pub fn holds_text(&self) -> bool {
        matches!(
            self,
            Self::Paragraph | Self::Heading(_) | Self::ListItem { .. }
        )
    }
}

/// One block of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub align: Alignment,
    pub inlines: Vec<Inline>,
}

impl Block {
    #[must_use]
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            align: Alignment::Left,
            inlines: Vec::new(),
        }
    }

    /// An empty paragraph.
    #[must_use]
    pub fn paragraph() -> Self {
        Self::new(BlockKind::Paragraph)
    }

    /// A paragraph holding one unstyled run.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::paragraph().with_inlines(vec![Inline::Text(TextRun::plain(text))])
    }

    #[must_use]
    pub fn rule() -> Self {
        Self::new(BlockKind::HorizontalRule)
    }

    #[must_use]
    pub fn image(src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self::new(BlockKind::Image {
            src: src.into(),
            alt: alt.into(),
        })
    }

    /// A `rows` x `cols` table of empty cells.
    #[must_use]
    pub fn table(rows: usize, cols: usize) -> Self {
        Self::new(BlockKind::Table {
            rows: vec![vec![String::new(); cols]; rows],
        })
    }

    #[must_use]
    pub fn with_kind(mut self, kind: BlockKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }

    #[must_use]
    pub fn with_inlines(mut self, inlines: Vec<Inline>) -> Self {
        self.inlines = inlines;
        self.normalize();
        self
    }

    /// Number of caret positions (0 for atomic blocks).
    #[must_use]
    pub fn len(&self) -> usize {
        if self.kind.holds_text() {
            self.inlines.iter().map(Inline::len).sum()
        } else {
            0
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inline text with line breaks as `\n`.
    #[must_use]
    pub fn inline_text(&self) -> String {
        let mut out = String::new();
        for inline in &self.inlines {
            match inline {
                Inline::Text(run) => out.push_str(&run.text),
                Inline::LineBreak => out.push('\n'),
            }
        }
        out
    }

    /// Visible text of the block, tables included (cells tab-separated).
    #[must_use]
    pub fn plain_text(&self) -> String {
        match &self.kind {
            BlockKind::Table { rows } => rows
                .iter()
                .map(|row| row.join("\t"))
                .collect::<Vec<_>>()
                .join("\n"),
            kind if kind.holds_text() => self.inline_text(),
            _ => String::new(),
        }
    }

    /// Merge adjacent runs with equal styles and drop empty runs.
    pub fn normalize(&mut self) {
        let mut merged: Vec<Inline> = Vec::with_capacity(self.inlines.len());
        for inline in self.inlines.drain(..) {
            match inline {
                Inline::Text(run) if run.text.is_empty() => {}
                Inline::Text(run) => match merged.last_mut() {
                    Some(Inline::Text(prev)) if prev.style == run.style => {
                        prev.text.push_str(&run.text);
                    }
                    _ => merged.push(Inline::Text(run)),
                },
                Inline::LineBreak => merged.push(Inline::LineBreak),
            }
        }
        self.inlines = merged;
    }
}

/// A caret position: block index and char offset inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub block: usize,
    pub offset: usize,
}

impl Position {
    #[must_use]
    pub const fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// A selection between an anchor and a moving head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Selection {
    pub anchor: Position,
    pub head: Position,
}

impl Selection {
    #[must_use]
    pub const fn new(anchor: Position, head: Position) -> Self {
        Self { anchor, head }
    }

    #[must_use]
    pub const fn caret(at: Position) -> Self {
        Self {
            anchor: at,
            head: at,
        }
    }

    #[must_use]
    pub fn start(&self) -> Position {
        self.anchor.min(self.head)
    }

    #[must_use]
    pub fn end(&self) -> Position {
        self.anchor.max(self.head)
    }

    #[must_use]
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }
}

/// A rich-text document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            blocks: vec![Block::paragraph()],
        }
    }
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from blocks; an empty list yields an empty paragraph.
    #[must_use]
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let mut doc = Self { blocks };
        doc.ensure_block();
        doc
    }

    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut Vec<Block> {
        &mut self.blocks
    }

    pub(crate) fn ensure_block(&mut self) {
        if self.blocks.is_empty() {
            self.blocks.push(Block::paragraph());
        }
    }

    /// True for the pristine document: one empty, left-aligned paragraph.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self.blocks.as_slice(), [only] if *only == Block::paragraph())
    }

    /// Whether the visible text is empty or whitespace only.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plain_text().trim().is_empty()
    }

    /// Visible text, one line per block.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Clamp a position into the document.
    #[must_use]
    pub fn clamp(&self, pos: Position) -> Position {
        let block = pos.block.min(self.blocks.len().saturating_sub(1));
        let len = self.blocks.get(block).map_or(0, Block::len);
        Position::new(block, pos.offset.min(len))
    }

    /// Position after the last caret position of the document.
    #[must_use]
    pub fn end(&self) -> Position {
        let block = self.blocks.len().saturating_sub(1);
        Position::new(block, self.blocks.get(block).map_or(0, Block::len))
    }
}
