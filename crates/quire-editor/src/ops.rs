#![forbid(unsafe_code)]

//! Pure editing operations.
//!
//! Every operation takes a document and a selection by reference and returns
//! an [`Edit`] holding the resulting document and selection. Inputs are never
//! mutated.

use crate::model::{
    Alignment, Block, BlockKind, Document, Inline, InlineStyle, Mark, Position, Selection,
    TextRun,
};

/// Result of an editing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub document: Document,
    pub selection: Selection,
}

impl Edit {
    fn unchanged(doc: &Document, sel: Selection) -> Self {
        Self {
            document: doc.clone(),
            selection: sel,
        }
    }
}

// ============================================================================
// Inline helpers
// ============================================================================

fn split_chars(text: &str, at: usize) -> (&str, &str) {
    let idx = text.char_indices().nth(at).map_or(text.len(), |(i, _)| i);
    text.split_at(idx)
}

/// Split an inline list at a char offset.
fn split_inlines(inlines: &[Inline], at: usize) -> (Vec<Inline>, Vec<Inline>) {
    let mut before = Vec::new();
    let mut after = Vec::new();
    let mut pos = 0;
    for inline in inlines {
        let len = inline.len();
        if pos + len <= at {
            before.push(inline.clone());
        } else if pos >= at {
            after.push(inline.clone());
        } else if let Inline::Text(run) = inline {
            let (left, right) = split_chars(&run.text, at - pos);
            before.push(Inline::Text(TextRun::new(left, run.style.clone())));
            after.push(Inline::Text(TextRun::new(right, run.style.clone())));
        }
        pos += len;
    }
    (before, after)
}

fn slice_inlines(inlines: &[Inline], from: usize, to: usize) -> Vec<Inline> {
    let (head, _) = split_inlines(inlines, to);
    split_inlines(&head, from).1
}

/// Apply `f` to the style of every run in `[from, to)` of a text block.
fn restyle(block: &mut Block, from: usize, to: usize, f: &mut impl FnMut(&mut InlineStyle)) {
    let (head, rest) = split_inlines(&block.inlines, from);
    let (mut mid, tail) = split_inlines(&rest, to - from);
    for inline in &mut mid {
        if let Inline::Text(run) = inline {
            f(&mut run.style);
        }
    }
    block.inlines = head.into_iter().chain(mid).chain(tail).collect();
    block.normalize();
}

/// Style inherited by text typed at `offset`.
fn style_at(block: &Block, offset: usize) -> InlineStyle {
    let mut pos = 0;
    let mut found = None;
    for inline in &block.inlines {
        if let Inline::Text(run) = inline {
            if found.is_none() || pos < offset {
                found = Some(&run.style);
            }
        }
        pos += inline.len();
        if pos >= offset && found.is_some() {
            break;
        }
    }
    found.cloned().unwrap_or_default()
}

/// Per-block `[from, to)` ranges covered by a selection.
fn block_ranges(doc: &Document, sel: Selection) -> Vec<(usize, usize, usize)> {
    let start = doc.clamp(sel.start());
    let end = doc.clamp(sel.end());
    (start.block..=end.block)
        .map(|idx| {
            let len = doc.blocks()[idx].len();
            let from = if idx == start.block { start.offset } else { 0 };
            let to = if idx == end.block { end.offset } else { len };
            (idx, from, to)
        })
        .collect()
}

fn clamped(doc: &Document, sel: Selection) -> Selection {
    Selection::new(doc.clamp(sel.anchor), doc.clamp(sel.head))
}

// ============================================================================
// Marks and links
// ============================================================================

/// Toggle a character mark over the selection.
///
/// When every selected character already carries the mark it is removed,
/// otherwise it is applied to the whole range. A collapsed selection or a
/// range without text is left untouched.
#[must_use]
pub fn toggle_mark(doc: &Document, sel: Selection, mark: Mark) -> Edit {
    let sel = clamped(doc, sel);
    if sel.is_collapsed() {
        return Edit::unchanged(doc, sel);
    }

    let ranges = block_ranges(doc, sel);
    let mut saw_text = false;
    let mut all_marked = true;
    for &(idx, from, to) in &ranges {
        let block = &doc.blocks()[idx];
        if !block.kind.holds_text() {
            continue;
        }
        for inline in slice_inlines(&block.inlines, from, to) {
            if let Inline::Text(run) = inline {
                if run.text.is_empty() {
                    continue;
                }
                saw_text = true;
                all_marked &= run.style.has(mark);
            }
        }
    }
    if !saw_text {
        return Edit::unchanged(doc, sel);
    }

    let on = !all_marked;
    let mut document = doc.clone();
    for (idx, from, to) in ranges {
        let block = &mut document.blocks_mut()[idx];
        if block.kind.holds_text() {
            restyle(block, from, to, &mut |style| style.set(mark, on));
        }
    }
    Edit {
        document,
        selection: sel,
    }
}

/// Link the selection to `url`.
///
/// With a collapsed selection the URL itself is inserted as linked text.
#[must_use]
pub fn set_link(doc: &Document, sel: Selection, url: &str) -> Edit {
    let sel = clamped(doc, sel);
    if sel.is_collapsed() {
        let run = TextRun::new(
            url,
            InlineStyle {
                link: Some(url.to_string()),
                ..InlineStyle::default()
            },
        );
        return insert_inlines(doc, sel, vec![Inline::Text(run)]);
    }

    let mut document = doc.clone();
    for (idx, from, to) in block_ranges(doc, sel) {
        let block = &mut document.blocks_mut()[idx];
        if block.kind.holds_text() {
            restyle(block, from, to, &mut |style| style.link = Some(url.to_string()));
        }
    }
    Edit {
        document,
        selection: sel,
    }
}

// ============================================================================
// Block formatting
// ============================================================================

fn map_text_blocks(doc: &Document, sel: Selection, mut f: impl FnMut(&mut Block)) -> Edit {
    let sel = clamped(doc, sel);
    let mut document = doc.clone();
    for (idx, _, _) in block_ranges(doc, sel) {
        let block = &mut document.blocks_mut()[idx];
        if block.kind.holds_text() {
            f(block);
        }
    }
    Edit {
        document,
        selection: sel,
    }
}

/// Change the kind of every text block touched by the selection.
///
/// Only text-bearing kinds are accepted; anything else leaves the document
/// as is.
#[must_use]
pub fn set_block_kind(doc: &Document, sel: Selection, kind: &BlockKind) -> Edit {
    if !kind.holds_text() {
        return Edit::unchanged(doc, clamped(doc, sel));
    }
    map_text_blocks(doc, sel, |block| block.kind = kind.clone())
}

#[must_use]
pub fn set_alignment(doc: &Document, sel: Selection, align: Alignment) -> Edit {
    map_text_blocks(doc, sel, |block| block.align = align)
}

/// Turn the touched blocks into list items, or back into paragraphs when
/// they already are items of the same list type.
#[must_use]
pub fn toggle_list(doc: &Document, sel: Selection, ordered: bool) -> Edit {
    let sel = clamped(doc, sel);
    let target = BlockKind::ListItem { ordered };
    let all_listed = block_ranges(doc, sel)
        .iter()
        .map(|&(idx, _, _)| &doc.blocks()[idx])
        .filter(|block| block.kind.holds_text())
        .all(|block| block.kind == target);
    let kind = if all_listed {
        BlockKind::Paragraph
    } else {
        target
    };
    map_text_blocks(doc, sel, |block| block.kind = kind.clone())
}

// ============================================================================
// Deletion and insertion
// ============================================================================

/// Remove the selected range.
///
/// Atomic blocks covered by the range are removed; one sitting at the end
/// of the range lies after the caret and is kept. Text blocks at both ends
/// are joined, keeping the kind of the first.
#[must_use]
pub fn delete_selection(doc: &Document, sel: Selection) -> Edit {
    let sel = clamped(doc, sel);
    if sel.is_collapsed() {
        return Edit::unchanged(doc, sel);
    }
    let start = sel.start();
    let end = sel.end();
    let blocks = doc.blocks();

    let first = &blocks[start.block];
    let last = &blocks[end.block];
    let mut replacement = Vec::new();

    if start.block == end.block {
        let mut block = first.clone();
        let (head, _) = split_inlines(&first.inlines, start.offset);
        let (_, tail) = split_inlines(&first.inlines, end.offset);
        block.inlines = head.into_iter().chain(tail).collect();
        block.normalize();
        replacement.push(block);
    } else {
        let tail = if last.kind.holds_text() {
            Some(split_inlines(&last.inlines, end.offset).1)
        } else {
            None
        };
        if first.kind.holds_text() {
            let mut block = first.clone();
            block.inlines = split_inlines(&first.inlines, start.offset).0;
            match tail {
                Some(tail) => block.inlines.extend(tail),
                None => {
                    block.normalize();
                    replacement.push(block);
                    replacement.push(last.clone());
                    return splice(doc, start, end, replacement, start);
                }
            }
            block.normalize();
            replacement.push(block);
        } else {
            let mut block = last.clone();
            if let Some(tail) = tail {
                block.inlines = tail;
                block.normalize();
            }
            replacement.push(block);
        }
    }

    let caret = if first.kind.holds_text() {
        start
    } else {
        Position::new(start.block, 0)
    };
    splice(doc, start, end, replacement, caret)
}

fn splice(
    doc: &Document,
    start: Position,
    end: Position,
    replacement: Vec<Block>,
    caret: Position,
) -> Edit {
    let mut document = doc.clone();
    document
        .blocks_mut()
        .splice(start.block..=end.block, replacement);
    document.ensure_block();
    let caret = document.clamp(caret);
    Edit {
        document,
        selection: Selection::caret(caret),
    }
}

/// Replace the selection with inline content.
///
/// At a caret in front of an atomic block a new paragraph is created to
/// hold the content.
#[must_use]
pub fn insert_inlines(doc: &Document, sel: Selection, inlines: Vec<Inline>) -> Edit {
    let Edit {
        mut document,
        selection,
    } = delete_selection(doc, sel);
    let at = selection.head;
    let added: usize = inlines.iter().map(Inline::len).sum();
    let blocks = document.blocks_mut();

    if blocks[at.block].kind.holds_text() {
        let block = &mut blocks[at.block];
        let (head, tail) = split_inlines(&block.inlines, at.offset);
        block.inlines = head.into_iter().chain(inlines).chain(tail).collect();
        block.normalize();
        Edit {
            document,
            selection: Selection::caret(Position::new(at.block, at.offset + added)),
        }
    } else {
        blocks.insert(at.block, Block::paragraph().with_inlines(inlines));
        Edit {
            document,
            selection: Selection::caret(Position::new(at.block, added)),
        }
    }
}

fn split_block(doc: &mut Document, at: Position) -> Position {
    let blocks = doc.blocks_mut();
    let block = &blocks[at.block];
    if !block.kind.holds_text() {
        blocks.insert(at.block, Block::paragraph());
        return Position::new(at.block + 1, 0);
    }
    let (head, tail) = split_inlines(&block.inlines, at.offset);
    let mut after = block.clone();
    after.inlines = tail;
    after.normalize();
    let before = &mut blocks[at.block];
    before.inlines = head;
    before.normalize();
    blocks.insert(at.block + 1, after);
    Position::new(at.block + 1, 0)
}

/// Replace the selection with text.
///
/// The text takes the style of the character before the caret. Each `\n`
/// splits the current block; the new block keeps its kind and alignment.
#[must_use]
pub fn insert_text(doc: &Document, sel: Selection, text: &str) -> Edit {
    let mut edit = delete_selection(doc, sel);
    let at = edit.selection.head;
    let style = style_at(&edit.document.blocks()[at.block], at.offset);
    for (idx, line) in text.split('\n').enumerate() {
        if idx > 0 {
            let caret = split_block(&mut edit.document, edit.selection.head);
            edit.selection = Selection::caret(caret);
        }
        if line.is_empty() {
            continue;
        }
        let run = Inline::Text(TextRun::new(line.replace('\r', ""), style.clone()));
        edit = insert_inlines(&edit.document, edit.selection, vec![run]);
    }
    edit
}

/// Replace the selection with whole blocks.
///
/// The current text block is split at the caret; an empty leading half is
/// dropped. The trailing half is kept when it has content; otherwise an empty
/// paragraph follows when the last inserted block cannot hold the caret.
#[must_use]
pub fn insert_blocks(doc: &Document, sel: Selection, new_blocks: Vec<Block>) -> Edit {
    let Edit {
        mut document,
        selection,
    } = delete_selection(doc, sel);
    if new_blocks.is_empty() {
        return Edit {
            document,
            selection,
        };
    }
    let at = selection.head;
    let count = new_blocks.len();
    let last_holds_text = new_blocks.last().is_some_and(|b| b.kind.holds_text());
    let last_len = new_blocks.last().map_or(0, Block::len);
    let blocks = document.blocks_mut();
    let current = blocks[at.block].clone();

    if !current.kind.holds_text() {
        blocks.splice(at.block..at.block, new_blocks);
        let caret = if last_holds_text {
            Position::new(at.block + count - 1, last_len)
        } else {
            Position::new(at.block + count, 0)
        };
        return Edit {
            document,
            selection: Selection::caret(caret),
        };
    }

    let (head, tail) = split_inlines(&current.inlines, at.offset);
    let mut before = current.clone();
    before.inlines = head;
    before.normalize();
    let mut after = current;
    after.inlines = tail;
    after.normalize();

    let mut replacement = Vec::with_capacity(count + 2);
    let keep_before = !before.is_empty();
    if keep_before {
        replacement.push(before);
    }
    replacement.extend(new_blocks);
    let keep_after = !after.is_empty() || !last_holds_text;
    if keep_after {
        if after.is_empty() {
            after = Block::paragraph();
        }
        replacement.push(after);
    }

    let first_new = at.block + usize::from(keep_before);
    let caret = if keep_after {
        Position::new(first_new + count, 0)
    } else {
        Position::new(first_new + count - 1, last_len)
    };
    blocks.splice(at.block..=at.block, replacement);
    Edit {
        document,
        selection: Selection::caret(caret),
    }
}

/// Text covered by the selection, blocks joined by `\n`.
///
/// Tables fully inside the range contribute their cell text.
#[must_use]
pub fn selected_text(doc: &Document, sel: Selection) -> String {
    let sel = clamped(doc, sel);
    if sel.is_collapsed() {
        return String::new();
    }
    let end_block = sel.end().block;
    let mut parts = Vec::new();
    for (idx, from, to) in block_ranges(doc, sel) {
        let block = &doc.blocks()[idx];
        if block.kind.holds_text() {
            let slice = slice_inlines(&block.inlines, from, to);
            parts.push(Block::paragraph().with_inlines(slice).inline_text());
        } else if idx < end_block {
            parts.push(block.plain_text());
        }
    }
    parts.join("\n")
}
