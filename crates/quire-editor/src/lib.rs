#![forbid(unsafe_code)]

//! Quire rich-text editor.
//!
//! The editing surface is an explicit model instead of a live DOM:
//!
//! - [`model`] - [`Document`], [`Block`], inline runs and selections
//! - [`ops`] - pure formatting and insertion operations returning an [`Edit`]
//! - [`html`] - the HTML codec used for on-disk content
//! - [`Editor`] - document + selection with the toolbar command surface
//!
//! # Example
//!
//! ```
//! use quire_editor::{Editor, Position, Selection};
//!
//! let mut editor = Editor::with_content("<p>hello world</p>");
//! editor.select(Selection::new(Position::new(0, 0), Position::new(0, 5)));
//! editor.bold();
//! assert_eq!(editor.content(), "<p><b>hello</b> world</p>");
//! ```

pub mod editor;
pub mod html;
pub mod model;
pub mod ops;

pub use editor::{DEFAULT_TABLE_SIZE, Editor};
pub use html::{from_html, to_html};
pub use model::{
    Alignment, Block, BlockKind, Document, Inline, InlineStyle, Mark, Position, Selection, TextRun,
};
pub use ops::Edit;
