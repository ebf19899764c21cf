#![forbid(unsafe_code)]

//! Quire text utilities.
//!
//! Stateless helpers shared by the editor and runtime crates:
//!
//! - [`FileType`] - the two on-disk formats and the mapping between paths,
//!   extensions and types
//! - [`path`] - extension, file-name and backup-name helpers
//! - [`name`] - file-name validation, sanitization and generation
//! - [`format`] - human-readable sizes and relative dates
//! - [`convert`] - HTML <-> plain text conversion used when writing `.txt`
//!
//! Nothing in this crate touches the filesystem or holds state.

pub mod convert;
pub mod file_type;
pub mod format;
pub mod name;
pub mod path;

pub use convert::{html_to_text, text_to_html};
pub use file_type::{FileType, ParseFileTypeError, SAVE_OPTIONS, SaveOption};
pub use format::{format_file_size, format_last_modified};
pub use name::{generate_file_name, sanitize_file_name, validate_file_name};
pub use path::{
    DEFAULT_FILE_NAME, backup_file_name, display_name, file_extension, file_name, file_stem,
    is_recent_file, is_text_file,
};
