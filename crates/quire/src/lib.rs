#![forbid(unsafe_code)]

//! Quire public facade crate.
//!
//! Re-exports the common types of the editor, runtime and text crates and
//! offers a prelude plus [`bootstrap`] for hosts that start from a config
//! file.

use std::fmt;
use std::path::Path;

// --- Editor re-exports -----------------------------------------------------

pub use quire_editor::{
    Alignment, Block, BlockKind, Document, Editor, Mark, Position, Selection, from_html, to_html,
};

// --- Runtime re-exports ----------------------------------------------------

pub use quire_runtime::{
    BridgeClient, BridgeError, ConfigError, DocumentState, DocumentStore, DocumentWorkflow,
    EditingSurface, FileDialog, FsBridge, MenuEvent, ModalCoordinator, NativeBridge, QuireApp,
    QuireConfig, SaveOutcome, WorkflowError,
};

// --- Text re-exports -------------------------------------------------------

pub use quire_text::{DEFAULT_FILE_NAME, FileType};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for Quire hosts.
#[derive(Debug)]
pub enum Error {
    /// The configuration could not be loaded or is invalid.
    Config(ConfigError),
    /// A document workflow failed.
    Workflow(WorkflowError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Workflow(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Workflow(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<WorkflowError> for Error {
    fn from(err: WorkflowError) -> Self {
        Self::Workflow(err)
    }
}

/// Standard result type for Quire APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Load the config (defaults when `path` is `None`) and install logging.
///
/// Logging is only installed when no global subscriber exists yet.
pub fn bootstrap(path: Option<&Path>) -> Result<QuireConfig> {
    let config = match path {
        Some(path) => QuireConfig::load(path)?,
        None => QuireConfig::default(),
    };
    quire_runtime::logging::init(&config.logging);
    Ok(config)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        DocumentStore, DocumentWorkflow, Editor, Error, FileType, MenuEvent, ModalCoordinator,
        NativeBridge, QuireApp, QuireConfig, Result, SaveOutcome,
    };

    pub use crate::{editor, runtime, text};
}

pub use quire_editor as editor;
pub use quire_runtime as runtime;
pub use quire_text as text;
