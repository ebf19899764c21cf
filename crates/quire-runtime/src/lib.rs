#![forbid(unsafe_code)]

//! Quire runtime.
//!
//! The stateful half of Quire: everything between the editing surface and
//! the native host.
//!
//! # Key Components
//!
//! - [`DocumentStore`] - the single document state, mutated only through
//!   named actions and observed through subscriptions
//! - [`ModalCoordinator`] - one-slot confirm / format-chooser requests that
//!   workflows await
//! - [`DocumentWorkflow`] - the New, Open, Save and Save As workflows
//! - [`BridgeClient`] / [`NativeBridge`] - typed file commands over an opaque
//!   host call, with [`FsBridge`] as a local file-system host
//! - [`QuireApp`] - wiring from a [`QuireConfig`]
//!
//! Everything here is single-threaded: handles share state through `Rc`
//! and futures are driven by whatever local executor the host runs.
//!
//! # Example
//!
//! ```
//! use quire_runtime::DocumentStore;
//!
//! let store = DocumentStore::in_memory();
//! store.set_current_file("/notes/todo.txt", "todo.txt", "buy milk", None);
//! let state = store.snapshot();
//! assert_eq!(state.file_type.as_str(), "txt");
//! assert!(!state.is_modified);
//! ```

pub mod app;
pub mod bridge;
pub mod config;
pub mod error;
pub mod events;
pub mod fs_bridge;
pub mod logging;
pub mod modal;
pub mod reactive;
pub mod storage;
pub mod store;
pub mod workflow;

pub use app::QuireApp;
pub use bridge::{BridgeClient, NativeBridge, OpenedFile, SavedFile};
pub use config::{DialogConfig, LoggingConfig, QuireConfig, RecentFilesConfig, StorageConfig};
pub use error::{BridgeError, ConfigError, ModalError, StorageError, WorkflowError};
pub use events::{MenuEvent, UnknownMenuEvent};
pub use fs_bridge::{DialogFilter, FileDialog, FsBridge};
pub use modal::{
    ActiveModal, ConfirmOutcome, ConfirmRequest, ModalCoordinator, ModalRequest, RequestId,
    SaveAsRequest, Severity,
};
pub use reactive::{Observable, Subscription};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::{DocumentState, DocumentStore, RecentFile};
pub use workflow::{DocumentWorkflow, EditingSurface, SaveOutcome};
