#![forbid(unsafe_code)]

//! Document state store.
//!
//! [`DocumentStore`] owns the single [`DocumentState`] of the application.
//! It is an injectable handle (clones share state): reads go through
//! [`DocumentStore::snapshot`] or a subscription, writes only through the
//! named actions below. Every action that changes the state notifies all
//! subscribers before it returns.
//!
//! # Invariants
//!
//! - `is_modified` is false right after `set_current_file`, `mark_as_saved`
//!   and `clear_document`; only `set_content` and `mark_as_modified` set it.
//! - `recent_files` never holds two entries with the same path and never
//!   exceeds the configured limit.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use quire_text::{DEFAULT_FILE_NAME, FileType};
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, trace, warn};

use crate::config::RecentFilesConfig;
use crate::reactive::{Observable, Subscription};
use crate::storage::{KeyValueStorage, MemoryStorage};

/// An entry of the recent-files list.
///
/// Persisted as `{ "path", "name", "lastModified" }` with an ISO-8601
/// timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentFile {
    pub path: String,
    pub name: String,
    pub last_modified: DateTime<Utc>,
}

/// Snapshot of the open document and the recent-files list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentState {
    /// Editor content (HTML).
    pub content: String,
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub file_type: FileType,
    pub is_modified: bool,
    /// Most recent first.
    pub recent_files: Vec<RecentFile>,
    /// Reserved for a notes sidebar; no workflow sets it.
    pub selected_note_id: Option<String>,
}

impl DocumentState {
    /// Whether the content has anything besides whitespace.
    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }

    /// File name for display, `Untitled` for unsaved documents.
    #[must_use]
    pub fn title(&self) -> &str {
        self.file_name.as_deref().unwrap_or(DEFAULT_FILE_NAME)
    }
}

/// Handle to the shared document state.
#[derive(Clone)]
pub struct DocumentStore {
    state: Observable<DocumentState>,
    storage: Rc<dyn KeyValueStorage>,
    recent: Rc<RecentFilesConfig>,
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("state", &self.state)
            .field("recent", &self.recent)
            .finish_non_exhaustive()
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// Drop later duplicates by path and cut to `limit`.
fn dedupe_and_truncate(files: &mut Vec<RecentFile>, limit: usize) {
    let mut seen = std::collections::HashSet::new();
    files.retain(|f| seen.insert(f.path.clone()));
    files.truncate(limit);
}

impl DocumentStore {
    #[must_use]
    pub fn new(storage: Rc<dyn KeyValueStorage>, recent: RecentFilesConfig) -> Self {
        Self {
            state: Observable::labeled("document_state", DocumentState::default()),
            storage,
            recent: Rc::new(recent),
        }
    }

    /// Store over [`MemoryStorage`] with default settings.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Rc::new(MemoryStorage::new()), RecentFilesConfig::default())
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    #[must_use]
    pub fn snapshot(&self) -> DocumentState {
        self.state.get()
    }

    /// Borrow the state without cloning it. `f` must not call actions.
    pub fn with<R>(&self, f: impl FnOnce(&DocumentState) -> R) -> R {
        self.state.with(f)
    }

    /// Number of state changes so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.state.version()
    }

    /// Call `callback` with every new state.
    pub fn subscribe(&self, callback: impl Fn(&DocumentState) + 'static) -> Subscription {
        self.state.subscribe(callback)
    }

    #[must_use]
    pub fn recent_limit(&self) -> usize {
        self.recent.limit
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    fn apply(&self, action: &'static str, f: impl FnOnce(&mut DocumentState)) {
        let _span = info_span!("store.action", action).entered();
        let changed = self.state.update(f);
        debug!(action, changed, version = self.state.version(), "store action");
    }

    /// Replace the content after an edit.
    pub fn set_content(&self, content: impl Into<String>) {
        let content = content.into();
        self.apply("set_content", move |s| {
            s.content = content;
            s.is_modified = true;
        });
    }

    /// Adopt a file as the current document.
    ///
    /// Without an explicit type, the type is inferred from `path`. Empty
    /// `path`/`name` are stored as absent.
    pub fn set_current_file(
        &self,
        path: &str,
        name: &str,
        content: impl Into<String>,
        file_type: Option<FileType>,
    ) {
        let file_type = file_type.unwrap_or_else(|| FileType::from_path(path));
        let content = content.into();
        let (path, name) = (non_empty(path), non_empty(name));
        self.apply("set_current_file", move |s| {
            s.file_path = path;
            s.file_name = name;
            s.content = content;
            s.file_type = file_type;
            s.is_modified = false;
        });
    }

    pub fn mark_as_modified(&self) {
        self.apply("mark_as_modified", |s| s.is_modified = true);
    }

    pub fn mark_as_saved(&self) {
        self.apply("mark_as_saved", |s| s.is_modified = false);
    }

    /// Reset to an unsaved, empty HTML document. Recent files are kept.
    pub fn clear_document(&self) {
        self.apply("clear_document", |s| {
            s.content.clear();
            s.file_path = None;
            s.file_name = None;
            s.file_type = FileType::Html;
            s.is_modified = false;
        });
    }

    /// Accepted for API parity; the state has no loading flag.
    pub fn set_loading(&self, loading: bool) {
        trace!(loading, "set_loading has no effect");
    }

    /// Move `path` to the front of the recent-files list, stamped now.
    pub fn add_to_recent_files(&self, path: &str, name: &str) {
        let entry = RecentFile {
            path: path.to_string(),
            name: name.to_string(),
            last_modified: Utc::now(),
        };
        let limit = self.recent.limit;
        self.apply("add_to_recent_files", move |s| {
            s.recent_files.retain(|f| f.path != entry.path);
            s.recent_files.insert(0, entry);
            s.recent_files.truncate(limit);
        });
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Hydrate the recent-files list from storage.
    ///
    /// Missing, unreadable or corrupt data yields an empty list. Returns the
    /// number of entries loaded.
    pub fn load_recent_files(&self) -> usize {
        let key = self.recent.storage_key.as_str();
        let mut files = match self.storage.get(key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<RecentFile>>(&raw) {
                Ok(files) => files,
                Err(err) => {
                    warn!(key, error = %err, "recent files are corrupt; starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(key, error = %err, "failed to load recent files");
                Vec::new()
            }
        };
        dedupe_and_truncate(&mut files, self.recent.limit);
        let count = files.len();
        self.apply("load_recent_files", move |s| s.recent_files = files);
        count
    }

    /// Flush the recent-files list to storage. Failures are logged only.
    ///
    /// Returns whether the write succeeded.
    pub fn persist_recent_files(&self) -> bool {
        let files = self.with(|s| s.recent_files.clone());
        write_recent(self.storage.as_ref(), &self.recent.storage_key, &files)
    }

    /// Keep storage in sync: flush the list every time it changes.
    ///
    /// The returned guard stops syncing when dropped.
    pub fn persist_recent_files_on_change(&self) -> Subscription {
        let storage = Rc::clone(&self.storage);
        let recent = Rc::clone(&self.recent);
        let last = RefCell::new(self.with(|s| s.recent_files.clone()));
        self.subscribe(move |state| {
            if *last.borrow() == state.recent_files {
                return;
            }
            if write_recent(storage.as_ref(), &recent.storage_key, &state.recent_files) {
                last.borrow_mut().clone_from(&state.recent_files);
            }
        })
    }
}

fn write_recent(storage: &dyn KeyValueStorage, key: &str, files: &[RecentFile]) -> bool {
    let raw = match serde_json::to_string(files) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(key, error = %err, "failed to encode recent files");
            return false;
        }
    };
    match storage.set(key, &raw) {
        Ok(()) => {
            debug!(key, count = files.len(), "recent files persisted");
            true
        }
        Err(err) => {
            warn!(key, error = %err, "failed to persist recent files");
            false
        }
    }
}
