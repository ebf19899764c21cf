#![forbid(unsafe_code)]

//! Document workflows: New, Open, Save and Save As.
//!
//! [`DocumentWorkflow`] owns no document state. It reads snapshots from the
//! [`DocumentStore`], asks the user through the [`ModalCoordinator`], does
//! I/O through the [`BridgeClient`], and writes results back through the
//! store's actions.
//!
//! # Serialization
//!
//! One workflow runs at a time. A workflow started while another is in
//! flight fails with [`WorkflowError::Busy`]; steps a workflow runs on its
//! own behalf (New saving first) do not re-enter the guard.
//!
//! # Failures
//!
//! A bridge failure is logged, reported through an "<Operation> Error"
//! prompt, and returned as [`WorkflowError::Bridge`], so a New or Open that
//! tried to save first stops instead of discarding the document. User
//! cancellation is an ordinary outcome.
//!
//! # Edits during a save
//!
//! The store keeps taking edits while a save awaits the user or the host.
//! A save adopts the live content when it finishes and leaves the document
//! modified if that content differs from what was written.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::{Stream, StreamExt};
use quire_editor::Editor;
use quire_text::{FileType, display_name};
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::bridge::{BridgeClient, NativeBridge};
use crate::error::{BridgeError, WorkflowError};
use crate::events::MenuEvent;
use crate::modal::{ConfirmOutcome, ConfirmRequest, ModalCoordinator, SaveAsRequest};
use crate::store::DocumentStore;

/// Operation names shown in error prompts.
pub const OPEN_FILE_OPERATION: &str = "Open File";
pub const SAVE_FILE_OPERATION: &str = "Save File";
pub const SAVE_AS_OPERATION: &str = "Save File As";

/// The live editing surface the workflows keep in step with the store.
pub trait EditingSurface {
    /// Replace the surface content.
    fn load_html(&mut self, html: &str);
    fn clear(&mut self);
    fn focus(&mut self);
}

impl EditingSurface for Editor {
    fn load_html(&mut self, html: &str) {
        self.set_content(html);
    }

    fn clear(&mut self) {
        Editor::clear(self);
    }

    fn focus(&mut self) {
        Editor::focus(self);
    }
}

/// Result of a Save or Save As.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// Blank content; nothing was written.
    Skipped,
    /// The chooser or the save dialog was closed.
    Cancelled,
}

impl SaveOutcome {
    /// Whether the current document may be replaced without losing work.
    #[must_use]
    pub const fn may_discard(self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

/// Clears the busy flag when a workflow ends, on every path.
struct BusyGuard<'a> {
    flag: &'a Cell<Option<&'static str>>,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(None);
    }
}

/// Runs the four document workflows.
pub struct DocumentWorkflow<B> {
    store: DocumentStore,
    modal: ModalCoordinator,
    client: BridgeClient<B>,
    surface: Option<Rc<RefCell<dyn EditingSurface>>>,
    running: Cell<Option<&'static str>>,
}

impl<B> std::fmt::Debug for DocumentWorkflow<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentWorkflow")
            .field("store", &self.store)
            .field("modal", &self.modal)
            .field("has_surface", &self.surface.is_some())
            .field("running", &self.running.get())
            .finish_non_exhaustive()
    }
}

impl<B: NativeBridge> DocumentWorkflow<B> {
    #[must_use]
    pub fn new(store: DocumentStore, modal: ModalCoordinator, bridge: B) -> Self {
        Self {
            store,
            modal,
            client: BridgeClient::new(bridge),
            surface: None,
            running: Cell::new(None),
        }
    }

    /// Keep `surface` in step with New and Open.
    #[must_use]
    pub fn with_surface<S: EditingSurface + 'static>(mut self, surface: Rc<RefCell<S>>) -> Self {
        let surface: Rc<RefCell<dyn EditingSurface>> = surface;
        self.surface = Some(surface);
        self
    }

    #[must_use]
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    #[must_use]
    pub fn modal(&self) -> &ModalCoordinator {
        &self.modal
    }

    #[must_use]
    pub fn client(&self) -> &BridgeClient<B> {
        &self.client
    }

    /// Name of the workflow in flight, if any.
    #[must_use]
    pub fn running(&self) -> Option<&'static str> {
        self.running.get()
    }

    fn begin(&self, name: &'static str) -> Result<BusyGuard<'_>, WorkflowError> {
        if let Some(active) = self.running.get() {
            warn!(rejected = name, active, "workflow already in progress");
            return Err(WorkflowError::Busy);
        }
        self.running.set(Some(name));
        Ok(BusyGuard {
            flag: &self.running,
        })
    }

    // ------------------------------------------------------------------
    // Workflows
    // ------------------------------------------------------------------

    /// Start a new, empty document. Returns whether the document was reset.
    pub async fn new_document(&self) -> Result<bool, WorkflowError> {
        let _busy = self.begin("new")?;
        self.run_new().instrument(info_span!("workflow", name = "new")).await
    }

    /// Replace the document with a file chosen by the user. Returns whether
    /// a file was loaded.
    pub async fn open_document(&self) -> Result<bool, WorkflowError> {
        let _busy = self.begin("open")?;
        self.run_open().instrument(info_span!("workflow", name = "open")).await
    }

    /// Save in place, or through Save As when the document has no path.
    pub async fn save(&self) -> Result<SaveOutcome, WorkflowError> {
        let _busy = self.begin("save")?;
        self.run_save().instrument(info_span!("workflow", name = "save")).await
    }

    /// Save to a new location in a format chosen by the user.
    pub async fn save_as(&self) -> Result<SaveOutcome, WorkflowError> {
        let _busy = self.begin("save_as")?;
        self.run_save_as()
            .instrument(info_span!("workflow", name = "save_as"))
            .await
    }

    /// Run the workflow bound to a menu event.
    pub async fn dispatch(&self, event: MenuEvent) -> Result<(), WorkflowError> {
        debug!(%event, "menu event");
        match event {
            MenuEvent::New => self.new_document().await.map(drop),
            MenuEvent::Open => self.open_document().await.map(drop),
            MenuEvent::Save => self.save().await.map(drop),
            MenuEvent::SaveAs => self.save_as().await.map(drop),
        }
    }

    /// Handle menu events one at a time until the stream ends. Failures
    /// have already been reported to the user and are only logged here.
    ///
    /// Returns the number of events handled.
    pub async fn run_menu_events<S>(&self, events: S) -> usize
    where
        S: Stream<Item = MenuEvent>,
    {
        let mut events = std::pin::pin!(events);
        let mut handled = 0;
        while let Some(event) = events.next().await {
            if let Err(err) = self.dispatch(event).await {
                warn!(%event, error = %err, "menu event failed");
            }
            handled += 1;
        }
        handled
    }

    // ------------------------------------------------------------------
    // Steps
    // ------------------------------------------------------------------

    async fn run_new(&self) -> Result<bool, WorkflowError> {
        if self.store.with(|s| s.is_modified) {
            let request = ConfirmRequest::unsaved_changes("Save & Continue", "Discard Changes");
            match self.modal.confirm(request).await {
                ConfirmOutcome::Confirmed => {
                    if !self.run_save().await?.may_discard() {
                        info!("new document abandoned; save was cancelled");
                        return Ok(false);
                    }
                }
                ConfirmOutcome::Cancelled => debug!("discarding unsaved changes"),
                ConfirmOutcome::Dismissed => debug!("prompt dismissed; discarding changes"),
            }
        }
        self.store.clear_document();
        self.with_surface_mut(|surface| {
            surface.clear();
            surface.focus();
        });
        info!("new document");
        Ok(true)
    }

    async fn run_open(&self) -> Result<bool, WorkflowError> {
        if self.store.with(|s| s.is_modified) {
            let request = ConfirmRequest::unsaved_changes("Save & Open", "Discard & Open");
            match self.modal.confirm(request).await {
                ConfirmOutcome::Confirmed => {
                    if !self.run_save().await?.may_discard() {
                        info!("open abandoned; save was cancelled");
                        return Ok(false);
                    }
                }
                ConfirmOutcome::Cancelled => debug!("discarding unsaved changes"),
                ConfirmOutcome::Dismissed => {
                    debug!("prompt dismissed; open abandoned");
                    return Ok(false);
                }
            }
        }
        self.open_from_dialog().await
    }

    async fn open_from_dialog(&self) -> Result<bool, WorkflowError> {
        self.store.set_loading(true);
        let result = self.client.open_file().await;
        self.store.set_loading(false);

        let opened = match result {
            Ok(Some(opened)) => opened,
            Ok(None) => {
                debug!("nothing opened");
                return Ok(false);
            }
            Err(err) => return Err(self.fail(OPEN_FILE_OPERATION, err).await),
        };

        let path = opened.file_path.unwrap_or_default();
        let name = opened.file_name.unwrap_or_default();
        let file_type = FileType::from_path(&path);
        self.store
            .set_current_file(&path, &name, opened.content.as_str(), Some(file_type));
        self.with_surface_mut(|surface| surface.load_html(&opened.content));
        if !path.is_empty() {
            self.store.add_to_recent_files(&path, &display_name(&path));
        }
        info!(path = %path, %file_type, "document opened");
        Ok(true)
    }

    async fn run_save(&self) -> Result<SaveOutcome, WorkflowError> {
        let (content, path, file_type) = self
            .store
            .with(|s| (s.content.clone(), s.file_path.clone(), s.file_type));
        if content.trim().is_empty() {
            debug!("blank document; nothing to save");
            return Ok(SaveOutcome::Skipped);
        }
        let Some(path) = path else {
            return self.run_save_as().await;
        };

        self.store.set_loading(true);
        let result = self.client.save_file(&content, &path, file_type).await;
        self.store.set_loading(false);

        match result {
            Ok(()) => {
                if self.store.with(|s| s.content == content) {
                    self.store.mark_as_saved();
                } else {
                    debug!("document edited while saving; still modified");
                }
                info!(path = %path, %file_type, "document saved");
                Ok(SaveOutcome::Saved)
            }
            Err(err) => Err(self.fail(SAVE_FILE_OPERATION, err).await),
        }
    }

    async fn run_save_as(&self) -> Result<SaveOutcome, WorkflowError> {
        let content = self.store.with(|s| s.content.clone());
        if content.trim().is_empty() {
            debug!("blank document; nothing to save");
            return Ok(SaveOutcome::Skipped);
        }
        let chosen = self.modal.choose_save_format(SaveAsRequest::default()).await;
        let Some(file_type) = chosen else {
            debug!("format chooser closed");
            return Ok(SaveOutcome::Cancelled);
        };

        self.store.set_loading(true);
        let result = self.client.save_file_as(&content, file_type).await;
        self.store.set_loading(false);

        match result {
            Ok(Some(saved)) => {
                let (path, name) = (saved.file_path.as_str(), saved.file_name.as_str());
                let live = self.store.with(|s| s.content.clone());
                let edited = live != content;
                self.store.set_current_file(path, name, live, Some(file_type));
                self.store.add_to_recent_files(path, name);
                if edited {
                    debug!("document edited while saving; still modified");
                    self.store.mark_as_modified();
                }
                info!(path = %saved.file_path, %file_type, "document saved as");
                Ok(SaveOutcome::Saved)
            }
            Ok(None) => {
                debug!("save dialog closed");
                Ok(SaveOutcome::Cancelled)
            }
            Err(err) => Err(self.fail(SAVE_AS_OPERATION, err).await),
        }
    }

    /// Report a failed operation to the user and build the error to return.
    async fn fail(&self, operation: &'static str, source: BridgeError) -> WorkflowError {
        error!(
            operation,
            command = source.command(),
            error = %source,
            "document operation failed"
        );
        self.modal
            .alert(
                format!("{operation} Error"),
                format!("Failed to {}: {source}", operation.to_lowercase()),
            )
            .await;
        WorkflowError::Bridge { operation, source }
    }

    fn with_surface_mut(&self, f: impl FnOnce(&mut dyn EditingSurface)) {
        if let Some(surface) = &self.surface {
            f(&mut *surface.borrow_mut());
        }
    }
}
