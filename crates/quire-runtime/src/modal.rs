#![forbid(unsafe_code)]

//! Single-slot modal request coordinator.
//!
//! Workflows ask the user through [`ModalCoordinator::confirm`] and
//! [`ModalCoordinator::choose_save_format`] and await the answer. The UI
//! observes the [`ActiveModal`] slot, renders it, and answers with the
//! request's [`RequestId`].
//!
//! At most one request is active. Issuing a new request while one is pending
//! supersedes it: the older future resolves at once as
//! [`ConfirmOutcome::Dismissed`] (or `None` for the format chooser). The
//! active slot is cleared before any outcome is delivered, so an awaiting
//! workflow never observes its own prompt still open.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use futures::channel::oneshot;
use quire_text::{FileType, SAVE_OPTIONS, SaveOption};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ModalError;
use crate::reactive::{Observable, Subscription};

/// Identifier of one modal request, unique per coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Visual weight of a confirm prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Warning,
    Danger,
    Info,
}

/// A confirm/cancel prompt. `cancel_label: None` renders confirm-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: Option<String>,
    pub severity: Severity,
}

impl ConfirmRequest {
    #[must_use]
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            confirm_label: "Confirm".to_string(),
            cancel_label: Some("Cancel".to_string()),
            severity: Severity::Warning,
        }
    }

    #[must_use]
    pub fn with_labels(mut self, confirm: impl Into<String>, cancel: impl Into<String>) -> Self {
        self.confirm_label = confirm.into();
        self.cancel_label = Some(cancel.into());
        self
    }

    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// "Unsaved Changes" warning used before discarding an edited document.
    #[must_use]
    pub fn unsaved_changes(confirm: &str, cancel: &str) -> Self {
        Self::new(
            "Unsaved Changes",
            "You have unsaved changes. Do you want to save them first?",
        )
        .with_labels(confirm, cancel)
    }

    /// Confirm-only "OK" prompt reporting a failure.
    #[must_use]
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            confirm_label: "OK".to_string(),
            cancel_label: None,
            severity: Severity::Danger,
            ..Self::new(title, message)
        }
    }
}

/// A save-format chooser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveAsRequest {
    pub title: String,
    pub options: Vec<SaveOption>,
}

impl Default for SaveAsRequest {
    fn default() -> Self {
        Self {
            title: "Save As".to_string(),
            options: SAVE_OPTIONS.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalRequest {
    Confirm(ConfirmRequest),
    SaveAs(SaveAsRequest),
}

impl ModalRequest {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Confirm(_) => CONFIRM,
            Self::SaveAs(_) => SAVE_AS,
        }
    }
}

const CONFIRM: &str = "confirm";
const SAVE_AS: &str = "save_as";

/// The request currently shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveModal {
    pub id: RequestId,
    pub request: ModalRequest,
}

/// Answer to a [`ConfirmRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed,
    Cancelled,
    /// Closed without a decision, or superseded by another request.
    Dismissed,
}

impl ConfirmOutcome {
    #[must_use]
    pub const fn is_confirmed(self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

enum Responder {
    Confirm(oneshot::Sender<ConfirmOutcome>),
    SaveAs(oneshot::Sender<Option<FileType>>),
}

impl Responder {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Confirm(_) => CONFIRM,
            Self::SaveAs(_) => SAVE_AS,
        }
    }

    fn dismiss(self) {
        // A dropped receiver means the awaiting workflow is gone.
        match self {
            Self::Confirm(tx) => {
                let _ = tx.send(ConfirmOutcome::Dismissed);
            }
            Self::SaveAs(tx) => {
                let _ = tx.send(None);
            }
        }
    }
}

struct Pending {
    id: RequestId,
    responder: Responder,
}

/// Handle to the modal slot. Clones share the slot.
#[derive(Clone)]
pub struct ModalCoordinator {
    active: Observable<Option<ActiveModal>>,
    pending: Rc<RefCell<Option<Pending>>>,
    next_id: Rc<Cell<u64>>,
}

impl Default for ModalCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ModalCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalCoordinator")
            .field("active", &self.active)
            .field("next_id", &self.next_id.get())
            .finish()
    }
}

impl ModalCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: Observable::labeled("modal", None),
            pending: Rc::new(RefCell::new(None)),
            next_id: Rc::new(Cell::new(1)),
        }
    }

    // ------------------------------------------------------------------
    // Request side
    // ------------------------------------------------------------------

    /// Show a confirm prompt and wait for the decision.
    pub async fn confirm(&self, request: ConfirmRequest) -> ConfirmOutcome {
        let (tx, rx) = oneshot::channel();
        let id = self.open(ModalRequest::Confirm(request), Responder::Confirm(tx));
        let outcome = rx.await.unwrap_or(ConfirmOutcome::Dismissed);
        debug!(%id, ?outcome, "confirm resolved");
        outcome
    }

    /// Show the format chooser; `None` when it closes without a choice.
    pub async fn choose_save_format(&self, request: SaveAsRequest) -> Option<FileType> {
        let (tx, rx) = oneshot::channel();
        let id = self.open(ModalRequest::SaveAs(request), Responder::SaveAs(tx));
        let choice = rx.await.unwrap_or(None);
        debug!(%id, ?choice, "save format resolved");
        choice
    }

    /// Show a confirm-only error prompt and wait until it is closed.
    pub async fn alert(&self, title: impl Into<String>, message: impl Into<String>) {
        let _ = self.confirm(ConfirmRequest::error(title, message)).await;
    }

    fn open(&self, request: ModalRequest, responder: Responder) -> RequestId {
        let id = RequestId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let kind = request.kind();
        let previous = self.pending.borrow_mut().replace(Pending { id, responder });
        if let Some(previous) = previous {
            warn!(superseded = %previous.id, by = %id, "modal request superseded");
            previous.responder.dismiss();
        }
        debug!(%id, kind, "modal opened");
        self.active.set(Some(ActiveModal { id, request }));
        id
    }

    // ------------------------------------------------------------------
    // UI side
    // ------------------------------------------------------------------

    #[must_use]
    pub fn active(&self) -> Option<ActiveModal> {
        self.active.get()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.active.with(Option::is_some)
    }

    /// Call `callback` whenever a modal opens or closes.
    pub fn subscribe(&self, callback: impl Fn(&Option<ActiveModal>) + 'static) -> Subscription {
        self.active.subscribe(callback)
    }

    /// Answer the confirm prompt `id`.
    pub fn respond_confirm(&self, id: RequestId, confirmed: bool) -> Result<(), ModalError> {
        let outcome = if confirmed {
            ConfirmOutcome::Confirmed
        } else {
            ConfirmOutcome::Cancelled
        };
        if let Responder::Confirm(tx) = self.take(id, Some(CONFIRM))? {
            let _ = tx.send(outcome);
        }
        Ok(())
    }

    /// Answer the format chooser `id`.
    pub fn choose_format(&self, id: RequestId, file_type: FileType) -> Result<(), ModalError> {
        if let Responder::SaveAs(tx) = self.take(id, Some(SAVE_AS))? {
            let _ = tx.send(Some(file_type));
        }
        Ok(())
    }

    /// Close request `id` without a decision.
    pub fn dismiss(&self, id: RequestId) -> Result<(), ModalError> {
        self.take(id, None)?.dismiss();
        Ok(())
    }

    /// Close whatever is open without a decision. Returns whether anything
    /// was open.
    pub fn close(&self) -> bool {
        let pending = self.pending.borrow_mut().take();
        match pending {
            Some(pending) => {
                debug!(id = %pending.id, "modal closed");
                self.active.set(None);
                pending.responder.dismiss();
                true
            }
            None => {
                self.active.set(None);
                false
            }
        }
    }

    /// Remove the pending request if it matches, clearing the active slot.
    fn take(&self, id: RequestId, expected: Option<&'static str>) -> Result<Responder, ModalError> {
        let pending = {
            let mut slot = self.pending.borrow_mut();
            match slot.take() {
                None => return Err(ModalError::NoActiveRequest),
                Some(p) if p.id != id => {
                    let active = p.id;
                    *slot = Some(p);
                    return Err(ModalError::Stale {
                        responded: id,
                        active,
                    });
                }
                Some(p) => match expected {
                    Some(expected) if p.responder.kind() != expected => {
                        let actual = p.responder.kind();
                        *slot = Some(p);
                        return Err(ModalError::KindMismatch {
                            id,
                            expected,
                            actual,
                        });
                    }
                    _ => p,
                },
            }
        };
        debug!(%id, "modal answered");
        self.active.set(None);
        Ok(pending.responder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use futures::executor::block_on;
    use std::pin::pin;

    #[test]
    fn confirm_resolves_with_the_answer_and_clears_slot() {
        let modal = ModalCoordinator::new();
        let mut fut = pin!(modal.confirm(ConfirmRequest::new("T", "M")));
        assert!(fut.as_mut().now_or_never().is_none());

        let active = modal.active().expect("prompt shown");
        assert!(matches!(active.request, ModalRequest::Confirm(ref r) if r.title == "T"));
        modal.respond_confirm(active.id, true).unwrap();
        assert!(!modal.is_open());
        assert_eq!(block_on(fut), ConfirmOutcome::Confirmed);
    }

    #[test]
    fn cancel_and_dismiss_are_distinct() {
        let modal = ModalCoordinator::new();
        let mut fut = pin!(modal.confirm(ConfirmRequest::new("T", "M")));
        let _ = fut.as_mut().now_or_never();
        let id = modal.active().unwrap().id;
        modal.respond_confirm(id, false).unwrap();
        assert_eq!(block_on(fut), ConfirmOutcome::Cancelled);

        let mut fut = pin!(modal.confirm(ConfirmRequest::new("T", "M")));
        let _ = fut.as_mut().now_or_never();
        let id = modal.active().unwrap().id;
        modal.dismiss(id).unwrap();
        assert_eq!(block_on(fut), ConfirmOutcome::Dismissed);
    }

    #[test]
    fn chooser_returns_the_chosen_format() {
        let modal = ModalCoordinator::new();
        let mut fut = pin!(modal.choose_save_format(SaveAsRequest::default()));
        let _ = fut.as_mut().now_or_never();
        let active = modal.active().unwrap();
        match &active.request {
            ModalRequest::SaveAs(r) => assert_eq!(r.options.len(), 2),
            other => panic!("unexpected request {other:?}"),
        }
        modal.choose_format(active.id, FileType::Txt).unwrap();
        assert_eq!(block_on(fut), Some(FileType::Txt));
    }

    #[test]
    fn new_request_supersedes_pending_one() {
        let modal = ModalCoordinator::new();
        let mut first = pin!(modal.confirm(ConfirmRequest::new("first", "")));
        let _ = first.as_mut().now_or_never();
        let first_id = modal.active().unwrap().id;

        let mut second = pin!(modal.choose_save_format(SaveAsRequest::default()));
        let _ = second.as_mut().now_or_never();
        let second_id = modal.active().unwrap().id;
        assert_ne!(first_id, second_id);

        assert_eq!(block_on(first), ConfirmOutcome::Dismissed);
        assert_eq!(
            modal.respond_confirm(first_id, true),
            Err(ModalError::Stale {
                responded: first_id,
                active: second_id
            })
        );
        assert_eq!(
            modal.respond_confirm(second_id, true),
            Err(ModalError::KindMismatch {
                id: second_id,
                expected: "confirm",
                actual: "save_as"
            })
        );
        assert!(modal.is_open());
        modal.choose_format(second_id, FileType::Html).unwrap();
        assert_eq!(block_on(second), Some(FileType::Html));
    }

    #[test]
    fn responding_without_request_is_an_error() {
        let modal = ModalCoordinator::new();
        assert_eq!(
            modal.dismiss(RequestId(9)),
            Err(ModalError::NoActiveRequest)
        );
        assert!(!modal.close());
    }

    #[test]
    fn close_resolves_chooser_as_none() {
        let modal = ModalCoordinator::new();
        let mut fut = pin!(modal.choose_save_format(SaveAsRequest::default()));
        let _ = fut.as_mut().now_or_never();
        assert!(modal.close());
        assert!(modal.active().is_none());
        assert_eq!(block_on(fut), None);
    }

    #[test]
    fn subscriber_can_answer_synchronously() {
        let modal = ModalCoordinator::new();
        let ui = modal.clone();
        let _sub = modal.subscribe(move |active| {
            if let Some(active) = active {
                let _ = ui.respond_confirm(active.id, true);
            }
        });
        let outcome = block_on(modal.confirm(ConfirmRequest::unsaved_changes("Save", "Discard")));
        assert_eq!(outcome, ConfirmOutcome::Confirmed);
        assert!(!modal.is_open());
    }

    #[test]
    fn error_prompt_is_confirm_only() {
        let req = ConfirmRequest::error("Open File Error", "Failed to open file: gone");
        assert_eq!(req.confirm_label, "OK");
        assert_eq!(req.cancel_label, None);
        assert_eq!(req.severity, Severity::Danger);
    }
}
