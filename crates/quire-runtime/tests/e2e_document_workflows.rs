#![forbid(unsafe_code)]

//! Document workflows end to end: a scripted host answers bridge calls and
//! a scripted user answers every modal request synchronously.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use futures::executor::block_on;
use quire_editor::Editor;
use quire_runtime::{
    BridgeError, ConfirmRequest, DocumentStore, DocumentWorkflow, MenuEvent, ModalCoordinator,
    ModalRequest, NativeBridge, SaveOutcome, Severity, Subscription, WorkflowError,
};
use quire_text::FileType;
use serde_json::{Value, json};

// ── Scripted host ──────────────────────────────────────────────────────

#[derive(Default)]
struct ScriptedBridge {
    replies: RefCell<VecDeque<Result<Value, String>>>,
    calls: RefCell<Vec<(String, Value)>>,
}

impl ScriptedBridge {
    fn with_replies(replies: impl IntoIterator<Item = Result<Value, &'static str>>) -> Rc<Self> {
        Rc::new(Self {
            replies: RefCell::new(
                replies
                    .into_iter()
                    .map(|r| r.map_err(str::to_string))
                    .collect(),
            ),
            calls: RefCell::default(),
        })
    }

    fn commands(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(c, _)| c.clone()).collect()
    }
}

impl NativeBridge for ScriptedBridge {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value, BridgeError> {
        self.calls.borrow_mut().push((command.to_string(), args));
        let reply = self.replies.borrow_mut().pop_front();
        match reply {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(BridgeError::failed(command, message)),
            None => panic!("unexpected bridge call {command}"),
        }
    }
}

// ── Scripted user ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Answer {
    Confirm,
    Cancel,
    Dismiss,
    Format(FileType),
}

struct ScriptedUi {
    seen: Rc<RefCell<Vec<ModalRequest>>>,
    _sub: Subscription,
}

impl ScriptedUi {
    fn attach(modal: &ModalCoordinator, answers: impl IntoIterator<Item = Answer>) -> Self {
        let queue: RefCell<VecDeque<Answer>> = RefCell::new(answers.into_iter().collect());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let handle = modal.clone();
        let sub = modal.subscribe(move |active| {
            let Some(active) = active else { return };
            log.borrow_mut().push(active.request.clone());
            let answer = queue.borrow_mut().pop_front();
            let result = match answer {
                Some(Answer::Confirm) => handle.respond_confirm(active.id, true),
                Some(Answer::Cancel) => handle.respond_confirm(active.id, false),
                Some(Answer::Dismiss) => handle.dismiss(active.id),
                Some(Answer::Format(ft)) => handle.choose_format(active.id, ft),
                None => panic!("unexpected modal {:?}", active.request),
            };
            result.expect("answer accepted");
        });
        Self { seen, _sub: sub }
    }

    fn requests(&self) -> Vec<ModalRequest> {
        self.seen.borrow().clone()
    }
}

// ── Fixture ────────────────────────────────────────────────────────────

struct Fixture {
    bridge: Rc<ScriptedBridge>,
    ui: ScriptedUi,
    wf: DocumentWorkflow<Rc<ScriptedBridge>>,
}

impl Fixture {
    fn new(
        replies: impl IntoIterator<Item = Result<Value, &'static str>>,
        answers: impl IntoIterator<Item = Answer>,
    ) -> Self {
        let bridge = ScriptedBridge::with_replies(replies);
        let modal = ModalCoordinator::new();
        let ui = ScriptedUi::attach(&modal, answers);
        let wf = DocumentWorkflow::new(DocumentStore::in_memory(), modal, Rc::clone(&bridge));
        Self { bridge, ui, wf }
    }

    fn store(&self) -> &DocumentStore {
        self.wf.store()
    }

    /// Edited document already saved at `path`.
    fn edited_at(self, path: &str, content: &str) -> Self {
        self.store().set_current_file(path, &quire_text::display_name(path), content, None);
        self.store().set_content(content);
        self
    }
}

fn confirm_title(request: &ModalRequest) -> &str {
    match request {
        ModalRequest::Confirm(c) => &c.title,
        ModalRequest::SaveAs(s) => &s.title,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// New
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn new_with_unsaved_changes_saves_in_place_then_clears() {
    let fx = Fixture::new([Ok(json!("File saved successfully: /d/n.html"))], [Answer::Confirm])
        .edited_at("/d/n.html", "hello");
    assert!(fx.store().snapshot().is_modified);

    assert!(block_on(fx.wf.new_document()).unwrap());

    let calls = fx.bridge.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "save_file");
    assert_eq!(
        calls[0].1,
        json!({ "content": "hello", "filePath": "/d/n.html", "fileType": "html" })
    );
    let state = fx.store().snapshot();
    assert_eq!(state.content, "");
    assert_eq!(state.file_path, None);
    assert!(!state.is_modified);

    match &fx.ui.requests()[0] {
        ModalRequest::Confirm(c) => {
            assert_eq!(c, &ConfirmRequest::unsaved_changes("Save & Continue", "Discard Changes"));
            assert_eq!(c.severity, Severity::Warning);
        }
        other => panic!("unexpected request {other:?}"),
    }
}

#[test]
fn new_without_changes_clears_silently() {
    let fx = Fixture::new([], []);
    fx.store().set_current_file("/d/n.html", "n.html", "kept", None);
    assert!(block_on(fx.wf.new_document()).unwrap());
    assert!(fx.ui.requests().is_empty());
    assert_eq!(fx.store().snapshot().content, "");
}

#[test]
fn new_discard_and_dismiss_both_clear_without_saving() {
    for answer in [Answer::Cancel, Answer::Dismiss] {
        let fx = Fixture::new([], [answer]).edited_at("/d/n.html", "hello");
        assert!(block_on(fx.wf.new_document()).unwrap(), "{answer:?}");
        assert!(fx.bridge.commands().is_empty());
        assert_eq!(fx.store().snapshot().file_path, None);
    }
}

#[test]
fn new_keeps_document_when_save_as_is_cancelled() {
    let fx = Fixture::new([], [Answer::Confirm, Answer::Dismiss]);
    fx.store().set_content("<p>untitled draft</p>");

    assert!(!block_on(fx.wf.new_document()).unwrap());
    assert!(fx.bridge.commands().is_empty());
    let state = fx.store().snapshot();
    assert_eq!(state.content, "<p>untitled draft</p>");
    assert!(state.is_modified);
    assert!(matches!(fx.ui.requests()[1], ModalRequest::SaveAs(_)));
}

#[test]
fn new_stops_when_the_save_fails() {
    let fx = Fixture::new(
        [Err("Failed to save file: disk full")],
        [Answer::Confirm, Answer::Confirm],
    )
    .edited_at("/d/n.html", "hello");

    let err = block_on(fx.wf.new_document()).unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Bridge {
            operation: "Save File",
            ..
        }
    ));

    let requests = fx.ui.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[1],
        ModalRequest::Confirm(ConfirmRequest::error(
            "Save File Error",
            "Failed to save file: Failed to save file: disk full"
        ))
    );
    let state = fx.store().snapshot();
    assert_eq!(state.content, "hello");
    assert!(state.is_modified);
    assert_eq!(fx.wf.running(), None);
}

// ═══════════════════════════════════════════════════════════════════════
// Open
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn open_cancelled_by_bridge_changes_nothing() {
    let fx = Fixture::new([Ok(Value::Null)], []);
    fx.store().set_current_file("/d/n.html", "n.html", "<p>a</p>", None);
    let before = fx.store().snapshot();
    let version = fx.store().version();

    assert!(!block_on(fx.wf.open_document()).unwrap());
    assert_eq!(fx.store().snapshot(), before);
    assert_eq!(fx.store().version(), version);
    assert!(fx.store().snapshot().recent_files.is_empty());
    assert!(fx.ui.requests().is_empty());
}

#[test]
fn open_loads_file_into_store_surface_and_recent_list() {
    let fx = Fixture::new(
        [Ok(json!({
            "content": "<p>buy milk</p>",
            "file_path": "/notes/todo.TXT",
            "file_name": "todo.TXT"
        }))],
        [],
    );
    let editor = Rc::new(RefCell::new(Editor::new()));
    let wf = DocumentWorkflow::new(
        fx.store().clone(),
        fx.wf.modal().clone(),
        Rc::clone(&fx.bridge),
    )
    .with_surface(Rc::clone(&editor));

    assert!(block_on(wf.open_document()).unwrap());
    let state = fx.store().snapshot();
    assert_eq!(state.file_type, FileType::Txt);
    assert_eq!(state.file_name.as_deref(), Some("todo.TXT"));
    assert_eq!(state.content, "<p>buy milk</p>");
    assert!(!state.is_modified);
    assert_eq!(state.recent_files[0].path, "/notes/todo.TXT");
    assert_eq!(state.recent_files[0].name, "todo.TXT");
    assert_eq!(editor.borrow().content(), "<p>buy milk</p>");
}

#[test]
fn open_without_path_is_html_and_not_recent() {
    let fx = Fixture::new([Ok(json!({ "content": "<p>x</p>" }))], []);
    assert!(block_on(fx.wf.open_document()).unwrap());
    let state = fx.store().snapshot();
    assert_eq!(state.file_type, FileType::Html);
    assert_eq!(state.file_path, None);
    assert!(state.recent_files.is_empty());
}

#[test]
fn open_with_changes_saves_first_or_discards() {
    let opened = json!({ "content": "<p>b</p>", "file_path": "/b.html", "file_name": "b.html" });

    let fx = Fixture::new([Ok(json!("ok")), Ok(opened.clone())], [Answer::Confirm])
        .edited_at("/a.html", "<p>a</p>");
    assert!(block_on(fx.wf.open_document()).unwrap());
    assert_eq!(fx.bridge.commands(), ["save_file", "open_file"]);
    assert_eq!(fx.ui.requests().len(), 1);
    match &fx.ui.requests()[0] {
        ModalRequest::Confirm(c) => {
            assert_eq!(c.confirm_label, "Save & Open");
            assert_eq!(c.cancel_label.as_deref(), Some("Discard & Open"));
        }
        other => panic!("unexpected request {other:?}"),
    }

    let fx = Fixture::new([Ok(opened)], [Answer::Cancel]).edited_at("/a.html", "<p>a</p>");
    assert!(block_on(fx.wf.open_document()).unwrap());
    assert_eq!(fx.bridge.commands(), ["open_file"]);
    assert_eq!(fx.store().snapshot().file_path.as_deref(), Some("/b.html"));
}

#[test]
fn open_dismissed_does_nothing() {
    let fx = Fixture::new([], [Answer::Dismiss]).edited_at("/a.html", "<p>a</p>");
    assert!(!block_on(fx.wf.open_document()).unwrap());
    assert!(fx.bridge.commands().is_empty());
    assert!(fx.store().snapshot().is_modified);
}

#[test]
fn open_invalid_response_reports_error_and_keeps_state() {
    let fx = Fixture::new([Ok(json!({ "file_path": "/x.html" }))], [Answer::Confirm]);
    fx.store().set_current_file("/d/n.html", "n.html", "<p>a</p>", None);
    let before = fx.store().snapshot();

    let err = block_on(fx.wf.open_document()).unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Bridge {
            operation: "Open File",
            source: BridgeError::InvalidResponse { .. }
        }
    ));
    assert_eq!(fx.store().snapshot(), before);
    let requests = fx.ui.requests();
    assert_eq!(confirm_title(&requests[0]), "Open File Error");
    match &requests[0] {
        ModalRequest::Confirm(c) => {
            assert!(c.message.starts_with("Failed to open file: "), "{}", c.message);
            assert_eq!(c.severity, Severity::Danger);
            assert_eq!(c.cancel_label, None);
        }
        other => panic!("unexpected request {other:?}"),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Save / Save As
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn save_as_with_blank_content_does_nothing() {
    let fx = Fixture::new([], []);
    fx.store().set_content("   ");
    let before = fx.store().snapshot();
    let version = fx.store().version();

    assert_eq!(block_on(fx.wf.save_as()).unwrap(), SaveOutcome::Skipped);
    assert_eq!(block_on(fx.wf.save()).unwrap(), SaveOutcome::Skipped);
    assert!(fx.bridge.commands().is_empty());
    assert!(fx.ui.requests().is_empty());
    assert_eq!(fx.store().snapshot(), before);
    assert_eq!(fx.store().version(), version);
}

#[test]
fn save_as_success_adopts_new_location() {
    let fx = Fixture::new(
        [Ok(json!({ "file_path": "/a/b.txt", "file_name": "b.txt" }))],
        [Answer::Format(FileType::Txt)],
    );
    fx.store().set_content("<p>note</p>");

    assert_eq!(block_on(fx.wf.save_as()).unwrap(), SaveOutcome::Saved);
    assert_eq!(
        fx.bridge.calls.borrow()[0].1,
        json!({ "content": "<p>note</p>", "fileType": "txt" })
    );
    let state = fx.store().snapshot();
    assert_eq!(state.file_type, FileType::Txt);
    assert_eq!(state.file_path.as_deref(), Some("/a/b.txt"));
    assert_eq!(state.content, "<p>note</p>");
    assert!(!state.is_modified);
    assert_eq!(state.recent_files[0].path, "/a/b.txt");
    assert_eq!(state.recent_files[0].name, "b.txt");
}

/// Host that lets the user keep typing while its dialog is open.
struct TypingHost {
    store: DocumentStore,
    typed: &'static str,
    reply: Value,
}

impl NativeBridge for TypingHost {
    async fn invoke(&self, _command: &str, _args: Value) -> Result<Value, BridgeError> {
        self.store.set_content(self.typed);
        Ok(self.reply.clone())
    }
}

#[test]
fn edits_made_during_save_are_kept_and_stay_modified() {
    let store = DocumentStore::in_memory();
    let modal = ModalCoordinator::new();
    let _ui = ScriptedUi::attach(&modal, [Answer::Format(FileType::Html)]);
    let host = TypingHost {
        store: store.clone(),
        typed: "<p>note and more</p>",
        reply: json!({ "file_path": "/a/b.html", "file_name": "b.html" }),
    };
    let wf = DocumentWorkflow::new(store.clone(), modal, host);
    store.set_content("<p>note</p>");

    assert_eq!(block_on(wf.save_as()).unwrap(), SaveOutcome::Saved);
    let state = store.snapshot();
    assert_eq!(state.content, "<p>note and more</p>");
    assert_eq!(state.file_path.as_deref(), Some("/a/b.html"));
    assert!(state.is_modified);

    let store = DocumentStore::in_memory();
    let host = TypingHost {
        store: store.clone(),
        typed: "<p>v2</p>",
        reply: json!("ok"),
    };
    let wf = DocumentWorkflow::new(store.clone(), ModalCoordinator::new(), host);
    store.set_current_file("/d/n.html", "n.html", "<p>v1</p>", None);
    store.set_content("<p>v1 edited</p>");
    assert_eq!(block_on(wf.save()).unwrap(), SaveOutcome::Saved);
    assert_eq!(store.snapshot().content, "<p>v2</p>");
    assert!(store.snapshot().is_modified);
}

#[test]
fn save_as_cancelled_chooser_performs_no_io() {
    let fx = Fixture::new([], [Answer::Dismiss]);
    fx.store().set_content("<p>note</p>");
    assert_eq!(block_on(fx.wf.save_as()).unwrap(), SaveOutcome::Cancelled);
    assert!(fx.bridge.commands().is_empty());
    assert!(fx.store().snapshot().is_modified);
}

#[test]
fn save_as_closed_dialog_keeps_document_unsaved() {
    let fx = Fixture::new([Ok(Value::Null)], [Answer::Format(FileType::Html)]);
    fx.store().set_content("<p>note</p>");
    assert_eq!(block_on(fx.wf.save_as()).unwrap(), SaveOutcome::Cancelled);
    let state = fx.store().snapshot();
    assert!(state.is_modified);
    assert_eq!(state.file_path, None);
}

#[test]
fn save_in_place_marks_saved() {
    let fx = Fixture::new([Ok(json!("ok"))], []).edited_at("/d/n.txt", "<p>t</p>");
    assert_eq!(block_on(fx.wf.save()).unwrap(), SaveOutcome::Saved);
    assert_eq!(fx.bridge.calls.borrow()[0].1["fileType"], "txt");
    assert!(!fx.store().snapshot().is_modified);
}

#[test]
fn save_without_path_goes_through_save_as() {
    let fx = Fixture::new(
        [Ok(json!({ "file_path": "/n.html", "file_name": "n.html" }))],
        [Answer::Format(FileType::Html)],
    );
    fx.store().set_content("<p>x</p>");
    assert_eq!(block_on(fx.wf.save()).unwrap(), SaveOutcome::Saved);
    assert_eq!(fx.bridge.commands(), ["save_file_as"]);
}

#[test]
fn save_as_failure_is_reported_with_operation_name() {
    let fx = Fixture::new(
        [Err("Failed to save file: read-only")],
        [Answer::Format(FileType::Html), Answer::Confirm],
    );
    fx.store().set_content("<p>x</p>");
    assert!(block_on(fx.wf.save_as()).is_err());
    assert_eq!(confirm_title(&fx.ui.requests()[1]), "Save File As Error");
}

// ═══════════════════════════════════════════════════════════════════════
// Menu events
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn menu_events_run_in_order() {
    let fx = Fixture::new(
        [
            Ok(json!({ "file_path": "/n.html", "file_name": "n.html" })),
            Ok(json!("ok")),
        ],
        [Answer::Format(FileType::Html)],
    );
    fx.store().set_content("<p>x</p>");

    let events = futures::stream::iter([MenuEvent::SaveAs, MenuEvent::Save, MenuEvent::New]);
    assert_eq!(block_on(fx.wf.run_menu_events(events)), 3);
    assert_eq!(fx.bridge.commands(), ["save_file_as", "save_file"]);
    assert_eq!(fx.store().snapshot().content, "");
    assert_eq!(fx.store().snapshot().recent_files.len(), 1);
}

#[test]
fn dispatch_maps_wire_names() {
    let fx = Fixture::new([Ok(Value::Null)], []);
    let event: MenuEvent = "open".parse().unwrap();
    block_on(fx.wf.dispatch(event)).unwrap();
    assert_eq!(fx.bridge.commands(), ["open_file"]);
}
