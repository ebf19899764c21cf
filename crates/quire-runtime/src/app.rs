#![forbid(unsafe_code)]

//! Application root.
//!
//! [`QuireApp`] wires the runtime together from a [`QuireConfig`]: it picks
//! the durable storage, hydrates the recent-files list, keeps that list
//! synced to storage, and hands the same store and modal coordinator to the
//! workflow controller.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::info;

use crate::bridge::NativeBridge;
use crate::config::QuireConfig;
use crate::modal::ModalCoordinator;
use crate::reactive::Subscription;
use crate::storage::{FileStorage, KeyValueStorage, MemoryStorage};
use crate::store::DocumentStore;
use crate::workflow::{DocumentWorkflow, EditingSurface};

/// The wired-up runtime.
pub struct QuireApp<B> {
    config: QuireConfig,
    workflow: DocumentWorkflow<B>,
    _recent_sync: Subscription,
}

impl<B: NativeBridge> QuireApp<B> {
    /// Build with the storage named by `config.storage.path` (in memory when
    /// unset).
    #[must_use]
    pub fn new(config: QuireConfig, bridge: B) -> Self {
        let storage: Rc<dyn KeyValueStorage> = match &config.storage.path {
            Some(path) => Rc::new(FileStorage::new(path)),
            None => Rc::new(MemoryStorage::new()),
        };
        Self::with_storage(config, storage, bridge)
    }

    #[must_use]
    pub fn with_storage(config: QuireConfig, storage: Rc<dyn KeyValueStorage>, bridge: B) -> Self {
        let store = DocumentStore::new(storage, config.recent_files.clone());
        let recent = store.load_recent_files();
        let recent_sync = store.persist_recent_files_on_change();
        let workflow = DocumentWorkflow::new(store, ModalCoordinator::new(), bridge);
        info!(
            recent,
            durable = config.storage.path.is_some(),
            "runtime ready"
        );
        Self {
            config,
            workflow,
            _recent_sync: recent_sync,
        }
    }

    /// Keep `surface` in step with New and Open.
    #[must_use]
    pub fn with_surface<S: EditingSurface + 'static>(self, surface: Rc<RefCell<S>>) -> Self {
        Self {
            workflow: self.workflow.with_surface(surface),
            ..self
        }
    }

    #[must_use]
    pub fn config(&self) -> &QuireConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &DocumentStore {
        self.workflow.store()
    }

    #[must_use]
    pub fn modal(&self) -> &ModalCoordinator {
        self.workflow.modal()
    }

    #[must_use]
    pub fn workflow(&self) -> &DocumentWorkflow<B> {
        &self.workflow
    }
}
