//! In-memory page: a document plus its listener table
//!
//! `Page` is the event-target host used when there is no browser around,
//! e.g. in tests or when steps are synthesized from another source.

use crate::dom::{Document, NodeId};
use crate::error::{Error, Result};
use crate::event::{DomEvent, EventInit, EventKind, EventTarget, Listener};
use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::trace;

type DocumentUpdate = Box<dyn FnOnce(&mut Document) + Send>;

pub struct Page {
    document: RwLock<Document>,
    listeners: Mutex<HashMap<EventKind, Vec<Listener>>>,
    /// Nesting depth of `dispatch` calls in flight
    dispatching: AtomicUsize,
    pending: Mutex<Vec<DocumentUpdate>>,
}

impl Page {
    pub fn new(document: Document) -> Self {
        Self {
            document: RwLock::new(document),
            listeners: Mutex::new(HashMap::new()),
            dispatching: AtomicUsize::new(0),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn document(&self) -> RwLockReadGuard<'_, Document> {
        self.document.read()
    }

    /// Write access. Must not be taken from inside a listener; use
    /// [`Page::update_document`] there.
    pub fn document_mut(&self) -> RwLockWriteGuard<'_, Document> {
        self.document.write()
    }

    /// Apply `update` to the document now, or once the outermost dispatch in
    /// flight returns. Queued updates run in the order they were requested.
    pub fn update_document<F>(&self, update: F)
    where
        F: FnOnce(&mut Document) + Send + 'static,
    {
        if self.is_dispatching() {
            let mut pending = self.pending.lock();
            pending.push(Box::new(update));
            trace!(queued = pending.len(), "document update deferred");
        } else {
            update(&mut self.document.write());
        }
    }

    pub fn is_dispatching(&self) -> bool {
        self.dispatching.load(Ordering::SeqCst) > 0
    }

    /// Deliver `init` to every listener registered for its kind.
    ///
    /// Listeners run in registration order against a snapshot of the table,
    /// so a listener may add or remove listeners while the event is in
    /// flight. The first failing listener stops delivery and its error is
    /// returned. Updates queued with [`Page::update_document`] are applied
    /// when the outermost dispatch returns, whether or not it failed.
    pub fn dispatch(&self, init: EventInit) -> Result<()> {
        self.dispatching.fetch_add(1, Ordering::SeqCst);
        let result = self.deliver(&init);
        if self.dispatching.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.flush_updates();
        }
        result
    }

    fn deliver(&self, init: &EventInit) -> Result<()> {
        let doc = self.document.read_recursive();
        if !doc.contains(init.target) {
            return Err(Error::node_not_found(init.target.index()));
        }

        let listeners = self
            .listeners
            .lock()
            .get(&init.kind)
            .cloned()
            .unwrap_or_default();
        trace!(kind = %init.kind, target = init.target.index(), listeners = listeners.len(), "dispatch");

        let event = DomEvent::new(&doc, init);
        for listener in listeners {
            listener(&event).map_err(|e| match e.downcast::<Error>() {
                Ok(inner) => inner,
                Err(e) => Error::listener_failed(init.kind.as_str(), e),
            })?;
        }
        Ok(())
    }

    fn flush_updates(&self) {
        let pending = std::mem::take(&mut *self.pending.lock());
        if pending.is_empty() {
            return;
        }
        trace!(updates = pending.len(), "applying deferred document updates");
        let mut doc = self.document.write();
        for update in pending {
            update(&mut doc);
        }
    }

    pub fn click(&self, target: NodeId) -> Result<()> {
        self.dispatch(EventInit::click(target))
    }

    pub fn key_down(&self, target: NodeId, key: &str) -> Result<()> {
        self.dispatch(EventInit::key_down(target, key))
    }

    /// Wheel events target `<body>`, falling back to `<html>` then the root
    pub fn wheel(&self, delta_x: f64, delta_y: f64) -> Result<()> {
        let target = {
            let doc = self.document.read();
            doc.body()
                .or_else(|| doc.document_element())
                .unwrap_or_else(|| doc.root())
        };
        self.dispatch(EventInit::wheel(target, delta_x, delta_y))
    }

    pub fn mouse_over(&self, target: NodeId) -> Result<()> {
        self.dispatch(EventInit::mouse_over(target))
    }

    pub fn mouse_out(&self, target: NodeId) -> Result<()> {
        self.dispatch(EventInit::mouse_out(target))
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.lock().get(&kind).map_or(0, Vec::len)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(Document::skeleton())
    }
}

impl EventTarget for Page {
    fn add_listener(&self, kind: EventKind, listener: Listener) {
        let mut table = self.listeners.lock();
        let entries = table.entry(kind).or_default();
        if !entries.iter().any(|l| Arc::ptr_eq(l, &listener)) {
            entries.push(listener);
        }
    }

    fn remove_listener(&self, kind: EventKind, listener: &Listener) {
        if let Some(entries) = self.listeners.lock().get_mut(&kind) {
            entries.retain(|l| !Arc::ptr_eq(l, listener));
        }
    }
}
