//! DOM events and the event-target capability
//!
//! Hosts deliver raw events through an [`EventTarget`]. The recorder only
//! ever sees this trait, so it runs the same against a browser binding or the
//! in-memory [`Page`](crate::page::Page).

use crate::dom::{Document, NodeId, NodeKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Click,
    Keydown,
    Wheel,
    Mouseover,
    Mouseout,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::Keydown => "keydown",
            EventKind::Wheel => "wheel",
            EventKind::Mouseover => "mouseover",
            EventKind::Mouseout => "mouseout",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific payload
#[derive(Debug, Clone, PartialEq)]
pub enum EventDetail {
    None,
    Key(String),
    Wheel { delta_x: f64, delta_y: f64 },
}

/// Owned description of an event, before it is dispatched
#[derive(Debug, Clone, PartialEq)]
pub struct EventInit {
    pub kind: EventKind,
    pub target: NodeId,
    pub detail: EventDetail,
}

impl EventInit {
    pub fn click(target: NodeId) -> Self {
        Self {
            kind: EventKind::Click,
            target,
            detail: EventDetail::None,
        }
    }

    pub fn key_down(target: NodeId, key: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Keydown,
            target,
            detail: EventDetail::Key(key.into()),
        }
    }

    pub fn wheel(target: NodeId, delta_x: f64, delta_y: f64) -> Self {
        Self {
            kind: EventKind::Wheel,
            target,
            detail: EventDetail::Wheel { delta_x, delta_y },
        }
    }

    pub fn mouse_over(target: NodeId) -> Self {
        Self {
            kind: EventKind::Mouseover,
            target,
            detail: EventDetail::None,
        }
    }

    pub fn mouse_out(target: NodeId) -> Self {
        Self {
            kind: EventKind::Mouseout,
            target,
            detail: EventDetail::None,
        }
    }
}

/// An event as seen by listeners, borrowing the live document
pub struct DomEvent<'a> {
    document: &'a Document,
    init: &'a EventInit,
}

impl<'a> DomEvent<'a> {
    pub fn new(document: &'a Document, init: &'a EventInit) -> Self {
        Self { document, init }
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }

    pub fn kind(&self) -> EventKind {
        self.init.kind
    }

    pub fn target(&self) -> NodeId {
        self.init.target
    }

    pub fn detail(&self) -> &EventDetail {
        &self.init.detail
    }

    /// Key identifier of a keydown event
    pub fn key(&self) -> Option<&str> {
        match &self.init.detail {
            EventDetail::Key(key) => Some(key.as_str()),
            _ => None,
        }
    }

    /// `(delta_x, delta_y)` of a wheel event
    pub fn delta(&self) -> Option<(f64, f64)> {
        match self.init.detail {
            EventDetail::Wheel { delta_x, delta_y } => Some((delta_x, delta_y)),
            _ => None,
        }
    }

    /// Target followed by its ancestors, innermost first
    pub fn composed_path(&self) -> Vec<NodeId> {
        self.document.composed_path(self.init.target)
    }

    /// The target, or the parent element when a text node was hit
    pub fn target_element(&self) -> Option<NodeId> {
        let target = self.init.target;
        match self.document.kind(target)? {
            NodeKind::Element(_) => Some(target),
            NodeKind::Text(_) => self.document.parent_element(target),
            NodeKind::Document => None,
        }
    }
}

impl fmt::Debug for DomEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomEvent")
            .field("kind", &self.init.kind)
            .field("target", &self.init.target)
            .field("detail", &self.init.detail)
            .finish()
    }
}

/// Listener identity is the `Arc` allocation, as with DOM function references.
pub type Listener = Arc<dyn Fn(&DomEvent<'_>) -> anyhow::Result<()> + Send + Sync>;

pub fn listener<F>(f: F) -> Listener
where
    F: Fn(&DomEvent<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Capability to attach raw DOM listeners
///
/// Adding a listener that is already registered for the same kind is a
/// no-op; removing one that is not registered is a no-op.
pub trait EventTarget: Send + Sync {
    fn add_listener(&self, kind: EventKind, listener: Listener);
    fn remove_listener(&self, kind: EventKind, listener: &Listener);
}

impl<T: EventTarget + ?Sized> EventTarget for Arc<T> {
    fn add_listener(&self, kind: EventKind, listener: Listener) {
        (**self).add_listener(kind, listener)
    }

    fn remove_listener(&self, kind: EventKind, listener: &Listener) {
        (**self).remove_listener(kind, listener)
    }
}
