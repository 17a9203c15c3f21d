//! Hover overlay collaborator
//!
//! The recorder only knows the [`Overlay`] trait: enabling hands back an
//! [`OverlayHandle`], disabling is disposing that handle. [`HoverOverlay`]
//! is the implementation for an in-memory [`Page`].

use crate::config::StyleMap;
use parking_lot::Mutex;
use std::sync::Arc;
use stepcorder_core::{
    bounding_element, listener, Document, EventKind, EventTarget, NodeId, Page, Result,
};
use tracing::{debug, warn};

pub const CONTAINER_ID: &str = "recorder-overlay-container";
pub const OVERLAY_ID: &str = "recorder-overlay";

pub trait Overlay: Send + Sync {
    fn enable(&self, style: &StyleMap) -> Result<OverlayHandle>;
}

/// Releases an enabled overlay exactly once, on `dispose` or on drop
#[must_use = "dropping the handle disables the overlay immediately"]
pub struct OverlayHandle {
    disposer: Option<Box<dyn FnOnce() + Send>>,
}

impl OverlayHandle {
    pub fn new(disposer: impl FnOnce() + Send + 'static) -> Self {
        Self {
            disposer: Some(Box::new(disposer)),
        }
    }

    pub fn dispose(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(disposer) = self.disposer.take() {
            disposer();
        }
    }
}

impl Drop for OverlayHandle {
    fn drop(&mut self) {
        self.release();
    }
}

/// What the overlay currently paints
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayState {
    pub container: Option<NodeId>,
    pub target: Option<NodeId>,
    pub style: StyleMap,
}

/// Outlines the element under the pointer.
///
/// Enabling or disposing from inside an event dispatch takes effect on the
/// listener table at once; the container is mounted or removed once the
/// dispatch returns.
pub struct HoverOverlay {
    page: Arc<Page>,
    state: Arc<Mutex<OverlayState>>,
}

impl HoverOverlay {
    pub fn new(page: Arc<Page>) -> Self {
        Self {
            page,
            state: Arc::new(Mutex::new(OverlayState::default())),
        }
    }

    pub fn state(&self) -> OverlayState {
        self.state.lock().clone()
    }

    pub fn is_enabled(&self) -> bool {
        self.state.lock().container.is_some()
    }
}

impl Overlay for HoverOverlay {
    fn enable(&self, style: &StyleMap) -> Result<OverlayHandle> {
        let state = self.state.clone();
        self.page.update_document(move |doc| match mount(doc) {
            Ok(container) => {
                state.lock().container = Some(container);
                debug!(container = container.index(), "hover overlay mounted");
            }
            Err(e) => warn!(error = %e, "hover overlay container not mounted"),
        });

        let state = self.state.clone();
        let overrides = style.clone();
        let over = listener(move |event| {
            let doc = event.document();
            let Some(element) = bounding_element(doc, &event.composed_path()) else {
                return Ok(());
            };
            let rect = doc.rect(element).unwrap_or_default();

            let mut style = default_style();
            style.insert("top".into(), format!("{}px", rect.y));
            style.insert("left".into(), format!("{}px", rect.x));
            style.insert("width".into(), format!("{}px", rect.width));
            style.insert("height".into(), format!("{}px", rect.height));
            style.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));

            let mut state = state.lock();
            state.target = Some(element);
            state.style = style;
            Ok(())
        });

        let state = self.state.clone();
        let out = listener(move |_| {
            let mut state = state.lock();
            state.target = None;
            state.style.clear();
            Ok(())
        });

        self.page.add_listener(EventKind::Mouseover, over.clone());
        self.page.add_listener(EventKind::Mouseout, out.clone());

        let page = self.page.clone();
        let state = self.state.clone();
        Ok(OverlayHandle::new(move || {
            page.remove_listener(EventKind::Mouseover, &over);
            page.remove_listener(EventKind::Mouseout, &out);
            {
                let mut state = state.lock();
                state.target = None;
                state.style.clear();
            }
            page.update_document(move |doc| {
                let Some(container) = state.lock().container.take() else {
                    return;
                };
                if let Err(e) = doc.remove(container) {
                    warn!(error = %e, "overlay container already gone");
                }
                debug!("hover overlay disposed");
            });
        }))
    }
}

/// `div#recorder-overlay-container > div#recorder-overlay` under `<body>`
fn mount(doc: &mut Document) -> Result<NodeId> {
    let parent = doc
        .body()
        .or_else(|| doc.document_element())
        .unwrap_or_else(|| doc.root());
    let container = doc.create_element(parent, "div")?;
    doc.set_attribute(container, "id", CONTAINER_ID)?;
    let overlay = doc.create_element(container, "div")?;
    doc.set_attribute(overlay, "id", OVERLAY_ID)?;
    Ok(container)
}

fn default_style() -> StyleMap {
    [
        ("box-sizing", "border-box"),
        ("pointer-events", "none"),
        ("position", "fixed"),
        ("z-index", "2147483647"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
