//! Recorder lifecycle and DOM event handlers
//!
//! ```text
//!            start             pause
//!   Idle ───────────▶ Started ───────▶ Paused
//!                        ▲   ◀───────    │
//!                        │  start/resume │
//!                        └───────────────┘
//!   any state ── stop ──▶ Stopped (terminal)
//! ```
//!
//! Listeners are registered on every entry into `Started` and removed on
//! every exit from it.

use crate::config::RecorderConfig;
use crate::overlay::{HoverOverlay, Overlay, OverlayHandle};
use crate::registry::{StepRegistry, Subscriber};
use crate::step::Step;
use crate::stream::StepStream;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use stepcorder_core::{
    listener, path_of, DomEvent, Error, EventKind, EventTarget, Listener, NodeId, Page, Result,
};
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecorderState {
    Idle,
    Started,
    Paused,
    Stopped,
}

impl fmt::Display for RecorderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecorderState::Idle => "idle",
            RecorderState::Started => "started",
            RecorderState::Paused => "paused",
            RecorderState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// The recorder
pub struct Recorder {
    config: RecorderConfig,
    state: RecorderState,
    target: Arc<dyn EventTarget>,
    registry: Arc<StepRegistry>,
    handlers: Handlers,
    overlay: Option<Box<dyn Overlay>>,
    overlay_handle: Option<OverlayHandle>,
}

impl Recorder {
    pub fn new(target: Arc<dyn EventTarget>, config: RecorderConfig) -> Self {
        let registry = Arc::new(StepRegistry::new());
        Self {
            config,
            state: RecorderState::Idle,
            target,
            handlers: Handlers::new(&registry),
            registry,
            overlay: None,
            overlay_handle: None,
        }
    }

    /// Recorder on an in-memory page, with the hover overlay wired in
    pub fn for_page(page: Arc<Page>, config: RecorderConfig) -> Self {
        let overlay = HoverOverlay::new(page.clone());
        Self::new(page, config).with_overlay(overlay)
    }

    /// Overlay shown while listeners are registered, if the config asks for one
    pub fn with_overlay(mut self, overlay: impl Overlay + 'static) -> Self {
        self.overlay = Some(Box::new(overlay));
        self
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// Steps recorded so far, in capture order
    pub fn steps(&self) -> Vec<Step> {
        self.registry.steps()
    }

    pub fn start(&mut self) -> Result<()> {
        match self.state {
            RecorderState::Idle | RecorderState::Paused => {}
            RecorderState::Started => {
                return Err(self.reject("start", "Call pause() or stop() first"));
            }
            RecorderState::Stopped => {
                return Err(self.reject(
                    "start",
                    "A stopped recorder cannot be restarted; create a new Recorder",
                ));
            }
        }
        self.transition(RecorderState::Started);
        self.register_listeners();
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        if self.state != RecorderState::Paused {
            return Err(self.reject("resume", "Only a paused recorder can be resumed"));
        }
        self.transition(RecorderState::Started);
        self.register_listeners();
        Ok(())
    }

    /// No-op unless recording
    pub fn pause(&mut self) {
        if self.state != RecorderState::Started {
            return;
        }
        self.transition(RecorderState::Paused);
        self.deregister_listeners();
    }

    /// Stop for good: listeners off, steps and subscribers dropped
    pub fn stop(&mut self) {
        self.transition(RecorderState::Stopped);
        self.deregister_listeners();
        self.registry.destroy();
    }

    pub fn subscribe(&self, subscriber: Subscriber) {
        self.registry.subscribe(subscriber);
    }

    pub fn unsubscribe(&self, subscriber: &Subscriber) {
        self.registry.unsubscribe(subscriber);
    }

    /// Receive steps over a bounded channel instead of a callback
    pub fn stream(&self, capacity: usize) -> StepStream {
        self.registry.stream(capacity)
    }

    fn transition(&mut self, to: RecorderState) {
        debug!(from = %self.state, to = %to, "recorder transition");
        self.state = to;
    }

    fn reject(&self, action: &str, suggestion: &str) -> Error {
        warn!(action, state = %self.state, "rejected recorder transition");
        Error::invalid_transition(action, &self.state.to_string())
            .with_suggestions(vec![suggestion.to_string()])
    }

    fn register_listeners(&mut self) {
        if let (Some(overlay), Some(style)) = (&self.overlay, self.config.overlay_style()) {
            match overlay.enable(style) {
                Ok(handle) => self.overlay_handle = Some(handle),
                Err(e) => warn!(error = %e, "hover overlay unavailable, recording without it"),
            }
        }
        for (kind, handler) in self.handlers.iter() {
            self.target.add_listener(kind, handler.clone());
        }
    }

    fn deregister_listeners(&mut self) {
        if let Some(handle) = self.overlay_handle.take() {
            handle.dispose();
        }
        for (kind, handler) in self.handlers.iter() {
            self.target.remove_listener(kind, handler);
        }
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.deregister_listeners();
    }
}

impl fmt::Debug for Recorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder")
            .field("state", &self.state)
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("overlay_enabled", &self.overlay_handle.is_some())
            .finish()
    }
}

/// Raw DOM listeners, created once so they can be removed by identity
struct Handlers {
    click: Listener,
    keydown: Listener,
    wheel: Listener,
}

impl Handlers {
    fn new(registry: &Arc<StepRegistry>) -> Self {
        let r = registry.clone();
        let click = listener(move |event| {
            if let Some((element, selector)) = locate(event) {
                r.push(Step::click(element, selector))?;
            }
            Ok(())
        });

        let r = registry.clone();
        let keydown = listener(move |event| {
            if let Some((element, selector)) = locate(event) {
                let key = event.key().unwrap_or("Unidentified");
                r.push(Step::keydown(element, selector, key))?;
            }
            Ok(())
        });

        let r = registry.clone();
        let wheel = listener(move |event| {
            let (x, y) = event.delta().unwrap_or_default();
            r.push(Step::scroll(x, y))?;
            Ok(())
        });

        Self {
            click,
            keydown,
            wheel,
        }
    }

    fn iter(&self) -> [(EventKind, &Listener); 3] {
        [
            (EventKind::Click, &self.click),
            (EventKind::Keydown, &self.keydown),
            (EventKind::Wheel, &self.wheel),
        ]
    }
}

/// Element and selector path for an element-targeted event
fn locate(event: &DomEvent<'_>) -> Option<(NodeId, String)> {
    let Some(element) = event.target_element() else {
        debug!(kind = %event.kind(), target = event.target().index(), "event without element target, skipped");
        return None;
    };
    match path_of(event.document(), element) {
        Ok(selector) => {
            trace!(kind = %event.kind(), %selector, "captured");
            Some((element, selector))
        }
        Err(e) => {
            debug!(kind = %event.kind(), error = %e, "no selector path, skipped");
            None
        }
    }
}
