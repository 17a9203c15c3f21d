//! # stepcorder
//!
//! Record what a user does on a web page as replayable steps.
//!
//! ## Features
//!
//! - **Recording**: clicks, key presses and wheel gestures as typed steps
//! - **Selectors**: a stable CSS selector path for every element involved
//! - **Fan-out**: callbacks or a channel, fed synchronously as events arrive
//! - **Host-agnostic**: anything implementing `EventTarget` can feed a recorder
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use stepcorder::prelude::*;
//!
//! let page = Arc::new(Page::default());
//! let button = {
//!     let mut doc = page.document_mut();
//!     let body = doc.body().unwrap();
//!     let button = doc.create_element(body, "button")?;
//!     doc.set_attribute(button, "id", "go")?;
//!     button
//! };
//!
//! let mut recorder = Recorder::for_page(page.clone(), RecorderConfig::default());
//! recorder.subscribe(subscriber(|step| {
//!     println!("{:?} {:?}", step.kind(), step.selector());
//!     Ok(())
//! }));
//! recorder.start()?;
//!
//! page.click(button)?;
//! assert_eq!(recorder.steps()[0].selector(), Some("button#go"));
//! # Ok::<(), anyhow::Error>(())
//! ```

// Re-export core document model and selectors
pub use stepcorder_core::*;

// Re-export recorder module
pub use stepcorder_recorder as recorder;

pub use stepcorder_recorder::{
    subscriber, HoverOverlay, Overlay, OverlayHandle, Recorder, RecorderConfig, RecorderState,
    Step, StepKind, StepRegistry, StepStream, Subscriber,
};

/// Prelude - import everything you need
pub mod prelude {
    pub use stepcorder_core::prelude::*;
    pub use stepcorder_recorder::prelude::*;
}
