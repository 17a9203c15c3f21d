//! stepcorder-recorder - record page interactions as steps
//!
//! Clicks, key presses and wheel gestures become typed [`Step`]s carrying a
//! CSS selector path for the element involved. Steps land in an ordered log
//! and are fanned out to subscribers as they happen.

pub mod config;
pub mod overlay;
pub mod recorder;
pub mod registry;
pub mod step;
pub mod stream;

pub use config::{RecorderConfig, StyleMap};
pub use overlay::{HoverOverlay, Overlay, OverlayHandle, OverlayState};
pub use recorder::{Recorder, RecorderState};
pub use registry::{subscriber, StepRegistry, Subscriber};
pub use step::{ClickStep, Delta, KeydownStep, ScrollStep, Step, StepKind};
pub use stream::{Receiver, StepStream};

pub mod prelude {
    pub use crate::config::{RecorderConfig, StyleMap};
    pub use crate::overlay::{HoverOverlay, Overlay, OverlayHandle};
    pub use crate::recorder::{Recorder, RecorderState};
    pub use crate::registry::{subscriber, StepRegistry, Subscriber};
    pub use crate::step::{Delta, Step, StepKind};
    pub use crate::stream::StepStream;
}
