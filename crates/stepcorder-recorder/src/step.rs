//! Recorded steps
//!
//! Steps serialize to compact tagged JSON:
//! `{"type":"click","element":7,"selector":"button#go"}`

use serde::{Deserialize, Serialize};
use stepcorder_core::NodeId;

/// One captured interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Step {
    Click(ClickStep),
    Keydown(KeydownStep),
    Scroll(ScrollStep),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickStep {
    pub element: NodeId,
    pub selector: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeydownStep {
    pub element: NodeId,
    pub selector: String,
    /// Key identifier as reported by the event, e.g. `a`, `Enter`, `ArrowUp`
    pub key: String,
}

/// Viewport-level wheel gesture, not tied to an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollStep {
    pub scroll_delta: Delta,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Click,
    Keydown,
    Scroll,
}

impl Step {
    pub fn click(element: NodeId, selector: impl Into<String>) -> Self {
        Step::Click(ClickStep {
            element,
            selector: selector.into(),
        })
    }

    pub fn keydown(element: NodeId, selector: impl Into<String>, key: impl Into<String>) -> Self {
        Step::Keydown(KeydownStep {
            element,
            selector: selector.into(),
            key: key.into(),
        })
    }

    pub fn scroll(x: f64, y: f64) -> Self {
        Step::Scroll(ScrollStep {
            scroll_delta: Delta { x, y },
        })
    }

    pub fn kind(&self) -> StepKind {
        match self {
            Step::Click(_) => StepKind::Click,
            Step::Keydown(_) => StepKind::Keydown,
            Step::Scroll(_) => StepKind::Scroll,
        }
    }

    pub fn element(&self) -> Option<NodeId> {
        match self {
            Step::Click(s) => Some(s.element),
            Step::Keydown(s) => Some(s.element),
            Step::Scroll(_) => None,
        }
    }

    pub fn selector(&self) -> Option<&str> {
        match self {
            Step::Click(s) => Some(s.selector.as_str()),
            Step::Keydown(s) => Some(s.selector.as_str()),
            Step::Scroll(_) => None,
        }
    }
}

impl From<ClickStep> for Step {
    fn from(step: ClickStep) -> Self {
        Step::Click(step)
    }
}

impl From<KeydownStep> for Step {
    fn from(step: KeydownStep) -> Self {
        Step::Keydown(step)
    }
}

impl From<ScrollStep> for Step {
    fn from(step: ScrollStep) -> Self {
        Step::Scroll(step)
    }
}
