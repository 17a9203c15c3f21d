//! Recorder configuration

use anyhow::{Context, Result as AnyResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use stepcorder_core::{Error, Result};

/// CSS property name to value, e.g. `"outline" => "2px solid red"`
pub type StyleMap = BTreeMap<String, String>;

/// Recorder configuration
///
/// Reads the camelCase keys hosts already use:
/// `{"enableMouseOverStyle": true, "mouseOverStyle": {"outline": "2px solid red"}}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecorderConfig {
    /// Show the hover overlay while listeners are registered
    pub enable_mouse_over_style: bool,
    /// Style overrides merged over the overlay defaults. Without it the
    /// overlay stays off even when enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mouse_over_style: Option<StyleMap>,
}

impl RecorderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::config_invalid)
    }

    pub fn load(path: impl AsRef<Path>) -> AnyResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading recorder config {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("parsing recorder config {}", path.display()))
    }

    /// Turn the overlay on with `style` merged over its defaults
    pub fn mouse_over_style<I, K, V>(mut self, style: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.enable_mouse_over_style = true;
        self.mouse_over_style = Some(
            style
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Style to hand the overlay, when it should be shown at all
    pub fn overlay_style(&self) -> Option<&StyleMap> {
        if self.enable_mouse_over_style {
            self.mouse_over_style.as_ref()
        } else {
            None
        }
    }
}
