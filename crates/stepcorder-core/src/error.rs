//! Structured errors for recorder hosts

use serde::{Deserialize, Serialize};
use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidTransition,
    SubscriberFailed,
    ListenerFailed,
    NotAnElement,
    NodeNotFound,
    HierarchyRequest,
    SelectorUnresolvable,
    ConfigInvalid,
    Unknown,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            suggestions: Vec::new(),
            context: None,
        }
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn is_invalid_transition(&self) -> bool {
        self.code == ErrorCode::InvalidTransition
    }

    /// `action` was attempted while the recorder was in `state`.
    pub fn invalid_transition(action: &str, state: &str) -> Self {
        Self::new(
            ErrorCode::InvalidTransition,
            format!("Cannot {} a recorder in {} state", action, state),
        )
        .with_context(serde_json::json!({ "action": action, "state": state }))
    }

    pub fn subscriber_failed(source: anyhow::Error) -> Self {
        Self::new(
            ErrorCode::SubscriberFailed,
            format!("Step subscriber failed: {:#}", source),
        )
    }

    pub fn listener_failed(event: &str, source: anyhow::Error) -> Self {
        Self::new(
            ErrorCode::ListenerFailed,
            format!("{} listener failed: {:#}", event, source),
        )
    }

    pub fn not_an_element(node: usize) -> Self {
        Self::new(
            ErrorCode::NotAnElement,
            format!("Node {} is not an element", node),
        )
    }

    pub fn node_not_found(node: usize) -> Self {
        Self::new(
            ErrorCode::NodeNotFound,
            format!("Node {} does not belong to this document", node),
        )
    }

    pub fn hierarchy_request(parent: usize, child: usize) -> Self {
        Self::new(
            ErrorCode::HierarchyRequest,
            format!("Node {} cannot be inserted under node {}", child, parent),
        )
    }

    pub fn selector_unresolvable(node: usize) -> Self {
        Self::new(
            ErrorCode::SelectorUnresolvable,
            format!("Node {} has no selector path below <html>", node),
        )
    }

    pub fn config_invalid(reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ConfigInvalid,
            format!("Invalid recorder config: {}", reason),
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for Error {}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        // Keep the structured code when the anyhow error wraps one of ours.
        match e.downcast::<Error>() {
            Ok(inner) => inner,
            Err(e) => Self::new(ErrorCode::Unknown, format!("{:#}", e)),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::new(ErrorCode::Unknown, e.to_string())
    }
}
