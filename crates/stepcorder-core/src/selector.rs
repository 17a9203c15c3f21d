//! CSS selector paths for recorded elements
//!
//! Each element maps to one segment:
//!   button#go                 - element with an id
//!   a[href=/docs]             - element with an href
//!   li                        - only child of its parent
//!   li:first-child            - first element child
//!   li:nth-child(3)           - 1-based position among element children
//!
//! Segments are joined from the outermost element below `<html>` down to the
//! target: `body:nth-child(2) > ul > li:first-child`. An id or href segment
//! anchors the path, so ancestors above it are left out:
//! `form#login > input:nth-child(2)`.

use crate::dom::{Document, NodeId};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

const COMBINATOR: &str = " > ";

/// Selector for a single element, without ancestor context
pub fn selector_of(doc: &Document, node: NodeId) -> Result<String> {
    segment(doc, node).map(|s| s.text)
}

/// Full selector path from below `<html>` down to `node`
pub fn path_of(doc: &Document, node: NodeId) -> Result<String> {
    SelectorPath::resolve(doc, node).map(|p| p.to_string())
}

/// First element on `path` (innermost first) rendered with a non-zero area
pub fn bounding_element(doc: &Document, path: &[NodeId]) -> Option<NodeId> {
    path.iter()
        .copied()
        .find(|&n| doc.rect(n).is_some_and(|r| !r.is_empty()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorPath {
    segments: Vec<String>,
}

impl SelectorPath {
    pub fn resolve(doc: &Document, node: NodeId) -> Result<Self> {
        if !doc.is_element(node) {
            return Err(missing(doc, node));
        }

        let mut segments = Vec::new();
        let mut current = Some(node);
        while let Some(n) = current {
            if doc.tag_name(n).is_some_and(|t| t.eq_ignore_ascii_case("html")) {
                break;
            }
            let seg = segment(doc, n)?;
            segments.push(seg.text);
            if seg.anchored {
                break;
            }
            current = doc.parent_element(n);
        }

        if segments.is_empty() {
            return Err(Error::selector_unresolvable(node.index()));
        }
        segments.reverse();
        Ok(Self { segments })
    }

    /// Outermost segment first
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Selector of the target element itself
    pub fn target(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }
}

impl std::fmt::Display for SelectorPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join(COMBINATOR))
    }
}

struct Segment {
    text: String,
    // id and href segments locate the element without ancestor context
    anchored: bool,
}

fn segment(doc: &Document, node: NodeId) -> Result<Segment> {
    let element = doc.element(node).ok_or_else(|| missing(doc, node))?;
    let tag = element.tag_name().to_lowercase();

    if let Some(id) = element.attribute("id").filter(|id| !id.is_empty()) {
        return Ok(Segment::anchored(format!("{}#{}", tag, id)));
    }
    if let Some(href) = element.attribute("href").filter(|href| !href.is_empty()) {
        return Ok(Segment::anchored(format!("{}[href={}]", tag, href)));
    }

    let parent = match doc.parent_element(node) {
        Some(parent) if doc.child_nodes(parent).len() != 1 => parent,
        _ => return Ok(Segment::positional(tag)),
    };

    let index = doc
        .element_children(parent)
        .iter()
        .position(|&c| c == node)
        .ok_or_else(|| Error::node_not_found(node.index()))?;

    let text = if index == 0 {
        format!("{}:first-child", tag)
    } else {
        format!("{}:nth-child({})", tag, index + 1)
    };
    Ok(Segment::positional(text))
}

impl Segment {
    fn anchored(text: String) -> Self {
        Self { text, anchored: true }
    }

    fn positional(text: String) -> Self {
        Self {
            text,
            anchored: false,
        }
    }
}

fn missing(doc: &Document, node: NodeId) -> Error {
    if doc.contains(node) {
        Error::not_an_element(node.index())
    } else {
        Error::node_not_found(node.index())
    }
}
