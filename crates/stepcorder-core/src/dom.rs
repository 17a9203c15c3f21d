//! In-memory document model
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Removing a node
//! only detaches it, so ids captured in recorded steps stay valid after the
//! element leaves the page.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Handle to a node of a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Bounding client rect of an element
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when the element is not rendered with an area
    pub fn is_empty(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    attributes: BTreeMap<String, String>,
    rect: Rect,
}

impl Element {
    fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            rect: Rect::default(),
        }
    }

    pub fn tag_name(&self) -> &str {
        &self.tag
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty document holding only the root node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
        }
    }

    /// `<html><head></head><body></body></html>`
    pub fn skeleton() -> Self {
        let mut doc = Self::new();
        let root = doc.root();
        let html = doc.push_node(Some(root), NodeKind::Element(Element::new("html")));
        doc.push_node(Some(html), NodeKind::Element(Element::new("head")));
        doc.push_node(Some(html), NodeKind::Element(Element::new("body")));
        doc
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn contains(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len()
    }

    /// The `<html>` element
    pub fn document_element(&self) -> Option<NodeId> {
        self.nodes[0]
            .children
            .iter()
            .copied()
            .find(|&c| self.is_element(c))
    }

    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.element_children(html)
            .into_iter()
            .find(|&c| self.tag_name(c).is_some_and(|t| t.eq_ignore_ascii_case("body")))
    }

    pub fn create_element(&mut self, parent: NodeId, tag: &str) -> Result<NodeId> {
        self.check_container(parent)?;
        Ok(self.push_node(Some(parent), NodeKind::Element(Element::new(tag))))
    }

    pub fn create_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId> {
        self.check_container(parent)?;
        Ok(self.push_node(Some(parent), NodeKind::Text(text.to_string())))
    }

    pub fn create_detached_element(&mut self, tag: &str) -> NodeId {
        self.push_node(None, NodeKind::Element(Element::new(tag)))
    }

    /// Move `child` (and its subtree) to the end of `parent`'s children
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check_container(parent)?;
        self.node(child)?;
        if child == self.root() || self.is_inclusive_ancestor(child, parent) {
            return Err(Error::hierarchy_request(parent.0, child.0));
        }
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Detach `node` from its parent. The id stays valid.
    pub fn remove(&mut self, node: NodeId) -> Result<()> {
        self.node(node)?;
        if node == self.root() {
            return Err(Error::hierarchy_request(node.0, node.0));
        }
        self.detach(node);
        Ok(())
    }

    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.nodes.get(node.0).map(|n| &n.kind)
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        match self.kind(node)? {
            NodeKind::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        self.element(node).is_some()
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(Element::tag_name)
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.attribute(name)
    }

    /// The `id` attribute
    pub fn id_attribute(&self, node: NodeId) -> Option<&str> {
        self.attribute(node, "id")
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        self.element_mut(node)?
            .attributes
            .insert(name.to_ascii_lowercase(), value.to_string());
        Ok(())
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<()> {
        self.element_mut(node)?
            .attributes
            .remove(&name.to_ascii_lowercase());
        Ok(())
    }

    pub fn rect(&self, node: NodeId) -> Option<Rect> {
        self.element(node).map(Element::rect)
    }

    pub fn set_rect(&mut self, node: NodeId, rect: Rect) -> Result<()> {
        self.element_mut(node)?.rect = rect;
        Ok(())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    /// Parent if it is an element; `None` for children of the root
    pub fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node).filter(|&p| self.is_element(p))
    }

    /// Every child node, text included
    pub fn child_nodes(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.child_nodes(node)
            .iter()
            .copied()
            .filter(|&c| self.is_element(c))
            .collect()
    }

    /// `node` followed by each ancestor, innermost first
    pub fn composed_path(&self, node: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = self.contains(node).then_some(node);
        while let Some(n) = current {
            path.push(n);
            current = self.parent(n);
        }
        path
    }

    /// First connected element whose `id` attribute equals `id`
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        let mut stack = vec![self.root()];
        while let Some(n) = stack.pop() {
            if self.id_attribute(n) == Some(id) {
                return Some(n);
            }
            stack.extend(self.child_nodes(n).iter().rev().copied());
        }
        None
    }

    fn push_node(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            kind,
        });
        if let Some(p) = parent {
            self.nodes[p.0].children.push(id);
        }
        id
    }

    fn node(&self, node: NodeId) -> Result<&Node> {
        self.nodes
            .get(node.0)
            .ok_or_else(|| Error::node_not_found(node.0))
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut Element> {
        match self.nodes.get_mut(node.0).map(|n| &mut n.kind) {
            Some(NodeKind::Element(e)) => Ok(e),
            Some(_) => Err(Error::not_an_element(node.0)),
            None => Err(Error::node_not_found(node.0)),
        }
    }

    fn check_container(&self, node: NodeId) -> Result<()> {
        match self.node(node)?.kind {
            NodeKind::Text(_) => Err(Error::not_an_element(node.0)),
            _ => Ok(()),
        }
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != node);
        }
    }
}
