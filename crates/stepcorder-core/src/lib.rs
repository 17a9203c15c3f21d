//! stepcorder-core - document model and selector paths
//!
//! Everything the recorder needs from a page, without a browser:
//!
//! - **dom**: arena-backed document with stable node ids
//! - **selector**: CSS selector paths for elements
//! - **event**: DOM events and the `EventTarget` capability
//! - **page**: in-memory event-target host

pub mod dom;
pub mod error;
pub mod event;
pub mod page;
pub mod selector;

pub use dom::{Document, Element, NodeId, NodeKind, Rect};
pub use error::{Error, ErrorCode, Result};
pub use event::{listener, DomEvent, EventDetail, EventInit, EventKind, EventTarget, Listener};
pub use page::Page;
pub use selector::{bounding_element, path_of, selector_of, SelectorPath};

pub mod prelude {
    pub use crate::dom::{Document, NodeId, Rect};
    pub use crate::error::{Error, ErrorCode, Result};
    pub use crate::event::{listener, DomEvent, EventInit, EventKind, EventTarget, Listener};
    pub use crate::page::Page;
    pub use crate::selector::{path_of, selector_of, SelectorPath};
}
