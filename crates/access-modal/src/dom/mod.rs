//! Browser document abstraction.
//!
//! The modal only talks to the page through [`Dom`]. [`MemoryDom`] is an
//! in-memory document used natively (and by the tests); `WebDom` drives the
//! real browser document through `web-sys` on `wasm32`.

pub mod html;
pub mod memory;
pub mod selector;
pub mod snapshot;
#[cfg(target_arch = "wasm32")]
pub mod web;

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

// Re-exports
pub use memory::{MemoryDom, NodeId};
pub use snapshot::DomNode;
#[cfg(target_arch = "wasm32")]
pub use web::WebDom;

pub const ESCAPE_KEY_CODE: u32 = 27;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomError {
    #[error("Invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("DOM error: {0}")]
    Js(String),
}

/// Events the modal listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    KeyDown,
    Click,
    Touch,
    Focus,
}

impl EventKind {
    /// Event type name used by the browser
    pub fn dom_name(&self) -> &'static str {
        match self {
            EventKind::KeyDown => "keydown",
            EventKind::Click => "click",
            EventKind::Touch => "touchend",
            EventKind::Focus => "focus",
        }
    }

    pub fn bubbles(&self) -> bool {
        !matches!(self, EventKind::Focus)
    }
}

/// Backend-neutral event payload handed to listeners
#[derive(Debug)]
pub struct DomEvent<N> {
    pub kind: EventKind,
    pub target: N,
    pub key: Option<String>,
    pub key_code: Option<u32>,
    propagation_stopped: Cell<bool>,
}

impl<N> DomEvent<N> {
    pub fn new(kind: EventKind, target: N) -> Self {
        Self {
            kind,
            target,
            key: None,
            key_code: None,
            propagation_stopped: Cell::new(false),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>, key_code: u32) -> Self {
        self.key = Some(key.into());
        self.key_code = Some(key_code);
        self
    }

    pub fn is_escape(&self) -> bool {
        self.key_code == Some(ESCAPE_KEY_CODE) || self.key.as_deref() == Some("Escape")
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

/// Identifies one registered listener so it can be removed again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerKey(pub(crate) u64);

pub type Listener<N> = Rc<dyn Fn(&DomEvent<N>)>;

/// The document operations the modal needs.
///
/// All methods take `&self`; implementations use interior mutability and
/// must not hold internal borrows while invoking listeners, because a
/// listener may call back into the document.
pub trait Dom: 'static {
    type Node: Clone + PartialEq + fmt::Debug + 'static;

    /// The page root (`<body>`)
    fn root(&self) -> Self::Node;
    fn head(&self) -> Option<Self::Node>;
    fn create_element(&self, tag: &str) -> Result<Self::Node, DomError>;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);
    fn remove_attribute(&self, node: &Self::Node, name: &str);
    fn add_class(&self, node: &Self::Node, class: &str);
    fn remove_class(&self, node: &Self::Node, class: &str);
    fn has_class(&self, node: &Self::Node, class: &str) -> bool;
    fn set_style(&self, node: &Self::Node, property: &str, value: &str);
    /// Replace the children of `node` with a single text node
    fn set_text(&self, node: &Self::Node, text: &str);
    /// Parse `html` and append the result to the children of `node`
    fn append_html(&self, node: &Self::Node, html: &str) -> Result<(), DomError>;

    fn first_child(&self, node: &Self::Node) -> Option<Self::Node>;
    fn child_nodes(&self, node: &Self::Node) -> Vec<Self::Node>;
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
    fn append_child(&self, parent: &Self::Node, child: &Self::Node);
    fn insert_before(&self, parent: &Self::Node, child: &Self::Node, reference: Option<&Self::Node>);
    fn remove_child(&self, parent: &Self::Node, child: &Self::Node);
    /// Inclusive: a node contains itself
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;

    fn query_selector(&self, scope: &Self::Node, selector: &str) -> Result<Option<Self::Node>, DomError>;
    fn query_selector_all(&self, scope: &Self::Node, selector: &str) -> Result<Vec<Self::Node>, DomError>;
    fn query_document(&self, selector: &str) -> Result<Option<Self::Node>, DomError>;
    fn query_document_all(&self, selector: &str) -> Result<Vec<Self::Node>, DomError>;
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    fn active_element(&self) -> Option<Self::Node>;
    /// Focus `node`; a no-op for elements that cannot take focus
    fn focus(&self, node: &Self::Node);

    fn listen(&self, node: &Self::Node, kind: EventKind, listener: Listener<Self::Node>) -> ListenerKey;
    fn listen_document(&self, kind: EventKind, listener: Listener<Self::Node>) -> ListenerKey;
    /// Remove a listener; unknown keys are ignored
    fn unlisten(&self, key: ListenerKey);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_detection() {
        assert!(DomEvent::new(EventKind::KeyDown, ()).with_key("Escape", 27).is_escape());
        assert!(DomEvent::new(EventKind::KeyDown, ()).with_key("Esc", 27).is_escape());
        assert!(!DomEvent::new(EventKind::KeyDown, ()).with_key("Enter", 13).is_escape());
        assert!(!DomEvent::new(EventKind::Click, ()).is_escape());
    }

    #[test]
    fn test_stop_propagation() {
        let event = DomEvent::new(EventKind::Click, ());
        assert!(!event.is_propagation_stopped());
        event.stop_propagation();
        assert!(event.is_propagation_stopped());
    }

    #[test]
    fn test_focus_does_not_bubble() {
        assert!(!EventKind::Focus.bubbles());
        assert!(EventKind::Click.bubbles());
        assert_eq!(EventKind::Touch.dom_name(), "touchend");
    }
}
