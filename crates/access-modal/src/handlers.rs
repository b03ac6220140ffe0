//! Revocable event bindings.
//!
//! Each binding owns one listener and the keys of every registration made
//! with it, so unbinding removes exactly what binding added, and a second
//! unbind is a no-op.

use crate::dom::{Dom, EventKind, Listener, ListenerKey};
use crate::page::Page;
use crate::surface::all;
use std::fmt;
use std::rc::Rc;

pub trait Binding {
    fn bind(&mut self);
    fn unbind(&mut self);
    fn is_bound(&self) -> bool;
}

/// Where a binding's listeners go, resolved when it is bound
#[derive(Debug, Clone)]
pub enum BindTarget<N> {
    Document,
    /// Elements under `scope` (or the whole document) matching `selector`
    Matching { scope: Option<N>, selector: String },
}

pub struct EventBinding<D: Dom> {
    page: Rc<Page<D>>,
    target: BindTarget<D::Node>,
    kinds: &'static [EventKind],
    listener: Listener<D::Node>,
    keys: Vec<ListenerKey>,
    bound: bool,
}

impl<D: Dom> fmt::Debug for EventBinding<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBinding")
            .field("target", &self.target)
            .field("kinds", &self.kinds)
            .field("keys", &self.keys)
            .field("bound", &self.bound)
            .finish()
    }
}

impl<D: Dom> EventBinding<D> {
    pub fn new(
        page: Rc<Page<D>>,
        target: BindTarget<D::Node>,
        kinds: &'static [EventKind],
        listener: Listener<D::Node>,
    ) -> Self {
        Self {
            page,
            target,
            kinds,
            listener,
            keys: Vec::new(),
            bound: false,
        }
    }

    /// Document-level `keydown`
    pub fn key_down(page: Rc<Page<D>>, listener: Listener<D::Node>) -> Self {
        Self::new(page, BindTarget::Document, &[EventKind::KeyDown], listener)
    }

    /// `click` and `touchend` on every close button inside `content`
    pub fn close_buttons(
        page: Rc<Page<D>>,
        content: D::Node,
        selector: &str,
        listener: Listener<D::Node>,
    ) -> Self {
        Self::new(
            page,
            BindTarget::Matching {
                scope: Some(content),
                selector: selector.to_string(),
            },
            &[EventKind::Click, EventKind::Touch],
            listener,
        )
    }

    /// `focus` on every focusable element of the document
    pub fn focus_trap(page: Rc<Page<D>>, selector: &str, listener: Listener<D::Node>) -> Self {
        Self::new(
            page,
            BindTarget::Matching {
                scope: None,
                selector: selector.to_string(),
            },
            &[EventKind::Focus],
            listener,
        )
    }

    /// Number of live registrations
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<D: Dom> Binding for EventBinding<D> {
    fn bind(&mut self) {
        if self.bound {
            return;
        }
        self.bound = true;
        let dom = self.page.dom();
        match &self.target {
            BindTarget::Document => {
                for kind in self.kinds {
                    let key = dom.listen_document(*kind, Rc::clone(&self.listener));
                    self.keys.push(key);
                }
            }
            BindTarget::Matching { scope, selector } => {
                let nodes = match scope {
                    Some(scope) => all(dom.query_selector_all(scope, selector)),
                    None => all(dom.query_document_all(selector)),
                };
                for node in &nodes {
                    for kind in self.kinds {
                        let key = dom.listen(node, *kind, Rc::clone(&self.listener));
                        self.keys.push(key);
                    }
                }
            }
        }
    }

    fn unbind(&mut self) {
        let dom = self.page.dom();
        for key in self.keys.drain(..) {
            dom.unlisten(key);
        }
        self.bound = false;
    }

    fn is_bound(&self) -> bool {
        self.bound
    }
}

impl<D: Dom> Drop for EventBinding<D> {
    fn drop(&mut self) {
        self.unbind();
    }
}
