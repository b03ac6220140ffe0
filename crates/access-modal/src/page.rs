//! Per-document state shared by every modal on a page.
//!
//! Holds the count of open modals and applies the page freeze (no
//! background scrolling) while that count is above zero. The count is
//! mirrored to an attribute on the page root so it can be inspected from
//! the page.

use crate::dom::Dom;
use std::cell::Cell;
use std::rc::Rc;

pub const OPEN_COUNT_ATTRIBUTE: &str = "data-access-modals-opened";
pub const FREEZE_CLASS: &str = "access-modal-active";
pub const FREEZE_STYLE_ID: &str = "access-modal-body-freeze-css";
const FREEZE_CSS: &str = ".access-modal-active {overflow: hidden;}";

pub struct Page<D: Dom> {
    dom: D,
    open_count: Cell<usize>,
    /// Whether the root carried a `class` attribute when the page froze
    had_class: Cell<bool>,
}

impl<D: Dom> Page<D> {
    /// Wrap a document; an existing count attribute on the root is picked up
    pub fn new(dom: D) -> Rc<Self> {
        let root = dom.root();
        let open_count = dom
            .attribute(&root, OPEN_COUNT_ATTRIBUTE)
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        let page = Self {
            dom,
            open_count: Cell::new(open_count),
            had_class: Cell::new(false),
        };
        page.write_count();
        Rc::new(page)
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn root(&self) -> D::Node {
        self.dom.root()
    }

    pub fn current(&self) -> usize {
        self.open_count.get()
    }

    pub fn increment(&self) -> usize {
        let count = self.open_count.get() + 1;
        self.open_count.set(count);
        self.write_count();
        count
    }

    /// Saturates at zero
    pub fn decrement(&self) -> usize {
        let count = self.open_count.get().saturating_sub(1);
        self.open_count.set(count);
        self.write_count();
        count
    }

    pub fn is_frozen(&self) -> bool {
        self.dom.has_class(&self.root(), FREEZE_CLASS)
    }

    /// Register an opened modal, freezing the page for the first one
    pub fn acquire(&self) -> usize {
        if self.current() == 0 {
            self.freeze();
        }
        self.increment()
    }

    /// Register a closed modal, unfreezing the page after the last one
    pub fn release(&self) -> usize {
        let count = self.decrement();
        if count == 0 {
            self.unfreeze();
        }
        count
    }

    fn write_count(&self) {
        self.dom.set_attribute(
            &self.root(),
            OPEN_COUNT_ATTRIBUTE,
            &self.open_count.get().to_string(),
        );
    }

    fn freeze(&self) {
        log::debug!("Freezing page scroll");
        self.inject_freeze_style();
        let root = self.root();
        self.had_class.set(self.dom.attribute(&root, "class").is_some());
        self.dom.add_class(&root, FREEZE_CLASS);
    }

    fn unfreeze(&self) {
        log::debug!("Unfreezing page scroll");
        if let Some(style) = self.dom.element_by_id(FREEZE_STYLE_ID) {
            if let Some(parent) = self.dom.parent(&style) {
                self.dom.remove_child(&parent, &style);
            }
        }
        let root = self.root();
        self.dom.remove_class(&root, FREEZE_CLASS);
        // Drop the class attribute only if freezing created it
        if !self.had_class.get()
            && self.dom.attribute(&root, "class").is_some_and(|c| c.trim().is_empty())
        {
            self.dom.remove_attribute(&root, "class");
        }
    }

    fn inject_freeze_style(&self) {
        if self.dom.element_by_id(FREEZE_STYLE_ID).is_some() {
            return;
        }
        let Some(head) = self.dom.head() else {
            log::warn!("Document has no <head>, freeze style not injected");
            return;
        };
        match self.dom.create_element("style") {
            Ok(style) => {
                self.dom.set_attribute(&style, "type", "text/css");
                self.dom.set_attribute(&style, "id", FREEZE_STYLE_ID);
                self.dom.set_text(&style, FREEZE_CSS);
                self.dom.append_child(&head, &style);
            }
            Err(err) => log::error!("Failed to create freeze style: {}", err),
        }
    }
}
