//! The modal controller.
//!
//! An [`AccessModal`] builds a fresh surface on every `open()` and tears it
//! down on `close()`. While open, everything else on the page is moved into
//! an `aria-hidden` isolation container, focus is kept inside the content
//! and the page is frozen through the shared [`Page`].

use crate::class_list::add_classes;
use crate::config::{Callbacks, FocusTarget, ModalConfig};
use crate::dom::{Dom, DomError, DomEvent, Listener};
use crate::handlers::{Binding, EventBinding};
use crate::page::Page;
use crate::surface::{self, optional, Surface};
use crate::template::TemplateRenderer;
use contracts::{ChromeRole, Hook, ModalError, ModalOptions};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

struct OpenState<D: Dom> {
    surface: Surface<D::Node>,
    /// Focused before open, restored after close
    last_active: Option<D::Node>,
    escape: EventBinding<D>,
    close_buttons: EventBinding<D>,
    focus_trap: EventBinding<D>,
}

struct Inner<D: Dom> {
    page: Rc<Page<D>>,
    options: ModalOptions,
    id: String,
    role: ChromeRole,
    focus_after_open: Option<FocusTarget<D::Node>>,
    focus_after_close: Option<FocusTarget<D::Node>>,
    callbacks: Callbacks<D>,
    renderer: Rc<dyn TemplateRenderer>,
    everything_else: D::Node,
    state: RefCell<Option<OpenState<D>>>,
}

/// Handle to one modal. Clones share the same modal.
pub struct AccessModal<D: Dom> {
    inner: Rc<Inner<D>>,
}

impl<D: Dom> Clone for AccessModal<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// Non-owning handle; does not keep the modal alive
pub struct WeakAccessModal<D: Dom> {
    inner: Weak<Inner<D>>,
}

impl<D: Dom> Clone for WeakAccessModal<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<D: Dom> WeakAccessModal<D> {
    pub fn upgrade(&self) -> Option<AccessModal<D>> {
        self.inner.upgrade().map(|inner| AccessModal { inner })
    }
}

impl<D: Dom> fmt::Debug for AccessModal<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessModal")
            .field("id", &self.inner.id)
            .field("role", &self.inner.role)
            .field("open", &self.is_open())
            .finish()
    }
}

impl<D: Dom> AccessModal<D> {
    /// Create a closed modal on `page`.
    ///
    /// Fails when the chrome role is neither `dialog` nor `alertdialog`.
    pub fn new(page: &Rc<Page<D>>, config: impl Into<ModalConfig<D>>) -> Result<Self, ModalError> {
        let config = config.into();
        let role = config.options.chrome_role()?;
        let (focus_after_open, focus_after_close) = config.resolved_focus_targets();
        let ModalConfig {
            mut options,
            callbacks,
            renderer,
            id_generator,
            ..
        } = config;

        let id = match options.id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => id_generator.generate(),
        };
        options.id = Some(id.clone());

        let dom = page.dom();
        let everything_else = dom
            .create_element("div")
            .map_err(|err| ModalError::Dom(err.to_string()))?;
        dom.set_attribute(&everything_else, "aria-hidden", "true");
        dom.set_style(&everything_else, "position", "relative");
        dom.set_style(&everything_else, "z-index", "1");
        add_classes(dom, &everything_else, &options.css_class_map.everything_else);

        log::debug!("Created modal {} ({})", id, role);

        Ok(Self {
            inner: Rc::new(Inner {
                page: Rc::clone(page),
                options,
                id,
                role,
                focus_after_open,
                focus_after_close,
                callbacks,
                renderer,
                everything_else,
                state: RefCell::new(None),
            }),
        })
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn downgrade(&self) -> WeakAccessModal<D> {
        WeakAccessModal {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Options the modal was built with, `id` filled in
    pub fn options(&self) -> &ModalOptions {
        &self.inner.options
    }

    pub fn role(&self) -> ChromeRole {
        self.inner.role
    }

    pub fn page(&self) -> &Rc<Page<D>> {
        &self.inner.page
    }

    pub fn is_open(&self) -> bool {
        self.inner.state.borrow().is_some()
    }

    /// Root of the dialog while open
    pub fn chrome(&self) -> Option<D::Node> {
        self.with_surface(|surface| surface.chrome.clone())
    }

    pub fn content(&self) -> Option<D::Node> {
        self.with_surface(|surface| surface.content.clone())
    }

    pub fn surface(&self) -> Option<Surface<D::Node>> {
        self.with_surface(Surface::clone)
    }

    /// Container holding the rest of the page while open
    pub fn isolation(&self) -> &D::Node {
        &self.inner.everything_else
    }

    pub fn open(&self) {
        self.fire(Hook::PreOpen);
        if self.is_open() {
            log::debug!("Modal {} is already open", self.inner.id);
            return;
        }
        if let Err(err) = self.try_open() {
            log::error!("Failed to open modal {}: {}", self.inner.id, err);
            return;
        }
        self.fire(Hook::PostOpen);
    }

    pub fn close(&self) {
        self.fire(Hook::PreClose);
        let Some(mut state) = self.inner.state.borrow_mut().take() else {
            return;
        };
        let inner = &self.inner;
        let page = &inner.page;
        let dom = page.dom();

        let isolation = &inner.everything_else;
        if let Some(parent) = dom.parent(isolation) {
            for child in dom.child_nodes(isolation) {
                dom.insert_before(&parent, &child, Some(isolation));
            }
            dom.remove_child(&parent, isolation);
        }

        let count = page.release();
        log::debug!("Closed modal {} ({} open)", inner.id, count);

        state.escape.unbind();
        state.focus_trap.unbind();
        state.close_buttons.unbind();

        let chrome = &state.surface.chrome;
        if let Some(parent) = dom.parent(chrome) {
            dom.remove_child(&parent, chrome);
        }

        match state.last_active.take() {
            Some(node) => dom.focus(&node),
            None => {
                if let Some(target) = self.resolve(inner.focus_after_close.as_ref()) {
                    dom.focus(&target);
                }
            }
        }

        self.fire(Hook::PostClose);
    }

    fn try_open(&self) -> Result<(), DomError> {
        let inner = &self.inner;
        let page = &inner.page;
        let dom = page.dom();

        let surface = surface::build(
            dom,
            &inner.options,
            &inner.id,
            inner.role,
            inner.renderer.as_ref(),
        )?;

        let last_active = match inner.focus_after_close {
            Some(_) => None,
            None => dom.active_element(),
        };

        let root = page.root();
        for child in dom.child_nodes(&root) {
            dom.append_child(&inner.everything_else, &child);
        }
        dom.append_child(&root, &inner.everything_else);
        let first = dom.first_child(&root);
        dom.insert_before(&root, &surface.chrome, first.as_ref());

        let count = page.acquire();
        log::debug!("Opened modal {} ({} open)", inner.id, count);

        let content = surface.content.clone();
        dom.set_attribute(&content, "tabindex", "0");
        if let Some(role) = inner.options.content_role() {
            dom.set_attribute(&content, "role", role);
        }

        let escape = EventBinding::key_down(Rc::clone(page), self.listener(Self::on_key));
        let close_buttons = EventBinding::close_buttons(
            Rc::clone(page),
            content.clone(),
            &inner.options.close_buttons_selector,
            self.listener(Self::on_close_button),
        );
        let focus_trap = EventBinding::focus_trap(
            Rc::clone(page),
            &inner.options.focusable_selector(),
            self.listener(Self::on_focus),
        );
        *inner.state.borrow_mut() = Some(OpenState {
            surface,
            last_active,
            escape,
            close_buttons,
            focus_trap,
        });

        let target = self
            .resolve(inner.focus_after_open.as_ref())
            .unwrap_or(content);
        dom.focus(&target);

        if let Some(state) = inner.state.borrow_mut().as_mut() {
            state.escape.bind();
            state.close_buttons.bind();
            state.focus_trap.bind();
        }
        Ok(())
    }

    /// Escape closes the modal when it is the topmost one
    fn on_key(&self, event: &DomEvent<D::Node>) {
        if !event.is_escape() {
            return;
        }
        let dom = self.inner.page.dom();
        let Some(chrome) = self.chrome() else {
            return;
        };
        if dom.parent(&chrome) == Some(self.inner.page.root()) {
            self.close();
        }
    }

    fn on_close_button(&self, event: &DomEvent<D::Node>) {
        if !self.is_open() {
            return;
        }
        self.fire(Hook::PreDismiss);
        event.stop_propagation();
        self.close();
        self.fire(Hook::PostDismiss);
    }

    /// Pull focus that left the content back into it
    fn on_focus(&self, event: &DomEvent<D::Node>) {
        let Some(content) = self.content() else {
            return;
        };
        let dom = self.inner.page.dom();
        if !dom.contains(&content, &event.target) {
            event.stop_propagation();
            dom.focus(&content);
        }
    }

    /// Wrap a handler so listeners do not keep the modal alive
    fn listener(&self, handle: fn(&Self, &DomEvent<D::Node>)) -> Listener<D::Node> {
        let weak = self.downgrade();
        Rc::new(move |event: &DomEvent<D::Node>| {
            if let Some(modal) = weak.upgrade() {
                handle(&modal, event);
            }
        })
    }

    fn resolve(&self, target: Option<&FocusTarget<D::Node>>) -> Option<D::Node> {
        let target = target?;
        let node = optional(target.resolve(self.inner.page.dom()));
        if node.is_none() {
            log::warn!("Modal {}: focus target {:?} not found", self.inner.id, target);
        }
        node
    }

    fn with_surface<T>(&self, f: impl FnOnce(&Surface<D::Node>) -> T) -> Option<T> {
        self.inner.state.borrow().as_ref().map(|state| f(&state.surface))
    }

    fn fire(&self, hook: Hook) {
        if let Some(callback) = self.inner.callbacks.get(hook) {
            log::debug!("Modal {}: {}", self.inner.id, hook.js_name());
            callback(self);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{EventKind, MemoryDom, NodeId, ESCAPE_KEY_CODE};
    use crate::ids::IdGenerator;
    use crate::page::{FREEZE_STYLE_ID, OPEN_COUNT_ATTRIBUTE};
    use proptest::prelude::*;

    const TEMPLATE: &str = r#"<h2 class="access-modal-title">Title</h2>
        <p class="access-modal-description">Body</p>
        <input class="field">
        <button class="access-modal-close-button"><span class="icon">x</span></button>"#;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    fn page_with(html: &str) -> (MemoryDom, Rc<Page<MemoryDom>>) {
        let dom = MemoryDom::with_body(html);
        let page = Page::new(dom.clone());
        (dom, page)
    }

    fn options(id: &str) -> ModalOptions {
        ModalOptions {
            id: Some(id.to_string()),
            template: Some(TEMPLATE.to_string()),
            ..Default::default()
        }
    }

    fn recording(options: ModalOptions, log: &Log) -> ModalConfig<MemoryDom> {
        let mut config = ModalConfig::new(options);
        for hook in Hook::ALL {
            let log = Rc::clone(log);
            config = config.on(hook, move |_| log.borrow_mut().push(hook.js_name()));
        }
        config
    }

    fn escape(dom: &MemoryDom) {
        dom.press_key("Escape", ESCAPE_KEY_CODE);
    }

    struct FixedId;

    impl IdGenerator for FixedId {
        fn generate(&self) -> String {
            "access-modal-fixed".to_string()
        }
    }

    #[test]
    fn test_invalid_role_is_rejected() {
        let (_, page) = page_with("");
        let result = AccessModal::new(
            &page,
            ModalOptions {
                chrome_role: "banner".to_string(),
                ..Default::default()
            },
        );
        assert_eq!(result.unwrap_err(), ModalError::InvalidRole("banner".to_string()));
    }

    #[test]
    fn test_id_is_generated_when_missing() {
        let (_, page) = page_with("");
        let config = ModalConfig::new(ModalOptions {
            id: Some(String::new()),
            ..Default::default()
        })
        .id_generator(FixedId);
        let modal = AccessModal::new(&page, config).unwrap();
        assert_eq!(modal.id(), "access-modal-fixed");
        assert_eq!(modal.options().id.as_deref(), Some("access-modal-fixed"));

        let named = AccessModal::new(&page, options("named")).unwrap();
        assert_eq!(named.id(), "named");
    }

    #[test]
    fn test_new_modal_is_closed_and_detached() {
        let (dom, page) = page_with("<main></main>");
        let modal = AccessModal::new(&page, options("m")).unwrap();
        assert!(!modal.is_open());
        assert!(modal.chrome().is_none());
        assert_eq!(dom.parent(modal.isolation()), None);
        assert_eq!(dom.attribute(modal.isolation(), "aria-hidden").as_deref(), Some("true"));
        assert!(dom.has_class(modal.isolation(), "access-modal-everything-else"));
        assert_eq!(page.current(), 0);
    }

    #[test]
    fn test_open_isolates_page_and_focuses_content() {
        let (dom, page) = page_with(r#"<main id="app"><button id="opener">Open</button></main>"#);
        let app = dom.element_by_id("app").unwrap();
        let modal = AccessModal::new(&page, options("m")).unwrap();
        modal.open();

        let chrome = modal.chrome().unwrap();
        let content = modal.content().unwrap();
        assert_eq!(dom.child_nodes(&dom.body()), vec![chrome, *modal.isolation()]);
        assert_eq!(dom.parent(&app), Some(*modal.isolation()));
        assert_eq!(dom.attribute(&chrome, "role").as_deref(), Some("alertdialog"));
        assert_eq!(dom.attribute(&content, "tabindex").as_deref(), Some("0"));
        assert_eq!(dom.attribute(&content, "role").as_deref(), Some("document"));
        assert_eq!(dom.active_element(), Some(content));

        assert_eq!(page.current(), 1);
        assert!(page.is_frozen());
        assert!(dom.element_by_id(FREEZE_STYLE_ID).is_some());
        assert_eq!(
            dom.attribute(&dom.body(), OPEN_COUNT_ATTRIBUTE).as_deref(),
            Some("1")
        );
    }

    #[test]
    fn test_open_and_close_round_trip() {
        let (dom, page) = page_with(
            r#"<header class="top">Site</header><main><p>Text</p><button>Go</button></main>"#,
        );
        let before = dom.snapshot(dom.body());
        let modal = AccessModal::new(&page, options("m")).unwrap();

        modal.open();
        assert_ne!(dom.snapshot(dom.body()), before);
        modal.close();

        assert_eq!(dom.snapshot(dom.body()), before);
        assert!(!page.is_frozen());
        assert!(dom.element_by_id(FREEZE_STYLE_ID).is_none());
        assert_eq!(dom.listener_count(), 0);
    }

    #[test]
    fn test_open_is_idempotent() {
        let (dom, page) = page_with("<main></main>");
        let log = Log::default();
        let modal = AccessModal::new(&page, recording(options("m"), &log)).unwrap();

        modal.open();
        let chrome = modal.chrome();
        let listeners = dom.listener_count();
        modal.open();

        assert_eq!(*log.borrow(), vec!["preOpen", "postOpen", "preOpen"]);
        assert_eq!(modal.chrome(), chrome);
        assert_eq!(dom.listener_count(), listeners);
        assert_eq!(dom.query_document_all(".access-modal").unwrap().len(), 1);
        assert_eq!(page.current(), 1);
    }

    #[test]
    fn test_close_when_closed_only_fires_pre_close() {
        let (_, page) = page_with("");
        let log = Log::default();
        let modal = AccessModal::new(&page, recording(options("m"), &log)).unwrap();
        modal.close();
        assert_eq!(*log.borrow(), vec!["preClose"]);
        assert_eq!(page.current(), 0);
    }

    #[test]
    fn test_hook_order_for_open_and_close() {
        let (_, page) = page_with("");
        let log = Log::default();
        let modal = AccessModal::new(&page, recording(options("m"), &log)).unwrap();
        modal.open();
        modal.close();
        assert_eq!(*log.borrow(), vec!["preOpen", "postOpen", "preClose", "postClose"]);
    }

    #[test]
    fn test_focus_returns_to_previous_element() {
        let (dom, page) = page_with(r#"<button id="opener">Open</button>"#);
        let opener = dom.element_by_id("opener").unwrap();
        dom.focus(&opener);

        let modal = AccessModal::new(&page, options("m")).unwrap();
        modal.open();
        assert_ne!(dom.active_element(), Some(opener));
        modal.close();
        assert_eq!(dom.active_element(), Some(opener));
    }

    #[test]
    fn test_focus_after_close_overrides_previous_element() {
        let (dom, page) = page_with(r#"<button id="opener">Open</button><a id="next" href="/next">Next</a>"#);
        let opener = dom.element_by_id("opener").unwrap();
        dom.focus(&opener);

        let modal = AccessModal::new(
            &page,
            ModalOptions {
                focus_after_close: Some("#next".to_string()),
                ..options("m")
            },
        )
        .unwrap();
        modal.open();
        modal.close();
        assert_eq!(dom.active_element(), dom.element_by_id("next"));
    }

    #[test]
    fn test_focus_after_open_target() {
        let (dom, page) = page_with("");
        let modal = AccessModal::new(
            &page,
            ModalOptions {
                focus_after_open: Some(".field".to_string()),
                ..options("m")
            },
        )
        .unwrap();
        modal.open();
        assert_eq!(dom.active_element(), dom.find(".field"));
    }

    #[test]
    fn test_unresolved_focus_after_open_falls_back_to_content() {
        let (dom, page) = page_with("");
        let modal = AccessModal::new(
            &page,
            ModalOptions {
                focus_after_open: Some("#missing".to_string()),
                ..options("m")
            },
        )
        .unwrap();
        modal.open();
        assert_eq!(dom.active_element(), modal.content());
    }

    #[test]
    fn test_node_focus_target() {
        let (dom, page) = page_with(r#"<button id="after">After</button>"#);
        let after = dom.element_by_id("after").unwrap();
        let config = ModalConfig::new(options("m")).focus_after_close(FocusTarget::Node(after));
        let modal = AccessModal::new(&page, config).unwrap();
        modal.open();
        modal.close();
        assert_eq!(dom.active_element(), Some(after));
    }

    #[test]
    fn test_escape_closes() {
        let (dom, page) = page_with("<main></main>");
        let modal = AccessModal::new(&page, options("m")).unwrap();
        modal.open();

        dom.press_key("a", 65);
        assert!(modal.is_open());

        escape(&dom);
        assert!(!modal.is_open());
        assert_eq!(page.current(), 0);
    }

    #[test]
    fn test_escape_by_key_code_only() {
        let (dom, page) = page_with("");
        let modal = AccessModal::new(&page, options("m")).unwrap();
        modal.open();
        dom.press_key("Esc", ESCAPE_KEY_CODE);
        assert!(!modal.is_open());
    }

    #[test]
    fn test_escape_closes_only_topmost() {
        let (dom, page) = page_with("<main></main>");
        let first = AccessModal::new(&page, options("first")).unwrap();
        let second = AccessModal::new(&page, options("second")).unwrap();
        first.open();
        second.open();
        assert_eq!(page.current(), 2);
        assert_eq!(dom.parent(&first.chrome().unwrap()), Some(*second.isolation()));

        escape(&dom);
        assert!(first.is_open());
        assert!(!second.is_open());
        assert_eq!(page.current(), 1);
        assert!(page.is_frozen());
        assert_eq!(dom.parent(&first.chrome().unwrap()), Some(dom.body()));

        escape(&dom);
        assert!(!first.is_open());
        assert_eq!(page.current(), 0);
        assert!(!page.is_frozen());
    }

    #[test]
    fn test_close_button_dismisses() {
        let (dom, page) = page_with("<main></main>");
        let log = Log::default();
        let surface_seen: Rc<RefCell<Vec<bool>>> = Rc::default();
        let seen = Rc::clone(&surface_seen);
        let mut config = recording(options("m"), &log);
        let log_post = Rc::clone(&log);
        config = config.on(Hook::PostDismiss, move |modal: &AccessModal<MemoryDom>| {
            log_post.borrow_mut().push("postDismiss");
            seen.borrow_mut().push(modal.chrome().is_none());
        });
        let modal = AccessModal::new(&page, config).unwrap();
        modal.open();
        log.borrow_mut().clear();

        let icon = dom.find(".access-modal-close-button .icon").unwrap();
        dom.click(icon);

        assert_eq!(
            *log.borrow(),
            vec!["preDismiss", "preClose", "postClose", "postDismiss"]
        );
        assert_eq!(*surface_seen.borrow(), vec![true]);
        assert!(dom.find(".access-modal").is_none());
        assert_eq!(page.current(), 0);
    }

    #[test]
    fn test_touch_on_close_button_dismisses() {
        let (dom, page) = page_with("");
        let modal = AccessModal::new(&page, options("m")).unwrap();
        modal.open();
        dom.touch(dom.find(".access-modal-close-button").unwrap());
        assert!(!modal.is_open());
    }

    #[test]
    fn test_nested_close_buttons_dismiss_once() {
        let (dom, page) = page_with("");
        let log = Log::default();
        let modal = AccessModal::new(
            &page,
            recording(
                ModalOptions {
                    template: Some(
                        r#"<div class="access-modal-close-button"><button class="access-modal-close-button">x</button></div>"#
                            .to_string(),
                    ),
                    ..options("m")
                },
                &log,
            ),
        )
        .unwrap();
        modal.open();
        log.borrow_mut().clear();

        dom.click(dom.find("button.access-modal-close-button").unwrap());
        let dismissals = log.borrow().iter().filter(|h| **h == "preDismiss").count();
        assert_eq!(dismissals, 1);
        assert_eq!(page.current(), 0);
    }

    #[test]
    fn test_click_elsewhere_does_not_dismiss() {
        let (dom, page) = page_with("");
        let modal = AccessModal::new(&page, options("m")).unwrap();
        modal.open();
        dom.click(dom.find(".access-modal-title").unwrap());
        dom.click(modal.surface().unwrap().overlay);
        assert!(modal.is_open());
    }

    #[test]
    fn test_focus_is_trapped_in_content() {
        let (dom, page) = page_with(r#"<button id="outside">Outside</button>"#);
        let outside = dom.element_by_id("outside").unwrap();
        let modal = AccessModal::new(&page, options("m")).unwrap();
        modal.open();

        let field = dom.find(".field").unwrap();
        dom.focus(&field);
        assert_eq!(dom.active_element(), Some(field));

        dom.focus(&outside);
        assert_eq!(dom.active_element(), modal.content());

        modal.close();
        dom.focus(&outside);
        assert_eq!(dom.active_element(), Some(outside));
    }

    #[test]
    fn test_handlers_are_revoked_on_close() {
        let (dom, page) = page_with(r#"<button id="outside">Outside</button>"#);
        let modal = AccessModal::new(&page, options("m")).unwrap();
        modal.open();
        assert_eq!(dom.listeners_on(None, EventKind::KeyDown), 1);
        assert_eq!(
            dom.listeners_on(dom.element_by_id("outside"), EventKind::Focus),
            1
        );
        modal.close();
        assert_eq!(dom.listener_count(), 0);
    }

    #[test]
    fn test_out_of_order_close_restores_page() {
        let (dom, page) = page_with(r#"<main><p>Text</p></main><footer></footer>"#);
        let before = dom.snapshot(dom.body());
        let first = AccessModal::new(&page, options("first")).unwrap();
        let second = AccessModal::new(&page, options("second")).unwrap();

        first.open();
        second.open();
        first.close();
        assert!(second.is_open());
        assert_eq!(page.current(), 1);
        assert!(page.is_frozen());

        second.close();
        assert_eq!(dom.snapshot(dom.body()), before);
    }

    #[test]
    fn test_hooks_may_reenter() {
        let (_, page) = page_with("");
        let config = ModalConfig::new(options("m"))
            .on(Hook::PostOpen, |modal: &AccessModal<MemoryDom>| modal.close());
        let modal = AccessModal::new(&page, config).unwrap();
        modal.open();
        assert!(!modal.is_open());
        assert_eq!(page.current(), 0);
    }

    #[test]
    fn test_dropping_open_modal_removes_listeners() {
        let (dom, page) = page_with("<input>");
        let modal = AccessModal::new(&page, options("m")).unwrap();
        modal.open();
        assert!(dom.listener_count() > 0);
        drop(modal);
        assert_eq!(dom.listener_count(), 0);
        escape(&dom);
    }

    #[test]
    fn test_weak_handle_does_not_keep_modal_alive() {
        let (dom, page) = page_with("<input>");
        let modal = AccessModal::new(&page, options("m")).unwrap();
        let weak = modal.downgrade();
        weak.upgrade().unwrap().open();
        assert!(modal.is_open());

        drop(modal);
        assert!(weak.upgrade().is_none());
        assert_eq!(dom.listener_count(), 0);
    }

    #[test]
    fn test_open_with_max_z_index() {
        let (dom, page) = page_with("<main></main>");
        let modal = AccessModal::new(
            &page,
            ModalOptions {
                z_index: i32::MAX,
                ..options("m")
            },
        )
        .unwrap();
        modal.open();
        assert!(modal.is_open());
        let content = modal.content().unwrap();
        assert_eq!(dom.style(content, "z-index"), Some(i32::MAX.to_string()));
        modal.close();
        assert_eq!(page.current(), 0);
    }

    #[test]
    fn test_round_trip_keeps_empty_class_attribute() {
        let (dom, page) = page_with("<main></main>");
        dom.set_attribute(&dom.body(), "class", "");
        let before = dom.snapshot(dom.body());
        let modal = AccessModal::new(&page, options("m")).unwrap();
        modal.open();
        modal.close();
        assert_eq!(dom.snapshot(dom.body()), before);
    }

    #[test]
    fn test_reopen_builds_fresh_surface() {
        let (dom, page) = page_with("");
        let modal = AccessModal::new(&page, options("m")).unwrap();
        modal.open();
        let first: NodeId = modal.chrome().unwrap();
        modal.close();
        modal.open();
        let second = modal.chrome().unwrap();
        assert_ne!(first, second);
        assert!(!dom.is_attached(first));
        assert_eq!(dom.query_document_all("#m").unwrap(), vec![second]);
    }

    proptest! {
        #[test]
        fn prop_counter_matches_open_instances(
            ops in prop::collection::vec((0usize..3, any::<bool>()), 0..40)
        ) {
            let (dom, page) = page_with(r#"<main><button>Go</button></main>"#);
            let before = dom.snapshot(dom.body());
            let modals: Vec<_> = (0..3)
                .map(|i| AccessModal::new(&page, options(&format!("m{i}"))).unwrap())
                .collect();

            for (index, open) in ops {
                if open {
                    modals[index].open();
                } else {
                    modals[index].close();
                }
                let opened = modals.iter().filter(|m| m.is_open()).count();
                prop_assert_eq!(page.current(), opened);
                prop_assert_eq!(page.is_frozen(), opened > 0);
            }

            for modal in &modals {
                modal.close();
            }
            prop_assert_eq!(page.current(), 0);
            prop_assert_eq!(dom.snapshot(dom.body()), before);
        }
    }
}
