//! Browser document through `web-sys`.

use super::{Dom, DomError, DomEvent, EventKind, Listener, ListenerKey};
use gloo_timers::future::TimeoutFuture;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, KeyboardEvent, Node, NodeList};

struct Registered {
    target: EventTarget,
    kind: EventKind,
    closure: Closure<dyn FnMut(Event)>,
}

pub struct WebDom {
    document: Document,
    body: Node,
    listeners: RefCell<HashMap<u64, Registered>>,
    next_key: Cell<u64>,
}

fn js_err(err: JsValue) -> DomError {
    DomError::Js(format!("{err:?}"))
}

fn collect(list: NodeList) -> Vec<Node> {
    (0..list.length()).filter_map(|i| list.get(i)).collect()
}

impl WebDom {
    /// The current window's document; `None` outside a page with a `<body>`
    pub fn new() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        let body: Node = document.body()?.into();
        Some(Self {
            document,
            body,
            listeners: RefCell::new(HashMap::new()),
            next_key: Cell::new(1),
        })
    }

    fn register(&self, target: EventTarget, kind: EventKind, listener: Listener<Node>) -> ListenerKey {
        let closure = Closure::wrap(Box::new(move |event: Event| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Node>().ok()) else {
                return;
            };
            let mut dom_event = DomEvent::new(kind, target);
            if let Some(keyboard) = event.dyn_ref::<KeyboardEvent>() {
                dom_event = dom_event.with_key(keyboard.key(), keyboard.key_code());
            }
            listener(&dom_event);
            if dom_event.is_propagation_stopped() {
                event.stop_propagation();
            }
        }) as Box<dyn FnMut(Event)>);

        if let Err(err) =
            target.add_event_listener_with_callback(kind.dom_name(), closure.as_ref().unchecked_ref())
        {
            log::error!("Failed to add {} listener: {:?}", kind.dom_name(), err);
        }

        let key = self.next_key.get();
        self.next_key.set(key + 1);
        self.listeners.borrow_mut().insert(
            key,
            Registered {
                target,
                kind,
                closure,
            },
        );
        ListenerKey(key)
    }
}

impl Dom for WebDom {
    type Node = Node;

    fn root(&self) -> Node {
        self.body.clone()
    }

    fn head(&self) -> Option<Node> {
        self.document.head().map(Into::into)
    }

    fn create_element(&self, tag: &str) -> Result<Node, DomError> {
        self.document
            .create_element(tag)
            .map(Into::into)
            .map_err(js_err)
    }

    fn attribute(&self, node: &Node, name: &str) -> Option<String> {
        node.dyn_ref::<Element>()?.get_attribute(name)
    }

    fn set_attribute(&self, node: &Node, name: &str, value: &str) {
        if let Some(el) = node.dyn_ref::<Element>() {
            let _ = el.set_attribute(name, value);
        }
    }

    fn remove_attribute(&self, node: &Node, name: &str) {
        if let Some(el) = node.dyn_ref::<Element>() {
            let _ = el.remove_attribute(name);
        }
    }

    fn add_class(&self, node: &Node, class: &str) {
        if let Some(el) = node.dyn_ref::<Element>() {
            let _ = el.class_list().add_1(class);
        }
    }

    fn remove_class(&self, node: &Node, class: &str) {
        if let Some(el) = node.dyn_ref::<Element>() {
            let _ = el.class_list().remove_1(class);
        }
    }

    fn has_class(&self, node: &Node, class: &str) -> bool {
        node.dyn_ref::<Element>()
            .is_some_and(|el| el.class_list().contains(class))
    }

    fn set_style(&self, node: &Node, property: &str, value: &str) {
        if let Some(el) = node.dyn_ref::<HtmlElement>() {
            let _ = el.style().set_property(property, value);
        }
    }

    fn set_text(&self, node: &Node, text: &str) {
        node.set_text_content(Some(text));
    }

    fn append_html(&self, node: &Node, html: &str) -> Result<(), DomError> {
        match node.dyn_ref::<Element>() {
            Some(el) => el.insert_adjacent_html("beforeend", html).map_err(js_err),
            None => Err(DomError::Js("cannot insert HTML into a non-element".to_string())),
        }
    }

    fn first_child(&self, node: &Node) -> Option<Node> {
        node.first_child()
    }

    fn child_nodes(&self, node: &Node) -> Vec<Node> {
        collect(node.child_nodes())
    }

    fn parent(&self, node: &Node) -> Option<Node> {
        node.parent_node()
    }

    fn append_child(&self, parent: &Node, child: &Node) {
        if let Err(err) = parent.append_child(child) {
            log::error!("appendChild failed: {:?}", err);
        }
    }

    fn insert_before(&self, parent: &Node, child: &Node, reference: Option<&Node>) {
        if let Err(err) = parent.insert_before(child, reference) {
            log::error!("insertBefore failed: {:?}", err);
        }
    }

    fn remove_child(&self, parent: &Node, child: &Node) {
        let _ = parent.remove_child(child);
    }

    fn contains(&self, ancestor: &Node, node: &Node) -> bool {
        ancestor.contains(Some(node))
    }

    fn query_selector(&self, scope: &Node, selector: &str) -> Result<Option<Node>, DomError> {
        match scope.dyn_ref::<Element>() {
            Some(el) => el
                .query_selector(selector)
                .map(|found| found.map(Into::into))
                .map_err(js_err),
            None => Ok(None),
        }
    }

    fn query_selector_all(&self, scope: &Node, selector: &str) -> Result<Vec<Node>, DomError> {
        match scope.dyn_ref::<Element>() {
            Some(el) => el.query_selector_all(selector).map(collect).map_err(js_err),
            None => Ok(Vec::new()),
        }
    }

    fn query_document(&self, selector: &str) -> Result<Option<Node>, DomError> {
        self.document
            .query_selector(selector)
            .map(|found| found.map(Into::into))
            .map_err(js_err)
    }

    fn query_document_all(&self, selector: &str) -> Result<Vec<Node>, DomError> {
        self.document
            .query_selector_all(selector)
            .map(collect)
            .map_err(js_err)
    }

    fn element_by_id(&self, id: &str) -> Option<Node> {
        self.document.get_element_by_id(id).map(Into::into)
    }

    fn active_element(&self) -> Option<Node> {
        self.document.active_element().map(Into::into)
    }

    fn focus(&self, node: &Node) {
        if let Some(el) = node.dyn_ref::<HtmlElement>() {
            let _ = el.focus();
        }
    }

    fn listen(&self, node: &Node, kind: EventKind, listener: Listener<Node>) -> ListenerKey {
        self.register(node.clone().into(), kind, listener)
    }

    fn listen_document(&self, kind: EventKind, listener: Listener<Node>) -> ListenerKey {
        self.register(self.document.clone().into(), kind, listener)
    }

    fn unlisten(&self, key: ListenerKey) {
        let Some(registered) = self.listeners.borrow_mut().remove(&key.0) else {
            return;
        };
        let _ = registered.target.remove_event_listener_with_callback(
            registered.kind.dom_name(),
            registered.closure.as_ref().unchecked_ref(),
        );
        // The closure may be the one currently running (a close button
        // closing its own modal), so it is dropped on the next tick.
        spawn_local(async move {
            TimeoutFuture::new(0).await;
            drop(registered);
        });
    }
}
