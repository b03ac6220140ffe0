//! In-memory document.
//!
//! An arena of nodes shaped like `<html><head></head><body></body></html>`
//! with the subset of browser behaviour the modal relies on: selector
//! queries, focusability, synchronous event dispatch (click, touch and
//! keydown bubble to the document, focus does not) and listener removal
//! taking effect during dispatch.

use super::html::{parse_fragment, HtmlNode};
use super::selector::{SelectorElement, SelectorList};
use super::{Dom, DomError, DomEvent, DomNode, EventKind, Listener, ListenerKey};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

const DOCUMENT: NodeId = NodeId(0);
const HTML: NodeId = NodeId(1);
const HEAD: NodeId = NodeId(2);
const BODY: NodeId = NodeId(3);

#[derive(Debug)]
enum NodeKind {
    Document,
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        styles: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

struct ListenerEntry {
    key: ListenerKey,
    target: NodeId,
    kind: EventKind,
    listener: Listener<NodeId>,
}

struct Document {
    nodes: RefCell<Vec<NodeData>>,
    active: Cell<Option<NodeId>>,
    listeners: RefCell<Vec<ListenerEntry>>,
    next_key: Cell<u64>,
}

/// Cheaply cloneable handle to one in-memory document
#[derive(Clone)]
pub struct MemoryDom {
    doc: Rc<Document>,
}

impl fmt::Debug for MemoryDom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDom")
            .field("nodes", &self.doc.nodes.borrow().len())
            .field("active", &self.doc.active.get())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

struct ElementRef<'a> {
    nodes: &'a [NodeData],
    id: NodeId,
}

impl SelectorElement for ElementRef<'_> {
    fn local_name(&self) -> String {
        match &self.nodes[self.id.0].kind {
            NodeKind::Element { tag, .. } => tag.clone(),
            _ => String::new(),
        }
    }

    fn attribute(&self, name: &str) -> Option<String> {
        match &self.nodes[self.id.0].kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone()),
            _ => None,
        }
    }

    fn parent_element(&self) -> Option<Self> {
        let parent = self.nodes[self.id.0].parent?;
        match self.nodes[parent.0].kind {
            NodeKind::Element { .. } => Some(ElementRef {
                nodes: self.nodes,
                id: parent,
            }),
            _ => None,
        }
    }
}

impl MemoryDom {
    pub fn new() -> Self {
        let element = |tag: &str, parent: NodeId, children: Vec<NodeId>| NodeData {
            kind: NodeKind::Element {
                tag: tag.to_string(),
                attributes: Vec::new(),
                styles: Vec::new(),
            },
            parent: Some(parent),
            children,
        };
        let nodes = vec![
            NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: vec![HTML],
            },
            element("html", DOCUMENT, vec![HEAD, BODY]),
            element("head", HTML, Vec::new()),
            element("body", HTML, Vec::new()),
        ];
        Self {
            doc: Rc::new(Document {
                nodes: RefCell::new(nodes),
                active: Cell::new(None),
                listeners: RefCell::new(Vec::new()),
                next_key: Cell::new(1),
            }),
        }
    }

    /// A document whose `<body>` holds the given markup
    pub fn with_body(html: &str) -> Self {
        let dom = Self::new();
        dom.append_fragment(BODY, html);
        dom
    }

    pub fn body(&self) -> NodeId {
        BODY
    }

    /// First element in the document matching `selector`; invalid selectors match nothing
    pub fn find(&self, selector: &str) -> Option<NodeId> {
        self.query_document(selector).ok().flatten()
    }

    pub fn tag_name(&self, node: NodeId) -> Option<String> {
        match &self.doc.nodes.borrow()[node.0].kind {
            NodeKind::Element { tag, .. } => Some(tag.clone()),
            _ => None,
        }
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        match &self.doc.nodes.borrow()[node.0].kind {
            NodeKind::Element { styles, .. } => styles
                .iter()
                .find(|(p, _)| p == property)
                .map(|(_, v)| v.clone()),
            _ => None,
        }
    }

    pub fn text_content(&self, node: NodeId) -> String {
        let nodes = self.doc.nodes.borrow();
        let mut text = String::new();
        collect_text(&nodes, node, &mut text);
        text
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        let nodes = self.doc.nodes.borrow();
        let mut current = Some(node);
        while let Some(id) = current {
            if id == DOCUMENT {
                return true;
            }
            current = nodes[id.0].parent;
        }
        false
    }

    pub fn listener_count(&self) -> usize {
        self.doc.listeners.borrow().len()
    }

    /// Listeners registered on `node` (or on the document for `None`)
    pub fn listeners_on(&self, node: Option<NodeId>, kind: EventKind) -> usize {
        let target = node.unwrap_or(DOCUMENT);
        self.doc
            .listeners
            .borrow()
            .iter()
            .filter(|e| e.target == target && e.kind == kind)
            .count()
    }

    pub fn snapshot(&self, node: NodeId) -> DomNode {
        let nodes = self.doc.nodes.borrow();
        snapshot_node(&nodes, node, 0)
    }

    pub fn click(&self, node: NodeId) {
        self.dispatch(DomEvent::new(EventKind::Click, node));
    }

    pub fn touch(&self, node: NodeId) {
        self.dispatch(DomEvent::new(EventKind::Touch, node));
    }

    /// Key press delivered to the focused element, or to `<body>`
    pub fn press_key(&self, key: &str, key_code: u32) {
        let target = self.doc.active.get().unwrap_or(BODY);
        self.dispatch(DomEvent::new(EventKind::KeyDown, target).with_key(key, key_code));
    }

    /// Deliver `event` to its target, then to each ancestor up to the
    /// document if the event bubbles and propagation was not stopped
    pub fn dispatch(&self, event: DomEvent<NodeId>) {
        let path: Vec<NodeId> = if event.kind.bubbles() {
            let nodes = self.doc.nodes.borrow();
            let mut path = vec![event.target];
            let mut current = nodes[event.target.0].parent;
            while let Some(id) = current {
                path.push(id);
                current = nodes[id.0].parent;
            }
            path
        } else {
            vec![event.target]
        };

        for current in path {
            let targeted: Vec<(ListenerKey, Listener<NodeId>)> = self
                .doc
                .listeners
                .borrow()
                .iter()
                .filter(|e| e.target == current && e.kind == event.kind)
                .map(|e| (e.key, Rc::clone(&e.listener)))
                .collect();

            for (key, listener) in targeted {
                // Removed by an earlier listener of this same dispatch
                if !self.doc.listeners.borrow().iter().any(|e| e.key == key) {
                    continue;
                }
                listener(&event);
            }

            if event.is_propagation_stopped() {
                break;
            }
        }
    }

    fn alloc(&self, kind: NodeKind) -> NodeId {
        let mut nodes = self.doc.nodes.borrow_mut();
        nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        NodeId(nodes.len() - 1)
    }

    fn append_fragment(&self, parent: NodeId, html: &str) {
        for node in parse_fragment(html) {
            let id = self.build(node);
            self.append_child(&parent, &id);
        }
    }

    fn build(&self, node: HtmlNode) -> NodeId {
        match node {
            HtmlNode::Text(text) => self.alloc(NodeKind::Text(text)),
            HtmlNode::Element {
                tag,
                attributes,
                children,
            } => {
                let id = self.alloc(NodeKind::Element {
                    tag,
                    attributes,
                    styles: Vec::new(),
                });
                for child in children {
                    let child_id = self.build(child);
                    self.append_child(&id, &child_id);
                }
                id
            }
        }
    }

    fn detach(nodes: &mut [NodeData], child: NodeId) {
        if let Some(old_parent) = nodes[child.0].parent.take() {
            nodes[old_parent.0].children.retain(|c| *c != child);
        }
    }

    fn with_attributes<R>(&self, node: NodeId, f: impl FnOnce(&mut Vec<(String, String)>) -> R) -> Option<R> {
        let mut nodes = self.doc.nodes.borrow_mut();
        match &mut nodes[node.0].kind {
            NodeKind::Element { attributes, .. } => Some(f(attributes)),
            _ => None,
        }
    }

    fn is_focusable(&self, node: NodeId) -> bool {
        let nodes = self.doc.nodes.borrow();
        let NodeKind::Element { tag, attributes, .. } = &nodes[node.0].kind else {
            return false;
        };
        let has = |name: &str| attributes.iter().any(|(n, _)| n == name);
        let value = |name: &str| {
            attributes
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str())
        };

        if has("tabindex") {
            return true;
        }
        match tag.as_str() {
            "a" | "area" => has("href"),
            "input" | "select" | "textarea" | "button" => !has("disabled"),
            "iframe" => true,
            _ => matches!(value("contenteditable"), Some("" | "true")),
        }
    }

    fn select(&self, scope: NodeId, selector: &str, first_only: bool) -> Result<Vec<NodeId>, DomError> {
        let list = SelectorList::parse(selector)?;
        let nodes = self.doc.nodes.borrow();
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = nodes[scope.0].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let NodeKind::Element { .. } = nodes[id.0].kind {
                if list.matches(&ElementRef { nodes: &nodes, id }) {
                    found.push(id);
                    if first_only {
                        break;
                    }
                }
                stack.extend(nodes[id.0].children.iter().rev().copied());
            }
        }
        Ok(found)
    }

    fn register(&self, target: NodeId, kind: EventKind, listener: Listener<NodeId>) -> ListenerKey {
        let key = ListenerKey(self.doc.next_key.get());
        self.doc.next_key.set(key.0 + 1);
        self.doc.listeners.borrow_mut().push(ListenerEntry {
            key,
            target,
            kind,
            listener,
        });
        key
    }
}

fn collect_text(nodes: &[NodeData], node: NodeId, out: &mut String) {
    match &nodes[node.0].kind {
        NodeKind::Text(text) => out.push_str(text),
        _ => {
            for child in &nodes[node.0].children {
                collect_text(nodes, *child, out);
            }
        }
    }
}

fn snapshot_node(nodes: &[NodeData], node: NodeId, depth: usize) -> DomNode {
    match &nodes[node.0].kind {
        NodeKind::Text(text) => DomNode::text_node(text, depth),
        NodeKind::Document => DomNode {
            tag_name: "#document".to_string(),
            id: None,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            styles: BTreeMap::new(),
            text: None,
            children: nodes[node.0]
                .children
                .iter()
                .map(|c| snapshot_node(nodes, *c, depth + 1))
                .collect(),
            depth,
        },
        NodeKind::Element {
            tag,
            attributes,
            styles,
        } => {
            let attributes: BTreeMap<String, String> = attributes.iter().cloned().collect();
            DomNode {
                tag_name: tag.clone(),
                id: attributes.get("id").cloned(),
                classes: attributes
                    .get("class")
                    .map(|c| c.split_whitespace().map(String::from).collect())
                    .unwrap_or_default(),
                attributes,
                styles: styles.iter().cloned().collect(),
                text: None,
                children: nodes[node.0]
                    .children
                    .iter()
                    .map(|c| snapshot_node(nodes, *c, depth + 1))
                    .collect(),
                depth,
            }
        }
    }
}

impl Dom for MemoryDom {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        BODY
    }

    fn head(&self) -> Option<NodeId> {
        Some(HEAD)
    }

    fn create_element(&self, tag: &str) -> Result<NodeId, DomError> {
        Ok(self.alloc(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            styles: Vec::new(),
        }))
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        self.with_attributes(*node, |attributes| {
            attributes
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| v.clone())
        })
        .flatten()
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        self.with_attributes(*node, |attributes| {
            match attributes.iter_mut().find(|(n, _)| *n == name) {
                Some((_, v)) => *v = value.to_string(),
                None => attributes.push((name, value.to_string())),
            }
        });
    }

    fn remove_attribute(&self, node: &NodeId, name: &str) {
        let name = name.to_ascii_lowercase();
        self.with_attributes(*node, |attributes| attributes.retain(|(n, _)| *n != name));
    }

    fn add_class(&self, node: &NodeId, class: &str) {
        let current = self.attribute(node, "class").unwrap_or_default();
        if current.split_whitespace().any(|c| c == class) {
            return;
        }
        let mut classes: Vec<&str> = current.split_whitespace().collect();
        classes.push(class);
        self.set_attribute(node, "class", &classes.join(" "));
    }

    fn remove_class(&self, node: &NodeId, class: &str) {
        let Some(current) = self.attribute(node, "class") else {
            return;
        };
        let classes: Vec<&str> = current.split_whitespace().filter(|c| *c != class).collect();
        self.set_attribute(node, "class", &classes.join(" "));
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.attribute(node, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    fn set_style(&self, node: &NodeId, property: &str, value: &str) {
        let mut nodes = self.doc.nodes.borrow_mut();
        if let NodeKind::Element { styles, .. } = &mut nodes[node.0].kind {
            match styles.iter_mut().find(|(p, _)| p == property) {
                Some((_, v)) => *v = value.to_string(),
                None => styles.push((property.to_string(), value.to_string())),
            }
        }
    }

    fn set_text(&self, node: &NodeId, text: &str) {
        {
            let mut nodes = self.doc.nodes.borrow_mut();
            let children = std::mem::take(&mut nodes[node.0].children);
            for child in children {
                nodes[child.0].parent = None;
            }
        }
        let text_node = self.alloc(NodeKind::Text(text.to_string()));
        self.append_child(node, &text_node);
    }

    fn append_html(&self, node: &NodeId, html: &str) -> Result<(), DomError> {
        self.append_fragment(*node, html);
        Ok(())
    }

    fn first_child(&self, node: &NodeId) -> Option<NodeId> {
        self.doc.nodes.borrow()[node.0].children.first().copied()
    }

    fn child_nodes(&self, node: &NodeId) -> Vec<NodeId> {
        self.doc.nodes.borrow()[node.0].children.clone()
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.doc.nodes.borrow()[node.0].parent
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) {
        self.insert_before(parent, child, None);
    }

    fn insert_before(&self, parent: &NodeId, child: &NodeId, reference: Option<&NodeId>) {
        if self.contains(child, parent) {
            log::warn!("Refusing to insert {child:?} into its own subtree");
            return;
        }
        let mut nodes = self.doc.nodes.borrow_mut();
        Self::detach(&mut nodes, *child);
        let position = reference.and_then(|r| nodes[parent.0].children.iter().position(|c| c == r));
        match position {
            Some(idx) => nodes[parent.0].children.insert(idx, *child),
            None => nodes[parent.0].children.push(*child),
        }
        nodes[child.0].parent = Some(*parent);
    }

    fn remove_child(&self, parent: &NodeId, child: &NodeId) {
        if self.parent(child) != Some(*parent) {
            return;
        }
        if let Some(active) = self.doc.active.get() {
            if self.contains(child, &active) {
                self.doc.active.set(None);
            }
        }
        let mut nodes = self.doc.nodes.borrow_mut();
        Self::detach(&mut nodes, *child);
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        let nodes = self.doc.nodes.borrow();
        let mut current = Some(*node);
        while let Some(id) = current {
            if id == *ancestor {
                return true;
            }
            current = nodes[id.0].parent;
        }
        false
    }

    fn query_selector(&self, scope: &NodeId, selector: &str) -> Result<Option<NodeId>, DomError> {
        Ok(self.select(*scope, selector, true)?.into_iter().next())
    }

    fn query_selector_all(&self, scope: &NodeId, selector: &str) -> Result<Vec<NodeId>, DomError> {
        self.select(*scope, selector, false)
    }

    fn query_document(&self, selector: &str) -> Result<Option<NodeId>, DomError> {
        self.query_selector(&DOCUMENT, selector)
    }

    fn query_document_all(&self, selector: &str) -> Result<Vec<NodeId>, DomError> {
        self.query_selector_all(&DOCUMENT, selector)
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let nodes = self.doc.nodes.borrow();
        let mut stack = vec![DOCUMENT];
        while let Some(current) = stack.pop() {
            if let NodeKind::Element { attributes, .. } = &nodes[current.0].kind {
                if attributes.iter().any(|(n, v)| n == "id" && v == id) {
                    return Some(current);
                }
            }
            stack.extend(nodes[current.0].children.iter().rev().copied());
        }
        None
    }

    fn active_element(&self) -> Option<NodeId> {
        Some(self.doc.active.get().unwrap_or(BODY))
    }

    fn focus(&self, node: &NodeId) {
        if !self.is_attached(*node) || !self.is_focusable(*node) {
            return;
        }
        if self.doc.active.get() == Some(*node) {
            return;
        }
        self.doc.active.set(Some(*node));
        self.dispatch(DomEvent::new(EventKind::Focus, *node));
    }

    fn listen(&self, node: &NodeId, kind: EventKind, listener: Listener<NodeId>) -> ListenerKey {
        self.register(*node, kind, listener)
    }

    fn listen_document(&self, kind: EventKind, listener: Listener<NodeId>) -> ListenerKey {
        self.register(DOCUMENT, kind, listener)
    }

    fn unlisten(&self, key: ListenerKey) {
        self.doc.listeners.borrow_mut().retain(|e| e.key != key);
    }
}
