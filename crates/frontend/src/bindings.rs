//! JavaScript surface: `new AccessModal(options)`.
//!
//! `options` is the camelCase options object. `focusAfterOpen` and
//! `focusAfterClose` take a selector or an element, and an optional
//! `callbacks` object holds `preOpen`, `postOpen`, `preClose`, `postClose`,
//! `preDismiss` and `postDismiss` functions (`preEsc` and `postEsc` are
//! accepted for the dismiss pair). Each callback receives an
//! `AccessModalHandle` that does not keep the modal alive.

use access_modal::dom::WebDom;
use access_modal::{
    AccessModal, FocusTarget, Hook, ModalConfig, ModalError, ModalOptions, Page, WeakAccessModal,
};
use js_sys::{Function, Object, Reflect};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Node};

thread_local! {
    static PAGE: RefCell<Option<Rc<Page<WebDom>>>> = const { RefCell::new(None) };
}

/// Page context shared by every modal of the document, created on first use
pub fn shared_page() -> Option<Rc<Page<WebDom>>> {
    PAGE.with(|cell| {
        let mut page = cell.borrow_mut();
        if page.is_none() {
            *page = WebDom::new().map(Page::new);
        }
        page.as_ref().map(Rc::clone)
    })
}

#[wasm_bindgen(js_name = AccessModal)]
pub struct JsAccessModal {
    modal: AccessModal<WebDom>,
}

#[wasm_bindgen(js_class = AccessModal)]
impl JsAccessModal {
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<JsAccessModal, JsValue> {
        let parsed = JsOptions::parse(options)?;
        let page = shared_page()
            .ok_or_else(|| JsValue::from(js_sys::Error::new("No document available")))?;

        let mut config = ModalConfig::new(parsed.options);
        if let Some(node) = parsed.focus_after_open {
            config = config.focus_after_open(FocusTarget::Node(node));
        }
        if let Some(node) = parsed.focus_after_close {
            config = config.focus_after_close(FocusTarget::Node(node));
        }
        for (hook, function) in parsed.callbacks {
            config = config.on(hook, move |modal: &AccessModal<WebDom>| {
                let handle = JsValue::from(JsModalHandle::new(modal));
                if let Err(err) = function.call1(&JsValue::NULL, &handle) {
                    log::error!(
                        "{} callback of modal {} threw: {:?}",
                        hook.js_name(),
                        modal.id(),
                        err
                    );
                }
            });
        }

        let modal = AccessModal::new(&page, config).map_err(|e| js_error(&e))?;
        Ok(JsAccessModal { modal })
    }

    pub fn open(&self) {
        self.modal.open();
    }

    pub fn close(&self) {
        self.modal.close();
    }

    /// The dialog's root node while open, `undefined` otherwise
    #[wasm_bindgen(js_name = isOpened)]
    pub fn is_opened(&self) -> Option<Node> {
        self.modal.chrome()
    }

    pub fn id(&self) -> String {
        self.modal.id().to_string()
    }
}

/// What callbacks receive: a weak reference to the modal that fired
#[wasm_bindgen(js_name = AccessModalHandle)]
pub struct JsModalHandle {
    id: String,
    modal: WeakAccessModal<WebDom>,
}

impl JsModalHandle {
    fn new(modal: &AccessModal<WebDom>) -> Self {
        Self {
            id: modal.id().to_string(),
            modal: modal.downgrade(),
        }
    }
}

#[wasm_bindgen(js_class = AccessModalHandle)]
impl JsModalHandle {
    pub fn open(&self) {
        if let Some(modal) = self.modal.upgrade() {
            modal.open();
        }
    }

    pub fn close(&self) {
        if let Some(modal) = self.modal.upgrade() {
            modal.close();
        }
    }

    #[wasm_bindgen(js_name = isOpened)]
    pub fn is_opened(&self) -> Option<Node> {
        self.modal.upgrade().and_then(|modal| modal.chrome())
    }

    pub fn id(&self) -> String {
        self.id.clone()
    }
}

/// A JS options object split into the serde record and the parts serde
/// cannot carry
struct JsOptions {
    options: ModalOptions,
    focus_after_open: Option<Node>,
    focus_after_close: Option<Node>,
    callbacks: Vec<(Hook, Function)>,
}

impl JsOptions {
    fn parse(options: JsValue) -> Result<Self, JsValue> {
        if !options.is_object() {
            if !options.is_undefined() && !options.is_null() {
                log::warn!("AccessModal options must be an object, using defaults");
            }
            return Ok(Self {
                options: ModalOptions::default(),
                focus_after_open: None,
                focus_after_close: None,
                callbacks: Vec::new(),
            });
        }

        let callbacks = callbacks_of(&options)?;

        // Element targets are taken out of a shallow copy so serde only sees selectors
        let plain = Object::assign(&Object::new(), options.unchecked_ref());
        let focus_after_open = take_element(&plain, "focusAfterOpen")?;
        let focus_after_close = take_element(&plain, "focusAfterClose")?;

        let options = serde_wasm_bindgen::from_value(plain.into())
            .map_err(|e| js_error(&ModalError::InvalidOptions(e.to_string())))?;
        Ok(Self {
            options,
            focus_after_open,
            focus_after_close,
            callbacks,
        })
    }
}

/// Remove `key` from `object` when it holds an element, returning the element
fn take_element(object: &Object, key: &str) -> Result<Option<Node>, JsValue> {
    let key = JsValue::from_str(key);
    let value = Reflect::get(object, &key)?;
    if !value.is_instance_of::<Element>() {
        return Ok(None);
    }
    Reflect::delete_property(object, &key)?;
    Ok(Some(value.unchecked_into::<Node>()))
}

/// Keys looked up for each hook, in order of preference
fn callback_names(hook: Hook) -> &'static [&'static str] {
    match hook {
        Hook::PreOpen => &["preOpen"],
        Hook::PostOpen => &["postOpen"],
        Hook::PreClose => &["preClose"],
        Hook::PostClose => &["postClose"],
        Hook::PreDismiss => &["preDismiss", "preEsc"],
        Hook::PostDismiss => &["postDismiss", "postEsc"],
    }
}

fn callbacks_of(options: &JsValue) -> Result<Vec<(Hook, Function)>, JsValue> {
    let callbacks = Reflect::get(options, &JsValue::from_str("callbacks"))?;
    if !callbacks.is_object() {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    for hook in Hook::ALL {
        for name in callback_names(hook) {
            let value = Reflect::get(&callbacks, &JsValue::from_str(name))?;
            match value.dyn_into::<Function>() {
                Ok(function) => {
                    found.push((hook, function));
                    break;
                }
                Err(value) if value.is_undefined() || value.is_null() => {}
                Err(_) => log::warn!("callbacks.{} is not a function, ignored", name),
            }
        }
    }
    Ok(found)
}

fn js_error(err: &ModalError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}
