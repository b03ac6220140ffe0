use crate::dom::{Dom, DomError};
use crate::ids::{IdGenerator, UuidIdGenerator};
use crate::modal::AccessModal;
use crate::template::{InterpolateTemplate, TemplateRenderer};
use contracts::{Hook, ModalOptions};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

pub type Callback<D> = Rc<dyn Fn(&AccessModal<D>)>;

/// Element to focus, given as a selector or as a node
#[derive(Debug, Clone, PartialEq)]
pub enum FocusTarget<N> {
    Selector(String),
    Node(N),
}

impl<N: Clone> FocusTarget<N> {
    /// Look the target up in the whole document
    pub fn resolve<D: Dom<Node = N>>(&self, dom: &D) -> Result<Option<N>, DomError> {
        match self {
            FocusTarget::Selector(selector) => dom.query_document(selector),
            FocusTarget::Node(node) => Ok(Some(node.clone())),
        }
    }
}

/// Lifecycle hooks, each invoked with the modal that fired it
pub struct Callbacks<D: Dom> {
    hooks: BTreeMap<Hook, Callback<D>>,
}

impl<D: Dom> Default for Callbacks<D> {
    fn default() -> Self {
        Self {
            hooks: BTreeMap::new(),
        }
    }
}

impl<D: Dom> Clone for Callbacks<D> {
    fn clone(&self) -> Self {
        Self {
            hooks: self.hooks.clone(),
        }
    }
}

impl<D: Dom> fmt::Debug for Callbacks<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.hooks.keys()).finish()
    }
}

impl<D: Dom> Callbacks<D> {
    pub fn set(&mut self, hook: Hook, callback: Callback<D>) {
        self.hooks.insert(hook, callback);
    }

    pub fn get(&self, hook: Hook) -> Option<Callback<D>> {
        self.hooks.get(&hook).cloned()
    }
}

/// Everything a modal is constructed from.
///
/// Node-valued focus targets take precedence over the selector fields of
/// [`ModalOptions`].
pub struct ModalConfig<D: Dom> {
    pub options: ModalOptions,
    pub focus_after_open: Option<FocusTarget<D::Node>>,
    pub focus_after_close: Option<FocusTarget<D::Node>>,
    pub callbacks: Callbacks<D>,
    pub renderer: Rc<dyn TemplateRenderer>,
    pub id_generator: Rc<dyn IdGenerator>,
}

impl<D: Dom> Default for ModalConfig<D> {
    fn default() -> Self {
        Self::new(ModalOptions::default())
    }
}

impl<D: Dom> From<ModalOptions> for ModalConfig<D> {
    fn from(options: ModalOptions) -> Self {
        Self::new(options)
    }
}

impl<D: Dom> ModalConfig<D> {
    pub fn new(options: ModalOptions) -> Self {
        Self {
            options,
            focus_after_open: None,
            focus_after_close: None,
            callbacks: Callbacks::default(),
            renderer: Rc::new(InterpolateTemplate),
            id_generator: Rc::new(UuidIdGenerator),
        }
    }

    pub fn on(mut self, hook: Hook, callback: impl Fn(&AccessModal<D>) + 'static) -> Self {
        self.callbacks.set(hook, Rc::new(callback));
        self
    }

    pub fn focus_after_open(mut self, target: FocusTarget<D::Node>) -> Self {
        self.focus_after_open = Some(target);
        self
    }

    pub fn focus_after_close(mut self, target: FocusTarget<D::Node>) -> Self {
        self.focus_after_close = Some(target);
        self
    }

    pub fn renderer(mut self, renderer: impl TemplateRenderer + 'static) -> Self {
        self.renderer = Rc::new(renderer);
        self
    }

    pub fn id_generator(mut self, generator: impl IdGenerator + 'static) -> Self {
        self.id_generator = Rc::new(generator);
        self
    }

    /// Explicit targets first, then the selectors from the options
    pub(crate) fn resolved_focus_targets(
        &self,
    ) -> (Option<FocusTarget<D::Node>>, Option<FocusTarget<D::Node>>) {
        let from_selector = |s: &Option<String>| s.clone().map(FocusTarget::Selector);
        (
            self.focus_after_open
                .clone()
                .or_else(|| from_selector(&self.options.focus_after_open)),
            self.focus_after_close
                .clone()
                .or_else(|| from_selector(&self.options.focus_after_close)),
        )
    }
}
