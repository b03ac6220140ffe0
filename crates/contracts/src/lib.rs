pub mod modal;

pub use modal::{ChromeRole, CssClassMap, Hook, ModalError, ModalOptions};
