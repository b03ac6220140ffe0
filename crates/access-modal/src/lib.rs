//! Accessible modal dialogs.
//!
//! A modal is created on a shared [`Page`] and opened or closed through
//! [`AccessModal`]. Document access goes through the [`dom::Dom`] trait:
//! [`dom::MemoryDom`] runs natively, `dom::WebDom` drives a browser
//! document on `wasm32`.

pub mod class_list;
pub mod config;
pub mod dom;
pub mod handlers;
pub mod ids;
pub mod modal;
pub mod page;
pub mod surface;
pub mod template;

pub use config::{Callback, Callbacks, FocusTarget, ModalConfig};
pub use contracts::{ChromeRole, CssClassMap, Hook, ModalError, ModalOptions};
pub use modal::{AccessModal, WeakAccessModal};
pub use page::Page;
pub use surface::Surface;
