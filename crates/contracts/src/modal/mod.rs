//! Option records shared by the modal widget and its JavaScript binding.

pub mod error;
pub mod hook;
pub mod options;
pub mod role;

// Re-exports
pub use error::ModalError;
pub use hook::Hook;
pub use options::{CssClassMap, ModalOptions};
pub use role::ChromeRole;
