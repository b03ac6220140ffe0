use thiserror::Error;

/// Errors surfaced when constructing a modal
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModalError {
    #[error("You must set chromeRole=`dialog` or chromeRole=`alertdialog` in the modal options (got `{0}`)")]
    InvalidRole(String),

    #[error("Invalid modal options: {0}")]
    InvalidOptions(String),

    #[error("DOM operation failed: {0}")]
    Dom(String),
}
