use super::{ChromeRole, ModalError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const DEFAULT_CLOSE_BUTTONS_SELECTOR: &str = ".access-modal-close-button";
pub const DEFAULT_CLOSE_BUTTON_DESCRIPTION_SELECTOR: &str =
    ".access-modal-close-button-description";
pub const DEFAULT_TITLE_SELECTOR: &str = ".access-modal-title";
pub const DEFAULT_DESCRIPTION_SELECTOR: &str = ".access-modal-description";

/// Elements that can receive focus, each excluding `tabindex="-1"`
pub const DEFAULT_FOCUSABLE_SELECTORS: [&str; 9] = [
    r#"a[href]:not([tabindex="-1"])"#,
    r#"area[href]:not([tabindex="-1"])"#,
    r#"input:not([disabled]):not([tabindex="-1"])"#,
    r#"select:not([disabled]):not([tabindex="-1"])"#,
    r#"textarea:not([disabled]):not([tabindex="-1"])"#,
    r#"button:not([disabled]):not([tabindex="-1"])"#,
    r#"iframe:not([tabindex="-1"])"#,
    r#"[tabindex]:not([tabindex="-1"])"#,
    r#"[contentEditable=true]:not([tabindex="-1"])"#,
];

/// Class names applied to the modal's elements.
///
/// Each value may hold several space-separated classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CssClassMap {
    pub chrome: String,
    pub overlay: String,
    pub content: String,
    /// Aria-hidden wrapper receiving the page content while the modal is open
    pub everything_else: String,
}

impl Default for CssClassMap {
    fn default() -> Self {
        Self {
            chrome: "access-modal access-modal-opened".to_string(),
            overlay: "access-modal-overlay".to_string(),
            content: "access-modal-content".to_string(),
            everything_else: "access-modal-everything-else".to_string(),
        }
    }
}

/// Modal configuration.
///
/// Fields missing from a deserialized object (at any nesting level) keep
/// their defaults, so a partial JSON object is merged over [`ModalOptions::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModalOptions {
    /// Id of the chrome, also the prefix of generated inner ids
    pub id: Option<String>,
    /// Selector of the element focused after close
    pub focus_after_close: Option<String>,
    /// Selector of the element focused after open
    pub focus_after_open: Option<String>,
    /// `dialog` or `alertdialog`; checked when the modal is constructed
    pub chrome_role: String,
    pub content_role: Option<String>,
    pub overlay_opacity: f64,
    pub z_index: i32,
    pub write_inline_styles: bool,

    pub close_buttons_selector: String,
    pub close_button_description_selector: String,
    pub title_selector: String,
    pub description_selector: String,

    pub template: Option<String>,
    pub template_vars: BTreeMap<String, Value>,

    pub css_class_map: CssClassMap,
    pub focusable_selector_list: Vec<String>,
}

impl Default for ModalOptions {
    fn default() -> Self {
        Self {
            id: None,
            focus_after_close: None,
            focus_after_open: None,
            chrome_role: ChromeRole::AlertDialog.as_str().to_string(),
            content_role: Some("document".to_string()),
            overlay_opacity: 0.8,
            z_index: 100,
            write_inline_styles: true,
            close_buttons_selector: DEFAULT_CLOSE_BUTTONS_SELECTOR.to_string(),
            close_button_description_selector: DEFAULT_CLOSE_BUTTON_DESCRIPTION_SELECTOR
                .to_string(),
            title_selector: DEFAULT_TITLE_SELECTOR.to_string(),
            description_selector: DEFAULT_DESCRIPTION_SELECTOR.to_string(),
            template: None,
            template_vars: BTreeMap::new(),
            css_class_map: CssClassMap::default(),
            focusable_selector_list: DEFAULT_FOCUSABLE_SELECTORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ModalOptions {
    /// Parse a (possibly partial) JSON options object
    pub fn from_json(json: &str) -> Result<Self, ModalError> {
        serde_json::from_str(json).map_err(|e| ModalError::InvalidOptions(e.to_string()))
    }

    /// Validated chrome role
    pub fn chrome_role(&self) -> Result<ChromeRole, ModalError> {
        self.chrome_role.parse()
    }

    /// Comma-joined focusable selector list, usable as one selector
    pub fn focusable_selector(&self) -> String {
        self.focusable_selector_list.join(",")
    }

    /// Content role, treating an empty string like an absent one
    pub fn content_role(&self) -> Option<&str> {
        self.content_role.as_deref().filter(|r| !r.is_empty())
    }
}
