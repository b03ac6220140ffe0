use serde::{Deserialize, Serialize};

/// Lifecycle extension points a caller can hook into
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Hook {
    PreOpen,
    PostOpen,
    PreClose,
    PostClose,
    /// Before a close button closes the modal
    PreDismiss,
    /// After a close button closed the modal
    PostDismiss,
}

impl Hook {
    pub const ALL: [Hook; 6] = [
        Hook::PreOpen,
        Hook::PostOpen,
        Hook::PreClose,
        Hook::PostClose,
        Hook::PreDismiss,
        Hook::PostDismiss,
    ];

    /// Key used for the hook in a JavaScript `callbacks` object
    pub fn js_name(&self) -> &'static str {
        match self {
            Hook::PreOpen => "preOpen",
            Hook::PostOpen => "postOpen",
            Hook::PreClose => "preClose",
            Hook::PostClose => "postClose",
            Hook::PreDismiss => "preDismiss",
            Hook::PostDismiss => "postDismiss",
        }
    }
}
