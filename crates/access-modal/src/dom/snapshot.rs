use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Serializable copy of a document subtree, used to compare DOM states
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomNode {
    /// Lowercase tag name, `#text` for text nodes
    pub tag_name: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub styles: BTreeMap<String, String>,
    pub text: Option<String>,
    pub children: Vec<DomNode>,
    pub depth: usize,
}

impl DomNode {
    pub fn text_node(text: &str, depth: usize) -> Self {
        Self {
            tag_name: "#text".to_string(),
            id: None,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            styles: BTreeMap::new(),
            text: Some(text.to_string()),
            children: Vec::new(),
            depth,
        }
    }

    /// Tag names of the direct children, handy in assertions
    pub fn child_tags(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.tag_name.as_str()).collect()
    }
}
