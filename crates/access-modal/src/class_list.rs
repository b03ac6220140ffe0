//! Space-separated class strings applied through a [`Dom`].

use crate::dom::Dom;

/// Individual class names of a space-separated class string
pub fn split_classes(classes: &str) -> impl Iterator<Item = &str> {
    classes.split_whitespace()
}

pub fn add_classes<D: Dom>(dom: &D, node: &D::Node, classes: &str) {
    for class in split_classes(classes) {
        dom.add_class(node, class);
    }
}

pub fn remove_classes<D: Dom>(dom: &D, node: &D::Node, classes: &str) {
    for class in split_classes(classes) {
        dom.remove_class(node, class);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;

    #[test]
    fn test_add_and_remove_multiple() {
        let dom = MemoryDom::new();
        let div = dom.create_element("div").unwrap();
        add_classes(&dom, &div, "  access-modal   access-modal-opened ");
        assert_eq!(
            dom.attribute(&div, "class").as_deref(),
            Some("access-modal access-modal-opened")
        );
        remove_classes(&dom, &div, "access-modal-opened");
        assert!(dom.has_class(&div, "access-modal"));
        assert!(!dom.has_class(&div, "access-modal-opened"));
    }

    #[test]
    fn test_blank_string_adds_nothing() {
        let dom = MemoryDom::new();
        let div = dom.create_element("div").unwrap();
        add_classes(&dom, &div, "   ");
        assert_eq!(dom.attribute(&div, "class"), None);
    }
}
