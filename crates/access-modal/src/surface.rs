//! Construction of the dialog surface: chrome, overlay and content.

use crate::class_list::add_classes;
use crate::dom::{Dom, DomError};
use crate::template::TemplateRenderer;
use contracts::{ChromeRole, ModalOptions};

/// Nodes built for one open cycle
#[derive(Debug, Clone)]
pub struct Surface<N> {
    /// Root of the dialog, carries role, id and the ARIA references
    pub chrome: N,
    pub overlay: N,
    pub content: N,
    pub title: Option<N>,
    pub description: Option<N>,
    pub close_button_description: Option<N>,
}

const FULL_SIZE: [(&str, &str); 6] = [
    ("top", "0"),
    ("right", "0"),
    ("bottom", "0"),
    ("left", "0"),
    ("height", "100%"),
    ("width", "100%"),
];

/// Optional lookups treat a bad selector as "not found"
pub(crate) fn optional<N>(found: Result<Option<N>, DomError>) -> Option<N> {
    found.unwrap_or_else(|err| {
        log::warn!("{}", err);
        None
    })
}

pub(crate) fn all<N>(found: Result<Vec<N>, DomError>) -> Vec<N> {
    found.unwrap_or_else(|err| {
        log::warn!("{}", err);
        Vec::new()
    })
}

pub(crate) fn build<D: Dom>(
    dom: &D,
    options: &ModalOptions,
    id: &str,
    role: ChromeRole,
    renderer: &dyn TemplateRenderer,
) -> Result<Surface<D::Node>, DomError> {
    let classes = &options.css_class_map;

    let chrome = dom.create_element("div")?;
    add_classes(dom, &chrome, &classes.chrome);
    dom.set_style(&chrome, "position", "relative");
    dom.set_style(&chrome, "z-index", "2");
    dom.set_attribute(&chrome, "role", role.as_str());
    dom.set_attribute(&chrome, "id", id);
    dom.set_attribute(&chrome, "tabindex", "-1");
    if options.write_inline_styles {
        dom.set_style(&chrome, "position", "fixed");
        dom.set_style(&chrome, "z-index", &options.z_index.to_string());
        for (property, value) in FULL_SIZE {
            dom.set_style(&chrome, property, value);
        }
    }

    let overlay = dom.create_element("div")?;
    add_classes(dom, &overlay, &classes.overlay);
    if options.write_inline_styles {
        dom.set_style(
            &overlay,
            "background-color",
            &format!("rgba(0, 0, 0, {})", options.overlay_opacity),
        );
        dom.set_style(&overlay, "pointer-events", "none");
        dom.set_style(&overlay, "position", "absolute");
        dom.set_style(&overlay, "z-index", &options.z_index.to_string());
        for (property, value) in FULL_SIZE {
            dom.set_style(&overlay, property, value);
        }
    }

    let content = dom.create_element("div")?;
    add_classes(dom, &content, &classes.content);
    if options.write_inline_styles {
        dom.set_style(&content, "position", "relative");
        dom.set_style(&content, "z-index", &options.z_index.saturating_add(1).to_string());
    }

    let html = options
        .template
        .as_deref()
        .map(|template| renderer.render(template, &options.template_vars))
        .unwrap_or_default();
    dom.append_html(&content, &html)?;

    let title = optional(dom.query_selector(&content, &options.title_selector));
    if let Some(title) = &title {
        let title_id = ensure_id(dom, title, &format!("{id}-title"));
        dom.set_attribute(&chrome, "aria-labelledby", &title_id);
    }

    let description = optional(dom.query_selector(&content, &options.description_selector));
    if let Some(description) = &description {
        let description_id = ensure_id(dom, description, &format!("{id}-description"));
        dom.set_attribute(&chrome, "aria-describedby", &description_id);
    }

    let close_button_description = optional(
        dom.query_selector(&content, &options.close_button_description_selector),
    );
    if let Some(node) = &close_button_description {
        let description_id = ensure_id(dom, node, &format!("{id}-close-button-description"));
        for button in all(dom.query_selector_all(&content, &options.close_buttons_selector)) {
            dom.set_attribute(&button, "aria-describedby", &description_id);
        }
    }

    dom.append_child(&chrome, &overlay);
    dom.append_child(&chrome, &content);

    Ok(Surface {
        chrome,
        overlay,
        content,
        title,
        description,
        close_button_description,
    })
}

/// The node's id, assigning `fallback` when it has none
fn ensure_id<D: Dom>(dom: &D, node: &D::Node, fallback: &str) -> String {
    match dom.attribute(node, "id").filter(|id| !id.is_empty()) {
        Some(id) => id,
        None => {
            dom.set_attribute(node, "id", fallback);
            fallback.to_string()
        }
    }
}
