use crate::bindings::shared_page;
use access_modal::dom::WebDom;
use access_modal::{AccessModal, Hook, ModalConfig, ModalOptions};
use leptos::prelude::*;

const TEMPLATE: &str = r#"<h2 class="access-modal-title"><%- title %></h2>
<p class="access-modal-description"><%- body %></p>
<span class="access-modal-close-button-description" hidden>Closes this dialog</span>
<input type="text" placeholder="Focus stays in here">
<button type="button" class="access-modal-close-button">Close</button>"#;

/// Hook activity shown on the page
#[derive(Clone, Copy)]
struct DemoLog {
    events: RwSignal<Vec<String>>,
    opened: RwSignal<usize>,
}

fn demo_modal(id: &str, title: &str, body: &str, activity: DemoLog) -> Option<AccessModal<WebDom>> {
    let page = shared_page()?;
    let options = ModalOptions {
        id: Some(id.to_string()),
        chrome_role: "dialog".to_string(),
        template: Some(TEMPLATE.to_string()),
        template_vars: [
            ("title".to_string(), serde_json::json!(title)),
            ("body".to_string(), serde_json::json!(body)),
        ]
        .into_iter()
        .collect(),
        ..Default::default()
    };

    let mut config = ModalConfig::new(options);
    for hook in Hook::ALL {
        config = config.on(hook, move |modal: &AccessModal<WebDom>| {
            activity
                .events
                .update(|events| events.push(format!("{}: {}", modal.id(), hook.js_name())));
            activity.opened.set(modal.page().current());
        });
    }

    AccessModal::new(&page, config)
        .map_err(|err| log::error!("Failed to create demo modal {}: {}", id, err))
        .ok()
}

#[component]
pub fn App() -> impl IntoView {
    let activity = DemoLog {
        events: RwSignal::new(Vec::new()),
        opened: RwSignal::new(0),
    };

    let first = StoredValue::new_local(demo_modal(
        "demo-first",
        "First dialog",
        "Press Escape or use the close button.",
        activity,
    ));
    let second = StoredValue::new_local(demo_modal(
        "demo-second",
        "Second dialog",
        "Escape closes this one first, then the dialog underneath.",
        activity,
    ));

    let open = move |modal: StoredValue<Option<AccessModal<WebDom>>, LocalStorage>| {
        modal.with_value(|modal| {
            if let Some(modal) = modal {
                modal.open();
            }
        });
    };

    view! {
        <main class="demo">
            <h1>"Accessible modal"</h1>
            <p>"Page content is hidden from assistive technology while a dialog is open."</p>
            <button type="button" on:click=move |_| open(first)>
                "Open dialog"
            </button>
            <button
                type="button"
                on:click=move |_| {
                    open(first);
                    open(second);
                }
            >
                "Open stacked dialogs"
            </button>
            <p>"Open dialogs: " {move || activity.opened.get()}</p>
            <ol class="demo-events">
                {move || {
                    activity
                        .events
                        .get()
                        .into_iter()
                        .map(|event| view! { <li>{event}</li> })
                        .collect_view()
                }}
            </ol>
        </main>
    }
}
