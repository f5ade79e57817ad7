use crate::format::format_date;
use crate::note::{display_file_name, markdown_to_html};
use crate::types::{Locale, ViewMode};
use dioxus::prelude::*;

#[component]
pub fn NoteView(markdown: Signal<String>, view_mode: ViewMode) -> Element {
    match view_mode {
        ViewMode::Preview => {
            let html = markdown.with(|md| markdown_to_html(md));
            rsx! {
                div { class: "doc-viewer md", dangerous_inner_html: "{html}" }
            }
        }
        ViewMode::Source => {
            let mut markdown = markdown;
            rsx! {
                textarea {
                    class: "note-source",
                    spellcheck: "false",
                    value: "{markdown}",
                    oninput: move |ev| markdown.set(ev.value()),
                }
            }
        }
    }
}

/// Where the note came from: generating task, original media and file.
#[component]
pub fn SourcePanel(
    task_id: String,
    source_url: Option<String>,
    file_path: Option<String>,
    created_at: Option<String>,
    locale: Locale,
    on_close: EventHandler<()>,
) -> Element {
    let created = created_at
        .as_deref()
        .map(|raw| format_date(raw, locale))
        .unwrap_or_default();

    rsx! {
        aside { class: "source-panel",
            div { class: "chat-panel-header",
                h3 { class: "section-title", "Sources" }
                button {
                    class: "action-btn", r#type: "button",
                    onclick: move |_| on_close.call(()),
                    "Close"
                }
            }
            dl { class: "source-list",
                dt { "Task" }
                dd { "{task_id}" }
                if let Some(url) = source_url {
                    dt { "Original" }
                    dd { a { href: "{url}", target: "_blank", rel: "noopener", "{url}" } }
                }
                if let Some(path) = file_path {
                    dt { "File" }
                    dd { title: "{path}", "{display_file_name(&path)}" }
                }
                if !created.is_empty() {
                    dt { "Generated" }
                    dd { "{created}" }
                }
            }
        }
    }
}
