//! Toolbar above the note: title, view-mode switch and panel toggles.

use crate::format::{class_if, class_names, format_date};
use crate::types::{Locale, ViewMode};
use dioxus::prelude::*;

/// Presentational header for the note view.
///
/// Holds no state of its own. Every toggle is reported to the parent through
/// the `on_*` handlers, which own the view mode and panel visibility.
#[component]
pub fn NoteHeader(
    title: String,
    created_at: Option<String>,
    markdown: String,
    locale: Locale,
    view_mode: ViewMode,
    chat_open: bool,
    sources_open: bool,
    backend_online: Option<bool>,
    on_view_mode: EventHandler<ViewMode>,
    on_toggle_chat: EventHandler<()>,
    on_toggle_sources: EventHandler<()>,
) -> Element {
    let created = created_at
        .as_deref()
        .map(|raw| format_date(raw, locale))
        .filter(|formatted| !formatted.is_empty());
    let status_class = match backend_online {
        Some(true) => "status-dot online",
        Some(false) => "status-dot offline",
        None => "status-dot",
    };
    let status_title = match backend_online {
        Some(true) => "Chat backend reachable",
        Some(false) => "Chat backend unreachable",
        None => "Checking chat backend…",
    };

    let on_copy = move |_| {
        #[cfg(not(target_arch = "wasm32"))]
        match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(markdown.clone())) {
            Ok(()) => tracing::debug!("note copied to clipboard"),
            Err(err) => tracing::warn!(error = %err, "clipboard unavailable"),
        }
        #[cfg(target_arch = "wasm32")]
        tracing::debug!("clipboard copy is not available in the browser build");
    };

    rsx! {
        div { class: "header no-divider",
            div { class: "header-content",
                div { class: "note-title",
                    h1 { "{title}" }
                    if let Some(created) = created {
                        span { class: "message-timestamp", "{created}" }
                    }
                }
                div { class: "tabs",
                    ModeButton { current: view_mode, mode: ViewMode::Preview, label: "Preview", on_select: on_view_mode }
                    ModeButton { current: view_mode, mode: ViewMode::Source, label: "Markdown", on_select: on_view_mode }
                }
                div { class: "actions",
                    span { class: status_class, title: status_title }
                    button { class: "action-btn", r#type: "button", title: "Copy markdown", onclick: on_copy, "Copy" }
                    button {
                        class: class_names(["action-btn", class_if(sources_open, "active")]),
                        r#type: "button",
                        onclick: move |_| on_toggle_sources.call(()),
                        "Sources"
                    }
                    button {
                        class: class_names(["action-btn", class_if(chat_open, "active")]),
                        r#type: "button",
                        onclick: move |_| on_toggle_chat.call(()),
                        "AI Chat"
                    }
                }
            }
        }
    }
}

#[component]
fn ModeButton(
    current: ViewMode,
    mode: ViewMode,
    label: &'static str,
    on_select: EventHandler<ViewMode>,
) -> Element {
    rsx! {
        button {
            class: class_names(["tab", class_if(current == mode, "active")]),
            r#type: "button",
            onclick: move |_| on_select.call(mode),
            "{label}"
        }
    }
}
