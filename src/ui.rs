use crate::api::{ApiHandle, HttpChatApi};
use crate::chat::ChatContext;
use crate::config;
use crate::format::{class_if, class_names};
use crate::note::load_note;
use crate::types::ViewMode;
use crate::views::{ChatPanel, NoteHeader, NoteView, SourcePanel};
use dioxus::prelude::*;

const MAIN_CSS: Asset = asset!("/assets/notebrief.css");

#[component]
pub fn App() -> Element {
    let config = use_hook(|| config::global().clone());
    let note = use_hook(|| load_note(&config));
    let markdown = use_signal(|| note.markdown.clone());
    let mut view_mode = use_signal(ViewMode::default);
    let mut chat_open = use_signal(|| false);
    let mut sources_open = use_signal(|| false);
    let api = use_hook(|| {
        HttpChatApi::new(&config.api_base)
            .map(ApiHandle::new)
            .map_err(|err| err.to_string())
    });
    let backend_online = use_signal(|| api.is_err().then_some(false));

    use_backend_probe(api.clone().ok(), backend_online);

    let chat_context = ChatContext {
        task_id: note.task_id.clone(),
        note_content: markdown(),
        model: config.model.clone(),
    };

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }
        div { class: "app-shell",
            NoteHeader {
                title: note.title.clone(),
                created_at: note.created_at.clone(),
                markdown: markdown(),
                locale: config.locale,
                view_mode: view_mode(),
                chat_open: chat_open(),
                sources_open: sources_open(),
                backend_online: backend_online(),
                on_view_mode: move |mode| view_mode.set(mode),
                on_toggle_chat: move |()| chat_open.set(!chat_open()),
                on_toggle_sources: move |()| sources_open.set(!sources_open()),
            }
            div { class: class_names(["workspace", class_if(chat_open(), "with-chat")]),
                main { class: "note-pane",
                    NoteView { markdown, view_mode: view_mode() }
                }
                if sources_open() {
                    SourcePanel {
                        task_id: note.task_id.clone(),
                        source_url: note.source_url.clone(),
                        file_path: note.file_path.clone(),
                        created_at: note.created_at.clone(),
                        locale: config.locale,
                        on_close: move |()| sources_open.set(false),
                    }
                }
                if chat_open() {
                    {match api.clone() {
                        Ok(api) => rsx! {
                            ChatPanel {
                                api,
                                context: chat_context,
                                on_close: move |()| chat_open.set(false),
                            }
                        },
                        Err(err) => rsx! {
                            aside { class: "chat-panel",
                                p { class: "toast toast-error", "Chat unavailable: {err}" }
                            }
                        },
                    }}
                }
            }
        }
    }
}

/// Runs the backend connectivity probe once and records the answer.
fn use_backend_probe(api: Option<ApiHandle>, online: Signal<Option<bool>>) {
    use_hook(move || {
        let mut online = online;
        if let Some(api) = api {
            spawn(async move {
                online.set(Some(api.is_reachable().await));
            });
        }
    });
}
