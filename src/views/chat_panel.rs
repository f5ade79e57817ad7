use crate::api::ApiHandle;
use crate::chat::{self, ChatContext, ChatPanelState, NoticeLevel, PanelStore, Phase, Turn};
use crate::format::{class_if, class_names, format_message_time};
use crate::note::markdown_to_html;
use crate::types::Role;
use dioxus::events::Key;
use dioxus::prelude::*;

impl PanelStore for Signal<ChatPanelState> {
    fn update<R>(&self, f: impl FnOnce(&mut ChatPanelState) -> R) -> R {
        let mut signal = *self;
        signal.with_mut(f)
    }
}

/// Side panel for discussing the open note with the model.
///
/// Bootstraps a session when mounted; closing the panel unmounts it and
/// drops the local message list.
#[component]
pub fn ChatPanel(api: ApiHandle, context: ChatContext, on_close: EventHandler<()>) -> Element {
    let state = use_signal(ChatPanelState::default);
    let mut input = use_signal(String::new);

    use_hook({
        let api = api.clone();
        let context = context.clone();
        move || {
            spawn(async move {
                chat::bootstrap(&state, &*api, &context).await;
            });
        }
    });

    // The guard and optimistic append run synchronously in the handler, so a
    // second Enter before the first request starts is already rejected.
    let send = use_callback({
        let api = api.clone();
        let context = context.clone();
        move |text: String| {
            let Some(pending) = state.update(|s| s.begin_send(&text, &context)) else {
                return;
            };
            input.set(String::new());
            let api = api.clone();
            spawn(async move {
                chat::deliver(&state, &*api, pending).await;
            });
        }
    });

    let retry = use_callback({
        let api = api.clone();
        let context = context.clone();
        move |()| {
            let api = api.clone();
            let context = context.clone();
            spawn(async move {
                chat::bootstrap(&state, &*api, &context).await;
            });
        }
    });

    let restart = use_callback({
        let api = api.clone();
        let context = context.clone();
        move |()| {
            let api = api.clone();
            let context = context.clone();
            spawn(async move {
                chat::restart(&state, &*api, &context).await;
            });
        }
    });

    let snapshot = state();
    let phase = snapshot.phase();
    let can_send = snapshot.can_send(&input());

    rsx! {
        aside { class: "chat-panel",
            div { class: "chat-panel-header",
                h3 { class: "section-title", "Ask about this note" }
                div { class: "actions",
                    if snapshot.session_id().is_some() {
                        button {
                            class: "action-btn", r#type: "button", title: "Start a new conversation",
                            disabled: phase != Phase::Idle,
                            onclick: move |_| restart.call(()),
                            "New chat"
                        }
                    }
                    button {
                        class: "action-btn", r#type: "button", title: "Close chat",
                        onclick: move |_| on_close.call(()),
                        "Close"
                    }
                }
            }

            if let Some(notice) = snapshot.notice() {
                div {
                    class: class_names([
                        "toast",
                        class_if(notice.level == NoticeLevel::Error, "toast-error"),
                    ]),
                    span { "{notice.text}" }
                    button {
                        class: "toast-dismiss", r#type: "button",
                        onclick: move |_| state.update(ChatPanelState::dismiss_notice),
                        "×"
                    }
                }
            }

            div { class: "chat-list",
                if phase == Phase::Initializing {
                    div { class: "shimmer-line", span { class: "shimmer-text", "Connecting…" } }
                } else if snapshot.needs_retry() {
                    div { class: "chat-empty",
                        p { class: "text-muted", "The chat session could not be started." }
                        button {
                            class: "btn btn-primary", r#type: "button",
                            onclick: move |_| retry.call(()),
                            "Retry"
                        }
                    }
                }
                for (i, turn) in snapshot.turns().iter().enumerate() {
                    TurnRow { key: "{turn.id}", turn: turn.clone(), pinned: i == 0, busy: phase != Phase::Idle, state }
                }
                if phase == Phase::Sending {
                    div { class: "message-row assistant",
                        div { class: "shimmer-line", span { class: "shimmer-text", "Thinking…" } }
                    }
                }
            }

            form { class: "composer",
                onsubmit: move |ev| ev.prevent_default(),
                div { class: "hstack",
                    textarea {
                        rows: "2",
                        placeholder: "Ask a question about the note",
                        value: "{input}",
                        disabled: snapshot.session_id().is_none() || phase != Phase::Idle,
                        oninput: move |ev| input.set(ev.value()),
                        onkeydown: move |ev| {
                            if ev.key() == Key::Enter && !ev.modifiers().shift() {
                                ev.prevent_default();
                                send.call(input());
                            }
                        },
                    }
                    button {
                        class: "btn btn-primary", r#type: "button",
                        disabled: !can_send,
                        onclick: move |_| send.call(input()),
                        "Send"
                    }
                }
            }
        }
    }
}

#[component]
fn TurnRow(turn: Turn, pinned: bool, busy: bool, state: Signal<ChatPanelState>) -> Element {
    let role = turn.message.role.as_str();
    let id = turn.id;
    let timestamp = turn
        .message
        .timestamp
        .as_deref()
        .and_then(format_message_time);

    rsx! {
        div { class: "message-row {role}",
            div { class: "message-stack",
                div { class: "bubble {role}",
                    if turn.message.role == Role::Assistant {
                        div { class: "md", dangerous_inner_html: markdown_to_html(&turn.message.content) }
                    } else {
                        "{turn.message.content}"
                    }
                }
                div { class: "message-meta",
                    if let Some(ts) = timestamp {
                        span { class: "message-timestamp", "{ts}" }
                    }
                    if !pinned {
                        button {
                            class: "action-btn", r#type: "button", title: "Delete message",
                            disabled: busy,
                            onclick: move |_| {
                                state.update(|s| s.delete_turn(id));
                            },
                            "Delete"
                        }
                    }
                }
            }
        }
    }
}
