//! Chat panel state: session bootstrap, optimistic sends and local deletion.
//!
//! The state is plain data so it can live in a Dioxus signal or a
//! `RefCell` in tests. Async drivers (`bootstrap`, `submit`, `restart`) only
//! touch it through [`PanelStore::update`], between awaits, so no borrow is
//! held across a remote call.

use crate::api::{ApiResult, ChatApi, CreateSessionRequest, SendMessageReply, SendMessageRequest};
use crate::types::{ChatMessage, ChatSession, ModelSelection, Role, SessionStatus};
use std::cell::RefCell;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub type TurnId = u64;

/// A message in the panel with a stable identity.
#[derive(Clone, Debug, PartialEq)]
pub struct Turn {
    pub id: TurnId,
    pub message: ChatMessage,
    /// The user turn this assistant turn answers.
    pub reply_to: Option<TurnId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Idle,
    Sending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Number of turns removed.
    Removed(usize),
    /// The first turn is pinned.
    Rejected,
    /// Deletion is disabled while a reply is outstanding.
    Busy,
    NotFound,
}

/// What the panel needs to know about the note it is attached to.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatContext {
    pub task_id: String,
    pub note_content: String,
    pub model: ModelSelection,
}

/// Result of a successful bootstrap: the session plus whatever history the
/// backend still holds for it.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionStart {
    pub session: ChatSession,
    pub history: Vec<ChatMessage>,
}

/// A send that has been applied locally and awaits the backend.
#[derive(Clone, Debug)]
pub struct PendingSend {
    pub request: SendMessageRequest,
    user_turn: TurnId,
    snapshot: Vec<Turn>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChatPanelState {
    session_id: Option<String>,
    turns: Vec<Turn>,
    next_id: TurnId,
    initializing: bool,
    sending: bool,
    bootstrap_failed: bool,
    notice: Option<Notice>,
}

fn now_timestamp() -> Option<String> {
    OffsetDateTime::now_utc().format(&Rfc3339).ok()
}

impl ChatPanelState {
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.turns.iter().map(|turn| turn.message.clone()).collect()
    }

    pub fn is_initializing(&self) -> bool {
        self.initializing
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn phase(&self) -> Phase {
        if self.initializing {
            Phase::Initializing
        } else if self.sending {
            Phase::Sending
        } else {
            Phase::Idle
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Bootstrap finished without producing a session.
    pub fn needs_retry(&self) -> bool {
        self.bootstrap_failed && !self.initializing
    }

    pub fn can_send(&self, input: &str) -> bool {
        !input.trim().is_empty() && self.session_id.is_some() && !self.sending && !self.initializing
    }

    fn push(&mut self, message: ChatMessage, reply_to: Option<TurnId>) -> TurnId {
        let id = self.next_id;
        self.next_id += 1;
        self.turns.push(Turn {
            id,
            message,
            reply_to,
        });
        id
    }

    /// Enters `Initializing`, dropping any previous session. Returns `false`
    /// if a bootstrap or send is already running.
    pub fn begin_bootstrap(&mut self) -> bool {
        if self.initializing || self.sending {
            return false;
        }
        self.initializing = true;
        self.bootstrap_failed = false;
        self.session_id = None;
        self.turns.clear();
        true
    }

    /// Leaves `Initializing` on every path.
    pub fn finish_bootstrap(&mut self, result: ApiResult<SessionStart>) {
        self.initializing = false;
        match result {
            Ok(SessionStart { session, history }) => {
                tracing::info!(
                    session_id = %session.session_id,
                    status = ?session.status,
                    history = history.len(),
                    "chat session ready"
                );
                self.session_id = Some(session.session_id);
                if history.is_empty() {
                    self.push(ChatMessage::assistant(session.welcome_message), None);
                } else {
                    self.load_history(history);
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to start chat session");
                self.bootstrap_failed = true;
                self.notice = Some(Notice::error(format!(
                    "Could not start the chat session: {err}"
                )));
            }
        }
    }

    /// Appends history, linking each assistant turn to the user turn
    /// directly before it.
    fn load_history(&mut self, history: Vec<ChatMessage>) {
        let mut last_user: Option<TurnId> = None;
        for message in history {
            match message.role {
                Role::User => {
                    last_user = Some(self.push(message, None));
                }
                Role::Assistant => {
                    self.push(message, last_user.take());
                }
            }
        }
    }

    /// Applies a submission optimistically. `None` when the guard rejects it.
    pub fn begin_send(&mut self, input: &str, context: &ChatContext) -> Option<PendingSend> {
        if !self.can_send(input) {
            return None;
        }
        let session_id = self.session_id.clone()?;
        let text = input.trim().to_string();
        let snapshot = self.turns.clone();
        let user_turn = self.push(
            ChatMessage {
                role: Role::User,
                content: text.clone(),
                timestamp: now_timestamp(),
            },
            None,
        );
        self.sending = true;
        Some(PendingSend {
            request: SendMessageRequest {
                session_id,
                message: text,
                note_content: context.note_content.clone(),
                provider_id: context.model.provider_id.clone(),
                model_name: context.model.model_name.clone(),
                task_id: Some(context.task_id.clone()),
            },
            user_turn,
            snapshot,
        })
    }

    /// Commits the reply or restores the list to its pre-send snapshot.
    pub fn finish_send(&mut self, pending: PendingSend, result: ApiResult<SendMessageReply>) {
        self.sending = false;
        match result {
            Ok(reply) => {
                self.push(
                    ChatMessage {
                        role: Role::Assistant,
                        content: reply.response,
                        timestamp: now_timestamp(),
                    },
                    Some(pending.user_turn),
                );
            }
            Err(err) => {
                tracing::warn!(error = %err, "chat message failed");
                self.turns = pending.snapshot;
                self.notice = Some(Notice::error(format!("Message not sent: {err}")));
            }
        }
    }

    /// Removes a turn locally. A user turn takes its replies with it.
    pub fn delete_turn(&mut self, id: TurnId) -> DeleteOutcome {
        let Some(position) = self.turns.iter().position(|turn| turn.id == id) else {
            return DeleteOutcome::NotFound;
        };
        if position == 0 {
            self.notice = Some(Notice::info("The opening message can't be deleted."));
            return DeleteOutcome::Rejected;
        }
        if self.sending {
            self.notice = Some(Notice::info("Wait for the reply before deleting messages."));
            return DeleteOutcome::Busy;
        }
        let before = self.turns.len();
        match self.turns[position].message.role {
            Role::User => self
                .turns
                .retain(|turn| turn.id != id && turn.reply_to != Some(id)),
            Role::Assistant => {
                self.turns.remove(position);
            }
        }
        DeleteOutcome::Removed(before - self.turns.len())
    }
}

/// Interior-mutable home of a [`ChatPanelState`].
pub trait PanelStore {
    fn update<R>(&self, f: impl FnOnce(&mut ChatPanelState) -> R) -> R;
}

impl PanelStore for RefCell<ChatPanelState> {
    fn update<R>(&self, f: impl FnOnce(&mut ChatPanelState) -> R) -> R {
        f(&mut self.borrow_mut())
    }
}

/// Creates or resumes the backend session for `context`.
pub async fn start_session(api: &dyn ChatApi, context: &ChatContext) -> ApiResult<SessionStart> {
    let request = CreateSessionRequest::new(&context.task_id, &context.note_content, &context.model);
    let session = api.create_session(&request).await?;
    let history = match session.status {
        SessionStatus::Existing => {
            api.history_or_empty(&session.session_id, &context.model)
                .await
        }
        SessionStatus::New => Vec::new(),
    };
    Ok(SessionStart { session, history })
}

/// Runs the mount-time bootstrap. Also used for the retry action.
pub async fn bootstrap(store: &impl PanelStore, api: &dyn ChatApi, context: &ChatContext) {
    if !store.update(ChatPanelState::begin_bootstrap) {
        return;
    }
    let result = start_session(api, context).await;
    store.update(|state| state.finish_bootstrap(result));
}

/// Sends `input` through the guarded transition. Returns whether a request
/// was issued.
pub async fn submit(
    store: &impl PanelStore,
    api: &dyn ChatApi,
    context: &ChatContext,
    input: &str,
) -> bool {
    let Some(pending) = store.update(|state| state.begin_send(input, context)) else {
        return false;
    };
    deliver(store, api, pending).await;
    true
}

/// Awaits the backend for a send already applied with
/// [`ChatPanelState::begin_send`], then commits or rolls back.
pub async fn deliver(store: &impl PanelStore, api: &dyn ChatApi, pending: PendingSend) {
    let result = api.send_message(&pending.request).await;
    store.update(|state| state.finish_send(pending, result));
}

/// Drops the current backend session (best-effort) and bootstraps a new one.
pub async fn restart(store: &impl PanelStore, api: &dyn ChatApi, context: &ChatContext) {
    let previous = store.update(|state| {
        if state.initializing || state.sending {
            None
        } else {
            Some(state.session_id.clone())
        }
    });
    let Some(previous) = previous else {
        return;
    };
    if let Some(session_id) = previous {
        api.delete_session_quietly(&session_id, &context.model)
            .await;
    }
    bootstrap(store, api, context).await;
}
