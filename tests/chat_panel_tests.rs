//! Integration tests for the chat panel lifecycle
//!
//! Drives bootstrap, send, retry and restart against an in-memory backend.

use async_trait::async_trait;
use notebrief::api::{
    ApiError, ApiResult, ChatApi, CreateSessionRequest, SendMessageReply, SendMessageRequest,
};
use notebrief::chat::{self, ChatContext, ChatPanelState, NoticeLevel, Phase};
use notebrief::types::{ChatMessage, ChatSession, ModelSelection, Role, SessionStatus};
use std::cell::{Cell, RefCell};

/// Scripted backend. `None` in a slot makes that call fail.
struct FakeBackend {
    status: Cell<Option<SessionStatus>>,
    history: Option<Vec<ChatMessage>>,
    reply: Option<String>,
    created: Cell<u32>,
    calls: RefCell<Vec<String>>,
}

impl FakeBackend {
    fn new(status: Option<SessionStatus>) -> Self {
        Self {
            status: Cell::new(status),
            history: Some(Vec::new()),
            reply: Some("X is...".to_string()),
            created: Cell::new(0),
            calls: RefCell::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn unavailable() -> ApiError {
        ApiError::Status {
            status: 503,
            body: "unavailable".to_string(),
        }
    }
}

#[async_trait(?Send)]
impl ChatApi for FakeBackend {
    async fn create_session(&self, request: &CreateSessionRequest) -> ApiResult<ChatSession> {
        self.calls
            .borrow_mut()
            .push(format!("create:{}", request.task_id));
        let status = self.status.get().ok_or_else(Self::unavailable)?;
        self.created.set(self.created.get() + 1);
        Ok(ChatSession {
            session_id: format!("s{}", self.created.get()),
            welcome_message: "Hi".to_string(),
            status,
        })
    }

    async fn send_message(&self, request: &SendMessageRequest) -> ApiResult<SendMessageReply> {
        self.calls
            .borrow_mut()
            .push(format!("send:{}", request.message));
        match &self.reply {
            Some(reply) => Ok(SendMessageReply {
                response: reply.clone(),
                session_id: request.session_id.clone(),
            }),
            None => Err(Self::unavailable()),
        }
    }

    async fn get_chat_history(
        &self,
        session_id: &str,
        _model: &ModelSelection,
    ) -> ApiResult<Vec<ChatMessage>> {
        self.calls.borrow_mut().push(format!("history:{session_id}"));
        self.history.clone().ok_or_else(Self::unavailable)
    }

    async fn delete_session(&self, session_id: &str, _model: &ModelSelection) -> ApiResult<()> {
        self.calls.borrow_mut().push(format!("delete:{session_id}"));
        Ok(())
    }

    async fn test_connection(&self) -> ApiResult<()> {
        Ok(())
    }
}

fn context() -> ChatContext {
    ChatContext {
        task_id: "task-42".to_string(),
        note_content: "# Meeting notes".to_string(),
        model: ModelSelection {
            provider_id: "openai".to_string(),
            model_name: "gpt-4o-mini".to_string(),
        },
    }
}

fn welcome_only(state: &ChatPanelState) -> bool {
    state.messages() == vec![ChatMessage::assistant("Hi")]
}

mod bootstrap_tests {
    use super::*;

    #[tokio::test]
    async fn new_session_shows_welcome() {
        let api = FakeBackend::new(Some(SessionStatus::New));
        let store = RefCell::new(ChatPanelState::default());
        chat::bootstrap(&store, &api, &context()).await;

        let state = store.borrow();
        assert_eq!(state.session_id(), Some("s1"));
        assert!(welcome_only(&state));
        assert!(!state.is_initializing());
        assert_eq!(api.calls(), ["create:task-42"]);
    }

    #[tokio::test]
    async fn existing_session_restores_history_in_order() {
        let mut api = FakeBackend::new(Some(SessionStatus::Existing));
        let history = vec![
            ChatMessage::user("first"),
            ChatMessage::assistant("answer"),
            ChatMessage::user("second"),
        ];
        api.history = Some(history.clone());
        let store = RefCell::new(ChatPanelState::default());
        chat::bootstrap(&store, &api, &context()).await;

        assert_eq!(store.borrow().messages(), history);
        assert_eq!(api.calls(), ["create:task-42", "history:s1"]);
    }

    #[tokio::test]
    async fn existing_session_with_empty_history_falls_back_to_welcome() {
        let api = FakeBackend::new(Some(SessionStatus::Existing));
        let store = RefCell::new(ChatPanelState::default());
        chat::bootstrap(&store, &api, &context()).await;
        assert!(welcome_only(&store.borrow()));
    }

    #[tokio::test]
    async fn unavailable_history_degrades_to_welcome() {
        let mut api = FakeBackend::new(Some(SessionStatus::Existing));
        api.history = None;
        let store = RefCell::new(ChatPanelState::default());
        chat::bootstrap(&store, &api, &context()).await;

        let state = store.borrow();
        assert_eq!(state.session_id(), Some("s1"));
        assert!(welcome_only(&state));
        assert!(state.notice().is_none());
    }

    #[tokio::test]
    async fn failed_bootstrap_can_be_retried() {
        let api = FakeBackend::new(None);
        let store = RefCell::new(ChatPanelState::default());
        chat::bootstrap(&store, &api, &context()).await;
        {
            let state = store.borrow();
            assert!(state.messages().is_empty());
            assert!(state.needs_retry());
            assert_eq!(state.phase(), Phase::Idle);
            assert_eq!(state.notice().map(|n| n.level), Some(NoticeLevel::Error));
        }
        assert!(!chat::submit(&store, &api, &context(), "hello?").await);

        api.status.set(Some(SessionStatus::New));
        chat::bootstrap(&store, &api, &context()).await;
        let state = store.borrow();
        assert_eq!(state.session_id(), Some("s1"));
        assert!(welcome_only(&state));
    }
}

mod send_tests {
    use super::*;

    async fn ready(api: &FakeBackend) -> RefCell<ChatPanelState> {
        let store = RefCell::new(ChatPanelState::default());
        chat::bootstrap(&store, api, &context()).await;
        store
    }

    #[tokio::test]
    async fn reply_is_appended_after_question() {
        let api = FakeBackend::new(Some(SessionStatus::New));
        let store = ready(&api).await;
        assert!(chat::submit(&store, &api, &context(), "What is X?").await);

        let messages = store.borrow().messages();
        let tail: Vec<(Role, &str)> = messages
            .iter()
            .skip(1)
            .map(|m| (m.role, m.content.as_str()))
            .collect();
        assert_eq!(
            tail,
            [(Role::User, "What is X?"), (Role::Assistant, "X is...")]
        );
        assert_eq!(store.borrow().phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn failed_send_leaves_no_trace() {
        let mut api = FakeBackend::new(Some(SessionStatus::New));
        api.reply = None;
        let store = ready(&api).await;
        let before = store.borrow().messages();

        assert!(chat::submit(&store, &api, &context(), "lost message").await);
        let state = store.borrow();
        assert_eq!(state.messages(), before);
        assert!(!state.is_sending());
        assert_eq!(state.notice().map(|n| n.level), Some(NoticeLevel::Error));
    }

    #[tokio::test]
    async fn submit_while_sending_is_ignored() {
        let api = FakeBackend::new(Some(SessionStatus::New));
        let store = ready(&api).await;
        let pending = store
            .borrow_mut()
            .begin_send("first", &context())
            .expect("guard should accept the first send");
        let len = store.borrow().messages().len();

        assert!(!chat::submit(&store, &api, &context(), "second").await);
        assert_eq!(store.borrow().messages().len(), len);
        assert!(!api.calls().iter().any(|c| c.starts_with("send:")));

        drop(pending);
    }

    #[tokio::test]
    async fn restart_replaces_session() {
        let api = FakeBackend::new(Some(SessionStatus::New));
        let store = ready(&api).await;
        assert!(chat::submit(&store, &api, &context(), "What is X?").await);

        chat::restart(&store, &api, &context()).await;
        let state = store.borrow();
        assert_eq!(state.session_id(), Some("s2"));
        assert!(welcome_only(&state));
        assert!(api.calls().contains(&"delete:s1".to_string()));
    }
}
