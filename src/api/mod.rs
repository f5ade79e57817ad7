/// Chat API module for notebrief
///
/// Typed access to the notes backend's chat endpoints. Every operation is a
/// single remote call with no retries or caching.
///
/// # Architecture
///
/// - `ChatApi` - trait seam the chat panel is written against
/// - `client` - `HttpChatApi`, the reqwest implementation
///
/// Raw operations return [`ApiResult`]. Session creation and sending gate
/// the panel's state, so callers handle their errors. History, delete and
/// the connectivity probe are best-effort; the `*_or_empty`, `*_quietly`
/// and `is_reachable` helpers log the error and degrade instead.
mod client;

pub use client::HttpChatApi;

use crate::types::{ChatMessage, ChatSession, ModelSelection};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("backend error {code}: {msg}")]
    Backend { code: i64, msg: String },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response carried no data")]
    MissingData,

    #[error("invalid API base URL: {0}")]
    InvalidUrl(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CreateSessionRequest {
    pub task_id: String,
    pub note_content: String,
    pub provider_id: String,
    pub model_name: String,
}

impl CreateSessionRequest {
    pub fn new(task_id: &str, note_content: &str, model: &ModelSelection) -> Self {
        Self {
            task_id: task_id.to_string(),
            note_content: note_content.to_string(),
            provider_id: model.provider_id.clone(),
            model_name: model.model_name.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SendMessageRequest {
    pub session_id: String,
    pub message: String,
    pub note_content: String,
    pub provider_id: String,
    pub model_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SendMessageReply {
    pub response: String,
    pub session_id: String,
}

#[async_trait(?Send)]
pub trait ChatApi {
    async fn create_session(&self, request: &CreateSessionRequest) -> ApiResult<ChatSession>;

    async fn send_message(&self, request: &SendMessageRequest) -> ApiResult<SendMessageReply>;

    async fn get_chat_history(
        &self,
        session_id: &str,
        model: &ModelSelection,
    ) -> ApiResult<Vec<ChatMessage>>;

    async fn delete_session(&self, session_id: &str, model: &ModelSelection) -> ApiResult<()>;

    async fn test_connection(&self) -> ApiResult<()>;

    /// History for `session_id`, or an empty list if the fetch fails.
    async fn history_or_empty(&self, session_id: &str, model: &ModelSelection) -> Vec<ChatMessage> {
        match self.get_chat_history(session_id, model).await {
            Ok(history) => history,
            Err(err) => {
                tracing::warn!(session_id, error = %err, "chat history unavailable");
                Vec::new()
            }
        }
    }

    /// Deletes the backend session, reporting only whether it worked.
    async fn delete_session_quietly(&self, session_id: &str, model: &ModelSelection) -> bool {
        match self.delete_session(session_id, model).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(session_id, error = %err, "failed to delete chat session");
                false
            }
        }
    }

    async fn is_reachable(&self) -> bool {
        match self.test_connection().await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "chat backend unreachable");
                false
            }
        }
    }
}

/// Cheap-to-clone handle to the chat backend, passed down as a prop.
#[derive(Clone)]
pub struct ApiHandle(pub Rc<dyn ChatApi>);

impl ApiHandle {
    pub fn new(api: impl ChatApi + 'static) -> Self {
        Self(Rc::new(api))
    }
}

impl PartialEq for ApiHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl std::ops::Deref for ApiHandle {
    type Target = dyn ChatApi;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
