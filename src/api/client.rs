use super::{
    ApiError, ApiResult, ChatApi, CreateSessionRequest, SendMessageReply, SendMessageRequest,
};
use crate::types::{ChatMessage, ChatSession, ModelSelection, Role};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Response wrapper used by every backend route.
#[derive(Deserialize)]
struct Envelope<T> {
    code: i64,
    #[serde(default)]
    msg: String,
    data: Option<T>,
}

#[derive(Deserialize)]
struct HistoryData {
    #[serde(default)]
    history: Vec<HistoryEntry>,
}

/// History row with the role kept as text. The backend also stores system
/// prompts (note transcript segments) in the same list.
#[derive(Deserialize)]
struct HistoryEntry {
    role: String,
    content: String,
    #[serde(default)]
    timestamp: Option<String>,
}

impl HistoryData {
    /// User and assistant turns in backend order; other roles are dropped.
    fn into_messages(self) -> Vec<ChatMessage> {
        let total = self.history.len();
        let messages: Vec<ChatMessage> = self
            .history
            .into_iter()
            .filter_map(|entry| {
                Some(ChatMessage {
                    role: Role::parse(&entry.role)?,
                    content: entry.content,
                    timestamp: entry.timestamp,
                })
            })
            .collect();
        if messages.len() < total {
            tracing::debug!(skipped = total - messages.len(), "ignored non-chat history entries");
        }
        messages
    }
}

/// Decodes an envelope body, turning non-zero codes into [`ApiError::Backend`].
fn decode_envelope<T: DeserializeOwned>(body: &str) -> ApiResult<Option<T>> {
    let envelope: Envelope<T> = serde_json::from_str(body)?;
    if envelope.code != 0 {
        return Err(ApiError::Backend {
            code: envelope.code,
            msg: envelope.msg,
        });
    }
    Ok(envelope.data)
}

pub struct HttpChatApi {
    client: Client,
    base: Url,
}

impl HttpChatApi {
    /// `base` is the API root, e.g. `http://127.0.0.1:8483/api`.
    pub fn new(base: &str) -> ApiResult<Self> {
        let base = Url::parse(base).map_err(|err| ApiError::InvalidUrl(format!("{base}: {err}")))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base.to_string()));
        }
        Ok(Self {
            client: Client::new(),
            base,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read_body(response: Response) -> ApiResult<String> {
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(ApiError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = request.send().await?;
        let body = Self::read_body(response).await?;
        decode_envelope::<T>(&body)?.ok_or(ApiError::MissingData)
    }

    async fn fetch_unit(&self, request: RequestBuilder) -> ApiResult<()> {
        let response = request.send().await?;
        let body = Self::read_body(response).await?;
        decode_envelope::<serde_json::Value>(&body).map(|_| ())
    }

    fn create_session_request(&self, request: &CreateSessionRequest) -> ApiResult<RequestBuilder> {
        let url = self.endpoint(&["chat", "sessions"])?;
        Ok(self.client.post(url).json(request))
    }

    fn send_message_request(&self, request: &SendMessageRequest) -> ApiResult<RequestBuilder> {
        let url = self.endpoint(&["chat", "messages"])?;
        Ok(self.client.post(url).json(request))
    }

    fn history_request(
        &self,
        session_id: &str,
        model: &ModelSelection,
    ) -> ApiResult<RequestBuilder> {
        let url = self.endpoint(&["chat", "sessions", session_id, "history"])?;
        Ok(self.client.get(url).query(&model_query(model)))
    }

    fn delete_request(
        &self,
        session_id: &str,
        model: &ModelSelection,
    ) -> ApiResult<RequestBuilder> {
        let url = self.endpoint(&["chat", "sessions", session_id])?;
        Ok(self.client.delete(url).query(&model_query(model)))
    }

    fn test_request(&self) -> ApiResult<RequestBuilder> {
        Ok(self.client.get(self.endpoint(&["chat", "test"])?))
    }
}

fn model_query(model: &ModelSelection) -> [(&'static str, &str); 2] {
    [
        ("provider_id", model.provider_id.as_str()),
        ("model_name", model.model_name.as_str()),
    ]
}

#[async_trait(?Send)]
impl ChatApi for HttpChatApi {
    async fn create_session(&self, request: &CreateSessionRequest) -> ApiResult<ChatSession> {
        tracing::debug!(task_id = %request.task_id, "creating chat session");
        self.fetch(self.create_session_request(request)?).await
    }

    async fn send_message(&self, request: &SendMessageRequest) -> ApiResult<SendMessageReply> {
        tracing::debug!(session_id = %request.session_id, "sending chat message");
        self.fetch(self.send_message_request(request)?).await
    }

    async fn get_chat_history(
        &self,
        session_id: &str,
        model: &ModelSelection,
    ) -> ApiResult<Vec<ChatMessage>> {
        tracing::debug!(session_id, "fetching chat history");
        let data: HistoryData = self
            .fetch(self.history_request(session_id, model)?)
            .await?;
        Ok(data.into_messages())
    }

    async fn delete_session(&self, session_id: &str, model: &ModelSelection) -> ApiResult<()> {
        tracing::debug!(session_id, "deleting chat session");
        self.fetch_unit(self.delete_request(session_id, model)?)
            .await
    }

    async fn test_connection(&self) -> ApiResult<()> {
        self.fetch_unit(self.test_request()?).await
    }
}
