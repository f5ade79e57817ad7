use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Maps a wire role name. System and tool entries have no place in the
    /// panel and yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One entry of a conversation as the backend stores it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: None,
        }
    }
}

/// Whether the backend started a fresh conversation or resumed one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    #[serde(rename = "new", alias = "created")]
    New,
    #[serde(rename = "existing")]
    Existing,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub session_id: String,
    pub welcome_message: String,
    pub status: SessionStatus,
}

/// Provider and model the backend should route a conversation to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelSelection {
    pub provider_id: String,
    pub model_name: String,
}

/// A generated note as displayed by the viewer.
#[derive(Clone, Debug, PartialEq)]
pub struct Note {
    pub task_id: String,
    pub title: String,
    pub markdown: String,
    pub created_at: Option<String>,
    pub source_url: Option<String>,
    pub file_path: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Preview,
    Source,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    En,
    Zh,
}

impl Locale {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en_us" | "english" => Some(Locale::En),
            "zh" | "zh-cn" | "zh_cn" | "chinese" => Some(Locale::Zh),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_status_accepts_created_alias() {
        let session: ChatSession = serde_json::from_str(
            r#"{"session_id":"chat_t1_abc","welcome_message":"Hi","status":"created"}"#,
        )
        .unwrap();
        assert_eq!(session.status, SessionStatus::New);

        let resumed: ChatSession = serde_json::from_str(
            r#"{"session_id":"s1","welcome_message":"Hi","status":"existing"}"#,
        )
        .unwrap();
        assert_eq!(resumed.status, SessionStatus::Existing);
    }

    #[test]
    fn message_without_timestamp_omits_field() {
        let json = serde_json::to_string(&ChatMessage::user("hello")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hello"}"#);
    }

    #[test]
    fn only_panel_roles_parse() {
        assert_eq!(Role::parse("user"), Some(Role::User));
        assert_eq!(Role::parse("assistant"), Some(Role::Assistant));
        assert_eq!(Role::parse("system"), None);
    }

    #[test]
    fn locale_parse_is_lenient() {
        assert_eq!(Locale::parse(" ZH-CN "), Some(Locale::Zh));
        assert_eq!(Locale::parse("en"), Some(Locale::En));
        assert_eq!(Locale::parse("fr"), None);
    }
}
