//! Runtime configuration read from the environment.
//!
//! `main` loads `.env` (or the bundled `assets/config.env`) into the process
//! environment first, so everything here is a plain variable lookup.

use crate::types::{Locale, ModelSelection};
use once_cell::sync::OnceCell;
use std::path::PathBuf;

static CONFIG: OnceCell<AppConfig> = OnceCell::new();

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8483/api";
pub const DEFAULT_PROVIDER: &str = "openai";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unsupported locale {0:?} (expected `en` or `zh`)")]
    InvalidLocale(String),

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub api_base: String,
    pub model: ModelSelection,
    pub locale: Locale,
    pub note_path: Option<PathBuf>,
    pub task_id: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Blank values count as
    /// unset for optional keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_base = get("NOTEBRIEF_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let provider_id = get("NOTEBRIEF_PROVIDER_ID").unwrap_or_else(|| DEFAULT_PROVIDER.to_string());
        let model_name = get("NOTEBRIEF_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let locale = match get("NOTEBRIEF_LOCALE") {
            Some(raw) => Locale::parse(&raw).ok_or(ConfigError::InvalidLocale(raw))?,
            None => Locale::default(),
        };

        if api_base.trim_end_matches('/').is_empty() {
            return Err(ConfigError::Empty("NOTEBRIEF_API_BASE"));
        }

        Ok(Self {
            api_base,
            model: ModelSelection {
                provider_id,
                model_name,
            },
            locale,
            note_path: get("NOTEBRIEF_NOTE").map(PathBuf::from).or_else(default_note_path),
            task_id: get("NOTEBRIEF_TASK_ID"),
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: ModelSelection {
                provider_id: DEFAULT_PROVIDER.to_string(),
                model_name: DEFAULT_MODEL.to_string(),
            },
            locale: Locale::default(),
            note_path: default_note_path(),
            task_id: None,
        }
    }
}

/// Makes `config` the process-wide configuration. Only the first call wins.
pub fn install(config: AppConfig) {
    if CONFIG.set(config).is_err() {
        tracing::warn!("configuration already installed, keeping the first one");
    }
}

/// The installed configuration, or one read from the environment.
pub fn global() -> &'static AppConfig {
    CONFIG.get_or_init(|| {
        AppConfig::from_env().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "falling back to default configuration");
            AppConfig::default()
        })
    })
}

/// `<documents>/notebrief/note.md`, when the platform has a documents dir.
fn default_note_path() -> Option<PathBuf> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        dirs::document_dir().map(|dir| dir.join("notebrief").join("note.md"))
    }
    #[cfg(target_arch = "wasm32")]
    {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.model.provider_id, DEFAULT_PROVIDER);
        assert_eq!(config.model.model_name, DEFAULT_MODEL);
        assert_eq!(config.locale, Locale::En);
        assert_eq!(config.task_id, None);
    }

    #[test]
    fn reads_explicit_values() {
        let config = AppConfig::from_lookup(lookup(&[
            ("NOTEBRIEF_API_BASE", "https://notes.example.com/api"),
            ("NOTEBRIEF_PROVIDER_ID", "deepseek"),
            ("NOTEBRIEF_MODEL", "deepseek-chat"),
            ("NOTEBRIEF_LOCALE", "zh"),
            ("NOTEBRIEF_NOTE", "/tmp/meeting.md"),
            ("NOTEBRIEF_TASK_ID", "task-7"),
        ]))
        .unwrap();
        assert_eq!(config.api_base, "https://notes.example.com/api");
        assert_eq!(config.model.provider_id, "deepseek");
        assert_eq!(config.locale, Locale::Zh);
        assert_eq!(config.note_path, Some(PathBuf::from("/tmp/meeting.md")));
        assert_eq!(config.task_id.as_deref(), Some("task-7"));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = AppConfig::from_lookup(lookup(&[("NOTEBRIEF_MODEL", "   ")])).unwrap();
        assert_eq!(config.model.model_name, DEFAULT_MODEL);
    }

    #[test]
    fn default_matches_empty_environment() {
        assert_eq!(AppConfig::from_lookup(lookup(&[])).unwrap(), AppConfig::default());
    }

    #[test]
    fn unknown_locale_is_an_error() {
        let err = AppConfig::from_lookup(lookup(&[("NOTEBRIEF_LOCALE", "klingon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLocale(raw) if raw == "klingon"));
    }
}
