use crate::config::AppConfig;
use crate::types::Note;
use comrak::plugins::syntect::SyntectAdapter;
use comrak::{ComrakOptions, ComrakPlugins, markdown_to_html_with_plugins};
use once_cell::sync::Lazy;
use std::path::Path;

const TITLE_MAX_CHARS: usize = 80;

const SAMPLE_NOTE: &str = "# Welcome to notebrief

No note file was found, so this sample is shown instead.

Set `NOTEBRIEF_NOTE` to the path of a generated markdown note and restart.
Open the chat panel from the toolbar to ask questions about the note.

## Keyboard

- **Enter** sends a chat message
- **Shift+Enter** inserts a newline
";

static MARKDOWN_OPTIONS: Lazy<ComrakOptions> = Lazy::new(|| {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.footnotes = true;
    options.extension.strikethrough = true;
    options.extension.tasklist = true;
    options.extension.autolink = true;
    options.extension.front_matter_delimiter = Some("---".to_owned());
    options
});

pub fn markdown_to_html(md: &str) -> String {
    let adapter = SyntectAdapter::new(Some("base16-ocean.dark"));
    let mut plugins = ComrakPlugins::default();
    plugins.render.codefence_syntax_highlighter = Some(&adapter);
    markdown_to_html_with_plugins(md, &MARKDOWN_OPTIONS, &plugins)
}

/// First non-empty line with heading markers stripped.
pub fn extract_title(content: &str, fallback: &str) -> String {
    content
        .lines()
        .map(|line| line.trim().trim_start_matches('#').trim())
        .find(|line| !line.is_empty())
        .unwrap_or(fallback)
        .chars()
        .take(TITLE_MAX_CHARS)
        .collect()
}

/// Reads the configured note, falling back to the built-in sample.
pub fn load_note(config: &AppConfig) -> Note {
    if let Some(note) = read_configured_note(config) {
        return note;
    }
    Note {
        task_id: config
            .task_id
            .clone()
            .unwrap_or_else(|| "sample".to_string()),
        title: extract_title(SAMPLE_NOTE, "Untitled"),
        markdown: SAMPLE_NOTE.to_string(),
        created_at: None,
        source_url: None,
        file_path: None,
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn read_configured_note(config: &AppConfig) -> Option<Note> {
    let path = config.note_path.as_deref()?;
    match std::fs::read_to_string(path) {
        Ok(markdown) => Some(note_from_file(path, markdown, config)),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "note unreadable, showing sample");
            None
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn read_configured_note(_config: &AppConfig) -> Option<Note> {
    None
}

#[cfg(not(target_arch = "wasm32"))]
fn note_from_file(path: &Path, markdown: String, config: &AppConfig) -> Note {
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("note");
    let created_at = std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|modified| modified.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|dur| dur.as_secs().to_string());
    Note {
        task_id: config.task_id.clone().unwrap_or_else(|| stem.to_string()),
        title: extract_title(strip_front_matter(&markdown), stem),
        created_at,
        source_url: front_matter_source(&markdown),
        file_path: Some(path.display().to_string()),
        markdown,
    }
}

/// Body of `markdown` after a leading `---` front matter block, if any.
pub fn strip_front_matter(markdown: &str) -> &str {
    let Some(rest) = markdown.strip_prefix("---\n") else {
        return markdown;
    };
    match rest.find("\n---") {
        Some(end) => {
            let after = &rest[end + "\n---".len()..];
            after.strip_prefix('\n').unwrap_or(after)
        }
        None => markdown,
    }
}

/// `source:` or `url:` from a leading `---` front matter block.
pub fn front_matter_source(markdown: &str) -> Option<String> {
    let mut lines = markdown.lines();
    if lines.next()?.trim() != "---" {
        return None;
    }
    for line in lines {
        let line = line.trim();
        if line == "---" {
            break;
        }
        if let Some((key, value)) = line.split_once(':')
            && matches!(key.trim(), "source" | "url")
        {
            let value = value.trim().trim_matches('"');
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

pub fn display_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
        .to_string()
}
