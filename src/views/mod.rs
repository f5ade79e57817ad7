pub mod chat_panel;
pub mod note;
pub mod note_header;

pub use chat_panel::ChatPanel;
pub use note::{NoteView, SourcePanel};
pub use note_header::NoteHeader;
