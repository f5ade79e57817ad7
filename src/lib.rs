//! # notebrief
//!
//! Markdown note viewer with an AI chat side-panel. The chat panel talks to
//! the notes backend through [`api::ChatApi`]; its lifecycle lives in
//! [`chat`] so it can be exercised without a renderer.

pub mod api;
pub mod chat;
pub mod config;
pub mod format;
pub mod note;
pub mod types;
pub mod ui;
pub mod views;
