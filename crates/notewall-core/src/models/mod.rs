//! Data models for Notewall

pub(crate) mod note;

pub use note::{Note, NoteId, NotePatch, CONTENT_FIELD, OWNER_FIELD, TITLE_FIELD};
