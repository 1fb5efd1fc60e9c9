//! Board layout and note actions
//!
//! Card heights come from the note text. The column count comes from the
//! viewport width. Edit and delete go straight to the store: the board never
//! changes its own list, it waits for the next pushed snapshot.

#![allow(clippy::cast_precision_loss)] // line/char counts are far below f64 precision limits

use std::fmt::Write as _;

use crate::error::Result;
use crate::models::{Note, NoteId, NotePatch};
use crate::store::DocumentStore;

/// Smallest card height in pixels (also used for empty notes)
pub const MIN_CARD_HEIGHT: f64 = 150.0;
/// Largest card height in pixels
pub const MAX_CARD_HEIGHT: f64 = 400.0;
const BASE_CARD_HEIGHT: f64 = 130.0;
const LINE_HEIGHT: f64 = 20.0;
const CHARS_PER_PIXEL: f64 = 30.0;

/// CSS class of the board container
pub const BOARD_CLASS: &str = "note-board";
/// CSS class of a single card
pub const CARD_CLASS: &str = "note-card";
/// Gap between columns and between stacked cards, in pixels
pub const CARD_GAP_PX: u32 = 20;

/// `(min viewport width, columns)`, ascending
const COLUMN_BREAKPOINTS: [(f64, usize); 3] = [(640.0, 2), (1024.0, 4), (1280.0, 4)];

/// Fixed pixel height for a card showing `content`.
///
/// `130 + 20 * lines + chars / 30`, clamped to `[150, 400]`. Lines are
/// newline-separated segments; chars are Unicode scalar values.
#[must_use]
pub fn card_height(content: Option<&str>) -> f64 {
    let Some(content) = content.filter(|content| !content.is_empty()) else {
        return MIN_CARD_HEIGHT;
    };

    let line_count = content.split('\n').count() as f64;
    let char_count = content.chars().count() as f64;
    let height = BASE_CARD_HEIGHT + LINE_HEIGHT * line_count + char_count / CHARS_PER_PIXEL;
    height.clamp(MIN_CARD_HEIGHT, MAX_CARD_HEIGHT)
}

/// Number of board columns for a viewport `width_px` wide (1 to 4)
#[must_use]
pub fn column_count(width_px: f64) -> usize {
    COLUMN_BREAKPOINTS
        .iter()
        .rev()
        .find(|(min_width, _)| width_px >= *min_width)
        .map_or(1, |(_, columns)| *columns)
}

/// Stylesheet for the masonry board, one media query per breakpoint
#[must_use]
pub fn masonry_css() -> String {
    let mut css = format!(
        ".{BOARD_CLASS} {{ column-count: 1; column-gap: {CARD_GAP_PX}px; }}\n\
         .{BOARD_CLASS} > .{CARD_CLASS} {{ break-inside: avoid; margin-bottom: {CARD_GAP_PX}px; }}\n"
    );
    for (min_width, columns) in COLUMN_BREAKPOINTS {
        let _ = writeln!(
            css,
            "@media (min-width: {min_width}px) {{ .{BOARD_CLASS} {{ column-count: {columns}; }} }}"
        );
    }
    css
}

/// Draft title/content for the note being edited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    pub target_id: NoteId,
    pub title: String,
    pub content: String,
}

impl EditBuffer {
    /// Load a note into a fresh buffer
    #[must_use]
    pub fn from_note(note: &Note) -> Self {
        Self {
            target_id: note.id.clone(),
            title: note.note_title.clone().unwrap_or_default(),
            content: note.note_content.clone().unwrap_or_default(),
        }
    }

    /// The partial update this buffer saves
    #[must_use]
    pub fn patch(&self) -> NotePatch {
        NotePatch {
            note_title: self.title.clone(),
            note_content: self.content.clone(),
        }
    }
}

/// What an open edit dialog does once a save for some note finishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The save went through; close the dialog
    Close,
    /// The save failed; keep the draft and show the message
    ShowError(String),
    /// The dialog was closed or moved to another note meanwhile
    Stale,
}

/// Resolve a finished save of `target` against whatever draft is open now
#[must_use]
pub fn save_outcome(
    open: Option<&EditBuffer>,
    target: &NoteId,
    result: std::result::Result<(), String>,
) -> SaveOutcome {
    if !open.is_some_and(|open| open.target_id == *target) {
        tracing::debug!("Ignoring finished save of {}; its draft is no longer open", target);
        return SaveOutcome::Stale;
    }
    match result {
        Ok(()) => SaveOutcome::Close,
        Err(message) => SaveOutcome::ShowError(message),
    }
}

/// Write the buffer's title and content to its target note.
///
/// Failures are logged and returned; the caller decides what stays open.
pub fn save_edit(store: &dyn DocumentStore, buffer: &EditBuffer) -> Result<()> {
    match store.update(&buffer.target_id, &buffer.patch()) {
        Ok(()) => {
            tracing::debug!("Saved note {}", buffer.target_id);
            Ok(())
        }
        Err(error) => {
            tracing::error!("Error updating note {}: {}", buffer.target_id, error);
            Err(error)
        }
    }
}

/// Remove a note. No confirmation and no local removal: the list changes when
/// the store pushes the next snapshot.
pub fn delete_note(store: &dyn DocumentStore, id: &NoteId) -> Result<()> {
    tracing::debug!("Deleting note {}", id);
    store.delete(id).inspect_err(|error| {
        tracing::error!("Error deleting note {}: {}", id, error);
    })
}
