//! UI Components
//!
//! Reusable UI components for the desktop application.

mod edit_dialog;
mod note_board;
mod note_card;
mod search_bar;

pub use edit_dialog::EditDialog;
pub use note_board::NoteBoard;
pub use note_card::NoteCard;
pub use search_bar::SearchBar;
