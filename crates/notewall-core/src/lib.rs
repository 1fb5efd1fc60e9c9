//! notewall-core - Core library for Notewall
//!
//! This crate contains the note model, the live document store, the
//! subscription manager that feeds a board, and the board's layout and
//! edit/delete logic. The desktop shell renders on top of it.

pub mod auth;
pub mod board;
pub mod config;
pub mod error;
pub mod feed;
pub mod models;
pub mod query;
pub mod store;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use feed::{BoardView, FeedHandle, FeedState, NoteFeed};
pub use models::{Note, NoteId, NotePatch};
