//! Application services
//!
//! Services for store access and other shared functionality.

mod notes;

pub use notes::NotesService;
