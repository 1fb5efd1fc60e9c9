//! Application state management
//!
//! Global state accessible via Dioxus context providers.

use dioxus::prelude::*;

use crate::services::NotesService;
use crate::theme::ResolvedTheme;

/// Global application state
#[derive(Clone, Copy)]
pub struct AppState {
    /// Store and identity access
    pub notes_service: Signal<NotesService>,
    /// Resolved theme (light/dark based on config and system preference)
    pub theme: Signal<ResolvedTheme>,
    /// Title prefix typed into the search bar
    pub search_query: Signal<String>,
}
