//! Board filters built from the search bar

use notewall_core::models::TITLE_FIELD;
use notewall_core::query::{FieldFilter, NoteFilters};

/// Filters matching notes whose title starts with `query`.
///
/// A blank query means no extra filters. Each call with a non-blank query
/// returns a new filter set, so the board re-subscribes.
pub fn title_prefix_filters(query: &str) -> NoteFilters {
    let query = query.trim();
    if query.is_empty() {
        return NoteFilters::none();
    }

    match FieldFilter::prefix(TITLE_FIELD, query) {
        Ok(range) => NoteFilters::new(range.to_vec()),
        Err(error) => {
            tracing::warn!("Ignoring search filter: {}", error);
            NoteFilters::none()
        }
    }
}
