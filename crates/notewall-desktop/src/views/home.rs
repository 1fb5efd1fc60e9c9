//! Home view - main application screen

use dioxus::prelude::*;

use crate::components::{NoteBoard, SearchBar};
use crate::filters::title_prefix_filters;
use crate::state::AppState;

/// Home view component - the main application screen
#[component]
pub fn Home() -> Element {
    let state = use_context::<AppState>();
    let colors = (state.theme)().palette();
    let filters = use_memo(move || title_prefix_filters(&(state.search_query)()));
    let account = (state.notes_service)()
        .signed_in_email()
        .unwrap_or_else(|| "Signed out".to_string());

    rsx! {
        div {
            class: "home-container",
            style: "display: flex; flex-direction: column; min-height: 100vh;",

            header {
                style: "
                    display: flex;
                    align-items: center;
                    justify-content: space-between;
                    padding: 16px 32px;
                    background: {colors.bg_secondary};
                ",
                h1 {
                    style: "margin: 0; font-size: 20px; font-weight: 700; color: {colors.text_primary};",
                    "My Notes"
                }
                span {
                    style: "font-size: 12px; color: {colors.text_muted};",
                    "{account}"
                }
            }

            SearchBar {}

            NoteBoard { filters: filters() }
        }
    }
}
