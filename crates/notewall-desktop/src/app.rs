//! Main application component

use dioxus::prelude::*;

use notewall_core::config::AppConfig;

use crate::services::NotesService;
use crate::state::AppState;
use crate::theme::{resolve_theme, ResolvedTheme};
use crate::views::Home;

/// Root application component
#[component]
pub fn App() -> Element {
    let config = use_hook(AppConfig::from_env);
    let theme = resolve_theme(config.theme);
    let service = use_hook(|| {
        NotesService::open(&config).map_err(|error| {
            tracing::error!("Failed to open note store: {}", error);
            error.to_string()
        })
    });

    match service {
        Ok(service) => rsx! {
            Shell { service, theme }
        },
        Err(message) => rsx! {
            StartupError { message, theme }
        },
    }
}

/// Application shell once the store is open
#[component]
fn Shell(service: NotesService, theme: ResolvedTheme) -> Element {
    let notes_service = use_signal(|| service);
    let theme = use_signal(|| theme);
    let search_query = use_signal(String::new);

    use_context_provider(|| AppState {
        notes_service,
        theme,
        search_query,
    });

    let colors = theme().palette();
    let theme_attr = if theme().is_dark() { "dark" } else { "light" };

    rsx! {
        div {
            class: "app-container",
            "data-theme": "{theme_attr}",
            style: "
                min-height: 100vh;
                font-family: system-ui, -apple-system, sans-serif;
                font-size: 14px;
                background: {colors.bg_primary};
                color: {colors.text_primary};
            ",
            Home {}
        }
    }
}

/// Shown when the note store cannot be opened
#[component]
fn StartupError(message: String, theme: ResolvedTheme) -> Element {
    let colors = theme.palette();

    rsx! {
        div {
            style: "
                min-height: 100vh;
                display: flex;
                align-items: center;
                justify-content: center;
                flex-direction: column;
                gap: 8px;
                background: {colors.bg_primary};
                font-family: system-ui, -apple-system, sans-serif;
            ",
            p {
                style: "margin: 0; font-size: 16px; font-weight: 600; color: {colors.text_primary};",
                "Note store initialization failed"
            }
            p {
                style: "margin: 0; font-size: 12px; color: {colors.error};",
                "{message}"
            }
        }
    }
}
