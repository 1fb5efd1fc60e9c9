//! Theme configuration for the desktop app

use std::sync::OnceLock;

use notewall_core::config::ThemeMode;

/// Cached system dark mode preference (detected once at startup)
static SYSTEM_DARK_MODE: OnceLock<bool> = OnceLock::new();

/// Resolved theme (light or dark)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolvedTheme {
    Light,
    #[default]
    Dark,
}

impl ResolvedTheme {
    #[must_use]
    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    /// Get the color palette for this theme
    #[must_use]
    pub const fn palette(self) -> &'static ColorPalette {
        match self {
            Self::Light => &LIGHT_PALETTE,
            Self::Dark => &DARK_PALETTE,
        }
    }
}

/// Resolve theme mode to actual light/dark theme
#[must_use]
pub fn resolve_theme(mode: ThemeMode) -> ResolvedTheme {
    match mode {
        ThemeMode::Light => ResolvedTheme::Light,
        ThemeMode::Dark => ResolvedTheme::Dark,
        ThemeMode::System => {
            if *SYSTEM_DARK_MODE.get_or_init(detect_system_dark_mode) {
                ResolvedTheme::Dark
            } else {
                ResolvedTheme::Light
            }
        }
    }
}

/// Only GTK exposes a cheap hint; elsewhere the board keeps its dark default
fn detect_system_dark_mode() -> bool {
    match std::env::var("GTK_THEME") {
        Ok(theme) => {
            let is_dark = theme.to_lowercase().contains("dark");
            tracing::debug!(
                "System theme detected from GTK_THEME: {}",
                if is_dark { "dark" } else { "light" }
            );
            is_dark
        }
        Err(_) => true,
    }
}

/// Color palette for the application
#[derive(Debug, Clone, Copy)]
pub struct ColorPalette {
    pub bg_primary: &'static str,
    pub bg_secondary: &'static str,
    pub card_bg: &'static str,
    pub card_footer: &'static str,
    pub card_hover: &'static str,
    pub text_primary: &'static str,
    pub text_secondary: &'static str,
    pub text_muted: &'static str,
    pub border: &'static str,
    pub border_light: &'static str,
    pub accent: &'static str,
    pub accent_text: &'static str,
    pub overlay: &'static str,
    pub error: &'static str,
}

/// Light theme colors
pub const LIGHT_PALETTE: ColorPalette = ColorPalette {
    bg_primary: "#f9fafb",
    bg_secondary: "#ffffff",
    card_bg: "#ffffff",
    card_footer: "#f3f4f6",
    card_hover: "#e5e7eb",
    text_primary: "#111827",
    text_secondary: "#4b5563",
    text_muted: "#9ca3af",
    border: "#d1d5db",
    border_light: "#e5e7eb",
    accent: "#4f46e5",
    accent_text: "#ffffff",
    overlay: "rgba(17, 24, 39, 0.45)",
    error: "#dc2626",
};

/// Dark theme colors
pub const DARK_PALETTE: ColorPalette = ColorPalette {
    bg_primary: "#111827",
    bg_secondary: "#1f2937",
    card_bg: "#1f2937",
    card_footer: "#374151",
    card_hover: "#4b5563",
    text_primary: "#f3f4f6",
    text_secondary: "#9ca3af",
    text_muted: "#6b7280",
    border: "#374151",
    border_light: "#4b5563",
    accent: "#818cf8",
    accent_text: "#111827",
    overlay: "rgba(0, 0, 0, 0.6)",
    error: "#ef4444",
};
