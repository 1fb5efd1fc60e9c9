//! Runtime configuration for client apps.
//!
//! Values come from the process environment (a `.env` file is loaded by the
//! binary first). Blank values count as unset.

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::Error;

/// Path of the local document store
pub const DB_PATH_VAR: &str = "NOTEWALL_DB_PATH";
/// Email of the signed-in user
pub const USER_EMAIL_VAR: &str = "NOTEWALL_USER_EMAIL";
/// `light`, `dark` or `system`
pub const THEME_VAR: &str = "NOTEWALL_THEME";

/// Requested color theme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
    System,
}

impl FromStr for ThemeMode {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            other => Err(Error::InvalidInput(format!(
                "unknown theme {other:?} (expected light, dark or system)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub user_email: Option<String>,
    pub theme: ThemeMode,
}

impl AppConfig {
    /// Read configuration from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; unknown themes fall back to the default
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let database_path = normalize_text_option(lookup(DB_PATH_VAR))
            .map_or_else(default_database_path, PathBuf::from);
        let user_email = normalize_text_option(lookup(USER_EMAIL_VAR));
        let theme = normalize_text_option(lookup(THEME_VAR))
            .map(|raw| {
                raw.parse().unwrap_or_else(|error| {
                    tracing::warn!("Ignoring {}: {}", THEME_VAR, error);
                    ThemeMode::default()
                })
            })
            .unwrap_or_default();

        Self {
            database_path,
            user_email,
            theme,
        }
    }
}

/// `<data dir>/notewall/notewall.db`, or the working directory if unknown
#[must_use]
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("notewall")
        .join("notewall.db")
}

/// Trim a value and treat blank strings as absent
#[must_use]
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
