//! Theme preferences stored next to the decision collections.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ports::{KeyValueStore, StorageError};

pub const THEME_KEY: &str = "theme";
pub const THEME_PREFERENCES_KEY: &str = "themePreferences";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }

    /// Parses a stored value, with or without JSON quoting.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().trim_matches('"') {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            "system" => Some(Theme::System),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemePreferences {
    pub accent_color: String,
    pub font_scale: f64,
    pub reduced_motion: bool,
}

impl Default for ThemePreferences {
    fn default() -> Self {
        Self {
            accent_color: "#2563eb".to_string(),
            font_scale: 1.0,
            reduced_motion: false,
        }
    }
}

#[derive(Clone)]
pub struct PreferencesRepository {
    store: Arc<dyn KeyValueStore>,
}

impl PreferencesRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored theme, `System` when missing or unreadable.
    pub async fn theme(&self) -> Theme {
        match self.store.get(THEME_KEY).await {
            Ok(Some(raw)) => Theme::parse(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "Unknown theme, using system");
                Theme::System
            }),
            Ok(None) => Theme::System,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read theme");
                Theme::System
            }
        }
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<(), StorageError> {
        self.store.set(THEME_KEY, theme.as_str()).await
    }

    pub async fn theme_preferences(&self) -> ThemePreferences {
        let raw = match self.store.get(THEME_PREFERENCES_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return ThemePreferences::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read theme preferences");
                return ThemePreferences::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Discarding unparseable theme preferences");
            ThemePreferences::default()
        })
    }

    pub async fn set_theme_preferences(
        &self,
        preferences: &ThemePreferences,
    ) -> Result<(), StorageError> {
        let json = serde_json::to_string(preferences)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.set(THEME_PREFERENCES_KEY, &json).await
    }
}
