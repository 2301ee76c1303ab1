//! Reader preferences that survive restarts: theme, highlight colours,
//! speed and chunk size.
//!
//! Stored as one JSON value under a fixed key. On startup they are laid
//! over the file configuration; command-line flags then override both.

use crate::config::{AppConfig, FontWeight, HighlightColor, ThemeMode};
use crate::store::{KeyValueStore, set_json};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const PREFERENCES_KEY: &str = "pacer-preferences-v1";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReaderPreferences {
    #[serde(default)]
    pub theme: ThemeMode,
    #[serde(default)]
    pub font_weight: FontWeight,
    #[serde(default = "crate::config::defaults::default_day_highlight")]
    pub day_highlight: HighlightColor,
    #[serde(default = "crate::config::defaults::default_night_highlight")]
    pub night_highlight: HighlightColor,
    #[serde(default = "crate::config::defaults::default_speed")]
    pub speed: u32,
    #[serde(default = "crate::config::defaults::default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for ReaderPreferences {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl ReaderPreferences {
    /// Snapshot the preference-backed fields of `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            theme: config.theme,
            font_weight: config.font_weight,
            day_highlight: config.day_highlight,
            night_highlight: config.night_highlight,
            speed: config.speed,
            chunk_size: config.chunk_size,
        }
    }

    /// Lay these preferences over `config`, re-clamping afterwards.
    pub fn apply_to(&self, config: &mut AppConfig) {
        config.theme = self.theme;
        config.font_weight = self.font_weight;
        config.day_highlight = self.day_highlight;
        config.night_highlight = self.night_highlight;
        config.speed = self.speed;
        config.chunk_size = self.chunk_size;
        config.clamp_in_place();
    }
}

/// Stored preferences, or `None` when absent or unreadable.
pub fn load(store: &dyn KeyValueStore) -> Option<ReaderPreferences> {
    let data = match store.get(PREFERENCES_KEY) {
        Ok(Some(data)) => data,
        Ok(None) => return None,
        Err(err) => {
            warn!("Failed to read preferences: {err}");
            return None;
        }
    };
    match serde_json::from_str(&data) {
        Ok(prefs) => Some(prefs),
        Err(err) => {
            warn!("Ignoring corrupt preferences: {err}");
            None
        }
    }
}

/// Persist `prefs`. Failures are logged and swallowed.
pub fn save(store: &dyn KeyValueStore, prefs: &ReaderPreferences) {
    match set_json(store, PREFERENCES_KEY, prefs) {
        Ok(()) => debug!(speed = prefs.speed, chunk = prefs.chunk_size, "Saved preferences"),
        Err(err) => warn!("Failed to save preferences: {err}"),
    }
}
