//! Game settings and preferences
//!
//! Persisted as JSON in LocalStorage under `bitjumper_settings`.

use serde::{Deserialize, Serialize};

use crate::platform::storage;

/// Scoring backend used when nothing else is configured
pub const DEFAULT_API_BASE: &str = "/api";

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Visual Effects ===
    /// Screen shake on a lost run
    pub screen_shake: bool,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,

    // === Feedback ===
    /// Vibrate on pickups, bounces and game over
    pub haptics: bool,

    // === Accessibility ===
    /// Reduced motion (no shake, no star drift)
    pub reduced_motion: bool,

    // === Backend ===
    /// Base URL of the scoring API, without trailing slash
    pub api_base: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_shake: true,
            show_fps: false,
            haptics: true,
            reduced_motion: false,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "bitjumper_settings";

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Scores endpoint, tolerating a trailing slash in `api_base`
    pub fn scores_url(&self) -> String {
        format!("{}/scores", self.api_base.trim_end_matches('/'))
    }

    /// Load settings, falling back to defaults on missing or corrupt data
    pub fn load() -> Self {
        if let Some(json) = storage::get_item(Self::STORAGE_KEY) {
            match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
                Err(e) => {
                    log::warn!("Dropping corrupt settings: {}", e);
                    storage::remove_item(Self::STORAGE_KEY);
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    pub fn save(&self) {
        match serde_json::to_string(self) {
            Ok(json) => {
                storage::set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
            Err(e) => log::warn!("Failed to encode settings: {}", e),
        }
    }
}
