//! Player preferences
//!
//! Persisted in LocalStorage, separate from the server-side high scores.

use serde::{Deserialize, Serialize};

use crate::platform::ControlsHint;

/// Which control instructions to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ControlsPreference {
    /// Detect from the browser
    #[default]
    Auto,
    Keyboard,
    Touch,
}

impl ControlsPreference {
    /// Resolve to a concrete hint, using `detected` for `Auto`
    pub fn resolve(&self, detected: ControlsHint) -> ControlsHint {
        match self {
            ControlsPreference::Auto => detected,
            ControlsPreference::Keyboard => ControlsHint::Keyboard,
            ControlsPreference::Touch => ControlsHint::Touch,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Name last used for a highscore submission
    pub player_name: String,
    /// Highscore API endpoint
    pub highscore_endpoint: String,
    /// Faint horizontal lines behind the play field
    pub background_grid: bool,
    pub controls: ControlsPreference,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player_name: String::new(),
            highscore_endpoint: "/api/highscores".to_string(),
            background_grid: true,
            controls: ControlsPreference::Auto,
        }
    }
}

impl Settings {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "devil_levels_settings";

    /// Remember the name typed for a submission
    pub fn remember_name(&mut self, name: &str) {
        self.player_name = name.trim().to_string();
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
