//! Player audio preferences
//!
//! Persisted as one JSON value in the key-value store.

use serde::{Deserialize, Serialize};

use crate::audio::AudioManager;
use crate::consts::SETTINGS_KEY;
use crate::error::PersistError;
use crate::persistence::KeyValueStore;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Background music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Wind and rain volume (0.0 - 1.0)
    pub ambient_volume: f32,
    /// Sound effects volume (0.0 - 2.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            music_volume: 0.12,
            ambient_volume: 0.15,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults when absent or unreadable
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let Some(json) = store.get(SETTINGS_KEY) else {
            log::info!("Using default settings");
            return Self::default();
        };
        match serde_json::from_str(&json) {
            Ok(settings) => {
                log::info!("Loaded settings");
                settings
            }
            Err(e) => {
                log::warn!("Stored settings unreadable ({}), using defaults", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), PersistError> {
        let json = serde_json::to_string(self)?;
        store.set(SETTINGS_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Push these preferences into the mixer
    pub fn apply_to(&self, audio: &mut AudioManager) {
        audio.set_master_volume(self.master_volume);
        audio.set_music_volume(self.music_volume);
        audio.set_ambient_volume(self.ambient_volume);
        audio.set_sfx_volume(self.sfx_volume);
        audio.set_muted(self.muted);
    }
}
