//! Player preferences
//!
//! Persisted as JSON in the key-value store, separate from the high score.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::platform::KeyValueStore;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Silence everything
    pub muted: bool,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    // === Visual ===
    /// Player motion trail
    pub show_trail: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_volume: 1.0,
            sfx_volume: 1.0,
            muted: false,
            mute_on_blur: true,
            show_trail: true,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "neonAscentSettings";

    /// Decode settings, clamping volumes into range
    pub fn from_json(json: &str) -> Result<Self> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.music_volume = settings.music_volume.clamp(0.0, 1.0);
        settings.sfx_volume = settings.sfx_volume.clamp(0.0, 1.0);
        Ok(settings)
    }

    /// Load settings, falling back to defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let Some(json) = store.get(Self::STORAGE_KEY) else {
            log::info!("Using default settings");
            return Self::default();
        };

        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings");
                settings
            }
            Err(e) => {
                log::warn!("Discarding stored settings: {}", e);
                Self::default()
            }
        }
    }

    /// Save settings
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        let json = serde_json::to_string(self)?;
        store.set(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Effective music voice volume
    pub fn music_gain(&self) -> f32 {
        if self.muted { 0.0 } else { self.music_volume }
    }

    /// Effective sound effect volume
    pub fn sfx_gain(&self) -> f32 {
        if self.muted { 0.0 } else { self.sfx_volume }
    }
}
