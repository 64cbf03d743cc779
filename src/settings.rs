//! Game settings and preferences
//!
//! Persisted separately from the high score through the same store.

use serde::{Deserialize, Serialize};

use crate::audio::Volumes;
use crate::consts::PLAYER_START_DELAY;
use crate::persistence::{KeyValueStore, PersistError};
use crate::sim::TrackParams;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,

    // === Flow ===
    /// Real-time delay between pressing play and the player starting to run
    pub start_delay_secs: f32,

    // === Generation ===
    pub track: TrackParams,
}

impl Default for Settings {
    fn default() -> Self {
        let volumes = Volumes::default();
        Self {
            master_volume: volumes.master,
            music_volume: volumes.music,
            sfx_volume: volumes.sfx,
            start_delay_secs: PLAYER_START_DELAY,
            track: TrackParams::default(),
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "endless_runner_settings";

    pub fn volumes(&self) -> Volumes {
        Volumes {
            master: self.master_volume.clamp(0.0, 1.0),
            music: self.music_volume.clamp(0.0, 1.0),
            sfx: self.sfx_volume.clamp(0.0, 1.0),
        }
    }

    /// Clamp out-of-range values from hand-edited files
    pub fn sanitized(mut self) -> Self {
        let volumes = self.volumes();
        self.master_volume = volumes.master;
        self.music_volume = volumes.music;
        self.sfx_volume = volumes.sfx;
        self.start_delay_secs = self.start_delay_secs.max(0.0);
        self.track.obstacle_spawn_probability = self.track.obstacle_spawn_probability.clamp(0.0, 1.0);
        self.track.min_straight_run = self.track.min_straight_run.max(1);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    /// Load settings, falling back to defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Settings unreadable ({}), using defaults", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Settings store failed ({}), using defaults", e),
        }

        log::info!("Using default settings");
        Self::default()
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), PersistError> {
        let json = serde_json::to_string(self)?;
        store.set(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
