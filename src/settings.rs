//! Game settings and preferences
//!
//! Persisted as one JSON value, separately from progression.

use serde::{Deserialize, Serialize};

use crate::leaderboard::MAX_LEADERBOARD_SIZE;
use crate::persistence::{self, KeyValueStore, keys};
use crate::sim::{Difficulty, RunRules};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Tier for the next run
    pub difficulty: Difficulty,

    // === Rules ===
    /// Flying off the top ends the run
    pub ceiling_is_fatal: bool,

    // === Leaderboard ===
    /// Entries shown per difficulty
    pub leaderboard_size: usize,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Easy,
            ceiling_is_fatal: false,
            leaderboard_size: 3,
            master_volume: 0.1,
            sfx_volume: 1.0,
            music_volume: 0.2,
        }
    }
}

impl Settings {
    /// Pull every field back into its valid range
    pub fn clamp(mut self) -> Self {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self.music_volume = self.music_volume.clamp(0.0, 1.0);
        self.leaderboard_size = self.leaderboard_size.clamp(1, MAX_LEADERBOARD_SIZE);
        self
    }

    /// Rules handed to the simulation
    pub fn rules(&self) -> RunRules {
        RunRules {
            ceiling_is_fatal: self.ceiling_is_fatal,
        }
    }

    pub fn effective_sfx_volume(&self) -> f32 {
        self.master_volume * self.sfx_volume
    }

    pub fn effective_music_volume(&self) -> f32 {
        self.master_volume * self.music_volume
    }

    /// Load settings, defaults if missing or corrupt
    pub fn load(store: &dyn KeyValueStore) -> Self {
        if store.get(keys::SETTINGS).is_none() {
            log::info!("Using default settings");
        }
        persistence::load_json::<Settings>(store, keys::SETTINGS).clamp()
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) {
        match persistence::save_json(store, keys::SETTINGS, self) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Failed to save settings: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_round_trip() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            difficulty: Difficulty::Hard,
            ceiling_is_fatal: true,
            leaderboard_size: 5,
            ..Settings::default()
        };
        settings.save(&mut store);
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let mut store = MemoryStore::new();
        store.set(keys::SETTINGS, r#"{"difficulty":"medium"}"#).unwrap();
        let settings = Settings::load(&store);
        assert_eq!(settings.difficulty, Difficulty::Medium);
        assert_eq!(settings.leaderboard_size, 3);
        assert!(!settings.ceiling_is_fatal);
    }

    #[test]
    fn test_out_of_range_values_clamped() {
        let mut store = MemoryStore::new();
        store
            .set(keys::SETTINGS, r#"{"master_volume":4.0,"leaderboard_size":0}"#)
            .unwrap();
        let settings = Settings::load(&store);
        assert_eq!(settings.master_volume, 1.0);
        assert_eq!(settings.leaderboard_size, 1);
    }

    #[test]
    fn test_corrupt_settings_fall_back() {
        let mut store = MemoryStore::new();
        store.set(keys::SETTINGS, "garbage").unwrap();
        assert_eq!(Settings::load(&store), Settings::default());
    }
}
