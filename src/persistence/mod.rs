//! Key-value persistence
//!
//! Everything durable is stored as text under a fixed key:
//! - numbers as decimal strings
//! - sets and maps as JSON objects
//!
//! Reads never fail: a missing or corrupt value loads as the default.

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[cfg(target_arch = "wasm32")]
mod local_storage;
#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorage;

/// Storage keys
pub mod keys {
    pub const COIN_COUNT: &str = "coinCount";
    pub const PURCHASED_SKINS: &str = "purchasedSkins";
    pub const EQUIPPED_SKIN: &str = "equippedSkin";
    pub const PLAYER_NAME: &str = "playerName";
    pub const LIFETIME_COINS: &str = "lifetimeCoins";
    pub const LIFETIME_OBSTACLES: &str = "lifetimeObstacles";
    pub const ACHIEVEMENTS: &str = "achievements";
    pub const BEST_SCORES: &str = "bestScores";
    pub const SETTINGS: &str = "settings";
    pub const LEADERBOARD: &str = "leaderboard";
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is not available")]
    Unavailable,
    #[error("storage rejected write to `{key}`")]
    Rejected { key: String },
    #[error("failed to serialize `{key}`: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// String key-value store that survives restarts
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-process store (native builds and tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read a decimal counter, zero if missing or unparsable
pub fn load_u64(store: &dyn KeyValueStore, key: &str) -> u64 {
    match store.get(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring corrupt value for {key}: {raw:?}");
            0
        }),
        None => 0,
    }
}

/// Read a JSON value, default if missing or corrupt
pub fn load_json<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> T {
    match store.get(key) {
        Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("Ignoring corrupt value for {key}: {e}");
            T::default()
        }),
        None => T::default(),
    }
}

pub fn save_u64(store: &mut dyn KeyValueStore, key: &str, value: u64) -> Result<(), StorageError> {
    store.set(key, &value.to_string())
}

pub fn save_json<T: Serialize + ?Sized>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_counter_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(load_u64(&store, keys::COIN_COUNT), 0);
        save_u64(&mut store, keys::COIN_COUNT, 42).unwrap();
        assert_eq!(store.get(keys::COIN_COUNT).as_deref(), Some("42"));
        assert_eq!(load_u64(&store, keys::COIN_COUNT), 42);
    }

    #[test]
    fn test_corrupt_values_load_as_default() {
        let mut store = MemoryStore::new();
        store.set(keys::COIN_COUNT, "lots").unwrap();
        store.set(keys::PURCHASED_SKINS, "{not json").unwrap();

        assert_eq!(load_u64(&store, keys::COIN_COUNT), 0);
        let skins: BTreeMap<String, bool> = load_json(&store, keys::PURCHASED_SKINS);
        assert!(skins.is_empty());
    }

    #[test]
    fn test_json_map_round_trip() {
        let mut store = MemoryStore::new();
        let mut skins = BTreeMap::new();
        skins.insert("duck".to_string(), true);
        save_json(&mut store, keys::PURCHASED_SKINS, &skins).unwrap();
        assert_eq!(
            store.get(keys::PURCHASED_SKINS).as_deref(),
            Some(r#"{"duck":true}"#)
        );
        let loaded: BTreeMap<String, bool> = load_json(&store, keys::PURCHASED_SKINS);
        assert_eq!(loaded, skins);
    }
}
