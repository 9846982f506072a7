//! Browser LocalStorage backend

use super::{KeyValueStore, StorageError};

/// Handle to `window.localStorage`.
///
/// Looked up on every access so a page with storage disabled still runs;
/// reads then return nothing and writes report `Unavailable`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = Self::storage().ok_or(StorageError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|_| StorageError::Rejected {
                key: key.to_string(),
            })
    }
}
